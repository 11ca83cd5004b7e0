//! HTTP handlers for ticklist-api.

pub mod health;
pub mod tags;
pub mod todos;
