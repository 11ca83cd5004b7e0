//! # ticklist-core
//!
//! Core types, traits, and rules for the ticklist todo service.
//!
//! This crate holds everything that does not touch the network or the
//! database: models, validation, tag colors, tag-name normalization, the
//! inline edit and click debounce state machines, and the repository traits
//! implemented by `ticklist-db`.

pub mod click;
pub mod color;
pub mod defaults;
pub mod edit;
pub mod error;
pub mod models;
pub mod tag_names;
pub mod traits;
pub mod validation;

// Re-export commonly used types at crate root
pub use click::{ClickAction, ClickDebouncer, ClickState};
pub use color::{color_for, fallback_color, is_valid_hex_color};
pub use edit::{resolve_edit, resolve_todo_edit, EditCommit};
pub use error::{Error, Result};
pub use models::*;
pub use tag_names::{normalize_tag_names, requested_color};
pub use traits::*;
pub use validation::FieldError;
