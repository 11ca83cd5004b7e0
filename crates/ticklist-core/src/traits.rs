//! Core traits for ticklist storage and authentication.
//!
//! Every repository method takes the owner id explicitly; rows belonging to
//! another user behave exactly like missing rows.

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// TODO REPOSITORY TRAITS
// =============================================================================

/// Repository for todo CRUD operations.
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// List the owner's todos, newest first, with their tag ids.
    async fn list(&self, user_id: &str) -> Result<Vec<Todo>>;

    /// Fetch a single todo.
    async fn get(&self, user_id: &str, id: Uuid) -> Result<Option<Todo>>;

    /// Create a todo.
    async fn create(&self, user_id: &str, req: CreateTodoRequest) -> Result<Todo>;

    /// Apply a partial update. Returns `None` when the todo does not exist.
    async fn update(&self, user_id: &str, id: Uuid, req: PatchTodoRequest)
        -> Result<Option<Todo>>;

    /// Delete a todo and its tag links. Returns whether a row was removed.
    async fn delete(&self, user_id: &str, id: Uuid) -> Result<bool>;
}

// =============================================================================
// TAG REPOSITORY TRAITS
// =============================================================================

/// Repository for tags and todo-tag links.
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// List the owner's tags by name, with usage counts.
    async fn list(&self, user_id: &str) -> Result<Vec<TagWithCount>>;

    /// Fetch a single tag.
    async fn get(&self, user_id: &str, id: Uuid) -> Result<Option<Tag>>;

    /// Create a tag. A duplicate name is `Error::Conflict`.
    async fn create(&self, user_id: &str, req: CreateTagRequest) -> Result<Tag>;

    /// Rename or recolor a tag. Returns `None` when the tag does not exist.
    async fn update(&self, user_id: &str, id: Uuid, req: PatchTagRequest) -> Result<Option<Tag>>;

    /// Delete a tag and its links. Returns whether a row was removed.
    async fn delete(&self, user_id: &str, id: Uuid) -> Result<bool>;

    /// Tags linked to a todo, ordered by name.
    async fn list_for_todo(&self, user_id: &str, todo_id: Uuid) -> Result<Vec<Tag>>;

    /// Link tags to a todo by name, creating missing tags, in one transaction.
    async fn add_tags_to_todo(
        &self,
        user_id: &str,
        todo_id: Uuid,
        req: AddTagsRequest,
    ) -> Result<AddTagsOutcome>;

    /// Unlink a tag from a todo. Returns whether a link was removed.
    async fn remove_from_todo(&self, user_id: &str, todo_id: Uuid, tag_id: Uuid) -> Result<bool>;
}

// =============================================================================
// AUTHENTICATION
// =============================================================================

/// Resolves a session token to the owning user id.
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Returns the user id for a live session, `None` for unknown or expired tokens.
    async fn validate(&self, token: &str) -> Result<Option<String>>;
}

/// Fixed token table, used by tests and local tooling.
#[derive(Debug, Clone, Default)]
pub struct StaticSessionValidator {
    sessions: HashMap<String, String>,
}

impl StaticSessionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `token` as a session for `user_id`.
    pub fn with_session(mut self, token: impl Into<String>, user_id: impl Into<String>) -> Self {
        self.sessions.insert(token.into(), user_id.into());
        self
    }
}

#[async_trait]
impl SessionValidator for StaticSessionValidator {
    async fn validate(&self, token: &str) -> Result<Option<String>> {
        Ok(self.sessions.get(token).cloned())
    }
}
