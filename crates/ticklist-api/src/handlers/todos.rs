//! Todo HTTP handlers.
//!
//! All routes are scoped to the authenticated owner; another user's todo is
//! indistinguishable from a missing one.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;
use uuid::Uuid;

use ticklist_core::validation::{validate_create_todo, validate_patch_todo};
use ticklist_core::{
    resolve_todo_edit, CreateTodoRequest, EditCommit, Error, PatchTodoRequest, Todo,
};

use crate::{ApiError, AppJson, AppPath, AppState, AuthUser};

/// List the caller's todos, newest first.
///
/// # Returns
/// - 200 OK with array of todos, each carrying its tag ids
/// - 401 Unauthorized without a valid session
pub async fn list_todos(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = state.todos.list(&auth.user_id).await?;
    Ok(Json(todos))
}

/// Create a todo.
///
/// # Returns
/// - 201 Created with the new todo
/// - 400 Bad Request if the body is not valid JSON or fails validation
pub async fn create_todo(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(req): AppJson<CreateTodoRequest>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    validate_create_todo(&req)?;
    let todo = state.todos.create(&auth.user_id, req).await?;
    info!(todo_id = %todo.id, "Todo created");
    Ok((StatusCode::CREATED, Json(todo)))
}

/// Get a single todo.
///
/// # Returns
/// - 200 OK with the todo
/// - 404 Not Found if the caller has no such todo
pub async fn get_todo(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Todo>, ApiError> {
    let todo = state
        .todos
        .get(&auth.user_id, id)
        .await?
        .ok_or(Error::TodoNotFound(id))?;
    Ok(Json(todo))
}

/// Apply an inline edit to a todo.
///
/// An edit that leaves both title and description empty deletes the todo.
///
/// # Returns
/// - 200 OK with the updated (or unchanged) todo
/// - 204 No Content when the edit emptied the todo and it was deleted
/// - 400 Bad Request on an empty body or invalid fields
/// - 404 Not Found if the caller has no such todo
pub async fn update_todo(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<PatchTodoRequest>,
) -> Result<Response, ApiError> {
    validate_patch_todo(&req)?;
    let current = state
        .todos
        .get(&auth.user_id, id)
        .await?
        .ok_or(Error::TodoNotFound(id))?;

    match resolve_todo_edit(&current, &req)? {
        EditCommit::Unchanged => Ok(Json(current).into_response()),
        EditCommit::Update(patch) => {
            let todo = state
                .todos
                .update(&auth.user_id, id, patch)
                .await?
                .ok_or(Error::TodoNotFound(id))?;
            Ok(Json(todo).into_response())
        }
        EditCommit::Delete => {
            if !state.todos.delete(&auth.user_id, id).await? {
                return Err(Error::TodoNotFound(id).into());
            }
            info!(todo_id = %id, "Todo emptied by edit, deleted");
            Ok(StatusCode::NO_CONTENT.into_response())
        }
    }
}

/// Delete a todo. Its tag links go with it; the tags stay.
///
/// # Returns
/// - 204 No Content on success
/// - 404 Not Found if the caller has no such todo
pub async fn delete_todo(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !state.todos.delete(&auth.user_id, id).await? {
        return Err(Error::TodoNotFound(id).into());
    }
    info!(todo_id = %id, "Todo deleted");
    Ok(StatusCode::NO_CONTENT)
}
