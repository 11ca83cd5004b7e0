//! Tag HTTP handlers, including the todo-tag link routes.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;
use uuid::Uuid;

use ticklist_core::validation::{validate_create_tag, validate_patch_tag};
use ticklist_core::{
    resolve_edit, AddTagsOutcome, AddTagsRequest, CreateTagRequest, EditCommit, Error,
    PatchTagRequest, Tag, TagWithCount,
};

use crate::{ApiError, AppJson, AppPath, AppState, AuthUser};

/// List the caller's tags by name, with usage counts.
///
/// # Returns
/// - 200 OK with array of tags, each with `todoCount`
pub async fn list_tags(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<TagWithCount>>, ApiError> {
    Ok(Json(state.tags.list(&auth.user_id).await?))
}

/// Get a single tag.
///
/// # Returns
/// - 200 OK with the tag
/// - 404 Not Found if the caller has no such tag
pub async fn get_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Tag>, ApiError> {
    let tag = state
        .tags
        .get(&auth.user_id, id)
        .await?
        .ok_or(Error::TagNotFound(id))?;
    Ok(Json(tag))
}

/// Create a tag. Without a color the tag gets its palette color.
///
/// # Returns
/// - 201 Created with the new tag
/// - 400 Bad Request on invalid name or color
/// - 409 Conflict if the caller already has a tag with this name
pub async fn create_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(req): AppJson<CreateTagRequest>,
) -> Result<(StatusCode, Json<Tag>), ApiError> {
    validate_create_tag(&req)?;
    let tag = state.tags.create(&auth.user_id, req).await?;
    info!(tag_id = %tag.id, "Tag created");
    Ok((StatusCode::CREATED, Json(tag)))
}

/// Rename or recolor a tag. A blank name deletes the tag.
///
/// # Returns
/// - 200 OK with the updated (or unchanged) tag
/// - 204 No Content when a blank name deleted the tag
/// - 400 Bad Request on an empty body or invalid fields
/// - 404 Not Found if the caller has no such tag
/// - 409 Conflict if the new name is taken
pub async fn update_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<PatchTagRequest>,
) -> Result<Response, ApiError> {
    validate_patch_tag(&req)?;
    let current = state
        .tags
        .get(&auth.user_id, id)
        .await?
        .ok_or(Error::TagNotFound(id))?;

    let name = match req.name.as_deref().map(|n| resolve_edit(&current.name, n)) {
        Some(EditCommit::Delete) => {
            if !state.tags.delete(&auth.user_id, id).await? {
                return Err(Error::TagNotFound(id).into());
            }
            info!(tag_id = %id, "Tag emptied by edit, deleted");
            return Ok(StatusCode::NO_CONTENT.into_response());
        }
        Some(EditCommit::Update(name)) => Some(name),
        Some(EditCommit::Unchanged) | None => None,
    };
    let color = req.color.filter(|c| *c != current.color);

    if name.is_none() && color.is_none() {
        return Ok(Json(current).into_response());
    }

    let tag = state
        .tags
        .update(&auth.user_id, id, PatchTagRequest { name, color })
        .await?
        .ok_or(Error::TagNotFound(id))?;
    Ok(Json(tag).into_response())
}

/// Delete a tag. Its links go with it; the todos stay.
///
/// # Returns
/// - 204 No Content on success
/// - 404 Not Found if the caller has no such tag
pub async fn delete_tag(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !state.tags.delete(&auth.user_id, id).await? {
        return Err(Error::TagNotFound(id).into());
    }
    info!(tag_id = %id, "Tag deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// List the tags linked to a todo, by name.
///
/// # Returns
/// - 200 OK with array of tags
/// - 404 Not Found if the caller has no such todo
pub async fn list_todo_tags(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(todo_id): AppPath<Uuid>,
) -> Result<Json<Vec<Tag>>, ApiError> {
    Ok(Json(state.tags.list_for_todo(&auth.user_id, todo_id).await?))
}

/// Link tags to a todo by name, creating tags that do not exist yet.
///
/// Per-name problems (bad color, name too long) are reported in `errors`
/// without failing the request; the other names are still linked.
///
/// # Returns
/// - 200 OK with `{ success, added, skipped, errors }`
/// - 400 Bad Request if no usable tag name was given
/// - 404 Not Found if the caller has no such todo
/// - 500 Internal Server Error if the transaction failed; nothing is written
pub async fn add_tags_to_todo(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(todo_id): AppPath<Uuid>,
    AppJson(req): AppJson<AddTagsRequest>,
) -> Result<Json<AddTagsOutcome>, ApiError> {
    let outcome = state
        .tags
        .add_tags_to_todo(&auth.user_id, todo_id, req)
        .await?;
    Ok(Json(outcome))
}

/// Unlink a tag from a todo.
///
/// # Returns
/// - 204 No Content on success
/// - 404 Not Found if the link does not exist for the caller
pub async fn remove_tag_from_todo(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath((todo_id, tag_id)): AppPath<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    if !state
        .tags
        .remove_from_todo(&auth.user_id, todo_id, tag_id)
        .await?
    {
        return Err(ApiError::NotFound("Tag is not linked to this todo".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
