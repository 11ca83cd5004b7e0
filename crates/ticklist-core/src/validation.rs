//! Request validation.
//!
//! Every validator returns the full list of field errors rather than stopping
//! at the first one, so the API can report all problems in a single response.

use serde::{Deserialize, Serialize};

use crate::color::is_valid_hex_color;
use crate::defaults::{TAG_NAME_MAX_LEN, TODO_DESCRIPTION_MAX_LEN, TODO_TITLE_MAX_LEN};
use crate::error::{Error, Result};
use crate::models::{CreateTagRequest, CreateTodoRequest, PatchTagRequest, PatchTodoRequest};

/// Field-level error for validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the field that failed validation.
    pub field: String,
    /// Error message for this field.
    pub message: String,
}

impl FieldError {
    /// Creates a new field error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Turn a list of field errors into a `Result`.
pub fn into_result(errors: Vec<FieldError>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(errors))
    }
}

/// PostgreSQL text columns cannot hold NUL, even though JSON can carry it.
fn contains_nul(value: &str) -> bool {
    value.contains('\0')
}

fn check_title(title: &str, errors: &mut Vec<FieldError>) {
    if title.trim().is_empty() {
        errors.push(FieldError::new("title", "Title is required"));
    } else if contains_nul(title) {
        errors.push(FieldError::new("title", "Title cannot contain NUL characters"));
    } else if title.trim().chars().count() > TODO_TITLE_MAX_LEN {
        errors.push(FieldError::new(
            "title",
            format!("Title must be {} characters or less", TODO_TITLE_MAX_LEN),
        ));
    }
}

fn check_description(description: Option<&str>, errors: &mut Vec<FieldError>) {
    if let Some(description) = description {
        if contains_nul(description) {
            errors.push(FieldError::new(
                "description",
                "Description cannot contain NUL characters",
            ));
        } else if description.trim().chars().count() > TODO_DESCRIPTION_MAX_LEN {
            errors.push(FieldError::new(
                "description",
                format!(
                    "Description must be {} characters or less",
                    TODO_DESCRIPTION_MAX_LEN
                ),
            ));
        }
    }
}

/// Validate a tag name. Returns the message on failure.
pub fn validate_tag_name(name: &str) -> std::result::Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Tag name cannot be empty".to_string());
    }
    if contains_nul(trimmed) {
        return Err("Tag name cannot contain NUL characters".to_string());
    }
    if trimmed.chars().count() > TAG_NAME_MAX_LEN {
        return Err(format!(
            "Tag name must be {} characters or less",
            TAG_NAME_MAX_LEN
        ));
    }
    Ok(())
}

/// Validate a tag color. Returns the message on failure.
pub fn validate_tag_color(color: &str) -> std::result::Result<(), String> {
    if is_valid_hex_color(color) {
        Ok(())
    } else {
        Err(format!(
            "Invalid color '{}': expected a hex color in the form #RRGGBB",
            color
        ))
    }
}

/// Validate a request to create a todo.
pub fn validate_create_todo(req: &CreateTodoRequest) -> Result<()> {
    let mut errors = Vec::new();
    check_title(&req.title, &mut errors);
    check_description(req.description.as_deref(), &mut errors);
    into_result(errors)
}

/// Validate a partial todo update.
///
/// A blank title is allowed here: an edit that empties a todo is resolved
/// into a delete by [`crate::edit::resolve_todo_edit`] before it reaches
/// storage.
pub fn validate_patch_todo(req: &PatchTodoRequest) -> Result<()> {
    if req.is_empty() {
        return Err(Error::field(
            "body",
            "Provide at least one of title, description, or completed.",
        ));
    }

    let mut errors = Vec::new();
    if let Some(title) = req.title.as_deref() {
        if contains_nul(title) {
            errors.push(FieldError::new("title", "Title cannot contain NUL characters"));
        } else if title.trim().chars().count() > TODO_TITLE_MAX_LEN {
            errors.push(FieldError::new(
                "title",
                format!("Title must be {} characters or less", TODO_TITLE_MAX_LEN),
            ));
        }
    }
    check_description(req.description.as_deref(), &mut errors);
    into_result(errors)
}

/// Validate a request to create a tag.
pub fn validate_create_tag(req: &CreateTagRequest) -> Result<()> {
    let mut errors = Vec::new();
    if let Err(msg) = validate_tag_name(&req.name) {
        errors.push(FieldError::new("name", msg));
    }
    if let Some(color) = req.color.as_deref() {
        if let Err(msg) = validate_tag_color(color) {
            errors.push(FieldError::new("color", msg));
        }
    }
    into_result(errors)
}

/// Validate a partial tag update.
///
/// As with todos, a blank name is accepted and later resolved into a delete.
pub fn validate_patch_tag(req: &PatchTagRequest) -> Result<()> {
    if req.name.is_none() && req.color.is_none() {
        return Err(Error::field("body", "Provide at least one of name or color."));
    }

    let mut errors = Vec::new();
    if let Some(name) = req.name.as_deref() {
        if contains_nul(name) {
            errors.push(FieldError::new("name", "Tag name cannot contain NUL characters"));
        } else if name.trim().chars().count() > TAG_NAME_MAX_LEN {
            errors.push(FieldError::new(
                "name",
                format!("Tag name must be {} characters or less", TAG_NAME_MAX_LEN),
            ));
        }
    }
    if let Some(color) = req.color.as_deref() {
        if let Err(msg) = validate_tag_color(color) {
            errors.push(FieldError::new("color", msg));
        }
    }
    into_result(errors)
}
