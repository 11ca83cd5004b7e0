//! Inline edit commit resolution.
//!
//! An inline edit ends in one of three ways: nothing changed, the record is
//! updated, or the edit emptied the record and it is deleted instead.

use crate::error::{Error, Result};
use crate::models::{PatchTodoRequest, Todo};

/// Outcome of committing an inline edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommit<T> {
    /// The edited value equals the original; nothing to write.
    Unchanged,
    /// Write this value.
    Update(T),
    /// The edit emptied the record; delete it.
    Delete,
}

/// Resolve a single-field text edit, such as renaming a tag.
pub fn resolve_edit(original: &str, edited: &str) -> EditCommit<String> {
    let edited = edited.trim();
    if edited.is_empty() {
        EditCommit::Delete
    } else if edited == original {
        EditCommit::Unchanged
    } else {
        EditCommit::Update(edited.to_string())
    }
}

/// Resolve a todo patch against the stored todo.
///
/// Text fields are trimmed and a blank description becomes `None`. When the
/// resulting title and description are both empty the todo is deleted. A
/// blank title next to a non-empty description is rejected.
pub fn resolve_todo_edit(
    current: &Todo,
    patch: &PatchTodoRequest,
) -> Result<EditCommit<PatchTodoRequest>> {
    let title = patch.title.as_deref().map(str::trim);
    let description = patch
        .description
        .as_deref()
        .map(str::trim)
        .map(|d| if d.is_empty() { None } else { Some(d) });

    let final_title = title.unwrap_or(current.title.as_str());
    let final_description = match description {
        Some(d) => d,
        None => current.description.as_deref().filter(|d| !d.trim().is_empty()),
    };

    if final_title.is_empty() {
        return if final_description.is_none() {
            Ok(EditCommit::Delete)
        } else {
            Err(Error::field("title", "Title is required"))
        };
    }

    let title_changed = title.is_some_and(|t| t != current.title);
    let description_changed =
        description.is_some_and(|d| d != current.description.as_deref());
    let completed_changed = patch.completed.is_some_and(|c| c != current.completed);

    if !title_changed && !description_changed && !completed_changed {
        return Ok(EditCommit::Unchanged);
    }

    Ok(EditCommit::Update(PatchTodoRequest {
        title: title.filter(|_| title_changed).map(str::to_string),
        // Some("") clears the stored description.
        description: description
            .filter(|_| description_changed)
            .map(|d| d.unwrap_or_default().to_string()),
        completed: patch.completed.filter(|_| completed_changed),
    }))
}
