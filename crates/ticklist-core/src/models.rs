//! Domain models and request/response types.
//!
//! JSON field names are camelCase to match the browser client.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// TODOS
// =============================================================================

/// A user-owned task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    /// Ids of linked tags, ordered by tag name.
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request for creating a todo.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial todo update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchTodoRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl PatchTodoRequest {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }
}

// =============================================================================
// TAGS
// =============================================================================

/// A user-owned label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    /// `#RRGGBB`
    pub color: String,
    pub created_at: DateTime<Utc>,
}

/// A tag plus the number of todos it is linked to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagWithCount {
    #[serde(flatten)]
    pub tag: Tag,
    pub todo_count: i64,
}

/// Request for creating a tag.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTagRequest {
    pub name: String,
    #[serde(default, alias = "colorHex")]
    pub color: Option<String>,
}

/// Partial tag update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchTagRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "colorHex")]
    pub color: Option<String>,
}

// =============================================================================
// TAG ASSOCIATION
// =============================================================================

/// Request for linking tags to a todo by name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTagsRequest {
    /// Tag names; blanks and duplicates are dropped.
    pub names: Vec<String>,
    /// Optional colors for tags that have to be created, keyed by name.
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

/// One tag that ended up linked (or was already linked) to the todo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagLink {
    pub tag_id: Uuid,
    pub name: String,
    pub color: String,
    /// Whether the tag row itself was created by this call.
    pub created: bool,
}

/// A tag name that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagError {
    pub name: String,
    pub message: String,
}

/// Result of linking tags to a todo.
///
/// `success` is true only when `errors` is empty; tags in `added` are
/// committed even when other names failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTagsOutcome {
    pub success: bool,
    pub added: Vec<TagLink>,
    pub skipped: Vec<TagLink>,
    pub errors: Vec<TagError>,
}

impl AddTagsOutcome {
    /// Record a per-name failure.
    pub fn reject(&mut self, name: &str, message: impl Into<String>) {
        self.errors.push(TagError {
            name: name.to_string(),
            message: message.into(),
        });
    }

    /// Set `success` from the error bucket and return the finished outcome.
    pub fn finish(mut self) -> Self {
        self.success = self.errors.is_empty();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_todo_serializes_camel_case() {
        let todo = Todo {
            id: Uuid::nil(),
            user_id: "user-1".to_string(),
            title: "Buy groceries".to_string(),
            description: None,
            completed: false,
            tag_ids: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert!(json.get("userId").is_some());
        assert!(json.get("tagIds").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn test_tag_with_count_flattens() {
        let tag = TagWithCount {
            tag: Tag {
                id: Uuid::nil(),
                user_id: "user-1".to_string(),
                name: "Frontend".to_string(),
                color: "#222222".to_string(),
                created_at: Utc::now(),
            },
            todo_count: 3,
        };
        let json = serde_json::to_value(&tag).unwrap();
        assert_eq!(json["name"], "Frontend");
        assert_eq!(json["todoCount"], 3);
    }

    #[test]
    fn test_create_tag_accepts_color_hex_alias() {
        let req: CreateTagRequest =
            serde_json::from_str(r##"{"name":"polly","colorHex":"#222222"}"##).unwrap();
        assert_eq!(req.color.as_deref(), Some("#222222"));
    }

    #[test]
    fn test_patch_todo_is_empty() {
        let req: PatchTodoRequest = serde_json::from_str("{}").unwrap();
        assert!(req.is_empty());

        let req: PatchTodoRequest = serde_json::from_str(r#"{"completed":true}"#).unwrap();
        assert!(!req.is_empty());
    }

    #[test]
    fn test_add_tags_request_colors_default_empty() {
        let req: AddTagsRequest = serde_json::from_str(r#"{"names":["Tanstack"]}"#).unwrap();
        assert_eq!(req.names, vec!["Tanstack"]);
        assert!(req.colors.is_empty());
    }

    #[test]
    fn test_outcome_success_tracks_errors() {
        let outcome = AddTagsOutcome::default().finish();
        assert!(outcome.success);

        let mut outcome = AddTagsOutcome::default();
        outcome.reject("polly", "Invalid color");
        let outcome = outcome.finish();
        assert!(!outcome.success);
        assert_eq!(outcome.errors[0].name, "polly");
    }
}
