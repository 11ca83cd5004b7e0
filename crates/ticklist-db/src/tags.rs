//! Tag repository implementation.
//!
//! Besides plain tag CRUD this owns the todo-tag association flow: linking a
//! batch of tag names to a todo, creating missing tags on the way, inside a
//! single transaction.

use std::time::Instant;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use ticklist_core::validation::{validate_tag_color, validate_tag_name};
use ticklist_core::{
    color_for, normalize_tag_names, requested_color, AddTagsOutcome, AddTagsRequest,
    CreateTagRequest, Error, PatchTagRequest, Result, Tag, TagLink, TagRepository, TagWithCount,
};

use crate::todos::PgTodoRepository;

const TAG_COLUMNS: &str = "id, user_id, name, color, created_at";

/// Insert-then-read rounds before giving up on a tag that keeps being deleted.
const UPSERT_ATTEMPTS: u32 = 2;

fn tag_from_row(row: &PgRow) -> Tag {
    Tag {
        id: row.get("id"),
        user_id: row.get("user_id"),
        name: row.get("name"),
        color: row.get("color"),
        created_at: row.get("created_at"),
    }
}

/// Map a unique violation on `(user_id, name)` to a conflict.
fn name_conflict(name: &str) -> impl FnOnce(sqlx::Error) -> Error + '_ {
    move |e| {
        let err = Error::Database(e);
        if err.is_unique_violation() {
            Error::Conflict(format!("Tag '{}' already exists", name))
        } else {
            err
        }
    }
}

/// PostgreSQL implementation of TagRepository.
#[derive(Clone)]
pub struct PgTagRepository {
    pool: Pool<Postgres>,
    todos: PgTodoRepository,
}

impl PgTagRepository {
    /// Create a new PgTagRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            todos: PgTodoRepository::new(pool.clone()),
            pool,
        }
    }

    /// Get the owner's tag by name, creating it when missing.
    ///
    /// Returns the tag and whether this call created it. Concurrent creators
    /// of the same name resolve through the unique index: the loser's insert
    /// is a no-op and it reads the winner's row. That read holds a key-share
    /// lock, so the tag cannot be deleted before the link is written. A tag
    /// deleted between the insert and the read is inserted again.
    pub async fn upsert_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: &str,
        name: &str,
        color: Option<&str>,
    ) -> Result<(Tag, bool)> {
        let insert = format!(
            r#"
            INSERT INTO tags (id, user_id, name, color, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (user_id, name) DO NOTHING
            RETURNING {}
            "#,
            TAG_COLUMNS
        );
        let select = format!(
            "SELECT {} FROM tags WHERE user_id = $1 AND name = $2 FOR KEY SHARE",
            TAG_COLUMNS
        );
        let color = color_for(name, color);

        for attempt in 1..=UPSERT_ATTEMPTS {
            let inserted = sqlx::query(&insert)
                .bind(Uuid::now_v7())
                .bind(user_id)
                .bind(name)
                .bind(&color)
                .fetch_optional(&mut **tx)
                .await
                .map_err(Error::Database)?;
            if let Some(row) = inserted {
                return Ok((tag_from_row(&row), true));
            }

            let existing = sqlx::query(&select)
                .bind(user_id)
                .bind(name)
                .fetch_optional(&mut **tx)
                .await
                .map_err(Error::Database)?;
            if let Some(row) = existing {
                return Ok((tag_from_row(&row), false));
            }

            debug!(
                subsystem = "database",
                component = "tags",
                op = "upsert",
                attempt,
                "Tag deleted between insert and read, retrying"
            );
        }

        Err(Error::Internal(format!("Tag '{}' kept disappearing while being linked", name)))
    }

    /// Link a tag to a todo. Returns false when the link already existed.
    pub async fn link_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        todo_id: Uuid,
        tag_id: Uuid,
    ) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO todo_tags (todo_id, tag_id, assigned_at) VALUES ($1, $2, NOW())
             ON CONFLICT (todo_id, tag_id) DO NOTHING",
        )
        .bind(todo_id)
        .bind(tag_id)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TagRepository for PgTagRepository {
    async fn list(&self, user_id: &str) -> Result<Vec<TagWithCount>> {
        let rows = sqlx::query(
            r#"
            SELECT
                g.id, g.user_id, g.name, g.color, g.created_at,
                COUNT(tt.todo_id) AS todo_count
            FROM tags g
            LEFT JOIN todo_tags tt ON tt.tag_id = g.id
            WHERE g.user_id = $1
            GROUP BY g.id
            ORDER BY g.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let tags = rows
            .iter()
            .map(|row| TagWithCount {
                tag: tag_from_row(row),
                todo_count: row.get("todo_count"),
            })
            .collect();
        Ok(tags)
    }

    async fn get(&self, user_id: &str, id: Uuid) -> Result<Option<Tag>> {
        let sql = format!(
            "SELECT {} FROM tags WHERE id = $1 AND user_id = $2",
            TAG_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.as_ref().map(tag_from_row))
    }

    async fn create(&self, user_id: &str, req: CreateTagRequest) -> Result<Tag> {
        let name = req.name.trim();
        let sql = format!(
            "INSERT INTO tags (id, user_id, name, color, created_at)
             VALUES ($1, $2, $3, $4, NOW())
             RETURNING {}",
            TAG_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(Uuid::now_v7())
            .bind(user_id)
            .bind(name)
            .bind(color_for(name, req.color.as_deref()))
            .fetch_one(&self.pool)
            .await
            .map_err(name_conflict(name))?;
        Ok(tag_from_row(&row))
    }

    async fn update(&self, user_id: &str, id: Uuid, req: PatchTagRequest) -> Result<Option<Tag>> {
        let name = req.name.as_deref().map(str::trim);
        let sql = format!(
            "UPDATE tags SET name = COALESCE($3, name), color = COALESCE($4, color)
             WHERE id = $1 AND user_id = $2
             RETURNING {}",
            TAG_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(user_id)
            .bind(name)
            .bind(req.color.as_deref())
            .fetch_optional(&self.pool)
            .await
            .map_err(name_conflict(name.unwrap_or_default()))?;
        Ok(row.as_ref().map(tag_from_row))
    }

    async fn delete(&self, user_id: &str, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_for_todo(&self, user_id: &str, todo_id: Uuid) -> Result<Vec<Tag>> {
        if !self.todos.exists(user_id, todo_id).await? {
            return Err(Error::TodoNotFound(todo_id));
        }
        let rows = sqlx::query(
            r#"
            SELECT g.id, g.user_id, g.name, g.color, g.created_at
            FROM todo_tags tt
            JOIN tags g ON g.id = tt.tag_id
            WHERE tt.todo_id = $1 AND g.user_id = $2
            ORDER BY g.name
            "#,
        )
        .bind(todo_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(rows.iter().map(tag_from_row).collect())
    }

    async fn add_tags_to_todo(
        &self,
        user_id: &str,
        todo_id: Uuid,
        req: AddTagsRequest,
    ) -> Result<AddTagsOutcome> {
        let start = Instant::now();
        let names = normalize_tag_names(&req.names);
        if names.is_empty() {
            return Err(Error::field("names", "Provide at least one tag name"));
        }

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        if !self.todos.lock_tx(&mut tx, user_id, todo_id).await? {
            return Err(Error::TodoNotFound(todo_id));
        }

        let mut outcome = AddTagsOutcome::default();
        for name in &names {
            if let Err(msg) = validate_tag_name(name) {
                outcome.reject(name, msg);
                continue;
            }
            let color = requested_color(&req.colors, name);
            if let Some(color) = color {
                if let Err(msg) = validate_tag_color(color) {
                    outcome.reject(name, msg);
                    continue;
                }
            }

            let (tag, created) = self.upsert_tx(&mut tx, user_id, name, color).await?;
            let linked = self.link_tx(&mut tx, todo_id, tag.id).await?;
            debug!(
                subsystem = "database",
                component = "tags",
                op = "link",
                todo_id = %todo_id,
                tag_id = %tag.id,
                created,
                linked,
                "Tag processed"
            );

            let link = TagLink {
                tag_id: tag.id,
                name: tag.name,
                color: tag.color,
                created,
            };
            if linked {
                outcome.added.push(link);
            } else {
                outcome.skipped.push(link);
            }
        }

        tx.commit().await.map_err(Error::Database)?;

        let outcome = outcome.finish();
        info!(
            subsystem = "database",
            component = "tags",
            op = "add_tags_to_todo",
            todo_id = %todo_id,
            requested = names.len(),
            added = outcome.added.len(),
            skipped = outcome.skipped.len(),
            errors = outcome.errors.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Tags linked to todo"
        );
        Ok(outcome)
    }

    async fn remove_from_todo(&self, user_id: &str, todo_id: Uuid, tag_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM todo_tags tt
            USING todos t
            WHERE tt.todo_id = $1 AND tt.tag_id = $2
              AND t.id = tt.todo_id AND t.user_id = $3
            "#,
        )
        .bind(todo_id)
        .bind(tag_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_conflict_passes_through_other_errors() {
        let err = name_conflict("Frontend")(sqlx::Error::RowNotFound);
        assert!(matches!(err, Error::Database(sqlx::Error::RowNotFound)));
    }
}
