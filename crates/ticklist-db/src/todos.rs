//! Todo repository implementation.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row, Transaction};
use tracing::debug;
use uuid::Uuid;

use ticklist_core::{CreateTodoRequest, Error, PatchTodoRequest, Result, Todo, TodoRepository};

/// Columns selected for every todo read, including tag ids ordered by tag name.
const TODO_COLUMNS: &str = r#"
    t.id, t.user_id, t.title, t.description, t.completed, t.created_at, t.updated_at,
    ARRAY(
        SELECT tt.tag_id
        FROM todo_tags tt
        JOIN tags g ON g.id = tt.tag_id
        WHERE tt.todo_id = t.id
        ORDER BY g.name
    ) AS tag_ids
"#;

fn todo_from_row(row: &PgRow) -> Todo {
    Todo {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        description: row.get("description"),
        completed: row.get("completed"),
        tag_ids: row.get("tag_ids"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Trimmed description, with blank mapped to `None`.
fn clean_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

/// PostgreSQL implementation of TodoRepository.
#[derive(Clone)]
pub struct PgTodoRepository {
    pool: Pool<Postgres>,
}

impl PgTodoRepository {
    /// Create a new PgTodoRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Fetch a todo within an existing transaction.
    pub async fn get_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: &str,
        id: Uuid,
    ) -> Result<Option<Todo>> {
        let sql = format!(
            "SELECT {} FROM todos t WHERE t.id = $1 AND t.user_id = $2",
            TODO_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(Error::Database)?;
        Ok(row.as_ref().map(todo_from_row))
    }

    /// Apply a partial update within an existing transaction.
    ///
    /// Returns whether the todo exists for the owner. An empty description
    /// clears the stored one.
    pub async fn update_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: &str,
        id: Uuid,
        req: &PatchTodoRequest,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE todos SET
                title = COALESCE($3, title),
                description = CASE
                    WHEN $4::text IS NULL THEN description
                    ELSE NULLIF($4::text, '')
                END,
                completed = COALESCE($5, completed),
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(req.title.as_deref().map(str::trim))
        .bind(req.description.as_deref().map(str::trim))
        .bind(req.completed)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    /// Lock the owner's todo row for the rest of the transaction.
    ///
    /// Returns false when the todo does not exist for the owner.
    pub async fn lock_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: &str,
        id: Uuid,
    ) -> Result<bool> {
        let row = sqlx::query("SELECT id FROM todos WHERE id = $1 AND user_id = $2 FOR UPDATE")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(Error::Database)?;
        Ok(row.is_some())
    }

    /// Check if the owner's todo exists.
    pub async fn exists(&self, user_id: &str, id: Uuid) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM todos WHERE id = $1 AND user_id = $2)")
                .bind(id)
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(Error::Database)?;
        Ok(exists)
    }
}

#[async_trait]
impl TodoRepository for PgTodoRepository {
    async fn list(&self, user_id: &str) -> Result<Vec<Todo>> {
        let sql = format!(
            "SELECT {} FROM todos t WHERE t.user_id = $1 ORDER BY t.created_at DESC, t.id DESC",
            TODO_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(rows.iter().map(todo_from_row).collect())
    }

    async fn get(&self, user_id: &str, id: Uuid) -> Result<Option<Todo>> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let result = self.get_tx(&mut tx, user_id, id).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(result)
    }

    async fn create(&self, user_id: &str, req: CreateTodoRequest) -> Result<Todo> {
        let row = sqlx::query(
            r#"
            INSERT INTO todos (id, user_id, title, description, completed, created_at, updated_at)
            VALUES ($1, $2, $3, $4, FALSE, NOW(), NOW())
            RETURNING id, user_id, title, description, completed, created_at, updated_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(user_id)
        .bind(req.title.trim())
        .bind(clean_description(req.description.as_deref()))
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        let todo = Todo {
            id: row.get("id"),
            user_id: row.get("user_id"),
            title: row.get("title"),
            description: row.get("description"),
            completed: row.get("completed"),
            tag_ids: Vec::new(),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        };
        debug!(
            subsystem = "database",
            component = "todos",
            op = "create",
            todo_id = %todo.id,
            "Todo created"
        );
        Ok(todo)
    }

    async fn update(
        &self,
        user_id: &str,
        id: Uuid,
        req: PatchTodoRequest,
    ) -> Result<Option<Todo>> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        if !self.update_tx(&mut tx, user_id, id, &req).await? {
            return Ok(None);
        }
        let result = self.get_tx(&mut tx, user_id, id).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(result)
    }

    async fn delete(&self, user_id: &str, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        let deleted = result.rows_affected() > 0;
        debug!(
            subsystem = "database",
            component = "todos",
            op = "delete",
            todo_id = %id,
            deleted,
            "Todo delete"
        );
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_description() {
        assert_eq!(clean_description(None), None);
        assert_eq!(clean_description(Some("   ")), None);
        assert_eq!(
            clean_description(Some(" Milk, Bread, Eggs ")).as_deref(),
            Some("Milk, Bread, Eggs")
        );
    }

    #[test]
    fn test_todo_columns_scope_tags_to_todo() {
        assert!(TODO_COLUMNS.contains("tt.todo_id = t.id"));
        assert!(TODO_COLUMNS.contains("ORDER BY g.name"));
    }
}
