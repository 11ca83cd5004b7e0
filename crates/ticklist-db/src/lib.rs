//! # ticklist-db
//!
//! PostgreSQL database layer for ticklist.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for todos, tags and sessions
//! - The transactional tag-association flow
//! - Embedded schema migrations (feature `migrations`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use ticklist_db::{AddTagsRequest, Database, PoolConfig, TagRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect_with_config(
//!         "postgres://localhost/ticklist",
//!         PoolConfig::new().max_connections(5),
//!     ).await?;
//!
//!     let outcome = db.tags.add_tags_to_todo(
//!         "user-1",
//!         todo_id,
//!         AddTagsRequest { names: vec!["Frontend".into()], ..Default::default() },
//!     ).await?;
//!
//!     println!("Added {} tags", outcome.added.len());
//!     Ok(())
//! }
//! ```
pub mod pool;
pub mod sessions;
pub mod tags;
pub mod todos;

// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use ticklist_core::*;

// Re-export repository implementations
pub use pool::{create_pool_with_config, log_pool_metrics, PoolConfig};
pub use sessions::{PgSessionRepository, PgUserRepository};
pub use tags::PgTagRepository;
pub use todos::PgTodoRepository;

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Todo repository.
    pub todos: PgTodoRepository,
    /// Tag repository, including todo-tag links.
    pub tags: PgTagRepository,
    /// Session lookup.
    pub sessions: PgSessionRepository,
    /// User rows (seeding and tests).
    pub users: PgUserRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            todos: PgTodoRepository::new(pool.clone()),
            tags: PgTagRepository::new(pool.clone()),
            sessions: PgSessionRepository::new(pool.clone()),
            users: PgUserRepository::new(pool.clone()),
            pool,
        }
    }

    /// Connect a pool and build the repositories on top of it.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
