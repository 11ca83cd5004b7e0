//! ticklist-seed: populate a local database with sample users and todos.
//!
//! Each seeded user also gets a session token, printed on stdout, so the API
//! can be exercised with `curl -H "Authorization: Bearer <token>"`.

use anyhow::Context;
use chrono::{Duration, Utc};
use clap::Parser;
use rand::seq::SliceRandom;
use tracing::info;
use uuid::Uuid;

use ticklist_db::{CreateTodoRequest, Database, PoolConfig, TodoRepository};

const TITLES: &[&str] = &[
    "Buy groceries",
    "Walk the dog",
    "Read a book",
    "Write code",
    "Exercise",
];

const DESCRIPTIONS: &[Option<&str>] = &[
    None,
    Some("Milk, Bread, Eggs"),
    Some("30-minute walk in the park"),
    Some("Finish reading 'Clean Code'"),
    Some("Work on Hono project"),
    Some("30 minutes of cardio"),
];

#[derive(Parser)]
#[command(name = "ticklist-seed")]
#[command(author, version, about = "Seed a ticklist database with sample data")]
struct Cli {
    /// Database connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Number of users to create
    #[arg(short, long, default_value_t = 10)]
    users: usize,

    /// Todos per user
    #[arg(short, long, default_value_t = 10)]
    todos: usize,

    /// Lifetime of the printed session tokens, in days
    #[arg(long, default_value_t = 7)]
    session_days: i64,

    /// Skip running migrations before seeding
    #[arg(long)]
    no_migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ticklist_db=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let db = Database::connect_with_config(&cli.database_url, PoolConfig::new().max_connections(2))
        .await
        .context("Failed to connect to database")?;

    if !cli.no_migrate {
        db.migrate().await.context("Failed to run migrations")?;
    }

    let mut rng = rand::thread_rng();
    let expires_at = Utc::now() + Duration::days(cli.session_days);

    for n in 0..cli.users {
        let user_id = Uuid::now_v7().to_string();
        let email = format!("seed-{}@example.test", user_id);
        db.users
            .upsert(&user_id, &format!("Seed User {}", n + 1), &email)
            .await
            .with_context(|| format!("Failed to create user {}", user_id))?;

        for _ in 0..cli.todos {
            let title = TITLES.choose(&mut rng).copied().unwrap_or("Write code");
            let description = DESCRIPTIONS.choose(&mut rng).copied().flatten();
            db.todos
                .create(
                    &user_id,
                    CreateTodoRequest {
                        title: title.to_string(),
                        description: description.map(str::to_string),
                    },
                )
                .await
                .context("Failed to create todo")?;
        }

        let token = Uuid::new_v4().simple().to_string();
        db.sessions
            .create(&user_id, &token, expires_at)
            .await
            .context("Failed to create session")?;
        println!("{}\t{}", email, token);
    }

    info!(
        users = cli.users,
        todos_per_user = cli.todos,
        "Seeded local database successfully"
    );
    Ok(())
}
