//! SQLite-backed persistent task store.
//!
//! - `tasks`: reminder / recurring task CRUD, due queries, delivery marking

mod tasks;

#[cfg(test)]
mod tests;

pub use tasks::{PrefixMatch, Task, TaskOwner};

use pomni_core::{config::MemoryConfig, error::PomniError, shellexpand};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;

/// Persistent task store backed by SQLite.
///
/// Cloning is cheap: clones share the same connection pool.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Create a new store, running migrations on first use.
    pub async fn new(config: &MemoryConfig) -> Result<Self, PomniError> {
        let db_path = shellexpand(&config.db_path);

        // Ensure parent directory exists.
        if let Some(parent) = std::path::Path::new(&db_path).parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| PomniError::Storage(format!("failed to create data dir: {e}")))?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| PomniError::Storage(format!("invalid db path: {e}")))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(opts)
            .await
            .map_err(|e| PomniError::Storage(format!("failed to connect to sqlite: {e}")))?;

        Self::run_migrations(&pool).await?;

        info!("Task store initialized at {db_path}");

        Ok(Self { pool })
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run SQL migrations, tracking which have already been applied.
    ///
    /// Safe to call repeatedly: applied migrations are skipped.
    async fn run_migrations(pool: &SqlitePool) -> Result<(), PomniError> {
        sqlx::raw_sql(
            "CREATE TABLE IF NOT EXISTS _migrations (
                name TEXT PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )
        .execute(pool)
        .await
        .map_err(|e| PomniError::Storage(format!("failed to create migrations table: {e}")))?;

        let migrations: &[(&str, &str)] = &[
            ("001_tasks", include_str!("../../migrations/001_tasks.sql")),
            (
                "002_daily_notifications",
                include_str!("../../migrations/002_daily_notifications.sql"),
            ),
        ];

        for (name, sql) in migrations {
            let applied: Option<(String,)> =
                sqlx::query_as("SELECT name FROM _migrations WHERE name = ?")
                    .bind(name)
                    .fetch_optional(pool)
                    .await
                    .map_err(|e| {
                        PomniError::Storage(format!("failed to check migration {name}: {e}"))
                    })?;

            if applied.is_some() {
                continue;
            }

            // Apply and record atomically.
            let mut tx = pool
                .begin()
                .await
                .map_err(|e| PomniError::Storage(format!("failed to begin migration: {e}")))?;

            sqlx::raw_sql(sql)
                .execute(&mut *tx)
                .await
                .map_err(|e| PomniError::Storage(format!("migration {name} failed: {e}")))?;

            sqlx::query("INSERT INTO _migrations (name) VALUES (?)")
                .bind(name)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    PomniError::Storage(format!("failed to record migration {name}: {e}"))
                })?;

            tx.commit()
                .await
                .map_err(|e| PomniError::Storage(format!("failed to commit migration {name}: {e}")))?;

            info!("applied migration {name}");
        }
        Ok(())
    }
}
