//! Versioned schema migrations.
//!
//! Each migration runs once, inside its own transaction, and is recorded in
//! `schema_migrations`. Running the set again is a no-op.

use crate::types::{AppError, Result};
use chrono::Utc;
use libsql::Connection;
use tracing::info;

/// A single forward-only schema change.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    pub statements: &'static [&'static str],
}

/// All migrations in the order they must be applied.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_users_table",
        statements: &[
            "CREATE TABLE users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            "CREATE UNIQUE INDEX ix_users_email ON users (email)",
        ],
    },
    Migration {
        version: 2,
        name: "create_posts_table",
        statements: &[
            "CREATE TABLE posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                published INTEGER NOT NULL DEFAULT 1,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                owner_id INTEGER NOT NULL,
                FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE CASCADE
            )",
        ],
    },
    Migration {
        version: 3,
        name: "create_votes_table",
        statements: &[
            "CREATE TABLE votes (
                user_id INTEGER NOT NULL,
                post_id INTEGER NOT NULL,
                PRIMARY KEY (user_id, post_id),
                FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            )",
        ],
    },
];

async fn ensure_migrations_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at INTEGER NOT NULL
        )",
        (),
    )
    .await
    .map_err(|e| AppError::Database(format!("Failed to create schema_migrations table: {}", e)))?;

    Ok(())
}

/// Versions already recorded as applied, ascending.
pub async fn applied_versions(conn: &Connection) -> Result<Vec<i64>> {
    ensure_migrations_table(conn).await?;

    let mut rows = conn
        .query("SELECT version FROM schema_migrations ORDER BY version ASC", ())
        .await
        .map_err(|e| AppError::Database(format!("Failed to query migrations: {}", e)))?;

    let mut versions = Vec::new();
    while let Some(row) = rows
        .next()
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
    {
        versions.push(row.get::<i64>(0).map_err(|e| AppError::Database(e.to_string()))?);
    }

    Ok(versions)
}

/// Applies every pending migration and returns the versions it applied.
pub async fn run(conn: &Connection) -> Result<Vec<i64>> {
    let applied = applied_versions(conn).await?;
    let mut newly_applied = Vec::new();

    for migration in MIGRATIONS.iter().filter(|m| !applied.contains(&m.version)) {
        let tx = conn
            .transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin migration: {}", e)))?;

        for statement in migration.statements {
            tx.execute(statement, ()).await.map_err(|e| {
                AppError::Database(format!(
                    "Migration {} ({}) failed: {}",
                    migration.version, migration.name, e
                ))
            })?;
        }

        tx.execute(
            "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?, ?, ?)",
            (migration.version, migration.name, Utc::now().timestamp()),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to record migration: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit migration: {}", e)))?;

        info!(version = migration.version, name = migration.name, "applied migration");
        newly_applied.push(migration.version);
    }

    Ok(newly_applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versions_are_strictly_increasing() {
        let versions: Vec<i64> = MIGRATIONS.iter().map(|m| m.version).collect();
        assert!(versions.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(versions.first(), Some(&1));
    }

    #[test]
    fn test_every_migration_has_statements() {
        for migration in MIGRATIONS {
            assert!(!migration.statements.is_empty(), "{} is empty", migration.name);
        }
    }
}
