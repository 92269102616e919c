//! Database migrations for the persistence layer

use crate::persistence::error::PersistenceError;
use crate::persistence::pool::{ConnectionPool, DatabaseBackend};
use sqlx::Row;

/// The request log: one row per agent request/response pair.
/// The id column is backend-specific (auto-increment spelling differs).
fn migration_001_jira_requests(backend: DatabaseBackend) -> String {
    let id_column = match backend {
        DatabaseBackend::Sqlite => "INTEGER PRIMARY KEY AUTOINCREMENT",
        DatabaseBackend::Postgres => "BIGSERIAL PRIMARY KEY",
        DatabaseBackend::Mysql => "BIGINT PRIMARY KEY AUTO_INCREMENT",
    };
    format!(
        r#"
CREATE TABLE IF NOT EXISTS jira_requests (
    id {id_column},
    request TEXT NOT NULL,
    response TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_jira_requests_created ON jira_requests(created_at);
"#
    )
}

fn tracking_table(backend: DatabaseBackend) -> String {
    let id_column = match backend {
        DatabaseBackend::Sqlite => "INTEGER PRIMARY KEY AUTOINCREMENT",
        DatabaseBackend::Postgres => "BIGSERIAL PRIMARY KEY",
        DatabaseBackend::Mysql => "BIGINT PRIMARY KEY AUTO_INCREMENT",
    };
    format!(
        r#"
CREATE TABLE IF NOT EXISTS _themis_migrations (
    id {id_column},
    name TEXT NOT NULL UNIQUE,
    applied_at TEXT NOT NULL
);
"#
    )
}

struct Migration {
    name: &'static str,
    sql: fn(DatabaseBackend) -> String,
}

fn get_migrations() -> Vec<Migration> {
    vec![Migration {
        name: "001_create_jira_requests",
        sql: migration_001_jira_requests,
    }]
}

/// Run all pending migrations.
pub async fn run(pool: &ConnectionPool) -> Result<(), PersistenceError> {
    let backend = pool.backend();

    for statement in split_statements(&tracking_table(backend)) {
        sqlx::query(&statement)
            .execute(pool.pool())
            .await
            .map_err(|e| PersistenceError::Migration(e.to_string()))?;
    }

    for migration in get_migrations() {
        let applied = sqlx::query("SELECT COUNT(*) as count FROM _themis_migrations WHERE name = ?")
            .bind(migration.name)
            .fetch_one(pool.pool())
            .await?;
        let count: i64 = applied.try_get("count")?;
        if count > 0 {
            continue;
        }

        tracing::info!(name = migration.name, "applying migration");
        for statement in split_statements(&(migration.sql)(backend)) {
            sqlx::query(&statement)
                .execute(pool.pool())
                .await
                .map_err(|e| {
                    PersistenceError::Migration(format!("{} failed: {e}", migration.name))
                })?;
        }

        sqlx::query("INSERT INTO _themis_migrations (name, applied_at) VALUES (?, ?)")
            .bind(migration.name)
            .bind(chrono::Utc::now().to_rfc3339())
            .execute(pool.pool())
            .await?;
    }

    Ok(())
}

/// sqlx::query runs one statement at a time; split on semicolons.
fn split_statements(sql: &str) -> Vec<String> {
    sql.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_statements_and_drops_blanks() {
        let statements = split_statements("CREATE TABLE a (x INT);\n\nCREATE INDEX b ON a(x);");
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with("CREATE TABLE"));
        assert!(statements[1].starts_with("CREATE INDEX"));
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = ConnectionPool::new("sqlite::memory:", 1, 5).await.unwrap();
        run(&pool).await.unwrap();
        run(&pool).await.unwrap();

        let row = sqlx::query("SELECT COUNT(*) as count FROM _themis_migrations")
            .fetch_one(pool.pool())
            .await
            .unwrap();
        let count: i64 = row.try_get("count").unwrap();
        assert_eq!(count, 1);
    }
}
