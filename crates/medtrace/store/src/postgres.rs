//! PostgreSQL world state.
//!
//! Live values live in `medtrace_world_state`, every committed change is
//! appended to `medtrace_key_history`, and `medtrace_commit_seq` hands out
//! commit versions. A commit runs in one SQL transaction: read versions are
//! re-checked under `FOR UPDATE`, and keys the transaction saw as absent are
//! inserted without upsert so that a concurrent create surfaces as a unique
//! violation rather than an overwrite.

use crate::model::{
    CommitReceipt, KeyModification, KeyValue, ReadWriteSet, TxId, Version, VersionedValue,
};
use crate::traits::WorldState;
use crate::{StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{BoxStream, StreamExt};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::time::Duration;

/// PostgreSQL-backed world state.
#[derive(Clone)]
pub struct PostgresWorldState {
    pool: PgPool,
}

impl PostgresWorldState {
    /// Connect to PostgreSQL and initialize required schema.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        Self::connect_with_options(database_url, 10, 5).await
    }

    /// Connect with explicit pool parameters.
    pub async fn connect_with_options(
        database_url: &str,
        max_connections: u32,
        connect_timeout_secs: u64,
    ) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(Duration::from_secs(connect_timeout_secs))
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Backend(format!("failed to connect postgres: {e}")))?;
        Self::from_pool(pool).await
    }

    /// Create adapter from an existing pool.
    pub async fn from_pool(pool: PgPool) -> StoreResult<Self> {
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> StoreResult<()> {
        let ddl = [
            r#"
            CREATE TABLE IF NOT EXISTS medtrace_world_state (
                key TEXT COLLATE "C" PRIMARY KEY,
                value BYTEA NOT NULL,
                version BIGINT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS medtrace_key_history (
                seq BIGSERIAL PRIMARY KEY,
                key TEXT NOT NULL,
                tx_id TEXT NOT NULL,
                value BYTEA,
                committed_at TIMESTAMPTZ NOT NULL
            )
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS medtrace_key_history_key_idx
            ON medtrace_key_history (key, seq)
            "#,
            "CREATE SEQUENCE IF NOT EXISTS medtrace_commit_seq",
        ];

        for stmt in ddl {
            sqlx::query(stmt)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::Backend(format!("schema init failed: {e}")))?;
        }
        Ok(())
    }
}

#[async_trait]
impl WorldState for PostgresWorldState {
    async fn get_state(&self, key: &str) -> StoreResult<Option<VersionedValue>> {
        let row = sqlx::query("SELECT value, version FROM medtrace_world_state WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        row.map(|row| -> StoreResult<VersionedValue> {
            Ok(VersionedValue {
                value: row.try_get("value").map_err(backend)?,
                version: version_from_row(&row)?,
            })
        })
        .transpose()
    }

    fn scan_range<'a>(&'a self, start: &str, end: &str) -> BoxStream<'a, StoreResult<KeyValue>> {
        sqlx::query(
            r#"
            SELECT key, value
              FROM medtrace_world_state
             WHERE ($1 = '' OR key >= $1)
               AND ($2 = '' OR key < $2)
             ORDER BY key
            "#,
        )
        .bind(start.to_string())
        .bind(end.to_string())
        .fetch(&self.pool)
        .map(|row| -> StoreResult<KeyValue> {
            let row = row.map_err(backend)?;
            Ok(KeyValue {
                key: row.try_get("key").map_err(backend)?,
                value: row.try_get("value").map_err(backend)?,
            })
        })
        .boxed()
    }

    fn history_of<'a>(&'a self, key: &str) -> BoxStream<'a, StoreResult<KeyModification>> {
        sqlx::query(
            r#"
            SELECT tx_id, value, committed_at
              FROM medtrace_key_history
             WHERE key = $1
             ORDER BY seq ASC
            "#,
        )
        .bind(key.to_string())
        .fetch(&self.pool)
        .map(|row| -> StoreResult<KeyModification> {
            let row = row.map_err(backend)?;
            let committed_at: DateTime<Utc> = row.try_get("committed_at").map_err(backend)?;
            Ok(KeyModification {
                tx_id: TxId(row.try_get("tx_id").map_err(backend)?),
                timestamp: committed_at,
                value: row.try_get("value").map_err(backend)?,
            })
        })
        .boxed()
    }

    async fn commit(&self, rwset: ReadWriteSet) -> StoreResult<CommitReceipt> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        for (key, observed) in &rwset.reads {
            let row = sqlx::query(
                "SELECT version FROM medtrace_world_state WHERE key = $1 FOR UPDATE",
            )
            .bind(key)
            .fetch_optional(&mut *tx)
            .await
            .map_err(backend)?;
            let current = row.as_ref().map(version_from_row).transpose()?;

            if current != *observed {
                return Err(conflict(key, &rwset.tx_id));
            }
        }

        let seq: i64 = sqlx::query_scalar("SELECT nextval('medtrace_commit_seq')")
            .fetch_one(&mut *tx)
            .await
            .map_err(backend)?;
        let version = Version(seq as u64);

        for (key, write) in &rwset.writes {
            match write {
                Some(value) => {
                    let seen_absent = matches!(rwset.reads.get(key), Some(None));
                    let sql = if seen_absent {
                        "INSERT INTO medtrace_world_state (key, value, version) VALUES ($1, $2, $3)"
                    } else {
                        r#"
                        INSERT INTO medtrace_world_state (key, value, version) VALUES ($1, $2, $3)
                        ON CONFLICT (key) DO UPDATE
                        SET value = EXCLUDED.value, version = EXCLUDED.version
                        "#
                    };
                    sqlx::query(sql)
                        .bind(key)
                        .bind(value)
                        .bind(seq)
                        .execute(&mut *tx)
                        .await
                        .map_err(|e| map_write_error(e, key, &rwset.tx_id))?;
                }
                None => {
                    sqlx::query("DELETE FROM medtrace_world_state WHERE key = $1")
                        .bind(key)
                        .execute(&mut *tx)
                        .await
                        .map_err(backend)?;
                }
            }

            sqlx::query(
                r#"
                INSERT INTO medtrace_key_history (key, tx_id, value, committed_at)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(key)
            .bind(rwset.tx_id.as_str())
            .bind(write.as_deref())
            .bind(rwset.timestamp)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;
        }

        tx.commit().await.map_err(backend)?;

        Ok(CommitReceipt {
            keys_written: rwset.writes.len(),
            tx_id: rwset.tx_id,
            version,
        })
    }

    fn backend_label(&self) -> &'static str {
        "postgres"
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

fn version_from_row(row: &PgRow) -> StoreResult<Version> {
    let version: i64 = row.try_get("version").map_err(backend)?;
    Ok(Version(version as u64))
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn conflict(key: &str, tx_id: &TxId) -> StoreError {
    StoreError::Conflict {
        key: key.to_string(),
        tx_id: tx_id.to_string(),
    }
}

fn map_write_error(err: sqlx::Error, key: &str, tx_id: &TxId) -> StoreError {
    let unique_violation = err
        .as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false);
    if unique_violation {
        conflict(key, tx_id)
    } else {
        backend(err)
    }
}
