//! SQLite monitor store
//!
//! ## Features
//!
//! - **Embedded**: No separate database server required
//! - **WAL mode**: Readers (CRUD listing) never block the tick writers
//! - **Connection pooling**: Shared by every trigger
//! - **Migrations**: Schema versioning with sqlx
//!
//! Timestamps are stored as Unix milliseconds. History rows are ordered by
//! their autoincrement id, so entries written within the same millisecond keep
//! their insertion order.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow, SqliteSynchronous,
};
use sqlx::{Pool, Row, Sqlite};
use tracing::{debug, info, instrument, warn};

use super::backend::{HealthStatus, MonitorStore};
use super::error::{StoreError, StoreResult};
use crate::monitor::{
    CheckResult, CheckStatus, HISTORY_LIMIT, HistoryEntry, MonitorChanges, MonitorDef,
};

const MONITOR_COLUMNS: &str = r#"
    monitor_id, owner_id, name, url, interval_secs, status,
    last_checked_at, last_response_time_ms, consecutive_fails
"#;

/// SQLite monitor store
pub struct SqliteStore {
    pool: Pool<Sqlite>,
    db_path: String,
}

impl SqliteStore {
    /// Open (or create) the database and run migrations
    ///
    /// ```no_run
    /// # use pulsewatch::storage::sqlite::SqliteStore;
    /// # async fn example() -> anyhow::Result<()> {
    /// let store = SqliteStore::new("./pulsewatch.db").await?;
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip_all)]
    pub async fn new(db_path: impl AsRef<Path>) -> StoreResult<Self> {
        let db_path_str = db_path.as_ref().to_string_lossy().to_string();

        info!("initializing SQLite store at: {}", db_path_str);

        let options = SqliteConnectOptions::new()
            .filename(&db_path_str)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        debug!("running database migrations");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::MigrationFailed(e.to_string()))?;

        info!("SQLite store ready");

        Ok(Self {
            pool,
            db_path: db_path_str,
        })
    }

    fn timestamp_to_millis(dt: &DateTime<Utc>) -> i64 {
        dt.timestamp_millis()
    }

    fn millis_to_timestamp(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now)
    }

    fn monitor_from_row(row: &SqliteRow) -> StoreResult<MonitorDef> {
        let status: String = row.try_get("status")?;

        Ok(MonitorDef {
            monitor_id: row.try_get("monitor_id")?,
            owner_id: row.try_get("owner_id")?,
            name: row.try_get("name")?,
            url: row.try_get("url")?,
            interval_secs: row.try_get::<i64, _>("interval_secs")?.max(0) as u64,
            status: status.parse()?,
            last_checked_at: row
                .try_get::<Option<i64>, _>("last_checked_at")?
                .map(Self::millis_to_timestamp),
            last_response_time_ms: row.try_get::<i64, _>("last_response_time_ms")?.max(0) as u64,
            consecutive_fails: row.try_get::<i64, _>("consecutive_fails")?.max(0) as u32,
            history: Vec::new(),
        })
    }

    fn history_from_row(row: &SqliteRow) -> StoreResult<HistoryEntry> {
        let status: String = row.try_get("status")?;

        Ok(HistoryEntry {
            status: status.parse::<CheckStatus>()?,
            timestamp: Self::millis_to_timestamp(row.try_get("timestamp")?),
            message: row.try_get("message")?,
            response_time_ms: row
                .try_get::<Option<i64>, _>("response_time_ms")?
                .map(|v| v.max(0) as u64),
        })
    }

    /// Fetch monitors matching `filter` and attach their history
    async fn load_monitors(&self, filter: &str, binds: &[&str]) -> StoreResult<Vec<MonitorDef>> {
        let sql = format!(
            "SELECT {MONITOR_COLUMNS} FROM monitors {filter} ORDER BY created_at ASC, monitor_id ASC"
        );
        let mut query = sqlx::query(&sql);
        for bind in binds {
            query = query.bind(*bind);
        }
        let rows = query.fetch_all(&self.pool).await?;

        let mut monitors = rows
            .iter()
            .map(Self::monitor_from_row)
            .collect::<StoreResult<Vec<_>>>()?;

        if monitors.is_empty() {
            return Ok(monitors);
        }

        let history_sql = format!(
            r#"
            SELECT monitor_id, status, timestamp, message, response_time_ms
            FROM monitor_history
            WHERE monitor_id IN (SELECT monitor_id FROM monitors {filter})
            ORDER BY id ASC
            "#
        );
        let mut history_query = sqlx::query(&history_sql);
        for bind in binds {
            history_query = history_query.bind(*bind);
        }
        let history_rows = history_query.fetch_all(&self.pool).await?;

        let mut history: HashMap<String, Vec<HistoryEntry>> = HashMap::new();
        for row in &history_rows {
            let monitor_id: String = row.try_get("monitor_id")?;
            history
                .entry(monitor_id)
                .or_default()
                .push(Self::history_from_row(row)?);
        }

        for monitor in &mut monitors {
            if let Some(entries) = history.remove(&monitor.monitor_id) {
                monitor.history = entries;
            }
        }

        Ok(monitors)
    }
}

#[async_trait]
impl MonitorStore for SqliteStore {
    #[instrument(skip(self))]
    async fn get_all(&self) -> StoreResult<Vec<MonitorDef>> {
        let monitors = self.load_monitors("", &[]).await?;
        debug!("loaded {} monitors", monitors.len());
        Ok(monitors)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, monitor_id: &str) -> StoreResult<Option<MonitorDef>> {
        let mut monitors = self
            .load_monitors("WHERE monitor_id = ?", &[monitor_id])
            .await?;
        Ok(monitors.pop())
    }

    #[instrument(skip(self, result), fields(status = %result.status))]
    async fn apply_check_result(
        &self,
        monitor_id: &str,
        result: &CheckResult,
        timestamp: DateTime<Utc>,
    ) -> StoreResult<()> {
        let millis = Self::timestamp_to_millis(&timestamp);
        let status = result.status.as_str();
        let response_time = result.response_time_ms.map(|v| v as i64);

        let mut tx = self.pool.begin().await?;

        // The counter is derived from the persisted value inside the UPDATE,
        // so the read and the write cannot interleave with another writer.
        let updated = sqlx::query(
            r#"
            UPDATE monitors SET
                status = ?,
                last_checked_at = ?,
                last_response_time_ms = COALESCE(?, last_response_time_ms),
                consecutive_fails = CASE WHEN ? = 'Down' THEN consecutive_fails + 1 ELSE 0 END
            WHERE monitor_id = ?
            "#,
        )
        .bind(status)
        .bind(millis)
        .bind(response_time)
        .bind(status)
        .bind(monitor_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(StoreError::NotFound(monitor_id.to_string()));
        }

        sqlx::query(
            r#"
            INSERT INTO monitor_history (monitor_id, status, timestamp, message, response_time_ms)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(monitor_id)
        .bind(status)
        .bind(millis)
        .bind(result.message.as_deref())
        .bind(response_time)
        .execute(&mut *tx)
        .await?;

        let trimmed = sqlx::query(
            r#"
            DELETE FROM monitor_history
            WHERE monitor_id = ?
              AND id NOT IN (
                  SELECT id FROM monitor_history
                  WHERE monitor_id = ?
                  ORDER BY id DESC
                  LIMIT ?
              )
            "#,
        )
        .bind(monitor_id)
        .bind(monitor_id)
        .bind(HISTORY_LIMIT as i64)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        if trimmed.rows_affected() > 0 {
            debug!("evicted {} history entries", trimmed.rows_affected());
        }
        Ok(())
    }

    #[instrument(skip(self, def), fields(monitor_id = %def.monitor_id))]
    async fn insert_monitor(&self, def: &MonitorDef) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO monitors (
                monitor_id, owner_id, name, url, interval_secs, status,
                last_checked_at, last_response_time_ms, consecutive_fails, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&def.monitor_id)
        .bind(&def.owner_id)
        .bind(&def.name)
        .bind(&def.url)
        .bind(def.interval_secs as i64)
        .bind(def.status.as_str())
        .bind(def.last_checked_at.as_ref().map(Self::timestamp_to_millis))
        .bind(def.last_response_time_ms as i64)
        .bind(def.consecutive_fails as i64)
        .bind(Self::timestamp_to_millis(&Utc::now()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_for_owner(&self, owner_id: &str) -> StoreResult<Vec<MonitorDef>> {
        self.load_monitors("WHERE owner_id = ?", &[owner_id]).await
    }

    async fn get_for_owner(
        &self,
        owner_id: &str,
        monitor_id: &str,
    ) -> StoreResult<Option<MonitorDef>> {
        let mut monitors = self
            .load_monitors("WHERE owner_id = ? AND monitor_id = ?", &[owner_id, monitor_id])
            .await?;
        Ok(monitors.pop())
    }

    #[instrument(skip(self, changes))]
    async fn update_definition(
        &self,
        monitor_id: &str,
        changes: &MonitorChanges,
    ) -> StoreResult<()> {
        if changes.is_empty() {
            return Ok(());
        }

        let updated = sqlx::query(
            r#"
            UPDATE monitors SET
                name = COALESCE(?, name),
                url = COALESCE(?, url),
                interval_secs = COALESCE(?, interval_secs)
            WHERE monitor_id = ?
            "#,
        )
        .bind(changes.name.as_deref())
        .bind(changes.url.as_deref())
        .bind(changes.interval_secs.map(|v| v as i64))
        .bind(monitor_id)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound(monitor_id.to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_monitor(&self, monitor_id: &str) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM monitor_history WHERE monitor_id = ?")
            .bind(monitor_id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM monitors WHERE monitor_id = ?")
            .bind(monitor_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(deleted.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> StoreResult<HealthStatus> {
        match sqlx::query("SELECT COUNT(*) AS total FROM monitors")
            .fetch_one(&self.pool)
            .await
        {
            Ok(row) => {
                let total: i64 = row.try_get("total")?;
                let metadata = HashMap::from([
                    ("backend".to_string(), "sqlite".to_string()),
                    ("db_path".to_string(), self.db_path.clone()),
                    ("monitors".to_string(), total.to_string()),
                ]);

                Ok(HealthStatus {
                    healthy: true,
                    message: "SQLite store operational".to_string(),
                    metadata,
                })
            }
            Err(e) => {
                warn!("health check failed: {}", e);
                Ok(HealthStatus {
                    healthy: false,
                    message: format!("health check failed: {}", e),
                    metadata: HashMap::new(),
                })
            }
        }
    }

    async fn close(&self) -> StoreResult<()> {
        info!("closing SQLite store");
        self.pool.close().await;
        Ok(())
    }
}
