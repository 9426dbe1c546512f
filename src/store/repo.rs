//! Report repository over the SQLite pool.
//!
//! Actions and records are stored as JSON bodies; ordering is carried by
//! explicit sequence numbers so what goes in comes back out in the same
//! order.

use crate::domain::{Action, LedgerRecord};
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use tracing::warn;

use super::ReportStatus;

#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a report row or reset an existing one back to generating.
    pub async fn start_report(&self, key: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO reports (key, status, error, created_at)
            VALUES (?, ?, NULL, ?)
            ON CONFLICT(key) DO UPDATE SET
                status = excluded.status,
                error = NULL,
                created_at = excluded.created_at
            "#,
        )
        .bind(key)
        .bind(ReportStatus::Generating.as_str())
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn set_status(
        &self,
        key: &str,
        status: ReportStatus,
        error: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE reports SET status = ?, error = ? WHERE key = ?")
            .bind(status.as_str())
            .bind(error)
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Status and error message of a report, or None if unknown.
    pub async fn report_status(
        &self,
        key: &str,
    ) -> Result<Option<(ReportStatus, Option<String>)>, sqlx::Error> {
        let row = sqlx::query("SELECT status, error FROM reports WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.and_then(|row| {
            let status: String = row.get(0);
            let error: Option<String> = row.get(1);
            ReportStatus::parse(&status).map(|status| (status, error))
        }))
    }

    /// Insert a page of fetched actions in a single transaction.
    ///
    /// `seq` continues from whatever is already stored, so pages append.
    pub async fn insert_actions_batch(
        &self,
        key: &str,
        actions: &[Action],
    ) -> Result<usize, sqlx::Error> {
        if actions.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;

        let next_seq: i64 =
            sqlx::query("SELECT COALESCE(MAX(seq) + 1, 0) FROM actions WHERE report_key = ?")
                .bind(key)
                .fetch_one(&mut *tx)
                .await?
                .get(0);

        let mut inserted = 0usize;
        for (i, action) in actions.iter().enumerate() {
            let body = match serde_json::to_string(action) {
                Ok(body) => body,
                Err(e) => {
                    warn!("Failed to serialize action: {}", e);
                    continue;
                }
            };
            sqlx::query(
                "INSERT INTO actions (report_key, seq, date_ns, body) VALUES (?, ?, ?, ?)",
            )
            .bind(key)
            .bind(next_seq + i as i64)
            .bind(action.timestamp().as_i64())
            .bind(body)
            .execute(&mut *tx)
            .await?;
            inserted += 1;
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Load a report's actions in chronological order, oldest first.
    /// Fetch order breaks timestamp ties.
    pub async fn load_actions(&self, key: &str) -> Result<Vec<Action>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT body FROM actions WHERE report_key = ? ORDER BY date_ns ASC, seq ASC",
        )
        .bind(key)
        .fetch_all(&self.pool)
        .await?;

        let mut actions = Vec::with_capacity(rows.len());
        for row in rows {
            let body: String = row.get(0);
            match serde_json::from_str(&body) {
                Ok(action) => actions.push(action),
                Err(e) => warn!("Failed to deserialize stored action: {}", e),
            }
        }
        Ok(actions)
    }

    /// Replace a report's records with the given sequence, preserving
    /// emission order.
    pub async fn replace_records(
        &self,
        key: &str,
        records: &[LedgerRecord],
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM records WHERE report_key = ?")
            .bind(key)
            .execute(&mut *tx)
            .await?;

        for (seq, record) in records.iter().enumerate() {
            let body = serde_json::to_string(record).map_err(|e| {
                sqlx::Error::Protocol(format!("record serialization failed: {}", e))
            })?;
            sqlx::query("INSERT INTO records (report_key, seq, body) VALUES (?, ?, ?)")
                .bind(key)
                .bind(seq as i64)
                .bind(body)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Load a report's records in emission order.
    pub async fn load_records(&self, key: &str) -> Result<Vec<LedgerRecord>, sqlx::Error> {
        let rows = sqlx::query("SELECT body FROM records WHERE report_key = ? ORDER BY seq ASC")
            .bind(key)
            .fetch_all(&self.pool)
            .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let body: String = row.get(0);
            match serde_json::from_str(&body) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Failed to deserialize stored record: {}", e),
            }
        }
        Ok(records)
    }

    /// Discard stored actions for a report; used once processing is done.
    pub async fn clear_actions(&self, key: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM actions WHERE report_key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Remove every trace of a report.
    pub async fn clear_report(&self, key: &str) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM actions WHERE report_key = ?")
            .bind(key)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM records WHERE report_key = ?")
            .bind(key)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM reports WHERE key = ?")
            .bind(key)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
