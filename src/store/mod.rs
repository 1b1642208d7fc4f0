//! Read-only access to the Notification Center store.
//!
//! The store is an SQLite database owned by the OS notification daemon,
//! located under the per-user darwin directory
//! (`$(getconf DARWIN_USER_DIR)/com.apple.NotificationCenter/db2/db`).
//! Records live in the `record` table: a monotonic `rec_id`, a binary-plist
//! `data` blob and two nullable timestamp columns. Rows disappear whenever
//! the user dismisses a notification, so callers cannot assume continuity
//! between polls.

pub mod time;

use std::path::{Path, PathBuf};
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use crate::{Error, Result};

/// Location of the notification database under `DARWIN_USER_DIR`.
const STORE_RELATIVE_PATH: &str = "com.apple.NotificationCenter/db2/db";

/// Busy timeout for queries; the notification daemon writes concurrently.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// One row of the notification store at a point in time.
#[derive(Debug, Clone)]
pub struct StoreRecord {
    /// Monotonically-increasing id assigned by the store at insertion.
    pub rec_id: i64,
    /// Raw binary-plist payload.
    pub data: Vec<u8>,
    /// Time the notification was shown, seconds in the store epoch.
    pub delivered_date: Option<f64>,
    /// Time the notification was requested, seconds in the store epoch.
    pub request_date: Option<f64>,
}

impl StoreRecord {
    /// The timestamp used for ordering and cursor comparisons.
    ///
    /// Prefers `delivered_date`; which of the two columns is populated varies
    /// with the schema version. A record with neither sorts before everything.
    pub fn effective_timestamp(&self) -> f64 {
        self.delivered_date.or(self.request_date).unwrap_or(0.0)
    }
}

/// Read-only handle to the notification store.
pub struct NotificationStore {
    pool: SqlitePool,
}

impl NotificationStore {
    /// Open the store at `path` read-only.
    ///
    /// The pool holds a single connection; only the poll path queries the
    /// store, one query at a time.
    pub async fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::config(format!(
                "notification store not found at {}",
                path.display()
            )));
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        tracing::info!("Opened notification store at {}", path.display());

        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fetch a window of the most recent live records, newest first.
    ///
    /// `offset` ranks from the newest row (0 = most recent). Returns fewer
    /// than `limit` rows when the table is smaller; an empty result means
    /// the store has no live row at `offset` or beyond.
    pub async fn fetch_window(&self, offset: u32, limit: u32) -> Result<Vec<StoreRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT rec_id, data, delivered_date, request_date
            FROM record
            ORDER BY COALESCE(delivered_date, request_date) DESC, rec_id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let records = rows
            .into_iter()
            .map(|row| StoreRecord {
                rec_id: row.get("rec_id"),
                data: row.get("data"),
                delivered_date: row.get("delivered_date"),
                request_date: row.get("request_date"),
            })
            .collect();

        Ok(records)
    }

    /// Fetch the `limit` most recent records, newest first.
    pub async fn fetch_recent(&self, limit: u32) -> Result<Vec<StoreRecord>> {
        self.fetch_window(0, limit).await
    }

    /// The single most recent record, if the store has any rows.
    pub async fn newest(&self) -> Result<Option<StoreRecord>> {
        Ok(self.fetch_window(0, 1).await?.into_iter().next())
    }

    /// Close the underlying pool. Called once during shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Locate the notification store for the current user.
///
/// macOS keeps the store under the per-user darwin directory reported by
/// `getconf DARWIN_USER_DIR`. On platforms without that variable this fails
/// with a configuration error; the `--database` flag overrides discovery.
pub async fn default_store_path() -> Result<PathBuf> {
    let output = tokio::process::Command::new("getconf")
        .arg("DARWIN_USER_DIR")
        .output()
        .await
        .map_err(|e| Error::config(format!("getconf DARWIN_USER_DIR failed: {e}")))?;

    if !output.status.success() {
        return Err(Error::config(
            "getconf DARWIN_USER_DIR failed; pass --database to point at the store",
        ));
    }

    let base = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if base.is_empty() {
        return Err(Error::config(
            "DARWIN_USER_DIR is empty; pass --database to point at the store",
        ));
    }

    Ok(PathBuf::from(base).join(STORE_RELATIVE_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test_store() -> NotificationStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        sqlx::query(
            r#"
            CREATE TABLE record (
                rec_id INTEGER PRIMARY KEY AUTOINCREMENT,
                data BLOB,
                delivered_date REAL,
                request_date REAL
            )
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        NotificationStore::from_pool(pool)
    }

    async fn insert_record(
        store: &NotificationStore,
        rec_id: i64,
        delivered: Option<f64>,
        requested: Option<f64>,
    ) {
        sqlx::query(
            "INSERT INTO record (rec_id, data, delivered_date, request_date) VALUES (?, ?, ?, ?)",
        )
        .bind(rec_id)
        .bind(Vec::<u8>::new())
        .bind(delivered)
        .bind(requested)
        .execute(&store.pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_fetch_window_orders_newest_first() {
        let store = setup_test_store().await;
        insert_record(&store, 1, Some(100.0), None).await;
        insert_record(&store, 2, Some(300.0), None).await;
        insert_record(&store, 3, Some(200.0), None).await;

        let records = store.fetch_recent(10).await.unwrap();
        let ids: Vec<i64> = records.iter().map(|r| r.rec_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn test_fetch_window_pages_by_offset() {
        let store = setup_test_store().await;
        for i in 1..=7 {
            insert_record(&store, i, Some(i as f64 * 10.0), None).await;
        }

        let first = store.fetch_window(0, 3).await.unwrap();
        let second = store.fetch_window(3, 3).await.unwrap();
        let third = store.fetch_window(6, 3).await.unwrap();
        let past_end = store.fetch_window(9, 3).await.unwrap();

        assert_eq!(
            first.iter().map(|r| r.rec_id).collect::<Vec<_>>(),
            vec![7, 6, 5]
        );
        assert_eq!(
            second.iter().map(|r| r.rec_id).collect::<Vec<_>>(),
            vec![4, 3, 2]
        );
        assert_eq!(third.iter().map(|r| r.rec_id).collect::<Vec<_>>(), vec![1]);
        assert!(past_end.is_empty());
    }

    #[tokio::test]
    async fn test_effective_timestamp_prefers_delivered() {
        let record = StoreRecord {
            rec_id: 1,
            data: Vec::new(),
            delivered_date: Some(200.0),
            request_date: Some(100.0),
        };
        assert_eq!(record.effective_timestamp(), 200.0);

        let request_only = StoreRecord {
            rec_id: 2,
            data: Vec::new(),
            delivered_date: None,
            request_date: Some(100.0),
        };
        assert_eq!(request_only.effective_timestamp(), 100.0);

        let neither = StoreRecord {
            rec_id: 3,
            data: Vec::new(),
            delivered_date: None,
            request_date: None,
        };
        assert_eq!(neither.effective_timestamp(), 0.0);
    }

    #[tokio::test]
    async fn test_ordering_falls_back_to_request_date() {
        let store = setup_test_store().await;
        insert_record(&store, 1, Some(100.0), None).await;
        insert_record(&store, 2, None, Some(300.0)).await;
        insert_record(&store, 3, Some(200.0), Some(50.0)).await;

        let records = store.fetch_recent(10).await.unwrap();
        let ids: Vec<i64> = records.iter().map(|r| r.rec_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn test_newest_on_empty_store() {
        let store = setup_test_store().await;
        assert!(store.newest().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_recent_on_small_table() {
        let store = setup_test_store().await;
        insert_record(&store, 1, Some(100.0), None).await;
        insert_record(&store, 2, Some(200.0), None).await;

        let records = store.fetch_recent(5).await.unwrap();
        assert_eq!(records.len(), 2);
    }
}
