//! SQLite-backed pending release store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use tracing::warn;

use super::{NewPendingRelease, PendingRelease, PendingReleaseError, PendingReleaseStore};

const SELECT_COLUMNS: &str =
    "SELECT id, series_id, title, added, retry_time, parsed_episode_info, release FROM pending_releases";

/// SQLite-backed pending release store.
pub struct SqlitePendingReleaseStore {
    conn: Mutex<Connection>,
}

impl SqlitePendingReleaseStore {
    /// Open (or create) the database file and its tables.
    pub fn new(path: &Path) -> Result<Self, PendingReleaseError> {
        let conn =
            Connection::open(path).map_err(|e| PendingReleaseError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, PendingReleaseError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| PendingReleaseError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), PendingReleaseError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS pending_releases (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                series_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                added TEXT NOT NULL,
                retry_time TEXT NOT NULL,
                parsed_episode_info TEXT NOT NULL,
                release TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_pending_releases_series_id ON pending_releases(series_id);
            "#,
        )
        .map_err(|e| PendingReleaseError::Database(e.to_string()))
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, PendingReleaseError> {
        self.conn
            .lock()
            .map_err(|_| PendingReleaseError::Database("connection lock poisoned".to_string()))
    }

    fn row_to_pending(row: &rusqlite::Row) -> rusqlite::Result<PendingRelease> {
        let added: String = row.get(3)?;
        let retry_time: String = row.get(4)?;
        let parsed: String = row.get(5)?;
        let release: String = row.get(6)?;

        Ok(PendingRelease {
            id: row.get(0)?,
            series_id: row.get(1)?,
            title: row.get(2)?,
            added: parse_timestamp(3, &added)?,
            retry_time: parse_timestamp(4, &retry_time)?,
            parsed: parse_json(5, &parsed)?,
            release: parse_json(6, &release)?,
        })
    }
}

fn parse_timestamp(column: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

fn parse_json<T: DeserializeOwned>(column: usize, value: &str) -> rusqlite::Result<T> {
    serde_json::from_str(value)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

impl PendingReleaseStore for SqlitePendingReleaseStore {
    fn insert(&self, release: NewPendingRelease) -> Result<PendingRelease, PendingReleaseError> {
        let conn = self.conn()?;

        let parsed_json = serde_json::to_string(&release.parsed)
            .map_err(|e| PendingReleaseError::Database(e.to_string()))?;
        let release_json = serde_json::to_string(&release.release)
            .map_err(|e| PendingReleaseError::Database(e.to_string()))?;

        conn.execute(
            "INSERT INTO pending_releases (series_id, title, added, retry_time, parsed_episode_info, release) VALUES (?, ?, ?, ?, ?, ?)",
            params![
                release.series_id,
                release.title,
                release.added.to_rfc3339(),
                release.retry_time.to_rfc3339(),
                parsed_json,
                release_json,
            ],
        )
        .map_err(|e| PendingReleaseError::Database(e.to_string()))?;

        Ok(PendingRelease {
            id: conn.last_insert_rowid(),
            series_id: release.series_id,
            title: release.title,
            added: release.added,
            retry_time: release.retry_time,
            parsed: release.parsed,
            release: release.release,
        })
    }

    fn get(&self, id: i64) -> Result<Option<PendingRelease>, PendingReleaseError> {
        let conn = self.conn()?;

        let result = conn.query_row(
            &format!("{} WHERE id = ?", SELECT_COLUMNS),
            params![id],
            Self::row_to_pending,
        );

        match result {
            Ok(pending) => Ok(Some(pending)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(PendingReleaseError::Database(e.to_string())),
        }
    }

    fn all(&self) -> Result<Vec<PendingRelease>, PendingReleaseError> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare(&format!("{} ORDER BY id ASC", SELECT_COLUMNS))
            .map_err(|e| PendingReleaseError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], Self::row_to_pending)
            .map_err(|e| PendingReleaseError::Database(e.to_string()))?;

        // An undecodable row is skipped so it cannot block the rest of the queue.
        let mut releases = Vec::new();
        for row_result in rows {
            match row_result {
                Ok(pending) => releases.push(pending),
                Err(e) => warn!("Skipping unreadable pending release row: {}", e),
            }
        }

        Ok(releases)
    }

    fn delete(&self, id: i64) -> Result<bool, PendingReleaseError> {
        let conn = self.conn()?;

        let affected = conn
            .execute("DELETE FROM pending_releases WHERE id = ?", params![id])
            .map_err(|e| PendingReleaseError::Database(e.to_string()))?;

        Ok(affected > 0)
    }

    fn delete_by_series(&self, series_id: i32) -> Result<usize, PendingReleaseError> {
        let conn = self.conn()?;

        conn.execute(
            "DELETE FROM pending_releases WHERE series_id = ?",
            params![series_id],
        )
        .map_err(|e| PendingReleaseError::Database(e.to_string()))
    }
}
