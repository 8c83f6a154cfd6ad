//! SQLite-backed key/value storage.

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::backends::StorageBackend;
use crate::{RiasecError, RiasecResult};

/// Stores values in a single `kv_store` table.
pub struct SqliteBackend {
    conn: Mutex<Connection>,
    label: String,
}

impl SqliteBackend {
    /// Opens (or creates) the database at `db_path`.
    pub fn open(db_path: &Path) -> RiasecResult<Self> {
        let conn = Connection::open(db_path)?;
        Self::with_connection(conn, db_path.display().to_string())
    }

    /// Database that lives only as long as this value.
    pub fn in_memory() -> RiasecResult<Self> {
        Self::with_connection(Connection::open_in_memory()?, ":memory:".to_string())
    }

    fn with_connection(conn: Connection, label: String) -> RiasecResult<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
        "#,
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
            label,
        })
    }
}

impl StorageBackend for SqliteBackend {
    fn get(&self, key: &str) -> RiasecResult<Option<String>> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let value = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> RiasecResult<()> {
        let mut conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let write = |conn: &mut Connection| -> rusqlite::Result<()> {
            let tx = conn.transaction()?;
            tx.execute(
                r#"
                INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
                "#,
                params![key, value, Utc::now().to_rfc3339()],
            )?;
            tx.commit()
        };

        write(&mut *conn).map_err(|e| RiasecError::StorageWriteFailed(e.to_string()))
    }

    fn describe(&self) -> String {
        format!("sqlite ({})", self.label)
    }
}
