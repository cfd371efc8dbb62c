//! SQLite-backed message table for the REST surface.

use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// One inserted guestbook-style message.
#[derive(Debug, Clone, Serialize)]
pub struct MessageRecord {
    pub id: i64,
    pub name: String,
    pub message: String,
    pub created_at: String,
}

/// Message store over a single SQLite connection.
///
/// Handlers call it from `spawn_blocking`; the mutex keeps concurrent
/// inserts sequential.
#[derive(Clone)]
pub struct MessageStore {
    conn: Arc<Mutex<Connection>>,
}

impl MessageStore {
    /// Open (or create) the database file and ensure the schema exists.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                message TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run arbitrary SQL, for tests that need to break the schema.
    #[cfg(test)]
    pub fn execute_raw(&self, sql: &str) {
        self.conn
            .lock()
            .expect("message store mutex poisoned")
            .execute(sql, [])
            .unwrap();
    }

    /// Insert one row and return the full inserted record.
    pub fn add_message(&self, name: &str, message: &str) -> Result<MessageRecord, StoreError> {
        let created_at = chrono::Utc::now().to_rfc3339();
        let conn = self.conn.lock().expect("message store mutex poisoned");
        conn.execute(
            "INSERT INTO messages (name, message, created_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![name, message, created_at],
        )?;
        Ok(MessageRecord {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            message: message.to_string(),
            created_at,
        })
    }
}
