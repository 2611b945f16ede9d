//! SQLite execution backend.

use std::path::{Path, PathBuf};

use rusqlite::OpenFlags;
use rusqlite::types::Value;
use tracing::debug;

use crate::db::{Connection, Connector, Row, SqlValue};
use crate::error::DbError;

/// Opens read-only connections to a SQLite database file.
#[derive(Debug, Clone)]
pub struct SqliteConnector {
    path: PathBuf,
}

impl SqliteConnector {
    /// Create a connector for the database at `path`.
    ///
    /// The file is not touched until a connection is requested.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Connector for SqliteConnector {
    fn connect(&self) -> Result<Box<dyn Connection>, DbError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = rusqlite::Connection::open_with_flags(&self.path, flags)
            .map_err(|e| DbError::Connection(e.to_string()))?;
        debug!(path = %self.path.display(), "opened sqlite connection");
        Ok(Box::new(SqliteConnection { conn }))
    }
}

struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl Connection for SqliteConnection {
    fn fetch_all(&mut self, sql: &str) -> Result<Vec<Row>, DbError> {
        let mut stmt = self.conn.prepare(sql).map_err(|e| DbError::Execution(e.to_string()))?;
        let columns = stmt.column_count();
        let rows = stmt
            .query_map([], |row| {
                (0..columns).map(|i| row.get::<_, Value>(i).map(SqlValue::from)).collect::<rusqlite::Result<Row>>()
            })
            .map_err(|e| DbError::Execution(e.to_string()))?
            .collect::<rusqlite::Result<Vec<Row>>>()
            .map_err(|e| DbError::Execution(e.to_string()));
        rows
    }

    fn close(self: Box<Self>) -> Result<(), DbError> {
        self.conn.close().map_err(|(_, e)| DbError::Connection(e.to_string()))
    }
}

impl From<Value> for SqlValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => SqlValue::Null,
            Value::Integer(i) => SqlValue::Integer(i),
            Value::Real(f) => SqlValue::Real(f),
            Value::Text(s) => SqlValue::Text(s),
            Value::Blob(b) => SqlValue::Blob(b),
        }
    }
}
