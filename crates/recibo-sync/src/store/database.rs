//! Database connection management: WAL mode, foreign keys, migrations.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do not create additional connections for writes.

use tracing::debug;

use crate::error::StoreError;

use super::migrations;

/// Handle to the SQLite database.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open the database at `path`, configure pragmas, and run migrations.
    pub async fn open(path: &str) -> Result<Self, StoreError> {
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| StoreError::Open(e.to_string()))?;

        conn.call(|conn| {
            conn.query_row("PRAGMA journal_mode = WAL", [], |_row| Ok(()))?;
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            migrations::run_migrations(conn)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
            Ok(())
        })
        .await?;

        debug!("Opened receipt database at {}", path);
        Ok(Self { conn })
    }

    /// The shared connection handle.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Close the connection, flushing outstanding work.
    pub async fn close(self) -> Result<(), StoreError> {
        self.conn.close().await?;
        Ok(())
    }
}
