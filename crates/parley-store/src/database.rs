// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite connection management.
//!
//! A [`Database`] owns one `tokio_rusqlite::Connection`, whose background
//! thread serializes every read and write. Do not open a second connection
//! to the same file for writes.

use std::path::Path;

use parley_core::ParleyError;
use tracing::debug;

use crate::migrations::run_migrations;

/// Wraps a tokio-rusqlite failure as a storage error.
pub(crate) fn map_tr_err<E>(e: tokio_rusqlite::Error<E>) -> ParleyError
where
    E: std::error::Error + Send + Sync + 'static,
{
    ParleyError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the migrated SQLite database.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (creating if needed) the database file, enables WAL mode and
    /// applies pending migrations.
    pub async fn open(path: &str) -> Result<Self, ParleyError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| ParleyError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| ParleyError::Storage {
                source: Box::new(e),
            })?;
        let db = Self { conn };
        db.prepare(true).await?;
        debug!(path = %path, "database opened");
        Ok(db)
    }

    /// Opens a private in-memory database with the schema applied.
    pub async fn open_in_memory() -> Result<Self, ParleyError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| ParleyError::Storage {
                source: Box::new(e),
            })?;
        let db = Self { conn };
        db.prepare(false).await?;
        Ok(db)
    }

    async fn prepare(&self, wal: bool) -> Result<(), ParleyError> {
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                if wal {
                    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
                }
                conn.execute_batch("PRAGMA busy_timeout=5000; PRAGMA synchronous=NORMAL;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        self.conn
            .call(|conn| run_migrations(conn))
            .await
            .map_err(map_tr_err)
    }

    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoints the WAL so the main database file is self-contained.
    pub async fn checkpoint(&self) -> Result<(), ParleyError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}
