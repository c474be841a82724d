// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use carelink_core::CarelinkError;
use tracing::debug;

use crate::migrations;

/// Handle to the single SQLite connection used by the store.
///
/// Opening runs PRAGMA setup and all pending migrations, creating the
/// schema on first connect.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path` and bring the schema up to date.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, CarelinkError> {
        if let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| CarelinkError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path.to_owned())
            .await
            .map_err(map_tr_err)?;

        conn.call(
            move |conn| -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
                if wal_mode {
                    // journal_mode returns a row; query it instead of execute.
                    conn.pragma_update(None, "journal_mode", "WAL")?;
                    conn.pragma_update(None, "synchronous", "NORMAL")?;
                }
                conn.pragma_update(None, "foreign_keys", "ON")?;
                conn.pragma_update(None, "busy_timeout", 5000)?;

                migrations::run_migrations(conn)?;
                Ok(())
            },
        )
        .await
        .map_err(|e| match e {
            tokio_rusqlite::Error::Error(source) => CarelinkError::Storage { source },
            tokio_rusqlite::Error::ConnectionClosed => CarelinkError::Storage {
                source: "database connection closed".into(),
            },
            tokio_rusqlite::Error::Close((_, err)) => CarelinkError::Storage {
                source: Box::new(err),
            },
            other => CarelinkError::Storage {
                source: other.to_string().into(),
            },
        })?;

        debug!(path, wal_mode, "database opened, schema up to date");
        Ok(Self { conn })
    }

    /// Returns the underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL and release the connection.
    pub async fn close(&self) -> Result<(), CarelinkError> {
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

/// Map a tokio-rusqlite error into the workspace storage error.
pub fn map_tr_err<E>(err: E) -> CarelinkError
where
    E: std::error::Error + Send + Sync + 'static,
{
    CarelinkError::Storage {
        source: Box::new(err),
    }
}
