// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the FeedbackStore trait.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use carelink_config::model::StorageConfig;
use carelink_core::types::{FeedbackCategory, FeedbackRecord, FeedbackStatus, NewFeedback};
use carelink_core::{AdapterKind, CarelinkError, FeedbackStore, HealthStatus, ServiceAdapter};

use crate::database::Database;
use crate::queries;

/// SQLite-backed feedback store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query module. The database is lazily initialized on the first
/// call to [`FeedbackStore::initialize`].
pub struct SqliteFeedbackStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteFeedbackStore {
    /// Create a new store with the given configuration.
    ///
    /// The database connection is not opened until `initialize` is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, CarelinkError> {
        self.db.get().ok_or_else(|| CarelinkError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl ServiceAdapter for SqliteFeedbackStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, CarelinkError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CarelinkError> {
        if let Some(db) = self.db.get() {
            db.close().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl FeedbackStore for SqliteFeedbackStore {
    async fn initialize(&self) -> Result<(), CarelinkError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| CarelinkError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite feedback store initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), CarelinkError> {
        self.db()?.close().await
    }

    async fn save_feedback(
        &self,
        feedback: &NewFeedback,
    ) -> Result<FeedbackRecord, CarelinkError> {
        queries::feedback::save_feedback(self.db()?, feedback).await
    }

    async fn list_new(&self) -> Result<Vec<FeedbackRecord>, CarelinkError> {
        queries::feedback::list_new(self.db()?).await
    }

    async fn update_status(&self, id: i64, status: FeedbackStatus) -> Result<(), CarelinkError> {
        queries::feedback::update_status(self.db()?, id, status).await
    }

    async fn counts_by_category(
        &self,
    ) -> Result<BTreeMap<FeedbackCategory, u64>, CarelinkError> {
        queries::feedback::counts_by_category(self.db()?).await
    }

    async fn delete_feedback(&self, id: i64) -> Result<(), CarelinkError> {
        queries::feedback::delete_feedback(self.db()?, id).await
    }
}
