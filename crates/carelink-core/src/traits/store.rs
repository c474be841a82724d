// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Feedback store trait for the persistence backend.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::CarelinkError;
use crate::traits::adapter::ServiceAdapter;
use crate::types::{FeedbackCategory, FeedbackRecord, FeedbackStatus, NewFeedback};

/// Adapter for the feedback persistence backend.
#[async_trait]
pub trait FeedbackStore: ServiceAdapter {
    /// Initializes the storage backend (migrations, connection, PRAGMAs).
    async fn initialize(&self) -> Result<(), CarelinkError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), CarelinkError>;

    /// Inserts a record and all of its attachments as a single transaction.
    ///
    /// Returns the stored record with its store-assigned ID. A partial
    /// insert (record persisted, attachments lost) must never be observable.
    async fn save_feedback(&self, feedback: &NewFeedback)
    -> Result<FeedbackRecord, CarelinkError>;

    /// Returns all records with status `new`, ascending by creation time,
    /// each with its attachments eagerly loaded.
    async fn list_new(&self) -> Result<Vec<FeedbackRecord>, CarelinkError>;

    /// Unconditionally overwrites a record's status. No transition check.
    async fn update_status(
        &self,
        id: i64,
        status: FeedbackStatus,
    ) -> Result<(), CarelinkError>;

    /// Grouped record counts per category. Categories with no records are
    /// absent from the map, not zero-valued.
    async fn counts_by_category(
        &self,
    ) -> Result<BTreeMap<FeedbackCategory, u64>, CarelinkError>;

    /// Deletes a record; its attachments are removed with it.
    async fn delete_feedback(&self, id: i64) -> Result<(), CarelinkError>;
}
