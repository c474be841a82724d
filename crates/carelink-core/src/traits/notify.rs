// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notifier trait for best-effort staff notification.

use async_trait::async_trait;

use crate::error::CarelinkError;
use crate::traits::adapter::ServiceAdapter;
use crate::types::FeedbackRecord;

/// Adapter for the outbound staff notification transport (email).
///
/// Delivery is best-effort: callers must treat failure as non-fatal and
/// never roll back an already-committed store write because of it.
#[async_trait]
pub trait Notifier: ServiceAdapter {
    /// Formats and sends a single notification for the given record.
    async fn notify(&self, record: &FeedbackRecord) -> Result<(), CarelinkError>;
}
