// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait shared by all Carelink service adapters.

use async_trait::async_trait;

use crate::error::CarelinkError;
use crate::types::{AdapterKind, HealthStatus};

/// The base trait for all Carelink service adapters.
///
/// Every adapter (chat gateway, feedback store, notifier) implements this
/// trait, which provides identity, lifecycle, and health check capabilities.
#[async_trait]
pub trait ServiceAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// Returns the kind of adapter (channel, storage, notifier).
    fn kind(&self) -> AdapterKind;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, CarelinkError>;

    /// Gracefully shuts down the adapter, releasing any held resources.
    async fn shutdown(&self) -> Result<(), CarelinkError>;
}
