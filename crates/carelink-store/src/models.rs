// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `carelink-core::types` for use across
//! adapter trait boundaries. This module re-exports them for convenience
//! within the storage crate.

pub use carelink_core::types::{
    FeedbackCategory, FeedbackRecord, FeedbackStatus, MediaAttachment, MediaKind, NewFeedback,
    NewMediaAttachment, Submitter,
};
