// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Carelink feedback bot.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain types used throughout the Carelink workspace. The chat gateway,
//! feedback store, and notifier crates all implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CarelinkError;
pub use types::{
    AdapterKind, ChatEvent, FeedbackCategory, FeedbackRecord, FeedbackStatus, HealthStatus,
    Locale, MediaKind, MessageId, NewFeedback, Reply,
};

// Re-export all adapter traits at crate root.
pub use traits::{ChatGateway, FeedbackStore, Notifier, ServiceAdapter};
