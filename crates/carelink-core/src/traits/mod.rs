// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits implemented by the pluggable Carelink subsystems.
//!
//! The dialogue engine and orchestrator only depend on these traits, so the
//! chat transport, the relational store, and the mail transport can all be
//! swapped out (or faked in tests).

pub mod adapter;
pub mod channel;
pub mod notify;
pub mod store;

pub use adapter::ServiceAdapter;
pub use channel::ChatGateway;
pub use notify::Notifier;
pub use store::FeedbackStore;
