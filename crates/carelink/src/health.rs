// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Minimal liveness HTTP server.
//!
//! Serves `GET /health` (always 200) for container orchestration probes,
//! plus the informational `GET /feedback` stub the deployment expects.

use std::net::SocketAddr;

use axum::{Json, Router, routing::get};
use carelink_core::CarelinkError;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Binds the health server and serves until the token is cancelled.
pub async fn serve(addr: SocketAddr, cancel: CancellationToken) -> Result<(), CarelinkError> {
    let app = Router::new()
        .route("/health", get(get_health))
        .route("/feedback", get(get_feedback_info));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| CarelinkError::Internal(format!("failed to bind {addr}: {e}")))?;

    info!(%addr, "health server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| CarelinkError::Internal(format!("health server error: {e}")))
}

async fn get_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

async fn get_feedback_info() -> Json<serde_json::Value> {
    Json(serde_json::json!({"message": "Feedback endpoint"}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_server_binds_and_shuts_down() {
        let cancel = CancellationToken::new();
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();

        let server_cancel = cancel.clone();
        let handle = tokio::spawn(async move { serve(addr, server_cancel).await });

        // Give the server a moment to bind, then stop it.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        cancel.cancel();

        let result = tokio::time::timeout(std::time::Duration::from_secs(2), handle)
            .await
            .expect("server must stop after cancellation")
            .unwrap();
        assert!(result.is_ok());
    }
}
