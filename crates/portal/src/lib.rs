// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! protea-portal: the Web Portal (C11), a read-only HTTP server over the
//! Shared Supervisor State, the Fitness Log, and the skill catalog. No
//! route accepts a mutation. Spawned and stopped independently of
//! `protea-sentinel`'s components by the binary entry point.

mod error;
mod routes;
mod state;

pub use error::PortalError;
pub use routes::build_router;
pub use state::PortalState;

use protea_core::Clock;

/// Bind `host:port` and serve the portal until `shutdown` resolves.
pub async fn run_portal<C>(
    state: PortalState<C>,
    host: &str,
    port: u16,
    shutdown: tokio::sync::oneshot::Receiver<()>,
) -> Result<(), PortalError>
where
    C: Clock,
{
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| PortalError::Bind(addr.clone(), e))?;
    tracing::info!(addr = %addr, "portal listening");

    let app = build_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = shutdown.await;
        })
        .await
        .map_err(PortalError::Serve)
}
