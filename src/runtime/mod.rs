//! # Runtime
//!
//! Process wiring around the reconciler.
//!
//! - `initialization`: client, backend, store, controller and server setup
//! - `watch_loop`: the kube-runtime controller driving reconciles
//! - `dispatch`: reconcile wrapper, retry policy and per-resource backoff
//! - `error_policy`: failed-reconcile handling, error sink and watch error classification

pub mod dispatch;
pub mod error_policy;
pub mod initialization;
pub mod watch_loop;

use crate::runtime::dispatch::DispatchContext;
use crate::runtime::initialization::initialize;
use crate::runtime::watch_loop::run_watch_loop;
use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info};

/// Run the controller until SIGINT/SIGTERM
///
/// The server reports ready once the ManagedCertificate cache has synced.
/// On shutdown it reports not ready and in-flight reconciles finish before
/// this returns.
///
/// # Errors
/// Returns an error if initialization fails.
pub async fn run() -> Result<()> {
    let init = initialize().await?;
    let config = init.config;

    let context = Arc::new(DispatchContext::from_config(init.reconciler, &config));

    let store = init.reader_store;
    let ready_state = Arc::clone(&init.server_state);
    tokio::spawn(async move {
        match store.wait_until_ready().await {
            Ok(()) => {
                info!(cached = store.state().len(), "ManagedCertificate cache synced");
                ready_state.set_ready(true);
            }
            Err(e) => error!(error = %e, "ManagedCertificate watch ended before the cache synced"),
        }
    });

    run_watch_loop(
        init.controller,
        context,
        init.server_state,
        config.worker_count,
        config.watch_restart_delay_duration(),
    )
    .await;

    info!("Controller stopped");
    Ok(())
}
