//! # Watch Loop
//!
//! Runs the kube-runtime `Controller` over ManagedCertificate resources.
//!
//! The controller's reflector is the reconciler's read cache. Every applied
//! object triggers a reconcile; deletions do not. Successful passes requeue
//! after the resync interval, failed passes follow the error policy.

use crate::controller::server::ServerState;
use crate::crd::ManagedCertificate;
use crate::runtime::dispatch::{reconcile_object, DispatchContext, ReconcileHandler};
use crate::runtime::error_policy::{handle_reconciliation_error, handle_watch_stream_error};
use futures::StreamExt;
use kube_runtime::controller::{self, Controller};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Drive the controller until SIGINT/SIGTERM
///
/// `worker_count` bounds how many resources reconcile in parallel. On the
/// first signal the server reports not ready and in-flight reconciles finish
/// before this returns.
pub async fn run_watch_loop<H>(
    controller: Controller<ManagedCertificate>,
    ctx: Arc<DispatchContext<H>>,
    server_state: Arc<ServerState>,
    worker_count: usize,
    restart_delay: Duration,
) where
    H: ReconcileHandler + 'static,
{
    let concurrency = u16::try_from(worker_count).unwrap_or(u16::MAX);
    info!(workers = concurrency, "Starting controller watch loop...");

    let shutdown_server_state = Arc::clone(&server_state);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal (SIGINT/SIGTERM), initiating graceful shutdown...");
            shutdown_server_state.set_ready(false);
            info!("Marked server as not ready, waiting for in-flight reconciliations to complete...");
        }
    });

    controller
        .with_config(controller::Config::default().concurrency(concurrency))
        .shutdown_on_signal()
        .run(
            |certificate, ctx| reconcile_object(certificate, ctx),
            |certificate, error, ctx| handle_reconciliation_error(certificate, error, ctx),
            ctx,
        )
        .for_each(move |result| async move {
            match result {
                Ok((object, action)) => {
                    debug!(resource = %object, ?action, "watch.event.reconciled");
                }
                // Already reported by the error policy
                Err(controller::Error::ReconcilerFailed(..)) => {}
                Err(controller::Error::ObjectNotFound(object)) => {
                    debug!(resource = %object, "Skipping requeue of deleted ManagedCertificate");
                }
                Err(e) => handle_watch_stream_error(&format!("{e:?}"), restart_delay).await,
            }
        })
        .await;

    info!("Controller stopped gracefully");
}
