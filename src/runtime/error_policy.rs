//! # Error Policy
//!
//! What happens after a failed reconcile, the process-wide error sink, and
//! classification of watch stream errors.

use crate::controller::key::{InvalidKey, ResourceKey};
use crate::controller::reconciler::ReconcilerError;
use crate::crd::ManagedCertificate;
use crate::observability::metrics;
use crate::runtime::dispatch::{DispatchContext, RetryDecision};
use kube_runtime::controller::Action;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, warn};

/// Failure of one reconcile handed to the controller
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Object carried no namespace/name identity
    #[error("dropping object")]
    InvalidKey(#[from] InvalidKey),

    #[error("failed to reconcile {key}")]
    Reconcile {
        key: ResourceKey,
        #[source]
        source: ReconcilerError,
    },
}

impl DispatchError {
    #[must_use]
    pub fn key(&self) -> Option<&ResourceKey> {
        match self {
            Self::InvalidKey(_) => None,
            Self::Reconcile { key, .. } => Some(key),
        }
    }
}

/// Render an error and its sources as `outer: inner: root`
#[must_use]
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

/// Handle a failed reconcile with per-resource Fibonacci backoff
///
/// Backoff state lives in the context, keyed by resource, so one failing
/// resource never delays another. Once the retry ceiling is reached the
/// resource waits for its next change instead of being requeued.
pub fn handle_reconciliation_error<H>(
    _certificate: Arc<ManagedCertificate>,
    error: &DispatchError,
    ctx: Arc<DispatchContext<H>>,
) -> Action {
    let decision = match error.key() {
        Some(key) => ctx.record_failure(key),
        None => RetryDecision::Drop,
    };
    report_error(error, decision);

    match decision {
        RetryDecision::Requeue { delay, .. } => Action::requeue(delay),
        RetryDecision::Drop | RetryDecision::GiveUp { .. } => Action::await_change(),
    }
}

/// Report a failed reconcile
///
/// Failures never stop the controller; they surface here, in the log stream
/// and the metrics.
pub fn report_error(err: &DispatchError, decision: RetryDecision) {
    let chain = error_chain(err);
    let resource = err.key().map(ToString::to_string).unwrap_or_default();

    match decision {
        RetryDecision::Drop => {
            metrics::increment_dropped_items();
            error!(error = %chain, "Object without namespace/name identity");
        }
        RetryDecision::Requeue { attempt, delay } => {
            metrics::increment_reconciliation_errors();
            metrics::increment_requeues();
            let next_attempt = chrono::Utc::now()
                + chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::zero());
            error!(
                resource = %resource,
                attempt,
                delay_ms = delay.as_millis(),
                next_attempt = %next_attempt.to_rfc3339(),
                error = %chain,
                "Reconciliation failed, requeued with backoff"
            );
        }
        RetryDecision::GiveUp { retries } => {
            metrics::increment_reconciliation_errors();
            metrics::increment_retries_exhausted();
            error!(
                resource = %resource,
                retries,
                error = %chain,
                "Reconciliation failed, retries exhausted"
            );
        }
    }
}

/// Coarse classification of a watch stream error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchErrorKind {
    /// 401, credentials or RBAC revoked
    Unauthorized,
    /// 410, resource version too old
    Expired,
    /// 429, API server storage reinitializing
    TooManyRequests,
    /// 404, usually the CRD is not installed
    NotFound,
    Other,
}

impl WatchErrorKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::Expired => "expired",
            Self::TooManyRequests => "too_many_requests",
            Self::NotFound => "not_found",
            Self::Other => "other",
        }
    }
}

/// Classify a rendered watch error
///
/// 404 is checked before 401 since not-found errors can mention `WatchFailed`.
#[must_use]
pub fn classify_watch_error(error_string: &str) -> WatchErrorKind {
    let is_not_found = error_string.contains("ObjectNotFound")
        || error_string.contains("404")
        || error_string.contains("not found");
    if is_not_found {
        return WatchErrorKind::NotFound;
    }
    if error_string.contains("401") || error_string.contains("Unauthorized") {
        return WatchErrorKind::Unauthorized;
    }
    if error_string.contains("410")
        || error_string.contains("too old resource version")
        || error_string.contains("Expired")
        || error_string.contains("Gone")
    {
        return WatchErrorKind::Expired;
    }
    if error_string.contains("429")
        || error_string.contains("storage is (re)initializing")
        || error_string.contains("TooManyRequests")
    {
        return WatchErrorKind::TooManyRequests;
    }
    WatchErrorKind::Other
}

/// Log a watch stream error and wait before the stream is polled again
///
/// The watcher already retries with its own backoff; the extra delay only
/// applies to errors that need time to clear.
pub async fn handle_watch_stream_error(error_string: &str, restart_delay: Duration) {
    let kind = classify_watch_error(error_string);
    metrics::increment_watch_errors(kind.as_str());

    match kind {
        WatchErrorKind::Unauthorized => {
            error!(
                error = %error_string,
                "Watch authentication failed (401), RBAC may have been revoked or the token expired"
            );
            tokio::time::sleep(restart_delay).await;
        }
        WatchErrorKind::Expired => {
            warn!("Watch resource version expired (410), watch will restart");
        }
        WatchErrorKind::TooManyRequests => {
            warn!(error = %error_string, "API server storage reinitializing (429), backing off");
        }
        WatchErrorKind::NotFound => {
            warn!(
                error = %error_string,
                "ManagedCertificate resource not found (404), is the CRD installed?"
            );
        }
        WatchErrorKind::Other => {
            error!(error = %error_string, "Watch stream error");
            tokio::time::sleep(restart_delay).await;
        }
    }
}
