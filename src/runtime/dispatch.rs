//! # Dispatch
//!
//! Glue between the kube-runtime `Controller` and the reconciler.
//!
//! The controller's scheduler is the work queue: an object is never
//! reconciled by two workers at once, triggers arriving during a pass are
//! merged into one, and the returned `Action` decides when it runs again.
//!
//! - success: the resource's backoff is dropped and it is requeued after the
//!   resync interval, so status keeps mirroring the backend
//! - failure: handled by `error_policy::handle_reconciliation_error`
//! - object without a namespace/name identity: dropped

use crate::config::ControllerConfig;
use crate::controller::backoff::BackoffState;
use crate::controller::key::ResourceKey;
use crate::controller::reconciler::{self, Reconciler, ReconcilerError};
use crate::crd::ManagedCertificate;
use crate::runtime::error_policy::DispatchError;
use async_trait::async_trait;
use kube_runtime::controller::Action;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

/// What the controller runs for each resource
#[async_trait]
pub trait ReconcileHandler: Send + Sync {
    async fn reconcile(&self, key: &ResourceKey) -> Result<(), ReconcilerError>;
}

#[async_trait]
impl ReconcileHandler for Reconciler {
    async fn reconcile(&self, key: &ResourceKey) -> Result<(), ReconcilerError> {
        reconciler::reconcile(self, key).await
    }
}

/// Retry ceiling for failed reconciles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Requeues allowed before a resource is given up on; `None` retries forever
    pub max_retries: Option<u32>,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_retries: Option<u32>) -> Self {
        Self { max_retries }
    }

    #[must_use]
    pub fn unlimited() -> Self {
        Self { max_retries: None }
    }

    /// Whether a resource already requeued `retries` times must be given up on
    #[must_use]
    pub fn exhausted(&self, retries: u32) -> bool {
        self.max_retries.is_some_and(|max| retries >= max)
    }
}

/// What happens to a resource after a failed pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Not a resource identity; never retried
    Drop,
    /// Retried after `delay`; `attempt` counts the requeues so far
    Requeue { attempt: u32, delay: Duration },
    /// Retry ceiling reached; waits for the next change to the resource
    GiveUp { retries: u32 },
}

/// Shared context handed to every reconcile and error-policy call
pub struct DispatchContext<H> {
    handler: Arc<H>,
    policy: RetryPolicy,
    backoff_start: Duration,
    backoff_max: Duration,
    resync_interval: Duration,
    /// Per-resource backoff, present only while the resource keeps failing
    backoff_states: Mutex<HashMap<ResourceKey, BackoffState>>,
}

impl<H> std::fmt::Debug for DispatchContext<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchContext")
            .field("policy", &self.policy)
            .field("backoff_start", &self.backoff_start)
            .field("backoff_max", &self.backoff_max)
            .field("resync_interval", &self.resync_interval)
            .finish_non_exhaustive()
    }
}

impl<H> DispatchContext<H> {
    #[must_use]
    pub fn new(
        handler: Arc<H>,
        policy: RetryPolicy,
        backoff_start: Duration,
        backoff_max: Duration,
        resync_interval: Duration,
    ) -> Self {
        Self {
            handler,
            policy,
            backoff_start,
            backoff_max,
            resync_interval,
            backoff_states: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn from_config(handler: Arc<H>, config: &ControllerConfig) -> Self {
        Self::new(
            handler,
            RetryPolicy::new(config.max_retries()),
            config.backoff_start_duration(),
            config.backoff_max_duration(),
            config.resync_interval_duration(),
        )
    }

    fn backoff_states(&self) -> MutexGuard<'_, HashMap<ResourceKey, BackoffState>> {
        self.backoff_states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Requeues since the resource last succeeded
    #[must_use]
    pub fn num_requeues(&self, key: &ResourceKey) -> u32 {
        self.backoff_states()
            .get(key)
            .map_or(0, |state| state.error_count)
    }

    /// Drop the resource's backoff
    pub fn forget(&self, key: &ResourceKey) {
        self.backoff_states().remove(key);
    }

    /// Record a failed pass and decide when the resource runs again
    pub fn record_failure(&self, key: &ResourceKey) -> RetryDecision {
        let mut states = self.backoff_states();

        let retries = states.get(key).map_or(0, |state| state.error_count);
        if self.policy.exhausted(retries) {
            states.remove(key);
            return RetryDecision::GiveUp { retries };
        }

        let state = states
            .entry(key.clone())
            .or_insert_with(|| BackoffState::new(self.backoff_start, self.backoff_max));
        let delay = state.next_delay();
        RetryDecision::Requeue {
            attempt: state.error_count,
            delay,
        }
    }
}

/// Reconcile one ManagedCertificate handed over by the controller
///
/// # Errors
/// Returns `InvalidKey` for objects without identity and `Reconcile` for a
/// failed pass; both go to the error policy.
pub async fn reconcile_object<H>(
    certificate: Arc<ManagedCertificate>,
    ctx: Arc<DispatchContext<H>>,
) -> Result<Action, DispatchError>
where
    H: ReconcileHandler,
{
    let key = ResourceKey::try_from(certificate.as_ref())?;

    match ctx.handler.reconcile(&key).await {
        Ok(()) => {
            ctx.forget(&key);
            debug!(
                resource = %key,
                resync_secs = ctx.resync_interval.as_secs(),
                "Reconciled, scheduling resync"
            );
            Ok(Action::requeue(ctx.resync_interval))
        }
        Err(source) => Err(DispatchError::Reconcile { key, source }),
    }
}
