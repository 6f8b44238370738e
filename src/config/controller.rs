//! # Controller Configuration
//!
//! Controller-level settings loaded from environment variables.

use crate::constants::{
    DEFAULT_BACKOFF_MAX_MS, DEFAULT_BACKOFF_START_MS, DEFAULT_CONTROLLER_NAMESPACE,
    DEFAULT_GCP_COMPUTE_ENDPOINT, DEFAULT_MAX_RECONCILE_RETRIES, DEFAULT_METRICS_PORT,
    DEFAULT_RESYNC_INTERVAL_SECS, DEFAULT_STATE_CONFIG_MAP_NAME, DEFAULT_WATCH_RESTART_DELAY_SECS,
    DEFAULT_WORKER_COUNT,
};
use std::time::Duration;

/// Controller-level configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
/// Environment variables are populated from a ConfigMap using `envFrom` in the deployment.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Number of ManagedCertificates reconciled in parallel
    pub worker_count: usize,
    /// Fibonacci backoff starting value (milliseconds)
    pub backoff_start_ms: u64,
    /// Fibonacci backoff maximum value (milliseconds)
    pub backoff_max_ms: u64,
    /// Requeues allowed per resource before it is dropped (0 = unlimited)
    pub max_reconcile_retries: u32,
    /// Delay before a successfully reconciled ManagedCertificate runs again (seconds)
    pub resync_interval_secs: u64,
    /// Watch stream restart delay after unknown errors (seconds)
    pub watch_restart_delay_secs: u64,
    /// Namespace where the controller is deployed (holds the state ConfigMap)
    pub controller_namespace: String,
    /// ConfigMap persisting the name mapping; empty keeps the mapping in memory only
    pub state_config_map_name: String,
    /// GCP project owning the SslCertificates; discovered from the metadata server when unset
    pub gcp_project_id: Option<String>,
    /// Compute Engine API endpoint
    pub gcp_compute_endpoint: String,
    /// HTTP server port for metrics and probes
    pub metrics_port: u16,
    /// Global log level (ERROR, WARN, INFO, DEBUG, TRACE)
    pub log_level: String,
    /// Log format (json, text)
    pub log_format: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            backoff_start_ms: DEFAULT_BACKOFF_START_MS,
            backoff_max_ms: DEFAULT_BACKOFF_MAX_MS,
            max_reconcile_retries: DEFAULT_MAX_RECONCILE_RETRIES,
            resync_interval_secs: DEFAULT_RESYNC_INTERVAL_SECS,
            watch_restart_delay_secs: DEFAULT_WATCH_RESTART_DELAY_SECS,
            controller_namespace: DEFAULT_CONTROLLER_NAMESPACE.to_string(),
            state_config_map_name: DEFAULT_STATE_CONFIG_MAP_NAME.to_string(),
            gcp_project_id: None,
            gcp_compute_endpoint: DEFAULT_GCP_COMPUTE_ENDPOINT.to_string(),
            metrics_port: DEFAULT_METRICS_PORT,
            log_level: "INFO".to_string(),
            log_format: "json".to_string(),
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// `from_env` delegates here; tests pass a map instead of mutating the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            worker_count: parse_or(&lookup, "WORKER_COUNT", defaults.worker_count).max(1),
            // A zero start keeps the Fibonacci sequence at zero
            backoff_start_ms: parse_or(&lookup, "BACKOFF_START_MS", defaults.backoff_start_ms)
                .max(1),
            backoff_max_ms: parse_or(&lookup, "BACKOFF_MAX_MS", defaults.backoff_max_ms),
            max_reconcile_retries: parse_or(
                &lookup,
                "MAX_RECONCILE_RETRIES",
                defaults.max_reconcile_retries,
            ),
            resync_interval_secs: parse_or(
                &lookup,
                "RESYNC_INTERVAL_SECS",
                defaults.resync_interval_secs,
            ),
            watch_restart_delay_secs: parse_or(
                &lookup,
                "WATCH_RESTART_DELAY_SECS",
                defaults.watch_restart_delay_secs,
            ),
            controller_namespace: lookup("POD_NAMESPACE").unwrap_or(defaults.controller_namespace),
            state_config_map_name: lookup("STATE_CONFIG_MAP_NAME")
                .unwrap_or(defaults.state_config_map_name),
            gcp_project_id: lookup("GCP_PROJECT_ID").filter(|v| !v.trim().is_empty()),
            gcp_compute_endpoint: lookup("GCP_COMPUTE_ENDPOINT")
                .unwrap_or(defaults.gcp_compute_endpoint),
            metrics_port: parse_or(&lookup, "METRICS_PORT", defaults.metrics_port),
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_format: lookup("LOG_FORMAT").unwrap_or(defaults.log_format),
        }
    }

    /// Get backoff start duration
    #[must_use]
    pub fn backoff_start_duration(&self) -> Duration {
        Duration::from_millis(self.backoff_start_ms)
    }

    /// Get backoff max duration
    #[must_use]
    pub fn backoff_max_duration(&self) -> Duration {
        Duration::from_millis(self.backoff_max_ms)
    }

    /// Get resync interval duration
    #[must_use]
    pub fn resync_interval_duration(&self) -> Duration {
        Duration::from_secs(self.resync_interval_secs)
    }

    /// Get watch restart delay duration
    #[must_use]
    pub fn watch_restart_delay_duration(&self) -> Duration {
        Duration::from_secs(self.watch_restart_delay_secs)
    }

    /// Retry ceiling, `None` when retries are unlimited
    #[must_use]
    pub fn max_retries(&self) -> Option<u32> {
        (self.max_reconcile_retries > 0).then_some(self.max_reconcile_retries)
    }

    /// Whether the name mapping should be persisted to a ConfigMap
    #[must_use]
    pub fn persist_state(&self) -> bool {
        !self.state_config_map_name.trim().is_empty()
    }
}

/// Read a variable and parse it, falling back to the default on absence or parse failure
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
