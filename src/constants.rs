//! # Constants
//!
//! Shared constants used throughout the controller.
//!
//! These values represent reasonable defaults and can be overridden via
//! environment variables where applicable.

/// Default HTTP server port for metrics and health probes
pub const DEFAULT_METRICS_PORT: u16 = 5000;

/// Default number of ManagedCertificates reconciled in parallel
pub const DEFAULT_WORKER_COUNT: usize = 4;

/// Default Fibonacci backoff starting value (milliseconds)
pub const DEFAULT_BACKOFF_START_MS: u64 = 1000;

/// Default Fibonacci backoff maximum value (milliseconds)
pub const DEFAULT_BACKOFF_MAX_MS: u64 = 300_000;

/// Default retry ceiling per resource; 0 means retry forever
pub const DEFAULT_MAX_RECONCILE_RETRIES: u32 = 0;

/// Default delay before a successfully reconciled resource runs again (seconds)
pub const DEFAULT_RESYNC_INTERVAL_SECS: u64 = 60;

/// Default delay before restarting the watch stream after unknown errors (seconds)
pub const DEFAULT_WATCH_RESTART_DELAY_SECS: u64 = 5;

/// Default namespace used when `POD_NAMESPACE` is not set
pub const DEFAULT_CONTROLLER_NAMESPACE: &str = "kube-system";

/// Default name of the ConfigMap persisting the name mapping
pub const DEFAULT_STATE_CONFIG_MAP_NAME: &str = "managed-certificate-controller-state";

/// Default GCP Compute Engine API endpoint
pub const DEFAULT_GCP_COMPUTE_ENDPOINT: &str = "https://compute.googleapis.com";

/// GKE metadata server base URL
pub const GCP_METADATA_ENDPOINT: &str = "http://metadata.google.internal/computeMetadata/v1";

/// Prefix of every generated SslCertificate name
pub const CERTIFICATE_NAME_PREFIX: &str = "mcert";

/// Field manager used for status and state patches
pub const FIELD_MANAGER: &str = "managed-certificate-controller";
