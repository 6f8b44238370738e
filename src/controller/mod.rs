//! # Controller
//!
//! Core controller modules for the Managed Certificate Controller.
//!
//! - `backoff`: Fibonacci backoff used for requeues after failures
//! - `key`: `namespace/name` identity of a ManagedCertificate
//! - `reconciler`: Core reconciliation logic
//! - `server`: HTTP server for metrics and health checks

pub mod backoff;
pub mod key;
pub mod reconciler;
pub mod server;
