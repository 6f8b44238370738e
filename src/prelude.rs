//! # Prelude
//!
//! Re-exports commonly used types and traits for convenience.
//!
//! ```rust
//! use managed_certificate_controller::prelude::*;
//! ```

// CRD types
pub use crate::crd::*;

// Identity
pub use crate::controller::key::{InvalidKey, ResourceKey};

// Backend traits and models
pub use crate::provider::{ProviderError, SslCertificate, SslCertificateProvider};

// Reconciler types
pub use crate::controller::reconciler::{
    reconcile, CertificateReader, CertificateWriter, NameGenerator, NameStore, Reconciler,
    ReconcilerError,
};

// Dispatch
pub use crate::runtime::dispatch::{DispatchContext, ReconcileHandler, RetryDecision, RetryPolicy};

pub use crate::config::ControllerConfig;
