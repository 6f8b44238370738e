//! # Provider Modules
//!
//! Backend clients for the SslCertificate objects that back each
//! ManagedCertificate.
//!
//! The reconciler only talks to the `SslCertificateProvider` trait; the GCP
//! Compute REST implementation lives in `gcp`.

use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

pub mod gcp;

/// SslCertificate as reported by the backend
///
/// Status strings are kept raw; `controller::reconciler::translate` turns them
/// into the public vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SslCertificate {
    pub name: String,
    pub domains: Vec<String>,
    /// Raw overall provisioning status (e.g. `PROVISIONING`)
    pub status: String,
    /// Raw provisioning status per domain
    pub domain_status: BTreeMap<String, String>,
}

/// Errors returned by a backend client
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The named SslCertificate does not exist
    #[error("SslCertificate {0} not found")]
    NotFound(String),

    /// An SslCertificate with this name already exists
    #[error("SslCertificate {0} already exists")]
    AlreadyExists(String),

    /// The backend rejected the request
    #[error("backend API error: {message} (code: {code}, status: {status})")]
    Api {
        code: u16,
        status: String,
        message: String,
    },

    /// The request never produced a usable response
    #[error("backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// No credentials could be obtained
    #[error("backend authentication failed: {0}")]
    Auth(String),
}

impl ProviderError {
    /// Whether the error says the object does not exist
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Backend client contract used by the reconciler and the name allocator
#[async_trait]
pub trait SslCertificateProvider: Send + Sync {
    /// Fetch an SslCertificate by name
    ///
    /// Must return `ProviderError::NotFound` (and only that) when the object
    /// does not exist, so callers can tell absence apart from transient failures.
    async fn get(&self, name: &str) -> Result<SslCertificate, ProviderError>;

    /// Create a managed SslCertificate covering `domains`
    async fn insert(&self, name: &str, domains: &[String]) -> Result<(), ProviderError>;
}
