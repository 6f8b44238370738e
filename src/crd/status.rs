//! # ManagedCertificate Status
//!
//! Status types written by the reconciler. Values use the public status
//! vocabulary produced by `controller::reconciler::translate`.

use serde::{Deserialize, Serialize};

/// Status of the ManagedCertificate resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManagedCertificateStatus {
    /// Overall provisioning status
    /// Values: Active, Provisioning, ProvisioningFailed, ProvisioningFailedPermanently,
    /// RenewalFailed, or empty when the backend reports no status yet
    #[serde(default)]
    pub certificate_status: String,
    /// Name of the backing SslCertificate. Never changes once set.
    #[serde(default)]
    pub certificate_name: String,
    /// Provisioning status of each domain, ordered by domain
    #[serde(default)]
    pub domain_status: Vec<DomainStatus>,
}

/// Provisioning status of a single domain
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DomainStatus {
    pub domain: String,
    /// Values: Provisioning, FailedNotVisible, FailedCaaChecking, FailedCaaForbidden,
    /// FailedRateLimited, Active
    pub status: String,
}
