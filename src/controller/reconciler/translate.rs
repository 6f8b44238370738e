//! # Status Translation
//!
//! Maps the backend's provisioning vocabulary onto the public vocabulary
//! written to `ManagedCertificate` status.
//!
//! The backend uses two disjoint enumerations, one for the certificate as a
//! whole and one per domain, so there are two independent tables. Parsing a
//! raw string is the only fallible step; the backend-to-public conversions are
//! exhaustive `match`es.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    #[error("unknown {kind} status {value:?}")]
    UnknownStatus { kind: &'static str, value: String },
}

/// Overall SslCertificate state as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagedCertificateState {
    Unspecified,
    Provisioning,
    Active,
    ProvisioningFailed,
    ProvisioningFailedPermanently,
    RenewalFailed,
}

impl FromStr for ManagedCertificateState {
    type Err = TranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "MANAGED_CERTIFICATE_STATUS_UNSPECIFIED" => Ok(Self::Unspecified),
            "PROVISIONING" => Ok(Self::Provisioning),
            "ACTIVE" => Ok(Self::Active),
            "PROVISIONING_FAILED" => Ok(Self::ProvisioningFailed),
            "PROVISIONING_FAILED_PERMANENTLY" => Ok(Self::ProvisioningFailedPermanently),
            "RENEWAL_FAILED" => Ok(Self::RenewalFailed),
            other => Err(TranslateError::UnknownStatus {
                kind: "certificate",
                value: other.to_string(),
            }),
        }
    }
}

/// Per-domain provisioning state as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainState {
    Provisioning,
    FailedNotVisible,
    FailedCaaChecking,
    FailedCaaForbidden,
    FailedRateLimited,
    Active,
}

impl FromStr for DomainState {
    type Err = TranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PROVISIONING" => Ok(Self::Provisioning),
            "FAILED_NOT_VISIBLE" => Ok(Self::FailedNotVisible),
            "FAILED_CAA_CHECKING" => Ok(Self::FailedCaaChecking),
            "FAILED_CAA_FORBIDDEN" => Ok(Self::FailedCaaForbidden),
            "FAILED_RATE_LIMITED" => Ok(Self::FailedRateLimited),
            "ACTIVE" => Ok(Self::Active),
            other => Err(TranslateError::UnknownStatus {
                kind: "domain",
                value: other.to_string(),
            }),
        }
    }
}

/// Public overall certificate status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateStatus {
    /// Backend has not reported a status yet
    Empty,
    Provisioning,
    Active,
    ProvisioningFailed,
    ProvisioningFailedPermanently,
    RenewalFailed,
}

impl CertificateStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "",
            Self::Provisioning => "Provisioning",
            Self::Active => "Active",
            Self::ProvisioningFailed => "ProvisioningFailed",
            Self::ProvisioningFailedPermanently => "ProvisioningFailedPermanently",
            Self::RenewalFailed => "RenewalFailed",
        }
    }
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ManagedCertificateState> for CertificateStatus {
    fn from(state: ManagedCertificateState) -> Self {
        match state {
            ManagedCertificateState::Unspecified => Self::Empty,
            ManagedCertificateState::Provisioning => Self::Provisioning,
            ManagedCertificateState::Active => Self::Active,
            ManagedCertificateState::ProvisioningFailed => Self::ProvisioningFailed,
            ManagedCertificateState::ProvisioningFailedPermanently => {
                Self::ProvisioningFailedPermanently
            }
            ManagedCertificateState::RenewalFailed => Self::RenewalFailed,
        }
    }
}

/// Public per-domain status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainStatusValue {
    Provisioning,
    FailedNotVisible,
    FailedCaaChecking,
    FailedCaaForbidden,
    FailedRateLimited,
    Active,
}

impl DomainStatusValue {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Provisioning => "Provisioning",
            Self::FailedNotVisible => "FailedNotVisible",
            Self::FailedCaaChecking => "FailedCaaChecking",
            Self::FailedCaaForbidden => "FailedCaaForbidden",
            Self::FailedRateLimited => "FailedRateLimited",
            Self::Active => "Active",
        }
    }
}

impl fmt::Display for DomainStatusValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DomainState> for DomainStatusValue {
    fn from(state: DomainState) -> Self {
        match state {
            DomainState::Provisioning => Self::Provisioning,
            DomainState::FailedNotVisible => Self::FailedNotVisible,
            DomainState::FailedCaaChecking => Self::FailedCaaChecking,
            DomainState::FailedCaaForbidden => Self::FailedCaaForbidden,
            DomainState::FailedRateLimited => Self::FailedRateLimited,
            DomainState::Active => Self::Active,
        }
    }
}

/// Translate a raw overall status
///
/// # Errors
/// Returns `UnknownStatus` for any value outside the overall table.
pub fn translate_overall_status(raw: &str) -> Result<CertificateStatus, TranslateError> {
    raw.parse::<ManagedCertificateState>().map(Into::into)
}

/// Translate a raw per-domain status
///
/// # Errors
/// Returns `UnknownStatus` for any value outside the per-domain table.
pub fn translate_domain_status(raw: &str) -> Result<DomainStatusValue, TranslateError> {
    raw.parse::<DomainState>().map(Into::into)
}
