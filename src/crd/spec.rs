//! # ManagedCertificate Spec
//!
//! The user-declared certificate intent.

use super::status::ManagedCertificateStatus;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// ManagedCertificate Custom Resource Definition
///
/// Declares a set of domains that should be covered by a Google-managed
/// SslCertificate. The controller creates the SslCertificate once and mirrors
/// its provisioning status back onto this resource.
///
/// # Example
///
/// ```yaml
/// apiVersion: networking.gke.io/v1
/// kind: ManagedCertificate
/// metadata:
///   name: example
///   namespace: default
/// spec:
///   domains:
///     - a.example.com
///     - b.example.com
/// ```
#[derive(CustomResource, Debug, Clone, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(
    kind = "ManagedCertificate",
    group = "networking.gke.io",
    version = "v1",
    namespaced,
    status = "ManagedCertificateStatus",
    shortname = "mcrt",
    printcolumn = r#"{"name":"Status", "type":"string", "jsonPath":".status.certificateStatus"}"#,
    printcolumn = r#"{"name":"Certificate", "type":"string", "jsonPath":".status.certificateName"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ManagedCertificateSpec {
    /// Domains the certificate must cover, in declaration order.
    /// Fixed once the SslCertificate is created; changing them does not recreate it.
    #[serde(default)]
    pub domains: Vec<String>,
}
