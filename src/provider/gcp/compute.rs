//! GCP Compute SslCertificates REST Client
//!
//! Native REST implementation for the global `sslCertificates` collection of
//! the Compute Engine API v1. Uses reqwest for HTTP requests and metadata
//! server tokens for authentication.
//!
//! References:
//! - [sslCertificates REST resource](https://cloud.google.com/compute/docs/reference/rest/v1/sslCertificates)

use super::auth::TokenSource;
use crate::observability::metrics;
use crate::provider::{ProviderError, SslCertificate, SslCertificateProvider};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, info_span, Instrument};

/// GCP Compute SslCertificates REST client
pub struct ComputeSslCertificates {
    http_client: Client,
    base_url: String,
    project_id: String,
    token_source: TokenSource,
}

// ============================================================================
// Compute API Request/Response Structures
// ============================================================================

/// SslCertificate resource representation
///
/// Only the fields this controller reads or writes are modelled; unknown
/// fields in responses are ignored.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SslCertificateResource {
    name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    certificate_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    managed: Option<ManagedSection>,
}

/// `managed` block of an SslCertificate
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManagedSection {
    #[serde(default)]
    domains: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    domain_status: BTreeMap<String, String>,
}

/// GCP API error response wrapper
///
/// API Reference: https://cloud.google.com/apis/design/errors
#[derive(Debug, Deserialize)]
struct GcpErrorResponse {
    error: GcpError,
}

#[derive(Debug, Deserialize)]
struct GcpError {
    code: u16,
    message: String,
    #[serde(default)]
    status: String,
}

impl From<SslCertificateResource> for SslCertificate {
    fn from(resource: SslCertificateResource) -> Self {
        let managed = resource.managed.unwrap_or_default();
        Self {
            name: resource.name,
            domains: managed.domains,
            status: managed.status.unwrap_or_default(),
            domain_status: managed.domain_status,
        }
    }
}

impl std::fmt::Debug for ComputeSslCertificates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComputeSslCertificates")
            .field("project_id", &self.project_id)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ComputeSslCertificates {
    /// Create a client for `project_id` talking to `base_url`
    ///
    /// `base_url` is the API root, e.g. `https://compute.googleapis.com`.
    #[must_use]
    pub fn new(
        http_client: Client,
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        token_source: TokenSource,
    ) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http_client,
            base_url,
            project_id: project_id.into(),
            token_source,
        }
    }

    fn collection_url(&self) -> String {
        format!(
            "{}/compute/v1/projects/{}/global/sslCertificates",
            self.base_url, self.project_id
        )
    }

    async fn request(
        &self,
        method: Method,
        url: &str,
    ) -> Result<reqwest::RequestBuilder, ProviderError> {
        let token = self.token_source.token().await?;
        Ok(self
            .http_client
            .request(method, url)
            .header("authorization", format!("Bearer {token}"))
            .header("content-type", "application/json"))
    }
}

/// Map a non-success response onto a typed error
async fn error_from_response(name: &str, response: reqwest::Response) -> ProviderError {
    let status = response.status();
    match status {
        StatusCode::NOT_FOUND => return ProviderError::NotFound(name.to_string()),
        StatusCode::CONFLICT => return ProviderError::AlreadyExists(name.to_string()),
        _ => {}
    }

    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<GcpErrorResponse>(&body) {
        Ok(parsed) => ProviderError::Api {
            code: parsed.error.code,
            status: parsed.error.status,
            message: parsed.error.message,
        },
        Err(_) => ProviderError::Api {
            code: status.as_u16(),
            status: status.canonical_reason().unwrap_or("UNKNOWN").to_string(),
            message: body,
        },
    }
}

fn result_label<T>(result: &Result<T, ProviderError>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(ProviderError::NotFound(_)) => "not_found",
        Err(ProviderError::AlreadyExists(_)) => "already_exists",
        Err(_) => "error",
    }
}

#[async_trait]
impl SslCertificateProvider for ComputeSslCertificates {
    async fn get(&self, name: &str) -> Result<SslCertificate, ProviderError> {
        let span = info_span!(
            "gcp.ssl_certificate.get",
            certificate.name = name,
            project.id = %self.project_id
        );
        async move {
            let start = Instant::now();
            let result = async {
                let url = format!("{}/{}", self.collection_url(), name);
                let response = self.request(Method::GET, &url).await?.send().await?;
                if !response.status().is_success() {
                    return Err(error_from_response(name, response).await);
                }
                let resource: SslCertificateResource = response.json().await?;
                Ok(SslCertificate::from(resource))
            }
            .await;

            debug!(result = result_label(&result), "SslCertificate lookup finished");
            metrics::record_backend_operation(
                "get",
                result_label(&result),
                start.elapsed().as_secs_f64(),
            );
            result
        }
        .instrument(span)
        .await
    }

    async fn insert(&self, name: &str, domains: &[String]) -> Result<(), ProviderError> {
        let span = info_span!(
            "gcp.ssl_certificate.insert",
            certificate.name = name,
            project.id = %self.project_id
        );
        async move {
            let start = Instant::now();
            let body = SslCertificateResource {
                name: name.to_string(),
                certificate_type: Some("MANAGED".to_string()),
                managed: Some(ManagedSection {
                    domains: domains.to_vec(),
                    ..ManagedSection::default()
                }),
            };

            let result = async {
                let response = self
                    .request(Method::POST, &self.collection_url())
                    .await?
                    .json(&body)
                    .send()
                    .await?;
                if !response.status().is_success() {
                    return Err(error_from_response(name, response).await);
                }
                info!(domains = ?domains, "Requested creation of SslCertificate");
                Ok(())
            }
            .await;

            metrics::record_backend_operation(
                "insert",
                result_label(&result),
                start.elapsed().as_secs_f64(),
            );
            result
        }
        .instrument(span)
        .await
    }
}
