//! GCP credentials
//!
//! Access tokens and project discovery through the GKE metadata server
//! (Workload Identity). Tokens are cached and refreshed shortly before they
//! expire.
//!
//! References:
//! - [Querying metadata](https://cloud.google.com/compute/docs/metadata/querying-metadata)

use crate::provider::ProviderError;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Refresh this long before the metadata server says the token expires
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// OAuth2 access token response from the metadata server
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Access token together with the instant it should be refreshed
#[derive(Debug, Clone)]
pub struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Source of bearer tokens for the Compute API
#[derive(Debug)]
pub enum TokenSource {
    /// Fixed token, used against mock servers
    Static(String),
    /// Token fetched from the metadata server and cached
    Metadata {
        http_client: Client,
        metadata_endpoint: String,
        cache: Mutex<Option<CachedToken>>,
    },
}

impl TokenSource {
    #[must_use]
    pub fn metadata(http_client: Client, metadata_endpoint: impl Into<String>) -> Self {
        Self::Metadata {
            http_client,
            metadata_endpoint: metadata_endpoint.into(),
            cache: Mutex::new(None),
        }
    }

    /// Current access token, without the `Bearer ` prefix
    pub async fn token(&self) -> Result<String, ProviderError> {
        match self {
            Self::Static(token) => Ok(token.clone()),
            Self::Metadata {
                http_client,
                metadata_endpoint,
                cache,
            } => {
                let mut cached = cache.lock().await;
                if let Some(token) = cached.as_ref().filter(|t| Instant::now() < t.refresh_at) {
                    return Ok(token.value.clone());
                }

                let fresh = fetch_token(http_client, metadata_endpoint).await?;
                let value = fresh.value.clone();
                *cached = Some(fresh);
                Ok(value)
            }
        }
    }
}

async fn fetch_token(
    http_client: &Client,
    metadata_endpoint: &str,
) -> Result<CachedToken, ProviderError> {
    let url = format!("{metadata_endpoint}/instance/service-accounts/default/token");
    let response = http_client
        .get(&url)
        .header("Metadata-Flavor", "Google")
        .send()
        .await
        .map_err(|e| ProviderError::Auth(format!("metadata server not available: {e}")))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Auth(format!(
            "metadata server returned {status}: {body}"
        )));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| ProviderError::Auth(format!("invalid token response: {e}")))?;
    debug!(
        expires_in = token.expires_in,
        "Retrieved access token from metadata server"
    );

    let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
    Ok(CachedToken {
        value: token.access_token,
        refresh_at: Instant::now() + lifetime,
    })
}

/// Discover the project the controller runs in from the metadata server
pub async fn discover_project_id(
    http_client: &Client,
    metadata_endpoint: &str,
) -> Result<String, ProviderError> {
    let url = format!("{metadata_endpoint}/project/project-id");
    let response = http_client
        .get(&url)
        .header("Metadata-Flavor", "Google")
        .send()
        .await
        .map_err(|e| ProviderError::Auth(format!("metadata server not available: {e}")))?;

    if !response.status().is_success() {
        return Err(ProviderError::Auth(format!(
            "metadata server returned {} for project id",
            response.status()
        )));
    }

    let project_id = response.text().await?.trim().to_string();
    if project_id.is_empty() {
        return Err(ProviderError::Auth(
            "metadata server returned an empty project id".to_string(),
        ));
    }
    info!(project.id = %project_id, "Discovered GCP project from metadata server");
    Ok(project_id)
}
