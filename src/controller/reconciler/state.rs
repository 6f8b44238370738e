//! # Name Mapping State
//!
//! Association from a ManagedCertificate to the name of its SslCertificate.
//! The mapping is the only link between the two; the SslCertificate carries
//! no back-reference.
//!
//! The dispatch loop never runs two reconciles for the same key at once, so
//! stores only need to be safe for concurrent access to different keys.

use crate::constants::FIELD_MANAGER;
use crate::controller::key::ResourceKey;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::{Api, ObjectMeta, Patch, PatchParams, PostParams};
use kube::Client;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("state ConfigMap {name} request failed")]
    ConfigMap {
        name: String,
        #[source]
        source: kube::Error,
    },
}

#[async_trait]
pub trait NameStore: Send + Sync {
    /// Name mapped to `key`, if any. An empty name is a reservation.
    async fn get(&self, key: &ResourceKey) -> Result<Option<String>, StoreError>;

    async fn put(&self, key: &ResourceKey, name: &str) -> Result<(), StoreError>;
}

/// Process-local store; mappings are lost on restart
#[derive(Debug, Default)]
pub struct InMemoryNameStore {
    entries: RwLock<HashMap<ResourceKey, String>>,
}

impl InMemoryNameStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NameStore for InMemoryNameStore {
    async fn get(&self, key: &ResourceKey) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &ResourceKey, name: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .insert(key.clone(), name.to_string());
        Ok(())
    }
}

/// ConfigMap data key for a resource
///
/// Namespaces are DNS labels and cannot contain `.`, so the first `.` splits
/// the key unambiguously.
fn encode_key(key: &ResourceKey) -> String {
    format!("{}.{}", key.namespace, key.name)
}

fn decode_key(raw: &str) -> Option<ResourceKey> {
    match raw.split_once('.') {
        Some((namespace, name)) if !namespace.is_empty() && !name.is_empty() => {
            Some(ResourceKey::new(namespace, name))
        }
        _ => None,
    }
}

fn decode_entries(data: BTreeMap<String, String>) -> HashMap<ResourceKey, String> {
    data.into_iter()
        .filter_map(|(raw, name)| match decode_key(&raw) {
            Some(key) => Some((key, name)),
            None => {
                warn!(key = %raw, "Ignoring malformed entry in state ConfigMap");
                None
            }
        })
        .collect()
}

/// Durable store backed by a ConfigMap
///
/// Loaded once at startup and served from memory. Every `put` is written to
/// the ConfigMap before the in-memory copy changes, so a failed write leaves
/// both unchanged.
pub struct ConfigMapNameStore {
    api: Api<ConfigMap>,
    config_map_name: String,
    entries: RwLock<HashMap<ResourceKey, String>>,
}

impl std::fmt::Debug for ConfigMapNameStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigMapNameStore")
            .field("config_map_name", &self.config_map_name)
            .finish_non_exhaustive()
    }
}

impl ConfigMapNameStore {
    /// Load the mapping, creating the ConfigMap when it does not exist
    ///
    /// # Errors
    /// Returns an error if the ConfigMap can be neither read nor created.
    pub async fn load(
        client: Client,
        namespace: &str,
        config_map_name: &str,
    ) -> Result<Self, StoreError> {
        let api: Api<ConfigMap> = Api::namespaced(client, namespace);
        let wrap = |source: kube::Error| StoreError::ConfigMap {
            name: config_map_name.to_string(),
            source,
        };

        let config_map = match api.get(config_map_name).await {
            Ok(config_map) => config_map,
            Err(kube::Error::Api(api_err)) if api_err.code == 404 => {
                info!(
                    namespace,
                    name = config_map_name,
                    "State ConfigMap not found, creating it"
                );
                let config_map = ConfigMap {
                    metadata: ObjectMeta {
                        name: Some(config_map_name.to_string()),
                        namespace: Some(namespace.to_string()),
                        ..ObjectMeta::default()
                    },
                    ..ConfigMap::default()
                };
                let params = PostParams {
                    field_manager: Some(FIELD_MANAGER.to_string()),
                    ..PostParams::default()
                };
                api.create(&params, &config_map).await.map_err(wrap)?
            }
            Err(e) => return Err(wrap(e)),
        };

        let entries = decode_entries(config_map.data.unwrap_or_default());
        info!(
            namespace,
            name = config_map_name,
            entries = entries.len(),
            "Loaded SslCertificate name mappings"
        );

        Ok(Self {
            api,
            config_map_name: config_map_name.to_string(),
            entries: RwLock::new(entries),
        })
    }
}

#[async_trait]
impl NameStore for ConfigMapNameStore {
    async fn get(&self, key: &ResourceKey) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &ResourceKey, name: &str) -> Result<(), StoreError> {
        let patch = serde_json::json!({ "data": { encode_key(key): name } });

        self.api
            .patch(
                &self.config_map_name,
                &PatchParams::apply(FIELD_MANAGER),
                &Patch::Merge(patch),
            )
            .await
            .map_err(|source| StoreError::ConfigMap {
                name: self.config_map_name.clone(),
                source,
            })?;

        self.entries
            .write()
            .await
            .insert(key.clone(), name.to_string());
        Ok(())
    }
}
