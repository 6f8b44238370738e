//! # Resource Access
//!
//! Read and write seams for `ManagedCertificate` resources.
//!
//! Reads are served from the reflector cache and may be stale. Writes only
//! touch the status subresource.

use crate::constants::FIELD_MANAGER;
use crate::controller::key::ResourceKey;
use crate::crd::{ManagedCertificate, ManagedCertificateStatus};
use async_trait::async_trait;
use kube::api::{Api, Patch, PatchParams};
use kube::Client;
use kube_runtime::reflector::{ObjectRef, Store};
use std::sync::Arc;
use tracing::debug;

#[async_trait]
pub trait CertificateReader: Send + Sync {
    /// Look up a ManagedCertificate; `None` when it does not exist
    async fn get(&self, key: &ResourceKey) -> Result<Option<Arc<ManagedCertificate>>, kube::Error>;
}

#[async_trait]
pub trait CertificateWriter: Send + Sync {
    /// Persist the status of a ManagedCertificate
    async fn update_status(
        &self,
        key: &ResourceKey,
        status: &ManagedCertificateStatus,
    ) -> Result<(), kube::Error>;
}

/// Reader backed by the watch loop's reflector store
#[derive(Clone)]
pub struct CachedCertificateReader {
    store: Store<ManagedCertificate>,
}

impl std::fmt::Debug for CachedCertificateReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedCertificateReader")
            .field("cached", &self.store.state().len())
            .finish()
    }
}

impl CachedCertificateReader {
    #[must_use]
    pub fn new(store: Store<ManagedCertificate>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CertificateReader for CachedCertificateReader {
    async fn get(&self, key: &ResourceKey) -> Result<Option<Arc<ManagedCertificate>>, kube::Error> {
        let object_ref = ObjectRef::new(&key.name).within(&key.namespace);
        Ok(self.store.get(&object_ref))
    }
}

/// Writer that merge-patches the status subresource
#[derive(Clone)]
pub struct StatusPatchWriter {
    client: Client,
}

impl std::fmt::Debug for StatusPatchWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusPatchWriter").finish_non_exhaustive()
    }
}

impl StatusPatchWriter {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CertificateWriter for StatusPatchWriter {
    async fn update_status(
        &self,
        key: &ResourceKey,
        status: &ManagedCertificateStatus,
    ) -> Result<(), kube::Error> {
        let api: Api<ManagedCertificate> = Api::namespaced(self.client.clone(), &key.namespace);
        let patch = serde_json::json!({ "status": status });

        api.patch_status(
            &key.name,
            &PatchParams::apply(FIELD_MANAGER),
            &Patch::Merge(patch),
        )
        .await?;

        debug!(resource = %key, "Patched ManagedCertificate status");
        Ok(())
    }
}
