//! # Types
//!
//! Core types for the reconciler.

use crate::controller::key::{InvalidKey, ResourceKey};
use crate::controller::reconciler::naming::{NameAllocator, NameGenerationError, NameGenerator};
use crate::controller::reconciler::resource::{CertificateReader, CertificateWriter};
use crate::controller::reconciler::state::{NameStore, StoreError};
use crate::controller::reconciler::translate::TranslateError;
use crate::provider::{ProviderError, SslCertificateProvider};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcilerError {
    #[error("ManagedCertificate {0} not found")]
    ResourceNotFound(ResourceKey),

    #[error(transparent)]
    InvalidKey(#[from] InvalidKey),

    #[error(transparent)]
    NameGeneration(#[from] NameGenerationError),

    /// Steps after the reservation found no mapping entry
    #[error("no SslCertificate name reserved for {0}")]
    MissingReservation(ResourceKey),

    #[error("SslCertificate backend request failed")]
    Provider(#[from] ProviderError),

    #[error("SslCertificate reported a status outside the known vocabulary")]
    UnknownStatus(#[from] TranslateError),

    #[error("name store request failed")]
    Store(#[from] StoreError),

    #[error("Kubernetes API request failed")]
    Kube(#[from] kube::Error),
}

/// Everything one reconcile pass needs
///
/// Collaborators are injected so tests can substitute in-process fakes.
#[derive(Clone)]
pub struct Reconciler {
    pub store: Arc<dyn NameStore>,
    pub provider: Arc<dyn SslCertificateProvider>,
    pub allocator: NameAllocator,
    pub reader: Arc<dyn CertificateReader>,
    pub writer: Arc<dyn CertificateWriter>,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("allocator", &self.allocator)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn NameStore>,
        provider: Arc<dyn SslCertificateProvider>,
        generator: Arc<dyn NameGenerator>,
        reader: Arc<dyn CertificateReader>,
        writer: Arc<dyn CertificateWriter>,
    ) -> Self {
        let allocator = NameAllocator::new(Arc::clone(&provider), generator);
        Self {
            store,
            provider,
            allocator,
            reader,
            writer,
        }
    }
}
