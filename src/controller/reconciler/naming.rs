//! # Name Allocation
//!
//! Picks the name of a new SslCertificate. The backend is the source of truth
//! for whether a name is taken.
//!
//! Allocation makes at most two attempts: if the first generated name already
//! exists a second one is generated and returned without another lookup.

use crate::constants::CERTIFICATE_NAME_PREFIX;
use crate::controller::reconciler::types::ReconcilerError;
use crate::observability::metrics;
use crate::provider::SslCertificateProvider;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to generate SslCertificate name: {0}")]
pub struct NameGenerationError(pub String);

/// Source of candidate SslCertificate names
pub trait NameGenerator: Send + Sync {
    /// # Errors
    /// Returns an error if no candidate name can be produced.
    fn generate(&self) -> Result<String, NameGenerationError>;
}

/// `mcert` followed by a random UUID
///
/// Always a valid GCE resource name: starts with a letter, lowercase
/// alphanumerics and dashes, at most 63 characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomNameGenerator;

impl NameGenerator for RandomNameGenerator {
    fn generate(&self) -> Result<String, NameGenerationError> {
        Ok(format!("{CERTIFICATE_NAME_PREFIX}{}", Uuid::new_v4()))
    }
}

#[derive(Clone)]
pub struct NameAllocator {
    provider: Arc<dyn SslCertificateProvider>,
    generator: Arc<dyn NameGenerator>,
}

impl std::fmt::Debug for NameAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NameAllocator").finish_non_exhaustive()
    }
}

impl NameAllocator {
    pub fn new(
        provider: Arc<dyn SslCertificateProvider>,
        generator: Arc<dyn NameGenerator>,
    ) -> Self {
        Self {
            provider,
            generator,
        }
    }

    /// Produce a name for a new SslCertificate
    ///
    /// # Errors
    /// Propagates generator failures and any backend lookup failure other
    /// than not-found.
    pub async fn allocate(&self) -> Result<String, ReconcilerError> {
        let candidate = self.generator.generate()?;

        let name = match self.provider.get(&candidate).await {
            Ok(_) => {
                metrics::increment_name_collisions();
                warn!(
                    name = %candidate,
                    "Generated SslCertificate name already exists, generating another one"
                );
                // Second candidate is not checked
                self.generator.generate()?
            }
            Err(e) if e.is_not_found() => candidate,
            Err(e) => return Err(e.into()),
        };

        debug!(name = %name, "Allocated SslCertificate name");
        metrics::increment_names_allocated();
        Ok(name)
    }
}
