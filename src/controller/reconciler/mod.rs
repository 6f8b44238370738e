//! # Reconciler
//!
//! Core reconciliation logic for `ManagedCertificate` resources.
//!
//! The reconciler:
//! - Reserves a unique SslCertificate name per ManagedCertificate
//! - Creates the SslCertificate in the backend exactly once
//! - Mirrors the backend provisioning status onto the resource status
//!
//! ## Module Structure
//!
//! - `naming`: SslCertificate name allocation
//! - `reconcile`: the reconcile pass
//! - `resource`: ManagedCertificate read/write seams
//! - `state`: name mapping stores
//! - `translate`: backend to public status vocabulary
//! - `types`: `Reconciler` and `ReconcilerError`

pub mod naming;
pub mod reconcile;
pub mod resource;
pub mod state;
pub mod translate;
pub mod types;

pub use naming::{NameAllocator, NameGenerationError, NameGenerator, RandomNameGenerator};
pub use reconcile::{build_status, reconcile};
pub use resource::{
    CachedCertificateReader, CertificateReader, CertificateWriter, StatusPatchWriter,
};
pub use state::{ConfigMapNameStore, InMemoryNameStore, NameStore, StoreError};
pub use types::{Reconciler, ReconcilerError};
