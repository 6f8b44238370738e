//! # Custom Resource Definitions
//!
//! CRD types for the Managed Certificate Controller.
//!
//! ## Module Structure
//!
//! - `spec.rs` - `ManagedCertificate` resource and its spec
//! - `status.rs` - Status mirrored from the backing SslCertificate

mod spec;
mod status;

pub use spec::{ManagedCertificate, ManagedCertificateSpec};
pub use status::{DomainStatus, ManagedCertificateStatus};
