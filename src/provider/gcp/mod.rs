//! # GCP Provider
//!
//! Google-managed SslCertificates through the Compute Engine REST API.

pub mod auth;
mod compute;

pub use auth::{discover_project_id, TokenSource};
pub use compute::ComputeSslCertificates;
