//! # Managed Certificate Controller
//!
//! A Kubernetes controller that provisions Google-managed SSL certificates for
//! `ManagedCertificate` resources.
//!
//! For every ManagedCertificate the controller:
//!
//! 1. Reserves a unique SslCertificate name and records it in a ConfigMap
//! 2. Creates the managed SslCertificate in the GCP project once
//! 3. Mirrors the certificate and per-domain provisioning status onto the resource
//!
//! Configuration comes from environment variables, see `config::ControllerConfig`.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    managed_certificate_controller::runtime::run().await
}
