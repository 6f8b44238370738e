//! # CRD Generator
//!
//! Prints the `ManagedCertificate` CustomResourceDefinition as YAML.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin crdgen > config/crd/managedcertificate.yaml
//! cargo run --bin crdgen | kubectl apply -f -
//! ```

use kube::core::CustomResourceExt;
use managed_certificate_controller::crd::ManagedCertificate;

fn main() -> anyhow::Result<()> {
    let crd = serde_yaml::to_string(&ManagedCertificate::crd())?;
    print!("{crd}");
    Ok(())
}
