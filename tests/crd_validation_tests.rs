//! # CRD Validation Tests
//!
//! Sample ManagedCertificate resources must deserialize into the CRD types and
//! the generated CRD must keep its identity and status subresource.

use kube::core::CustomResourceExt;
use managed_certificate_controller::crd::{ManagedCertificate, ManagedCertificateStatus};

#[test]
fn test_deserialize_resource_without_status() {
    let yaml = r#"
apiVersion: networking.gke.io/v1
kind: ManagedCertificate
metadata:
  name: example
  namespace: ns
spec:
  domains:
    - a.com
    - b.com
"#;

    let certificate: ManagedCertificate =
        serde_yaml::from_str(yaml).expect("Failed to deserialize ManagedCertificate");
    assert_eq!(certificate.metadata.name.as_deref(), Some("example"));
    assert_eq!(certificate.spec.domains, vec!["a.com", "b.com"]);
    assert!(certificate.status.is_none());
}

#[test]
fn test_deserialize_resource_with_status() {
    let yaml = r#"
apiVersion: networking.gke.io/v1
kind: ManagedCertificate
metadata:
  name: example
  namespace: ns
spec:
  domains:
    - a.com
status:
  certificateStatus: Active
  certificateName: mcert-1234
  domainStatus:
    - domain: a.com
      status: Active
"#;

    let certificate: ManagedCertificate =
        serde_yaml::from_str(yaml).expect("Failed to deserialize ManagedCertificate");
    let status = certificate.status.expect("status should be present");
    assert_eq!(status.certificate_status, "Active");
    assert_eq!(status.certificate_name, "mcert-1234");
    assert_eq!(status.domain_status.len(), 1);
    assert_eq!(status.domain_status[0].domain, "a.com");
}

#[test]
fn test_partial_status_defaults_missing_fields() {
    let status: ManagedCertificateStatus =
        serde_json::from_value(serde_json::json!({ "certificateName": "mcert-1" })).unwrap();
    assert_eq!(status.certificate_name, "mcert-1");
    assert_eq!(status.certificate_status, "");
    assert!(status.domain_status.is_empty());
}

#[test]
fn test_status_serializes_camel_case() {
    let status = ManagedCertificateStatus {
        certificate_status: "Provisioning".to_string(),
        certificate_name: "mcert-1".to_string(),
        domain_status: Vec::new(),
    };
    let value = serde_json::to_value(&status).unwrap();
    assert_eq!(value["certificateStatus"], "Provisioning");
    assert_eq!(value["certificateName"], "mcert-1");
    assert!(value["domainStatus"].as_array().unwrap().is_empty());
}

#[test]
fn test_generated_crd_identity() {
    let crd = ManagedCertificate::crd();
    assert_eq!(
        crd.metadata.name.as_deref(),
        Some("managedcertificates.networking.gke.io")
    );
    assert_eq!(crd.spec.group, "networking.gke.io");
    assert_eq!(crd.spec.scope, "Namespaced");
    assert_eq!(crd.spec.names.kind, "ManagedCertificate");
    assert_eq!(
        crd.spec.names.short_names.as_deref(),
        Some(&["mcrt".to_string()][..])
    );

    let version = &crd.spec.versions[0];
    assert_eq!(version.name, "v1");
    assert!(version
        .subresources
        .as_ref()
        .and_then(|s| s.status.as_ref())
        .is_some());
    let columns: Vec<_> = version
        .additional_printer_columns
        .as_ref()
        .unwrap()
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(columns, vec!["Status", "Certificate"]);
}
