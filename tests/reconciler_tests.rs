//! Reconciler scenarios against in-process fakes

mod common;

use common::{certificate, GetFailure, Harness};
use managed_certificate_controller::controller::key::ResourceKey;
use managed_certificate_controller::controller::reconciler::{
    reconcile, NameStore, ReconcilerError,
};
use managed_certificate_controller::crd::{DomainStatus, ManagedCertificateStatus};
use managed_certificate_controller::provider::ProviderError;

fn key() -> ResourceKey {
    ResourceKey::new("ns", "example")
}

fn domain(domain: &str, status: &str) -> DomainStatus {
    DomainStatus {
        domain: domain.to_string(),
        status: status.to_string(),
    }
}

#[tokio::test]
async fn test_new_resource_is_named_created_and_published() {
    let harness = Harness::new(&["cert-xyz"]);
    harness
        .reader
        .put(certificate("ns", "example", &["a.com", "b.com"]));
    harness
        .backend
        .insert_domain_status
        .lock()
        .unwrap()
        .insert("b.com".to_string(), "ACTIVE".to_string());

    reconcile(&harness.reconciler, &key()).await.unwrap();

    assert_eq!(
        harness.store.get(&key()).await.unwrap().as_deref(),
        Some("cert-xyz")
    );
    assert_eq!(
        *harness.backend.inserts.lock().unwrap(),
        vec![(
            "cert-xyz".to_string(),
            vec!["a.com".to_string(), "b.com".to_string()]
        )]
    );
    assert_eq!(
        harness.writer.last_status(),
        Some(ManagedCertificateStatus {
            certificate_status: "Provisioning".to_string(),
            certificate_name: "cert-xyz".to_string(),
            domain_status: vec![domain("a.com", "Provisioning"), domain("b.com", "Active")],
        })
    );
}

#[tokio::test]
async fn test_reservation_is_stable_across_passes() {
    let harness = Harness::new(&["cert-1", "cert-2"]);
    harness.reader.put(certificate("ns", "example", &["a.com"]));

    reconcile(&harness.reconciler, &key()).await.unwrap();
    reconcile(&harness.reconciler, &key()).await.unwrap();

    assert_eq!(
        harness.store.get(&key()).await.unwrap().as_deref(),
        Some("cert-1")
    );
    assert_eq!(*harness.generator.calls.lock().unwrap(), 1);
    assert_eq!(harness.backend.insert_count(), 1);
}

#[tokio::test]
async fn test_existing_certificate_is_not_recreated() {
    let harness = Harness::new(&[]);
    harness.reader.put(certificate("ns", "example", &["a.com"]));
    harness.store.put(&key(), "existing").await.unwrap();
    harness
        .backend
        .set_status("existing", "ACTIVE", &[("a.com", "ACTIVE")]);

    reconcile(&harness.reconciler, &key()).await.unwrap();

    assert_eq!(harness.backend.insert_count(), 0);
    assert_eq!(*harness.generator.calls.lock().unwrap(), 0);
    let status = harness.writer.last_status().unwrap();
    assert_eq!(status.certificate_status, "Active");
    assert_eq!(status.certificate_name, "existing");
}

#[tokio::test]
async fn test_empty_reservation_is_replaced() {
    let harness = Harness::new(&["cert-1"]);
    harness.reader.put(certificate("ns", "example", &["a.com"]));
    harness.store.put(&key(), "").await.unwrap();

    reconcile(&harness.reconciler, &key()).await.unwrap();

    assert_eq!(
        harness.store.get(&key()).await.unwrap().as_deref(),
        Some("cert-1")
    );
    assert_eq!(harness.backend.insert_count(), 1);
}

#[tokio::test]
async fn test_unknown_status_keeps_earlier_side_effects() {
    let harness = Harness::new(&["cert-1"]);
    harness.reader.put(certificate("ns", "example", &["a.com"]));
    *harness.backend.insert_status.lock().unwrap() = Some("BOGUS".to_string());

    let result = reconcile(&harness.reconciler, &key()).await;

    assert!(matches!(result, Err(ReconcilerError::UnknownStatus(_))));
    assert_eq!(
        harness.store.get(&key()).await.unwrap().as_deref(),
        Some("cert-1")
    );
    assert_eq!(harness.backend.insert_count(), 1);
    assert_eq!(harness.writer.write_count(), 0);

    // Once the backend reports a known value the next pass publishes it
    harness
        .backend
        .set_status("cert-1", "ACTIVE", &[("a.com", "ACTIVE")]);
    reconcile(&harness.reconciler, &key()).await.unwrap();
    assert_eq!(harness.backend.insert_count(), 1);
    assert_eq!(
        harness.writer.last_status().unwrap().certificate_status,
        "Active"
    );
}

#[tokio::test]
async fn test_missing_resource_fails_without_side_effects() {
    let harness = Harness::new(&["cert-1"]);

    let result = reconcile(&harness.reconciler, &key()).await;

    assert!(matches!(result, Err(ReconcilerError::ResourceNotFound(k)) if k == key()));
    assert_eq!(*harness.generator.calls.lock().unwrap(), 0);
    assert_eq!(harness.store.get(&key()).await.unwrap(), None);
    assert_eq!(harness.backend.insert_count(), 0);
}

#[tokio::test]
async fn test_transient_lookup_error_does_not_create() {
    let harness = Harness::new(&[]);
    harness.reader.put(certificate("ns", "example", &["a.com"]));
    harness.store.put(&key(), "cert-xyz").await.unwrap();
    harness.backend.fail_next_get(GetFailure::Unavailable);

    let result = reconcile(&harness.reconciler, &key()).await;

    assert!(matches!(
        result,
        Err(ReconcilerError::Provider(ProviderError::Api { code: 503, .. }))
    ));
    assert_eq!(harness.backend.insert_count(), 0);

    // The retry sees a real not-found and creates the certificate
    reconcile(&harness.reconciler, &key()).await.unwrap();
    assert_eq!(harness.backend.insert_count(), 1);
}

#[tokio::test]
async fn test_create_of_existing_certificate_counts_as_success() {
    let harness = Harness::new(&[]);
    harness.reader.put(certificate("ns", "example", &["a.com"]));
    harness.store.put(&key(), "cert-xyz").await.unwrap();
    harness
        .backend
        .set_status("cert-xyz", "ACTIVE", &[("a.com", "ACTIVE")]);
    // Lookup misses the certificate, so the insert runs into it
    harness.backend.fail_next_get(GetFailure::NotFound);

    reconcile(&harness.reconciler, &key()).await.unwrap();

    assert_eq!(harness.backend.insert_count(), 1);
    assert_eq!(
        harness.store.get(&key()).await.unwrap().as_deref(),
        Some("cert-xyz")
    );
    assert_eq!(
        harness.writer.last_status(),
        Some(ManagedCertificateStatus {
            certificate_status: "Active".to_string(),
            certificate_name: "cert-xyz".to_string(),
            domain_status: vec![domain("a.com", "Active")],
        })
    );
}

#[tokio::test]
async fn test_unchanged_status_is_not_rewritten() {
    let harness = Harness::new(&["cert-1"]);
    harness.reader.put(certificate("ns", "example", &["a.com"]));

    reconcile(&harness.reconciler, &key()).await.unwrap();
    reconcile(&harness.reconciler, &key()).await.unwrap();
    assert_eq!(harness.writer.write_count(), 1);

    harness
        .backend
        .set_status("cert-1", "ACTIVE", &[("a.com", "ACTIVE")]);
    reconcile(&harness.reconciler, &key()).await.unwrap();
    assert_eq!(harness.writer.write_count(), 2);
}

#[tokio::test]
async fn test_same_name_in_different_namespaces_gets_separate_certificates() {
    let harness = Harness::new(&["cert-1", "cert-2"]);
    harness.reader.put(certificate("ns", "example", &["a.com"]));
    harness.reader.put(certificate("other", "example", &["b.com"]));

    let other = ResourceKey::new("other", "example");
    reconcile(&harness.reconciler, &key()).await.unwrap();
    reconcile(&harness.reconciler, &other).await.unwrap();

    assert_eq!(
        harness.store.get(&key()).await.unwrap().as_deref(),
        Some("cert-1")
    );
    assert_eq!(
        harness.store.get(&other).await.unwrap().as_deref(),
        Some("cert-2")
    );
    assert_eq!(harness.backend.insert_count(), 2);
}
