//! Common test utilities
//!
//! rustls setup for tests that open HTTP connections, plus in-process fakes
//! for every collaborator of the reconciler.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use async_trait::async_trait;
use managed_certificate_controller::controller::key::ResourceKey;
use managed_certificate_controller::controller::reconciler::{
    CertificateReader, CertificateWriter, InMemoryNameStore, NameGenerationError, NameGenerator,
    Reconciler,
};
use managed_certificate_controller::crd::{
    ManagedCertificate, ManagedCertificateSpec, ManagedCertificateStatus,
};
use managed_certificate_controller::provider::{
    ProviderError, SslCertificate, SslCertificateProvider,
};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex, Once};

static RUSTLS_INIT: Once = Once::new();

/// Initialize rustls crypto provider for tests
///
/// Uses a `Once` so it runs a single time per test binary.
pub fn init_rustls() {
    RUSTLS_INIT.call_once(|| {
        // Another component (e.g. the Pact mock server) may already have
        // installed a process-wide provider; that is fine.
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

pub fn certificate(namespace: &str, name: &str, domains: &[&str]) -> ManagedCertificate {
    let mut certificate = ManagedCertificate::new(
        name,
        ManagedCertificateSpec {
            domains: domains.iter().map(|d| (*d).to_string()).collect(),
        },
    );
    certificate.metadata.namespace = Some(namespace.to_string());
    certificate
}

/// Scripted outcome for the next backend `get` of a name
#[derive(Debug, Clone)]
pub enum GetFailure {
    Unavailable,
    /// Reports NotFound even when the certificate exists, as a lagging read would
    NotFound,
}

/// In-memory SslCertificate backend
///
/// Inserted certificates report `PROVISIONING` for the certificate and each
/// domain unless `insert_status` / `insert_domain_status` say otherwise.
#[derive(Default)]
pub struct FakeBackend {
    pub certificates: Mutex<HashMap<String, SslCertificate>>,
    pub inserts: Mutex<Vec<(String, Vec<String>)>>,
    pub gets: Mutex<Vec<String>>,
    /// Failures returned by upcoming `get` calls, in order
    pub get_failures: Mutex<VecDeque<GetFailure>>,
    pub insert_status: Mutex<Option<String>>,
    pub insert_domain_status: Mutex<BTreeMap<String, String>>,
}

impl FakeBackend {
    pub fn set_status(&self, name: &str, status: &str, domain_status: &[(&str, &str)]) {
        let mut certificates = self.certificates.lock().unwrap();
        let certificate = certificates
            .entry(name.to_string())
            .or_insert_with(|| SslCertificate {
                name: name.to_string(),
                ..SslCertificate::default()
            });
        certificate.status = status.to_string();
        certificate.domain_status = domain_status
            .iter()
            .map(|(d, s)| ((*d).to_string(), (*s).to_string()))
            .collect::<BTreeMap<_, _>>();
    }

    pub fn fail_next_get(&self, failure: GetFailure) {
        self.get_failures.lock().unwrap().push_back(failure);
    }

    pub fn insert_count(&self) -> usize {
        self.inserts.lock().unwrap().len()
    }
}

#[async_trait]
impl SslCertificateProvider for FakeBackend {
    async fn get(&self, name: &str) -> Result<SslCertificate, ProviderError> {
        self.gets.lock().unwrap().push(name.to_string());
        match self.get_failures.lock().unwrap().pop_front() {
            Some(GetFailure::Unavailable) => {
                return Err(ProviderError::Api {
                    code: 503,
                    status: "UNAVAILABLE".to_string(),
                    message: "backend unavailable".to_string(),
                });
            }
            Some(GetFailure::NotFound) => return Err(ProviderError::NotFound(name.to_string())),
            None => {}
        }
        self.certificates
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(name.to_string()))
    }

    async fn insert(&self, name: &str, domains: &[String]) -> Result<(), ProviderError> {
        self.inserts
            .lock()
            .unwrap()
            .push((name.to_string(), domains.to_vec()));

        let mut certificates = self.certificates.lock().unwrap();
        if certificates.contains_key(name) {
            return Err(ProviderError::AlreadyExists(name.to_string()));
        }
        let overrides = self.insert_domain_status.lock().unwrap();
        certificates.insert(
            name.to_string(),
            SslCertificate {
                name: name.to_string(),
                domains: domains.to_vec(),
                status: self
                    .insert_status
                    .lock()
                    .unwrap()
                    .clone()
                    .unwrap_or_else(|| "PROVISIONING".to_string()),
                domain_status: domains
                    .iter()
                    .map(|d| {
                        let status = overrides
                            .get(d)
                            .cloned()
                            .unwrap_or_else(|| "PROVISIONING".to_string());
                        (d.clone(), status)
                    })
                    .collect(),
            },
        );
        Ok(())
    }
}

/// Hands out a fixed list of names, then `name-N`
#[derive(Default)]
pub struct SequenceNameGenerator {
    pub names: Mutex<VecDeque<String>>,
    pub calls: Mutex<usize>,
}

impl SequenceNameGenerator {
    pub fn new(names: &[&str]) -> Self {
        Self {
            names: Mutex::new(names.iter().map(|n| (*n).to_string()).collect()),
            calls: Mutex::new(0),
        }
    }
}

impl NameGenerator for SequenceNameGenerator {
    fn generate(&self) -> Result<String, NameGenerationError> {
        let mut calls = self.calls.lock().unwrap();
        *calls += 1;
        Ok(self
            .names
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| format!("name-{}", *calls)))
    }
}

/// Resource cache backed by a map
#[derive(Default)]
pub struct FakeReader {
    pub certificates: Mutex<HashMap<ResourceKey, Arc<ManagedCertificate>>>,
}

impl FakeReader {
    pub fn put(&self, certificate: ManagedCertificate) {
        let key = ResourceKey::try_from(&certificate).unwrap();
        self.certificates
            .lock()
            .unwrap()
            .insert(key, Arc::new(certificate));
    }
}

#[async_trait]
impl CertificateReader for FakeReader {
    async fn get(
        &self,
        key: &ResourceKey,
    ) -> Result<Option<Arc<ManagedCertificate>>, kube::Error> {
        Ok(self.certificates.lock().unwrap().get(key).cloned())
    }
}

/// Status writer recording every write
///
/// When a reader is attached, writes are also applied to the cached copy so
/// the next pass observes them.
#[derive(Default)]
pub struct FakeWriter {
    pub writes: Mutex<Vec<(ResourceKey, ManagedCertificateStatus)>>,
    pub reader: Option<Arc<FakeReader>>,
}

impl FakeWriter {
    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    pub fn last_status(&self) -> Option<ManagedCertificateStatus> {
        self.writes.lock().unwrap().last().map(|(_, s)| s.clone())
    }
}

#[async_trait]
impl CertificateWriter for FakeWriter {
    async fn update_status(
        &self,
        key: &ResourceKey,
        status: &ManagedCertificateStatus,
    ) -> Result<(), kube::Error> {
        self.writes
            .lock()
            .unwrap()
            .push((key.clone(), status.clone()));

        if let Some(reader) = &self.reader {
            let mut certificates = reader.certificates.lock().unwrap();
            if let Some(current) = certificates.get(key) {
                let mut updated = (**current).clone();
                updated.status = Some(status.clone());
                certificates.insert(key.clone(), Arc::new(updated));
            }
        }
        Ok(())
    }
}

/// A reconciler wired to fakes, with handles on each of them
pub struct Harness {
    pub reconciler: Reconciler,
    pub store: Arc<InMemoryNameStore>,
    pub backend: Arc<FakeBackend>,
    pub generator: Arc<SequenceNameGenerator>,
    pub reader: Arc<FakeReader>,
    pub writer: Arc<FakeWriter>,
}

impl Harness {
    pub fn new(names: &[&str]) -> Self {
        let store = Arc::new(InMemoryNameStore::new());
        let backend = Arc::new(FakeBackend::default());
        let generator = Arc::new(SequenceNameGenerator::new(names));
        let reader = Arc::new(FakeReader::default());
        let writer = Arc::new(FakeWriter {
            writes: Mutex::new(Vec::new()),
            reader: Some(Arc::clone(&reader)),
        });

        let reconciler = Reconciler::new(
            Arc::clone(&store) as _,
            Arc::clone(&backend) as _,
            Arc::clone(&generator) as _,
            Arc::clone(&reader) as _,
            Arc::clone(&writer) as _,
        );

        Self {
            reconciler,
            store,
            backend,
            generator,
            reader,
            writer,
        }
    }
}
