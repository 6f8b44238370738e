//! # Initialization
//!
//! Controller initialization logic including rustls setup, tracing, metrics,
//! server startup, Kubernetes client setup and backend wiring.

use crate::config::ControllerConfig;
use crate::constants::GCP_METADATA_ENDPOINT;
use crate::controller::reconciler::{
    CachedCertificateReader, ConfigMapNameStore, InMemoryNameStore, NameStore,
    RandomNameGenerator, Reconciler, StatusPatchWriter,
};
use crate::controller::server::{start_server, ServerState};
use crate::crd::ManagedCertificate;
use crate::observability;
use crate::provider::gcp::{discover_project_id, ComputeSslCertificates, TokenSource};
use crate::provider::SslCertificateProvider;
use anyhow::{bail, Context, Result};
use kube::api::Api;
use kube::Client;
use kube_runtime::reflector::Store;
use kube_runtime::{watcher, Controller};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Initialization result containing all necessary components for the controller
pub struct InitializationResult {
    pub config: ControllerConfig,
    /// Controller over ManagedCertificates in all namespaces
    pub controller: Controller<ManagedCertificate>,
    /// Reconciler context
    pub reconciler: Arc<Reconciler>,
    /// The controller's ManagedCertificate cache
    pub reader_store: Store<ManagedCertificate>,
    /// Server state for health checks
    pub server_state: Arc<ServerState>,
}

impl std::fmt::Debug for InitializationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitializationResult")
            .field("config", &self.config)
            .field("server_ready", &self.server_state.ready())
            .finish_non_exhaustive()
    }
}

/// Initialize the controller runtime
///
/// Handles:
/// - rustls crypto provider setup
/// - Tracing subscriber setup
/// - Metrics registration
/// - HTTP server startup
/// - Kubernetes client creation
/// - SslCertificate backend and name store setup
pub async fn initialize() -> Result<InitializationResult> {
    // Must happen before anything opens a TLS connection
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        bail!("Failed to install rustls crypto provider");
    }

    let config = ControllerConfig::from_env();
    observability::logging::init_tracing(&config)?;

    info!("Starting Managed Certificate Controller");
    info!(
        "Build info: datetime={}, git_hash={}",
        env!("BUILD_DATETIME"),
        env!("BUILD_GIT_HASH")
    );
    info!(?config, "Loaded configuration");

    observability::metrics::register_metrics().context("Failed to register metrics")?;

    let server_state = Arc::new(ServerState::default());
    let server_port = config.metrics_port;
    let server_state_clone = Arc::clone(&server_state);
    tokio::spawn(async move {
        if let Err(e) = start_server(server_port, server_state_clone).await {
            error!("HTTP server error: {}", e);
        }
    });

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;

    let provider = create_gcp_provider(&config).await?;
    let store = create_name_store(&config, &client).await?;

    let certificates: Api<ManagedCertificate> = Api::all(client.clone());
    let controller = Controller::new(certificates, watcher::Config::default());
    let reader_store = controller.store();

    let reconciler = Arc::new(Reconciler::new(
        store,
        provider,
        Arc::new(RandomNameGenerator),
        Arc::new(CachedCertificateReader::new(reader_store.clone())),
        Arc::new(StatusPatchWriter::new(client)),
    ));

    info!("Controller initialized, starting watch loop...");

    Ok(InitializationResult {
        config,
        controller,
        reconciler,
        reader_store,
        server_state,
    })
}

async fn create_gcp_provider(config: &ControllerConfig) -> Result<Arc<dyn SslCertificateProvider>> {
    let http_client = reqwest::Client::builder()
        .use_rustls_tls()
        .build()
        .context("Failed to create HTTP client")?;

    let project_id = if let Some(project_id) = &config.gcp_project_id {
        project_id.clone()
    } else {
        info!("GCP_PROJECT_ID not set, asking the metadata server");
        discover_project_id(&http_client, GCP_METADATA_ENDPOINT)
            .await
            .context("Failed to discover GCP project id")?
    };

    info!(
        project_id = %project_id,
        endpoint = %config.gcp_compute_endpoint,
        "Using GCP Compute SslCertificates backend"
    );

    let token_source = TokenSource::metadata(http_client.clone(), GCP_METADATA_ENDPOINT);
    Ok(Arc::new(ComputeSslCertificates::new(
        http_client,
        config.gcp_compute_endpoint.clone(),
        project_id,
        token_source,
    )))
}

async fn create_name_store(config: &ControllerConfig, client: &Client) -> Result<Arc<dyn NameStore>> {
    if !config.persist_state() {
        warn!("STATE_CONFIG_MAP_NAME is empty, SslCertificate names are kept in memory only");
        return Ok(Arc::new(InMemoryNameStore::new()));
    }

    let store = ConfigMapNameStore::load(
        client.clone(),
        &config.controller_namespace,
        &config.state_config_map_name,
    )
    .await
    .with_context(|| {
        format!(
            "Failed to load state ConfigMap {}/{}",
            config.controller_namespace, config.state_config_map_name
        )
    })?;
    Ok(Arc::new(store))
}
