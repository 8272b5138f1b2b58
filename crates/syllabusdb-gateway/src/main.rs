//! SyllabusDB Gateway - admin moderation HTTP API
//!
//! This is the main entry point for the gateway service. The moderation
//! workflow runs in-process against a local RocksDB store and a filesystem
//! blob store.
//!
//! # Dev Mode
//!
//! Build with `--features dev-mode` to use a mock ID token validator that
//! doesn't require network access to the key endpoint.
//! Use tokens in format: `test-token:<uid>:<email>`
//!
//! # Outbound Services
//!
//! Set `NOTIFY_URL` to send user emails and `SCAN_URL` to enable PDF scans.
//! Without them the gateway logs notifications and reports scans as failed.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "dev-mode")]
use syllabusdb_auth::MockIdTokenValidator;
use syllabusdb_auth::AdminEmailPolicy;
#[cfg(not(feature = "dev-mode"))]
use syllabusdb_auth::{AuthConfig, JwksValidator};
use syllabusdb_gateway::{create_router, GatewayConfig, GatewayState};
use syllabusdb_moderation::{
    AdminGate, HttpNotifier, HttpScanner, ModerationConfig, ModerationService, NoopNotifier,
    NoopScanner, Notifier, OutboundQueue, RetryPolicy, Scanner,
};
use syllabusdb_store::{FsBlobStore, RocksStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,syllabusdb=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting SyllabusDB Gateway");

    // Load configuration from environment
    let listen_addr = std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into());
    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "/data/syllabusdb".into());
    let blob_dir = std::env::var("BLOB_DIR").unwrap_or_else(|_| "/data/syllabusdb-blobs".into());
    let admin_email = std::env::var("ADMIN_EMAIL")?;
    let auth_project_id =
        std::env::var("AUTH_PROJECT_ID").unwrap_or_else(|_| "syllabusdb".into());
    let notify_url = std::env::var("NOTIFY_URL").ok();
    let scan_url = std::env::var("SCAN_URL").ok();
    let redirect_url = std::env::var("REDIRECT_URL").unwrap_or_else(|_| "/".into());
    let site_url =
        std::env::var("SITE_URL").unwrap_or_else(|_| ModerationConfig::default().site_url);

    tracing::info!(
        listen_addr = %listen_addr,
        data_dir = %data_dir,
        blob_dir = %blob_dir,
        auth_project_id = %auth_project_id,
        notify_url = ?notify_url,
        scan_url = ?scan_url,
        redirect_url = %redirect_url,
        "Gateway configuration loaded"
    );

    // Initialize stores
    tracing::info!(path = %data_dir, "Opening RocksDB store");
    let store = Arc::new(RocksStore::open(&data_dir)?);
    let blobs = Arc::new(FsBlobStore::new(&blob_dir));

    // Outbound services
    let notifier: Arc<dyn Notifier> = if let Some(url) = notify_url {
        Arc::new(HttpNotifier::new(url))
    } else {
        tracing::warn!("No NOTIFY_URL set - notifications will only be logged");
        Arc::new(NoopNotifier)
    };
    let scanner: Arc<dyn Scanner> = if let Some(url) = scan_url {
        Arc::new(HttpScanner::new(url))
    } else {
        tracing::warn!("No SCAN_URL set - PDF scans are disabled");
        Arc::new(NoopScanner)
    };
    let (outbound, _worker) = OutboundQueue::spawn(notifier, scanner, RetryPolicy::default());

    let moderation = Arc::new(ModerationService::new(
        store,
        blobs,
        outbound,
        ModerationConfig { site_url },
    ));
    tracing::info!("Moderation service initialized");

    // Initialize ID token validator
    #[cfg(feature = "dev-mode")]
    let validator = {
        tracing::warn!("DEV MODE ENABLED - using mock ID token validator");
        tracing::warn!("Use tokens in format: test-token:<uid>:<email>");
        Arc::new(MockIdTokenValidator)
    };

    #[cfg(not(feature = "dev-mode"))]
    let validator = Arc::new(JwksValidator::new(AuthConfig::firebase(&auth_project_id)));
    tracing::info!("ID token validator initialized");

    let gate = AdminGate::new(AdminEmailPolicy::new(admin_email));

    // Build gateway state and configuration
    let gateway_config = GatewayConfig {
        listen_addr: listen_addr.clone(),
        redirect_url,
        ..GatewayConfig::default()
    };
    let state = GatewayState::new(moderation, validator, gate, gateway_config);

    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
