//! HTTP gateway for the SyllabusDB admin moderation API.
//!
//! This crate exposes the moderation workflow over HTTP. It handles:
//!
//! - ID token validation from the `Authorization` header
//! - The admin gate, redirecting everyone else
//! - REST endpoints for the pending queue and each admin action
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Admin page / sdb-admin CLI                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ HTTP
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    syllabusdb-gateway                       │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────┐    │
//! │  │ AdminAccess │ │   Router    │ │   ApiError          │    │
//! │  │  Extractor  │ │  + Handlers │ │   (303 / JSON)      │    │
//! │  └─────────────┘ └─────────────┘ └─────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!               ┌──────────────┴──────────────┐
//!               ▼                             ▼
//!        ┌──────────────┐              ┌──────────────┐
//!        │  Moderation  │              │  Auth (JWKS) │
//!        └──────────────┘              └──────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use syllabusdb_auth::{AdminEmailPolicy, AuthConfig, JwksValidator};
//! use syllabusdb_gateway::{create_router, GatewayConfig, GatewayState};
//! use syllabusdb_moderation::{
//!     AdminGate, ModerationConfig, ModerationService, NoopNotifier, NoopScanner, OutboundQueue,
//!     RetryPolicy,
//! };
//! use syllabusdb_store::{FsBlobStore, RocksStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(RocksStore::open("/tmp/syllabusdb")?);
//! let blobs = Arc::new(FsBlobStore::new("/tmp/syllabusdb-blobs"));
//! let (outbound, _worker) = OutboundQueue::spawn(
//!     Arc::new(NoopNotifier),
//!     Arc::new(NoopScanner),
//!     RetryPolicy::default(),
//! );
//! let moderation = Arc::new(ModerationService::new(
//!     store,
//!     blobs,
//!     outbound,
//!     ModerationConfig::default(),
//! ));
//! let validator = Arc::new(JwksValidator::new(AuthConfig::firebase("syllabusdb")));
//! let gate = AdminGate::new(AdminEmailPolicy::new("admin@syllabusdb.com"));
//!
//! let state = GatewayState::new(moderation, validator, gate, GatewayConfig::default());
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use auth::AdminAccess;
pub use config::GatewayConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::GatewayState;
