//! Admin moderation workflow for SyllabusDB.
//!
//! This crate holds the business logic behind the admin page: loading the
//! pending queue, approving and rejecting syllabi and college requests, and
//! telling the affected users what happened.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              Gateway (HTTP) / ModerationDesk                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ AdminSession
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ModerationService                        │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────┐    │
//! │  │  Pending    │ │  Syllabus / │ │    Saga runner      │    │
//! │  │  loader     │ │  College    │ │    (compensation)   │    │
//! │  └─────────────┘ └─────────────┘ └─────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!               ┌──────────────┼──────────────────┐
//!               ▼              ▼                  ▼
//!        ┌──────────┐   ┌──────────┐   ┌────────────────────┐
//!        │ Document │   │  Blob    │   │  OutboundQueue     │
//!        │  Store   │   │  Store   │   │  (notify, scan)    │
//!        └──────────┘   └──────────┘   └────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use syllabusdb_auth::{AdminEmailPolicy, Identity};
//! use syllabusdb_moderation::{
//!     AdminGate, HttpNotifier, ModerationConfig, ModerationDesk, ModerationService,
//!     NoopScanner, OutboundQueue, PresetPrompt, RetryPolicy,
//! };
//! use syllabusdb_store::{FsBlobStore, RocksStore};
//!
//! # async fn example(identity: Identity) -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(RocksStore::open("/tmp/syllabusdb")?);
//! let blobs = Arc::new(FsBlobStore::new("/tmp/syllabusdb-blobs"));
//! let (outbound, _worker) = OutboundQueue::spawn(
//!     Arc::new(HttpNotifier::new("http://mailer:8080")),
//!     Arc::new(NoopScanner),
//!     RetryPolicy::default(),
//! );
//! let service = Arc::new(ModerationService::new(
//!     store,
//!     blobs,
//!     outbound,
//!     ModerationConfig::default(),
//! ));
//!
//! let gate = AdminGate::new(AdminEmailPolicy::new("admin@syllabusdb.com"));
//! let session = gate.admit(Some(identity))?;
//!
//! let mut desk = ModerationDesk::open(service, session).await?;
//! if let Some(first) = desk.items().syllabi.first() {
//!     let reference = first.syllabus.reference();
//!     desk.approve_syllabus(&reference, &PresetPrompt::confirming()).await?;
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod desk;
pub mod error;
pub mod gate;
pub mod loader;
pub mod messages;
pub mod notifier;
pub mod outbound;
pub mod prompt;
pub mod saga;
pub mod scanner;
pub mod service;
pub mod types;

pub use desk::ModerationDesk;
pub use error::{ControlError, Result};
pub use gate::{AdminGate, AdminSession};
pub use messages::Notification;
pub use notifier::{HttpNotifier, NoopNotifier, Notifier};
pub use outbound::{OutboundQueue, OutboundTask, RetryPolicy};
pub use prompt::{PresetPrompt, Prompt};
pub use saga::{Saga, Step};
pub use scanner::{HttpScanner, NoopScanner, ScanCache, ScanResult, ScanVerdict, Scanner};
pub use service::{Moderation, ModerationService};
pub use types::{
    AbortReason, CollegeGroup, ModerationConfig, Outcome, OwnerGroup, PendingItems,
    PendingSyllabus,
};

// Re-export commonly used types from dependencies for convenience
pub use syllabusdb_core::{CollegeId, CourseId, CourseRef, SyllabusId, SyllabusRef, Uid};
pub use syllabusdb_store::{College, Course, Syllabus};
