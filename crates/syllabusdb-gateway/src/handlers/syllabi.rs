//! Syllabus moderation endpoints.
//!
//! The request body carries the admin's answers. They are replayed to the
//! workflow through a [`PresetPrompt`].

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use syllabusdb_auth::IdTokenValidator;
use syllabusdb_core::Uid;
use syllabusdb_moderation::{Moderation, PresetPrompt};

use crate::auth::AdminAccess;
use crate::error::ApiError;
use crate::handlers::parse_syllabus_ref;
use crate::state::GatewayState;

// =============================================================================
// Request Types
// =============================================================================

/// Body of an approval.
#[derive(Debug, Deserialize)]
pub struct ApproveSyllabusBody {
    /// The uploader to notify. Read from the record when omitted.
    #[serde(default)]
    pub owner: Option<Uid>,
    /// The admin's answer to the confirmation.
    #[serde(default)]
    pub confirm: bool,
}

/// Body of a rejection.
#[derive(Debug, Deserialize)]
pub struct DisapproveBody {
    /// Why the item is rejected.
    #[serde(default)]
    pub reason: Option<String>,
    /// The admin's answer to the confirmation.
    #[serde(default)]
    pub confirm: bool,
}

// =============================================================================
// Handlers
// =============================================================================

/// Approve a pending syllabus.
///
/// # Errors
///
/// Returns an error if the ids are invalid, the syllabus is missing, or a
/// write fails.
pub async fn approve_syllabus<M, V>(
    State(state): State<Arc<GatewayState<M, V>>>,
    AdminAccess(session): AdminAccess,
    Path((college, course, syllabus)): Path<(String, String, String)>,
    Json(body): Json<ApproveSyllabusBody>,
) -> Result<impl IntoResponse, ApiError>
where
    M: Moderation + 'static,
    V: IdTokenValidator + 'static,
{
    let reference = parse_syllabus_ref(&college, &course, &syllabus)?;
    let owner = match body.owner {
        Some(owner) => owner,
        None => state.moderation.get_syllabus(&session, &reference).await?.owner,
    };

    let prompt = PresetPrompt::new(body.confirm, None);
    let outcome = state
        .moderation
        .approve_syllabus(&session, &reference, &owner, &prompt)
        .await?;

    Ok(Json(outcome))
}

/// Reject a pending syllabus.
///
/// The record is read first so the workflow gets its file path and owner.
///
/// # Errors
///
/// Returns an error if the ids are invalid, the syllabus is missing, or a
/// write fails.
pub async fn disapprove_syllabus<M, V>(
    State(state): State<Arc<GatewayState<M, V>>>,
    AdminAccess(session): AdminAccess,
    Path((college, course, syllabus)): Path<(String, String, String)>,
    Json(body): Json<DisapproveBody>,
) -> Result<impl IntoResponse, ApiError>
where
    M: Moderation + 'static,
    V: IdTokenValidator + 'static,
{
    let reference = parse_syllabus_ref(&college, &course, &syllabus)?;
    let record = state.moderation.get_syllabus(&session, &reference).await?;

    let prompt = PresetPrompt::new(body.confirm, body.reason);
    let outcome = state
        .moderation
        .disapprove_syllabus(&session, &record, &prompt)
        .await?;

    Ok(Json(outcome))
}
