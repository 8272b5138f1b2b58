//! College request moderation endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use syllabusdb_auth::IdTokenValidator;
use syllabusdb_moderation::{Moderation, PresetPrompt};

use crate::auth::AdminAccess;
use crate::error::ApiError;
use crate::handlers::parse_college_id;
use crate::handlers::syllabi::DisapproveBody;
use crate::state::GatewayState;

/// Body of a college approval.
#[derive(Debug, Deserialize)]
pub struct ConfirmBody {
    /// The admin's answer to the confirmation.
    #[serde(default)]
    pub confirm: bool,
}

/// Approve a pending college request.
///
/// # Errors
///
/// Returns an error if the id is invalid, the college is missing, or the
/// write fails.
pub async fn approve_college<M, V>(
    State(state): State<Arc<GatewayState<M, V>>>,
    AdminAccess(session): AdminAccess,
    Path(college): Path<String>,
    Json(body): Json<ConfirmBody>,
) -> Result<impl IntoResponse, ApiError>
where
    M: Moderation + 'static,
    V: IdTokenValidator + 'static,
{
    let college_id = parse_college_id(&college)?;
    let prompt = PresetPrompt::new(body.confirm, None);
    let outcome = state
        .moderation
        .approve_college(&session, &college_id, &prompt)
        .await?;

    Ok(Json(outcome))
}

/// Reject a pending college request.
///
/// # Errors
///
/// Returns an error if the id is invalid, the college is missing, or the
/// delete fails.
pub async fn disapprove_college<M, V>(
    State(state): State<Arc<GatewayState<M, V>>>,
    AdminAccess(session): AdminAccess,
    Path(college): Path<String>,
    Json(body): Json<DisapproveBody>,
) -> Result<impl IntoResponse, ApiError>
where
    M: Moderation + 'static,
    V: IdTokenValidator + 'static,
{
    let college_id = parse_college_id(&college)?;
    let prompt = PresetPrompt::new(body.confirm, body.reason);
    let outcome = state
        .moderation
        .disapprove_college(&session, &college_id, &prompt)
        .await?;

    Ok(Json(outcome))
}
