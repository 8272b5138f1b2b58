//! Pending queue endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use syllabusdb_auth::IdTokenValidator;
use syllabusdb_moderation::{College, CollegeGroup, Moderation, PendingSyllabus};

use crate::auth::AdminAccess;
use crate::error::ApiError;
use crate::state::GatewayState;

/// Response for the pending queue.
#[derive(Debug, Serialize)]
pub struct PendingResponse {
    /// Pending syllabi, newest first.
    pub syllabi: Vec<PendingSyllabus>,
    /// The same syllabi grouped by college, then uploader.
    pub groups: Vec<CollegeGroup>,
    /// Pending college requests.
    pub colleges: Vec<College>,
}

/// List everything awaiting moderation.
///
/// # Errors
///
/// Returns an error if the store query fails.
pub async fn list_pending<M, V>(
    State(state): State<Arc<GatewayState<M, V>>>,
    AdminAccess(session): AdminAccess,
) -> Result<impl IntoResponse, ApiError>
where
    M: Moderation + 'static,
    V: IdTokenValidator + 'static,
{
    let items = state.moderation.load_pending(&session).await?;
    let groups = items.groups();

    Ok(Json(PendingResponse {
        syllabi: items.syllabi,
        groups,
        colleges: items.colleges,
    }))
}
