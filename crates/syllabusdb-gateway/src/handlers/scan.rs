//! PDF scan endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use syllabusdb_auth::IdTokenValidator;
use syllabusdb_moderation::{Moderation, ScanResult};

use crate::auth::AdminAccess;
use crate::error::ApiError;
use crate::handlers::{parse_syllabus_id, parse_syllabus_ref};
use crate::state::GatewayState;

/// Queue a scan of a syllabus PDF. Answers `202 Accepted`.
///
/// # Errors
///
/// Returns an error if the ids are invalid or the syllabus is missing.
pub async fn request_scan<M, V>(
    State(state): State<Arc<GatewayState<M, V>>>,
    AdminAccess(session): AdminAccess,
    Path((college, course, syllabus)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, ApiError>
where
    M: Moderation + 'static,
    V: IdTokenValidator + 'static,
{
    let reference = parse_syllabus_ref(&college, &course, &syllabus)?;
    state.moderation.request_scan(&session, &reference).await?;

    Ok((StatusCode::ACCEPTED, Json(ScanResult::Pending)))
}

/// The latest scan result for a syllabus.
///
/// # Errors
///
/// Returns `ApiError::NotFound` if no scan was requested.
pub async fn scan_result<M, V>(
    State(state): State<Arc<GatewayState<M, V>>>,
    AdminAccess(session): AdminAccess,
    Path(syllabus): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    M: Moderation + 'static,
    V: IdTokenValidator + 'static,
{
    let syllabus_id = parse_syllabus_id(&syllabus)?;
    state
        .moderation
        .scan_result(&session, &syllabus_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("scan of {syllabus_id}")))
}
