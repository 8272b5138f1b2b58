//! Admin authentication extractor.
//!
//! [`AdminAccess`] validates the `Authorization: Bearer <token>` header and
//! passes the identity through the admin gate. Callers without a valid token
//! or without admin rights are redirected before any handler runs.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use syllabusdb_auth::{AuthError, IdTokenValidator, Identity};
use syllabusdb_moderation::{AdminSession, Moderation};

use crate::error::ApiError;
use crate::state::GatewayState;

/// An admin session opened for this request.
#[derive(Debug, Clone)]
pub struct AdminAccess(pub AdminSession);

impl<M, V> FromRequestParts<Arc<GatewayState<M, V>>> for AdminAccess
where
    M: Moderation + 'static,
    V: IdTokenValidator + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<GatewayState<M, V>>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        let identity = match token {
            Some(token) => identify(state.validator.as_ref(), token).await?,
            None => None,
        };

        state
            .gate
            .admit(identity)
            .map(AdminAccess)
            .map_err(|_| ApiError::Redirect(state.config.redirect_url.clone()))
    }
}

/// Validate a token. Bad tokens mean "no identity"; a broken key service
/// is an error.
async fn identify<V: IdTokenValidator + ?Sized>(
    validator: &V,
    token: &str,
) -> Result<Option<Identity>, ApiError> {
    match validator.validate(token).await {
        Ok(identity) => Ok(Some(identity)),
        Err(e @ (AuthError::JwksFetchFailed(_) | AuthError::Internal(_))) => Err(e.into()),
        Err(e) => {
            tracing::debug!(error = %e, "Rejected ID token");
            Ok(None)
        }
    }
}
