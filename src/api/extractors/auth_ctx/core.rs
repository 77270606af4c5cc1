use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

use super::AuthCtx;

/// Extractor for routes that need a principal.
///
/// The session middleware inserts `AuthCtx` into request extensions; when it is missing
/// the request is anonymous and the route answers 401.
pub struct AuthCtxExtractor(pub AuthCtx);

impl FromRequestParts<AppState> for AuthCtxExtractor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthCtx>()
            .cloned()
            .map(AuthCtxExtractor)
            .ok_or(AppError::AuthenticationRequired)
    }
}

/// `Option<AuthCtxExtractor>` for routes that also serve anonymous visitors.
impl OptionalFromRequestParts<AppState> for AuthCtxExtractor {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<AuthCtx>().cloned().map(AuthCtxExtractor))
    }
}
