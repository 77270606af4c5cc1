//! Session authentication: read the candidate token (bearer header / session cookie),
//! validate it, and put `AuthCtx` into request extensions.
//!
//! On a rejected token:
//! - the session cookie is cleared when the token came from it
//! - API routes answer 401 immediately
//! - page routes continue anonymously (the page decides whether to redirect to login)

use axum::{
    Router,
    body::Body,
    extract::{OriginalUri, State},
    http::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::api::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::AuthOutcome;
use crate::services::auth::cookie::CookiePolicy;
use crate::state::AppState;

/// Put the session authenticator in front of every route of `router`.
///
/// ```ignore
/// let guarded = api::routes::guarded();
/// let guarded = middleware::auth::session::apply(guarded, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, session_middleware))
}

async fn session_middleware(
    State(state): State<AppState>,
    OriginalUri(original_uri): OriginalUri,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let authenticator = &state.authenticator;

    // Store failure -> 500; the cookie is left alone since the token may still be good.
    let outcome = authenticator.authenticate(req.headers()).await?;

    match outcome {
        AuthOutcome::Anonymous => Ok(next.run(req).await),
        AuthOutcome::Authenticated { principal, source } => {
            // middleware -> extractor
            req.extensions_mut().insert(AuthCtx::new(principal, source));
            Ok(next.run(req).await)
        }
        AuthOutcome::Rejected { source, reason } => {
            let action = authenticator.failure_action(source, original_uri.path());

            warn!(
                reason = %reason,
                source = ?source,
                route = ?action.route,
                path = original_uri.path(),
                "session token rejected"
            );

            let mut response = if action.short_circuits() {
                AppError::AuthenticationRequired.into_response()
            } else {
                next.run(req).await
            };

            if let Some(cookie) = &action.clearing_cookie {
                CookiePolicy::append_to(response.headers_mut(), cookie);
            }

            Ok(response)
        }
    }
}
