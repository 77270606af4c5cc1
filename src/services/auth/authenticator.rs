//! Per-request authentication.
//!
//! NoCredential -> CandidateExtracted -> Validated(Principal)
//!                                    -> Rejected
//!
//! This type holds no per-request state. The HTTP wiring (binding the principal to the
//! request, short-circuiting, appending the clearing cookie) lives in
//! `middleware::auth::session`.

use std::sync::Arc;

use axum::http::{HeaderMap, header};
use axum_extra::extract::cookie::Cookie;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::repos::{IdentityStore, Principal, RepoError};
use crate::services::auth::cookie::CookiePolicy;
use crate::services::auth::mode::ModePolicy;
use crate::services::auth::route_class::{RouteClass, RouteClassPolicy};
use crate::services::auth::token_codec::{TokenCodec, TokenError};

/// Transport a candidate token was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    Header,
    Cookie,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub token: String,
    pub source: AuthSource,
}

#[derive(Debug, Error)]
pub enum RejectReason {
    #[error(transparent)]
    Token(#[from] TokenError),
    /// Token verified but its subject no longer exists.
    #[error("unknown subject")]
    UnknownSubject,
}

#[derive(Debug)]
pub enum AuthOutcome {
    /// No candidate on any enabled transport.
    Anonymous,
    Authenticated {
        principal: Principal,
        source: AuthSource,
    },
    Rejected {
        source: AuthSource,
        reason: RejectReason,
    },
}

/// What the HTTP layer does with a rejected candidate.
#[derive(Debug)]
pub struct FailureAction {
    pub route: RouteClass,
    /// Present when the bad token came from the session cookie.
    pub clearing_cookie: Option<Cookie<'static>>,
}

impl FailureAction {
    pub fn short_circuits(&self) -> bool {
        self.route == RouteClass::Api
    }
}

#[derive(Clone)]
pub struct RequestAuthenticator {
    modes: ModePolicy,
    cookies: CookiePolicy,
    routes: RouteClassPolicy,
    tokens: Arc<TokenCodec>,
    store: Arc<dyn IdentityStore>,
}

impl std::fmt::Debug for RequestAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestAuthenticator")
            .field("modes", &self.modes)
            .field("cookies", &self.cookies)
            .field("routes", &self.routes)
            .finish_non_exhaustive()
    }
}

impl RequestAuthenticator {
    pub fn new(
        modes: ModePolicy,
        cookies: CookiePolicy,
        routes: RouteClassPolicy,
        tokens: Arc<TokenCodec>,
        store: Arc<dyn IdentityStore>,
    ) -> Self {
        Self {
            modes,
            cookies,
            routes,
            tokens,
            store,
        }
    }

    /// Header first, then cookie. A disabled transport is never read.
    pub fn extract_candidate(&self, headers: &HeaderMap) -> Option<Candidate> {
        if self.modes.is_header_enabled()
            && let Some(token) = bearer_token(headers)
        {
            return Some(Candidate {
                token,
                source: AuthSource::Header,
            });
        }

        if self.modes.is_cookie_enabled()
            && let Some(token) = self.cookies.read_token(headers)
        {
            return Some(Candidate {
                token,
                source: AuthSource::Cookie,
            });
        }

        None
    }

    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<AuthOutcome, RepoError> {
        self.authenticate_at(headers, Utc::now()).await
    }

    /// `Err` only for an identity-store failure; credential problems are `Rejected`.
    pub async fn authenticate_at(
        &self,
        headers: &HeaderMap,
        now: DateTime<Utc>,
    ) -> Result<AuthOutcome, RepoError> {
        let Some(candidate) = self.extract_candidate(headers) else {
            return Ok(AuthOutcome::Anonymous);
        };
        let source = candidate.source;

        let verified = match self.tokens.validate_at(&candidate.token, now) {
            Ok(v) => v,
            Err(e) => {
                return Ok(AuthOutcome::Rejected {
                    source,
                    reason: e.into(),
                });
            }
        };

        let key = verified.subject.subject_id.to_string();
        match self.store.find_by_subject_or_username(&key).await? {
            Some(principal) => Ok(AuthOutcome::Authenticated { principal, source }),
            None => Ok(AuthOutcome::Rejected {
                source,
                reason: RejectReason::UnknownSubject,
            }),
        }
    }

    pub fn failure_action(&self, source: AuthSource, path: &str) -> FailureAction {
        FailureAction {
            route: self.routes.classify(path),
            clearing_cookie: match source {
                AuthSource::Cookie => Some(self.cookies.build_clearing()),
                AuthSource::Header => None,
            },
        }
    }
}

/// `Authorization: Bearer <token>`; scheme is case-insensitive, blank token is absent.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}
