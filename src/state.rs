/*
 * Responsibility
 * - Shared context bound to the Router (AppState)
 * - Cheap to Clone (Arc inside); everything here is immutable after startup
 */
use std::sync::Arc;

use crate::services::auth::{RequestAuthenticator, SessionIssuer};

#[derive(Clone, Debug)]
pub struct AppState {
    pub authenticator: Arc<RequestAuthenticator>,
    pub sessions: Arc<SessionIssuer>,
}

impl AppState {
    pub fn new(authenticator: Arc<RequestAuthenticator>, sessions: Arc<SessionIssuer>) -> Self {
        Self {
            authenticator,
            sessions,
        }
    }
}
