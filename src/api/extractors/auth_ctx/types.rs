/*
 * Responsibility
 * - The "authenticated context" type that handlers see
 * - The session middleware validates and stores it in request extensions;
 *   handlers only receive this type
 *
 * Notes
 * - Token validation and transport selection belong to middleware/services
 */
use crate::repos::Principal;
use crate::services::auth::AuthSource;

/// Attached to a request after its token validated and the subject resolved.
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub principal: Principal,
    /// Transport the token arrived on (log correlation only).
    pub source: AuthSource,
}

impl AuthCtx {
    pub fn new(principal: Principal, source: AuthSource) -> Self {
        Self { principal, source }
    }
}
