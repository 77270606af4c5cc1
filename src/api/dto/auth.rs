/*
 * Responsibility
 * - Request/response DTOs for the session endpoints
 * - Field names are camelCase on the wire (browser clients)
 */
use serde::{Deserialize, Serialize};

use crate::repos::Principal;
use crate::services::auth::mode::AuthMode;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user: Principal,
}

/// `identifier` is a username or an email address. `username` and `email` are accepted
/// as field names too.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "username", alias = "email")]
    pub identifier: String,
    pub password: String,
    /// Transport hint: `header` (or `jwt`), `cookie`, `both`.
    #[serde(default)]
    pub mode: Option<String>,
}

/// `?authMode=` query hint; the body `mode` field wins when both are present.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(rename = "authMode")]
    pub auth_mode: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub auth_mode: AuthMode,
    pub message: &'static str,
    /// Only present when the effective mode delivers the token in the body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Seconds until the token expires.
    pub expires_in: i64,
    pub user: Principal,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfigResponse {
    pub mode: AuthMode,
    pub header_enabled: bool,
    pub cookie_enabled: bool,
    pub dual_mode: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: Principal,
    pub auth_source: &'static str,
}
