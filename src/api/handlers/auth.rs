/*
 * Responsibility
 * - POST /api/register, /api/login, /api/logout
 * - GET /api/auth/config
 * - Thin: parse DTO -> SessionIssuer -> map to response (body token and/or cookie)
 */
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use axum_extra::extract::cookie::CookieJar;

use crate::api::dto::auth::{
    AuthConfigResponse, LoginQuery, LoginRequest, LoginResponse, MessageResponse,
    RegisterRequest, RegisterResponse,
};
use crate::error::AppError;
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let user = state
        .sessions
        .register(&req.username, &req.email, &req.password)
        .await?;

    Ok((
        StatusCode::OK,
        Json(RegisterResponse {
            message: "Registration successful",
            user,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let requested = req.mode.as_deref().or(query.auth_mode.as_deref());

    let out = state
        .sessions
        .login(&req.identifier, &req.password, requested)
        .await?;

    let jar = match out.cookie {
        Some(cookie) => jar.add(cookie),
        None => jar,
    };

    Ok((
        jar,
        Json(LoginResponse {
            auth_mode: out.mode,
            message: "Login successful",
            token: out.body_token,
            expires_in: out.expires_in,
            user: out.principal,
        }),
    ))
}

/// Always 200, always clears the session cookie.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    (
        jar.add(state.sessions.logout()),
        Json(MessageResponse {
            message: "Logout successful",
        }),
    )
}

pub async fn auth_config(State(state): State<AppState>) -> Json<AuthConfigResponse> {
    let modes = state.sessions.modes();
    Json(AuthConfigResponse {
        mode: modes.mode(),
        header_enabled: modes.is_header_enabled(),
        cookie_enabled: modes.is_cookie_enabled(),
        dual_mode: modes.is_dual_mode(),
    })
}
