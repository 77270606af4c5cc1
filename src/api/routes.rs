/*
 * Responsibility
 * - URL structure
 * - Session endpoints (register/login/logout) sit outside the authenticator;
 *   everything else is wrapped by it in app.rs
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::handlers::{
    auth::{auth_config, login, logout, register},
    health::health,
    me::me,
    pages::{dashboard, landing, login_page, register_page},
};
use crate::state::AppState;

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
}

pub fn guarded_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/me", get(me))
        .route("/api/auth/config", get(auth_config))
        .route("/", get(landing))
        .route("/login", get(login_page))
        .route("/register", get(register_page))
        .route("/dashboard", get(dashboard))
}
