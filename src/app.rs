/*
 * Responsibility
 * - Config loading -> dependency wiring -> Router assembly
 * - Middleware order: session authenticator on the guarded routes, HTTP layers outermost
 * - Start with axum::serve()
 */
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::{Config, ConfigError};
use crate::middleware;
use crate::repos::{IdentityStore, InMemoryUserRepo, PgUserRepo};
use crate::services::auth::build_auth_services;
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG wins when set, e.g. RUST_LOG=info,finapp_auth=debug,tower_http=debug
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Surface panics through tracing; stderr may not be visible where the process runs.
        tracing::error!(?info, "panic");

        // Development: crash so it gets noticed. Production: default hook, keep serving.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        env = ?config.app_env,
        addr = %config.addr,
        auth_mode = config.auth_mode.as_str(),
        "starting finapp auth service"
    );

    if config.app_env.is_production() && !config.cookie.secure {
        tracing::warn!("AUTH_COOKIE_SECURE is off in production; session cookies travel over plain HTTP");
    }

    let store = build_store(&config).await?;
    let state = build_state(&config, store);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_store(config: &Config) -> Result<Arc<dyn IdentityStore>> {
    match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;
            // migrations/ is embedded at compile time
            sqlx::migrate!().run(&pool).await?;
            tracing::info!("database migrations applied");
            Ok(Arc::new(PgUserRepo::new(pool)))
        }
        None if config.app_env.is_production() => {
            Err(ConfigError::Missing("DATABASE_URL").into())
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory identity store");
            Ok(Arc::new(InMemoryUserRepo::new()))
        }
    }
}

pub fn build_state(config: &Config, store: Arc<dyn IdentityStore>) -> AppState {
    let (authenticator, sessions) = build_auth_services(config, store);
    AppState::new(authenticator, sessions)
}

pub fn build_router(state: AppState) -> Router {
    let guarded = middleware::auth::session::apply(api::guarded_routes(), state.clone());

    let router = Router::new()
        .merge(api::session_routes())
        .merge(guarded)
        .with_state(state);

    middleware::http::apply(router)
}
