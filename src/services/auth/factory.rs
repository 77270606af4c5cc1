/// Factory: build the auth services from application `Config`.
use std::sync::Arc;

use chrono::Duration;

use crate::config::Config;
use crate::repos::IdentityStore;
use crate::services::auth::{
    RequestAuthenticator, SessionIssuer, cookie::CookiePolicy, mode::ModePolicy,
    password::Argon2Verifier, route_class::RouteClassPolicy, token_codec::TokenCodec,
};

pub fn build_auth_services(
    config: &Config,
    store: Arc<dyn IdentityStore>,
) -> (Arc<RequestAuthenticator>, Arc<SessionIssuer>) {
    let tokens = Arc::new(TokenCodec::new(
        config.signing_secret.as_bytes(),
        Duration::seconds(config.token_ttl_seconds),
    ));
    let modes = ModePolicy::new(config.auth_mode);
    let cookies = CookiePolicy::new(config.cookie.clone());

    let authenticator = RequestAuthenticator::new(
        modes,
        cookies.clone(),
        RouteClassPolicy::new(config.api_prefixes.clone()),
        tokens.clone(),
        store.clone(),
    );

    let sessions = SessionIssuer::new(
        store,
        Arc::new(Argon2Verifier::new()),
        tokens,
        modes,
        cookies,
    );

    (Arc::new(authenticator), Arc::new(sessions))
}
