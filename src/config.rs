/*
 * Responsibility
 * - Load settings from the environment (PORT, DATABASE_URL, AUTH_* keys)
 * - Validate values up front (startup fails on missing/invalid config)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use axum_extra::extract::cookie::SameSite;

use crate::services::auth::mode::AuthMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

pub const MIN_SIGNING_SECRET_BYTES: usize = 32;

const DEFAULT_TOKEN_TTL_SECONDS: i64 = 900; // 15 min
pub const MAX_TOKEN_TTL_SECONDS: i64 = 30 * 24 * 60 * 60;

/// Session cookie attributes. `HttpOnly` is not configurable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSettings {
    pub name: String,
    pub path: String,
    pub max_age_seconds: i64,
    pub same_site: SameSite,
    pub secure: bool,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            name: "auth-token".to_string(),
            path: "/".to_string(),
            max_age_seconds: 900,
            same_site: SameSite::Strict,
            secure: false,
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // None -> in-memory identity store (development only)
    pub database_url: Option<String>,

    pub auth_mode: AuthMode,
    pub cookie: CookieSettings,
    pub token_ttl_seconds: i64,
    pub signing_secret: String,
    pub api_prefixes: Vec<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the signing secret or credentials embedded in DATABASE_URL
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("database", &self.database_url.as_ref().map(|_| "<set>"))
            .field("auth_mode", &self.auth_mode)
            .field("cookie", &self.cookie)
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("api_prefixes", &self.api_prefixes)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let auth_mode = match std::env::var("AUTH_MODE") {
            Ok(v) => AuthMode::parse(&v).ok_or(ConfigError::Invalid("AUTH_MODE"))?,
            Err(_) => AuthMode::Header,
        };

        let defaults = CookieSettings::default();

        let cookie_name = std::env::var("AUTH_COOKIE_NAME").unwrap_or(defaults.name);
        if !is_valid_cookie_name(&cookie_name) {
            return Err(ConfigError::Invalid("AUTH_COOKIE_NAME"));
        }

        let cookie_path = std::env::var("AUTH_COOKIE_PATH").unwrap_or(defaults.path);
        if !cookie_path.starts_with('/') {
            return Err(ConfigError::Invalid("AUTH_COOKIE_PATH"));
        }

        let max_age_seconds = match std::env::var("AUTH_COOKIE_MAX_AGE_SECONDS") {
            Ok(v) => v
                .parse::<i64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid("AUTH_COOKIE_MAX_AGE_SECONDS"))?,
            Err(_) => defaults.max_age_seconds,
        };

        let same_site = match std::env::var("AUTH_COOKIE_SAME_SITE") {
            Ok(v) => parse_same_site(&v).ok_or(ConfigError::Invalid("AUTH_COOKIE_SAME_SITE"))?,
            Err(_) => defaults.same_site,
        };

        let secure = match std::env::var("AUTH_COOKIE_SECURE") {
            Ok(v) => parse_bool(&v).ok_or(ConfigError::Invalid("AUTH_COOKIE_SECURE"))?,
            Err(_) => defaults.secure,
        };

        // SameSite=None is rejected by browsers unless the cookie is also Secure
        if same_site == SameSite::None && !secure {
            return Err(ConfigError::Invalid("AUTH_COOKIE_SAME_SITE"));
        }

        let token_ttl_seconds =
            parse_token_ttl(std::env::var("AUTH_TOKEN_TTL_SECONDS").ok().as_deref())?;

        let signing_secret = std::env::var("AUTH_SIGNING_SECRET")
            .map_err(|_| ConfigError::Missing("AUTH_SIGNING_SECRET"))?;
        if signing_secret.len() < MIN_SIGNING_SECRET_BYTES {
            return Err(ConfigError::Invalid("AUTH_SIGNING_SECRET"));
        }

        let api_prefixes = parse_prefixes(
            &std::env::var("AUTH_API_PREFIXES").unwrap_or_else(|_| "/api".to_string()),
        );
        if api_prefixes.is_empty() {
            return Err(ConfigError::Invalid("AUTH_API_PREFIXES"));
        }

        Ok(Self {
            addr,
            app_env,
            database_url,
            auth_mode,
            cookie: CookieSettings {
                name: cookie_name,
                path: cookie_path,
                max_age_seconds,
                same_site,
                secure,
            },
            token_ttl_seconds,
            signing_secret,
            api_prefixes,
        })
    }
}

pub fn parse_same_site(value: &str) -> Option<SameSite> {
    match value.trim().to_ascii_lowercase().as_str() {
        "strict" => Some(SameSite::Strict),
        "lax" => Some(SameSite::Lax),
        "none" => Some(SameSite::None),
        _ => None,
    }
}

/// Unset -> 15 min. Set -> 1..=MAX_TOKEN_TTL_SECONDS or the config is invalid.
fn parse_token_ttl(value: Option<&str>) -> Result<i64, ConfigError> {
    match value {
        None => Ok(DEFAULT_TOKEN_TTL_SECONDS),
        Some(v) => v
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|n| (1..=MAX_TOKEN_TTL_SECONDS).contains(n))
            .ok_or(ConfigError::Invalid("AUTH_TOKEN_TTL_SECONDS")),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_prefixes(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| s.starts_with('/') && s.len() > 1)
        .collect()
}

// RFC 6265 token: visible ASCII minus separators
fn is_valid_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?={}".contains(&b)
        })
}
