//! Session cookie materialization.
//!
//! Every cookie written by this service goes through `CookiePolicy` so the attribute set
//! stays consistent between login, logout and the authenticator's stale-cookie cleanup.

use axum::http::{HeaderMap, HeaderValue, header};
use axum_extra::extract::cookie::Cookie;
use time::Duration;

use crate::config::CookieSettings;

#[derive(Debug, Clone)]
pub struct CookiePolicy {
    settings: CookieSettings,
}

impl CookiePolicy {
    pub fn new(settings: CookieSettings) -> Self {
        Self { settings }
    }

    /// Session cookie carrying `token`. HttpOnly is always set.
    pub fn build(&self, token: &str) -> Cookie<'static> {
        let mut cookie = self.base(token.to_string());
        cookie.set_max_age(Duration::seconds(self.settings.max_age_seconds));
        cookie
    }

    /// Same name/path as the session cookie, empty value, `Max-Age=0`.
    pub fn build_clearing(&self) -> Cookie<'static> {
        let mut cookie = self.base(String::new());
        cookie.set_max_age(Duration::ZERO);
        cookie
    }

    /// Reads the session token from the request's `Cookie` headers.
    ///
    /// A blank value counts as absent (a browser may echo back a just-cleared cookie).
    pub fn read_token(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| Cookie::parse(pair.trim().to_string()).ok())
            .find(|c| c.name() == self.settings.name)
            .map(|c| c.value().trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Appends `cookie` as a `Set-Cookie` header, keeping any cookies already set.
    pub fn append_to(headers: &mut HeaderMap, cookie: &Cookie<'_>) {
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(v) => {
                headers.append(header::SET_COOKIE, v);
            }
            Err(e) => {
                tracing::error!(error = %e, cookie = cookie.name(), "cookie is not a valid header value");
            }
        }
    }

    fn base(&self, value: String) -> Cookie<'static> {
        let mut cookie = Cookie::new(self.settings.name.clone(), value);
        cookie.set_path(self.settings.path.clone());
        cookie.set_same_site(self.settings.same_site);
        cookie.set_secure(self.settings.secure);
        cookie.set_http_only(true);
        cookie
    }
}
