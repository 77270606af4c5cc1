//! Which credential transports are active, and which one a login response uses.

use serde::Serialize;
use tracing::debug;

/// Process-wide transport mode. Read-only after startup.
///
/// On the wire `Header` is `"jwt"`; browser clients branch on that value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// `Authorization: Bearer <token>` only.
    #[serde(rename = "jwt")]
    Header,
    /// HTTP-only session cookie only.
    Cookie,
    Both,
}

impl AuthMode {
    /// Parses a mode name. `jwt` is accepted as an alias of `header`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "header" | "jwt" | "bearer" => Some(Self::Header),
            "cookie" => Some(Self::Cookie),
            "both" => Some(Self::Both),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Header => "jwt",
            Self::Cookie => "cookie",
            Self::Both => "both",
        }
    }

    /// Whether a login under this mode returns the token in the response body.
    pub fn delivers_body_token(&self) -> bool {
        matches!(self, Self::Header | Self::Both)
    }

    /// Whether a login under this mode sets the session cookie.
    pub fn delivers_cookie(&self) -> bool {
        matches!(self, Self::Cookie | Self::Both)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ModePolicy {
    mode: AuthMode,
}

impl ModePolicy {
    pub fn new(mode: AuthMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn is_header_enabled(&self) -> bool {
        matches!(self.mode, AuthMode::Header | AuthMode::Both)
    }

    pub fn is_cookie_enabled(&self) -> bool {
        matches!(self.mode, AuthMode::Cookie | AuthMode::Both)
    }

    pub fn is_dual_mode(&self) -> bool {
        matches!(self.mode, AuthMode::Both)
    }

    /// Honors a requested mode only when the configured mode permits it.
    ///
    /// Anything else (absent, unknown, or disallowed) falls back to the configured
    /// mode instead of failing the request.
    pub fn resolve_effective_mode(&self, requested: Option<&str>) -> AuthMode {
        let Some(raw) = requested.filter(|s| !s.trim().is_empty()) else {
            return self.mode;
        };

        let allowed = match AuthMode::parse(raw) {
            Some(m @ AuthMode::Header) if self.is_header_enabled() => Some(m),
            Some(m @ AuthMode::Cookie) if self.is_cookie_enabled() => Some(m),
            Some(m @ AuthMode::Both) if self.is_dual_mode() => Some(m),
            _ => None,
        };

        match allowed {
            Some(m) => m,
            None => {
                debug!(
                    requested = raw,
                    configured = self.mode.as_str(),
                    "requested auth mode not permitted, using configured mode"
                );
                self.mode
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_aliases_and_case() {
        assert_eq!(AuthMode::parse("HEADER"), Some(AuthMode::Header));
        assert_eq!(AuthMode::parse("jwt"), Some(AuthMode::Header));
        assert_eq!(AuthMode::parse(" Cookie "), Some(AuthMode::Cookie));
        assert_eq!(AuthMode::parse("both"), Some(AuthMode::Both));
        assert_eq!(AuthMode::parse("session"), None);
    }

    #[test]
    fn wire_names_match_browser_client() {
        for (mode, name) in [
            (AuthMode::Header, "jwt"),
            (AuthMode::Cookie, "cookie"),
            (AuthMode::Both, "both"),
        ] {
            assert_eq!(serde_json::to_value(mode).unwrap(), name);
            assert_eq!(mode.as_str(), name);
            assert_eq!(AuthMode::parse(name), Some(mode));
        }
    }

    #[test]
    fn transport_flags_follow_mode() {
        let header = ModePolicy::new(AuthMode::Header);
        assert!(header.is_header_enabled());
        assert!(!header.is_cookie_enabled());
        assert!(!header.is_dual_mode());

        let cookie = ModePolicy::new(AuthMode::Cookie);
        assert!(!cookie.is_header_enabled());
        assert!(cookie.is_cookie_enabled());

        let both = ModePolicy::new(AuthMode::Both);
        assert!(both.is_header_enabled() && both.is_cookie_enabled() && both.is_dual_mode());
    }

    #[test]
    fn dual_mode_honors_any_requested_mode() {
        let p = ModePolicy::new(AuthMode::Both);
        assert_eq!(p.resolve_effective_mode(Some("cookie")), AuthMode::Cookie);
        assert_eq!(p.resolve_effective_mode(Some("header")), AuthMode::Header);
        assert_eq!(p.resolve_effective_mode(Some("both")), AuthMode::Both);
        assert_eq!(p.resolve_effective_mode(None), AuthMode::Both);
    }

    #[test]
    fn disallowed_or_unknown_requests_fall_back() {
        let p = ModePolicy::new(AuthMode::Header);
        assert_eq!(p.resolve_effective_mode(Some("cookie")), AuthMode::Header);
        assert_eq!(p.resolve_effective_mode(Some("both")), AuthMode::Header);
        assert_eq!(p.resolve_effective_mode(Some("carrier-pigeon")), AuthMode::Header);
        assert_eq!(p.resolve_effective_mode(Some("  ")), AuthMode::Header);

        let p = ModePolicy::new(AuthMode::Cookie);
        assert_eq!(p.resolve_effective_mode(Some("jwt")), AuthMode::Cookie);
    }
}
