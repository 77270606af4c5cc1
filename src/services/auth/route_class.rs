//! Route classification for authentication failures.
//!
//! API routes reject a bad credential with 401. Page routes let the request through
//! anonymously so the page can send the visitor to the login screen.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Api,
    Page,
}

#[derive(Debug, Clone)]
pub struct RouteClassPolicy {
    api_prefixes: Vec<String>,
}

impl RouteClassPolicy {
    /// Prefixes are matched on path-segment boundaries (`/api` matches `/api` and `/api/me`,
    /// not `/apiary`).
    pub fn new(api_prefixes: Vec<String>) -> Self {
        let api_prefixes = api_prefixes
            .into_iter()
            .map(|p| p.trim_end_matches('/').to_string())
            .filter(|p| !p.is_empty())
            .collect();
        Self { api_prefixes }
    }

    pub fn classify(&self, path: &str) -> RouteClass {
        let is_api = self.api_prefixes.iter().any(|prefix| {
            path.strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        });

        if is_api { RouteClass::Api } else { RouteClass::Page }
    }
}

impl Default for RouteClassPolicy {
    fn default() -> Self {
        Self::new(vec!["/api".to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_prefix_matches_on_segment_boundary() {
        let p = RouteClassPolicy::default();
        assert_eq!(p.classify("/api"), RouteClass::Api);
        assert_eq!(p.classify("/api/me"), RouteClass::Api);
        assert_eq!(p.classify("/apiary"), RouteClass::Page);
        assert_eq!(p.classify("/dashboard"), RouteClass::Page);
        assert_eq!(p.classify("/"), RouteClass::Page);
    }

    #[test]
    fn multiple_prefixes() {
        let p = RouteClassPolicy::new(vec!["/api/".to_string(), "/internal".to_string()]);
        assert_eq!(p.classify("/internal/stats"), RouteClass::Api);
        assert_eq!(p.classify("/api/me"), RouteClass::Api);
        assert_eq!(p.classify("/login"), RouteClass::Page);
    }
}
