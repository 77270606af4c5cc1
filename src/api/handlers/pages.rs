/*
 * Responsibility
 * - Minimal page routes (/, /login, /register, /dashboard)
 * - Pages never answer 401: an anonymous visitor to /dashboard is sent to /login
 */
use axum::response::{Html, IntoResponse, Redirect, Response};

use crate::api::extractors::AuthCtxExtractor;

pub async fn landing() -> Html<&'static str> {
    Html("<!doctype html><title>finapp</title><h1>finapp</h1><a href=\"/login\">Sign in</a>")
}

pub async fn login_page() -> Html<&'static str> {
    Html("<!doctype html><title>Sign in</title><h1>Sign in</h1>")
}

pub async fn register_page() -> Html<&'static str> {
    Html("<!doctype html><title>Register</title><h1>Create an account</h1>")
}

pub async fn dashboard(ctx: Option<AuthCtxExtractor>) -> Response {
    match ctx {
        Some(AuthCtxExtractor(ctx)) => Html(format!(
            "<!doctype html><title>Dashboard</title><h1>Welcome, {}</h1>",
            escape_html(&ctx.principal.username)
        ))
        .into_response(),
        None => Redirect::to("/login").into_response(),
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::escape_html;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("<b>\"a\" & 'b'</b>"), "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;");
    }
}
