/*
 * Responsibility
 * - GET /api/me: the principal bound to this request (401 when anonymous)
 */
use axum::Json;

use crate::api::dto::auth::MeResponse;
use crate::api::extractors::AuthCtxExtractor;
use crate::services::auth::AuthSource;

pub async fn me(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<MeResponse> {
    Json(MeResponse {
        user: ctx.principal,
        auth_source: match ctx.source {
            AuthSource::Header => "header",
            AuthSource::Cookie => "cookie",
        },
    })
}
