use crate::services::ai::AiService;
use crate::services::cache::CacheService;
use crate::services::email::EmailService;
use crate::services::stats::{PublicStats, StatsService};
use axum::{response::IntoResponse, Extension, Json};
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/v1/public/stats",
    responses(
        (status = 200, description = "Landing-page counters (sample numbers if the database is down)", body = PublicStats),
    ),
    tag = "stats"
)]
pub async fn public_stats(
    Extension(db): Extension<DatabaseConnection>,
    cache: Option<Extension<CacheService>>,
) -> impl IntoResponse {
    let mut service = StatsService::new(db);
    if let Some(Extension(cache)) = cache {
        service = service.with_cache(cache);
    }

    let stats = service.public_stats().await;
    crate::response::ApiResponse::ok(stats)
}

#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service health and optional-feature flags", body = serde_json::Value)
    ),
    tag = "stats"
)]
pub async fn health_check(
    Extension(db): Extension<DatabaseConnection>,
    Extension(email_service): Extension<EmailService>,
    Extension(ai): Extension<AiService>,
) -> impl IntoResponse {
    // Best-effort probe; a dead database degrades the status instead of
    // failing the endpoint.
    let db_ok = db
        .query_one(Statement::from_string(
            sea_orm::DatabaseBackend::Postgres,
            "SELECT 1".to_string(),
        ))
        .await
        .is_ok();

    let status = if db_ok { "ok" } else { "degraded" };

    Json(json!({
        "status": status,
        "service": "IdeaConnect API",
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_ok,
        "env": {
            "smtp": email_service.is_configured(),
            "ai": ai.is_configured(),
        },
    }))
}
