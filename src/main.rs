mod config;
mod error;
mod handlers;
mod middleware;
mod migration;
mod models;
mod response;
mod routes;
mod score;
mod services;
mod utils;

use axum::{extract::Extension, routing::get, Router};
use sea_orm_migration::MigratorTrait;
use services::ai::AiService;
use services::cache::CacheService;
use std::env;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Stats & health
        crate::handlers::stats::public_stats,
        crate::handlers::stats::health_check,
        // Auth routes
        crate::handlers::register,
        crate::handlers::login,
        crate::handlers::auth::guest_session,
        crate::handlers::auth::refresh_token,
        crate::handlers::get_current_user,
        crate::handlers::change_password,
        crate::handlers::auth::logout,
        crate::handlers::auth::delete_account,
        // Password reset
        crate::handlers::reset::request_reset,
        crate::handlers::reset::verify_reset,
        // Profiles
        crate::handlers::profile::get_profile,
        crate::handlers::profile::update_my_profile,
        // Ideas
        crate::handlers::idea::list_ideas,
        crate::handlers::idea::my_ideas,
        crate::handlers::idea::get_idea,
        crate::handlers::idea::create_idea,
        crate::handlers::idea::update_idea,
        crate::handlers::idea::delete_idea,
        // Votes
        crate::handlers::vote::cast_vote,
        crate::handlers::vote::get_votes,
        // Comments
        crate::handlers::comment::list_comments,
        crate::handlers::comment::create_comment,
        crate::handlers::comment::delete_comment,
        // Assistant
        crate::handlers::assistant::chat,
        // Admin
        crate::handlers::admin::list_users,
        crate::handlers::admin::create_user,
        crate::handlers::admin::patch_user,
        crate::handlers::admin::update_user_role,
        crate::handlers::admin::delete_user,
        crate::handlers::admin::list_ideas,
        crate::handlers::admin::count_ideas,
        crate::handlers::admin::delete_idea,
    ),
    components(
        schemas(
            crate::response::ApiResponse<serde_json::Value>,
            crate::response::PaginatedResponse<serde_json::Value>,
            crate::response::PaginationQuery,
            crate::error::AppError,
            // Auth
            crate::handlers::auth::RegisterRequest,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::RefreshTokenRequest,
            crate::handlers::auth::AuthResponse,
            crate::handlers::auth::GuestResponse,
            crate::handlers::auth::TokenResponse,
            crate::handlers::auth::UserResponse,
            crate::handlers::auth::ChangePasswordRequest,
            // Reset
            crate::handlers::reset::RequestResetRequest,
            crate::handlers::reset::VerifyResetRequest,
            // Profiles
            crate::handlers::profile::ProfileResponse,
            crate::handlers::profile::UpdateProfileRequest,
            // Ideas
            crate::handlers::idea::IdeaResponse,
            crate::handlers::idea::IdeaRequest,
            crate::handlers::idea::IdeaListQuery,
            // Votes
            crate::score::VoteTally,
            crate::models::vote::VoteKind,
            crate::handlers::vote::VoteRequest,
            crate::handlers::vote::VoteResponse,
            crate::handlers::vote::TallyResponse,
            // Comments
            crate::handlers::comment::CommentResponse,
            crate::handlers::comment::CreateCommentRequest,
            // Assistant
            crate::services::ai::ChatTurn,
            crate::services::ai::ChatRole,
            crate::services::ai::ModerationVerdict,
            crate::handlers::assistant::ChatRequest,
            crate::handlers::assistant::ChatResponse,
            // Stats
            crate::services::stats::PublicStats,
            // Admin
            crate::handlers::admin::AdminUserResponse,
            crate::handlers::admin::CreateUserRequest,
            crate::handlers::admin::PatchUserRequest,
            crate::handlers::admin::UpdateRoleRequest,
            crate::handlers::admin::AdminIdeaResponse,
            crate::handlers::admin::IdeaCountResponse,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login, sessions"),
        (name = "reset", description = "One-time-code password reset"),
        (name = "profiles", description = "Member profiles"),
        (name = "ideas", description = "Idea submission and browsing"),
        (name = "votes", description = "Yes/Maybe/No validation votes"),
        (name = "comments", description = "Idea comments"),
        (name = "assistant", description = "Conversational assistant"),
        (name = "admin", description = "Administrative operations"),
        (name = "stats", description = "Public counters and health"),
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ideaconnect=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration before doing anything else
    let jwt_config = validate_config()?;
    utils::jwt::init_jwt_config(jwt_config)?;

    tracing::info!("Starting IdeaConnect API v{}...", env!("CARGO_PKG_VERSION"));

    let db = config::database::get_database().await?;
    tracing::info!("Database connected successfully");

    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    services::bootstrap_admin::ensure_bootstrap_admin(&db).await?;

    // Redis/Cache is optional - graceful degradation if unavailable
    let cache = match config::redis::get_redis().await {
        Ok(conn) => {
            tracing::info!("Redis connected successfully");
            Some(CacheService::new(conn))
        }
        Err(e) => {
            tracing::warn!("Redis unavailable, running without cache: {}", e);
            None
        }
    };

    let email_service = services::email::EmailService::from_env();
    if email_service.is_configured() {
        tracing::info!("SMTP email service configured");
    } else {
        tracing::warn!("SMTP not configured, reset codes will not be delivered");
    }

    let ai_service = AiService::from_env();
    if ai_service.is_configured() {
        tracing::info!("AI moderation and assistant configured");
    } else {
        tracing::warn!("AI not configured; moderation approves everything");
    }

    let mut app = create_app()
        .layer(Extension(db))
        .layer(Extension(email_service))
        .layer(Extension(ai_service));

    if let Some(cache) = cache {
        app = app.layer(Extension(cache));
    }

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Validate all required configuration at startup (fail-fast).
fn validate_config() -> anyhow::Result<crate::config::jwt::JwtConfig> {
    // JWT config — validated and cached
    let jwt_config = config::jwt::JwtConfig::from_env()?;

    // DATABASE_URL — checked here for early error; actual connection happens later
    if env::var("DATABASE_URL").is_err() {
        return Err(anyhow::anyhow!(
            "DATABASE_URL environment variable must be set"
        ));
    }

    Ok(jwt_config)
}

fn build_cors_layer() -> CorsLayer {
    use axum::http::{header, HeaderValue, Method};

    let origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins_str == "*" {
        cors.allow_origin(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = origins_str
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

fn create_app() -> Router {
    Router::new()
        .route("/", get(handlers::stats::health_check))
        .merge(routes::create_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(axum::middleware::from_fn(
            middleware::security::security_headers_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    tracing::info!("Shutdown signal received, gracefully shutting down...");
}
