use crate::config::rate_limit::{RateLimitConfig, RateLimitRule};
use crate::handlers;
use crate::middleware::auth::auth_middleware;
use axum::{middleware, routing, Router};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

pub fn create_routes() -> Router {
    Router::new().nest("/api/v1", api_routes())
}

fn api_routes() -> Router {
    let rate_limit_config = RateLimitConfig::from_env();

    let auth = auth_routes(&rate_limit_config);
    let public_read = public_read_routes(&rate_limit_config);
    let protected =
        protected_routes(&rate_limit_config).layer(middleware::from_fn(auth_middleware));

    auth.merge(public_read).merge(protected)
}

/// Auth routes: session issuance and the password-reset code flow.
/// The governor limit here is the outer throttle; reset issuance also
/// carries its own per-email 60 s cooldown in the service.
fn auth_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route("/auth/register", routing::post(handlers::register))
        .route("/auth/login", routing::post(handlers::login))
        .route("/auth/guest", routing::post(handlers::auth::guest_session))
        .route(
            "/auth/refresh",
            routing::post(handlers::auth::refresh_token),
        )
        .route(
            "/auth/request-reset",
            routing::post(handlers::reset::request_reset),
        )
        .route(
            "/auth/verify-reset",
            routing::post(handlers::reset::verify_reset),
        );

    with_optional_rate_limit(router, config.enabled, config.auth)
}

/// Public read routes: browse surfaces and the health/stats probes.
fn public_read_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route("/ideas", routing::get(handlers::idea::list_ideas))
        .route("/ideas/{id}", routing::get(handlers::idea::get_idea))
        .route("/ideas/{id}/votes", routing::get(handlers::vote::get_votes))
        .route(
            "/ideas/{id}/comments",
            routing::get(handlers::comment::list_comments),
        )
        .route(
            "/profiles/{id}",
            routing::get(handlers::profile::get_profile),
        )
        .route("/public/stats", routing::get(handlers::stats::public_stats))
        .route("/health", routing::get(handlers::stats::health_check));

    with_optional_rate_limit(router, config.enabled, config.public_read)
}

/// Protected routes: everything behind the JWT middleware. Guests pass
/// the middleware but are stopped by require_member inside each write
/// handler; the assistant is deliberately open to them.
fn protected_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        // Session
        .route("/auth/me", routing::get(handlers::get_current_user))
        .route("/auth/logout", routing::post(handlers::auth::logout))
        .route("/auth/password", routing::put(handlers::change_password))
        .route("/account", routing::delete(handlers::auth::delete_account))
        // Profiles
        .route(
            "/profiles/me",
            routing::put(handlers::profile::update_my_profile),
        )
        // Ideas. "mine" before "{id}" so the literal wins.
        .route("/ideas/mine", routing::get(handlers::idea::my_ideas))
        .route("/ideas", routing::post(handlers::idea::create_idea))
        .route(
            "/ideas/{id}",
            routing::put(handlers::idea::update_idea).delete(handlers::idea::delete_idea),
        )
        // Votes
        .route("/ideas/{id}/vote", routing::post(handlers::vote::cast_vote))
        // Comments
        .route(
            "/ideas/{id}/comments",
            routing::post(handlers::comment::create_comment),
        )
        .route(
            "/comments/{id}",
            routing::delete(handlers::comment::delete_comment),
        )
        // Assistant
        .route(
            "/assistant/chat",
            routing::post(handlers::assistant::chat),
        )
        // Admin
        .route(
            "/admin/users",
            routing::get(handlers::admin::list_users).post(handlers::admin::create_user),
        )
        .route(
            "/admin/users/{id}",
            routing::patch(handlers::admin::patch_user).delete(handlers::admin::delete_user),
        )
        .route(
            "/admin/users/{id}/role",
            routing::put(handlers::admin::update_user_role),
        )
        .route("/admin/ideas", routing::get(handlers::admin::list_ideas))
        .route(
            "/admin/ideas/count",
            routing::get(handlers::admin::count_ideas),
        )
        .route(
            "/admin/ideas/{id}",
            routing::delete(handlers::admin::delete_idea),
        );

    with_optional_rate_limit(router, config.enabled, config.protected)
}

fn with_optional_rate_limit(router: Router, enabled: bool, rule: RateLimitRule) -> Router {
    if !enabled {
        return router;
    }

    let governor_conf = GovernorConfigBuilder::default()
        .per_second(rule.per_second)
        .burst_size(rule.burst_size)
        .finish()
        .expect("Invalid rate limit configuration");

    router.layer(GovernorLayer::new(governor_conf))
}
