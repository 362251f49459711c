use crate::config::rate_limit::{RateLimitConfig, RateLimitRule};
use crate::handlers;
use crate::middleware::auth::auth_middleware;
use axum::{middleware, routing, Router};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

pub fn create_routes(rate_limit: &RateLimitConfig) -> Router {
    Router::new().nest("/api/v1", api_routes(rate_limit))
}

fn api_routes(rate_limit: &RateLimitConfig) -> Router {
    let auth = auth_routes(rate_limit);
    let protected = protected_routes(rate_limit).layer(middleware::from_fn(auth_middleware));

    auth.merge(protected)
}

/// Credential routes reachable without a session.
fn auth_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route("/auth/register", routing::post(handlers::register))
        .route("/auth/verify", routing::post(handlers::verify_code))
        .route("/auth/resend-code", routing::post(handlers::resend_code))
        .route("/auth/login", routing::post(handlers::login))
        .route(
            "/auth/forgot-password",
            routing::post(handlers::forgot_password),
        )
        .route(
            "/auth/reset-password/{token}",
            routing::get(handlers::check_reset_token).post(handlers::reset_password),
        );

    with_optional_rate_limit(router, config.enabled, config.auth)
}

/// Everything behind the session gate.
fn protected_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        // Account
        .route("/auth/me", routing::get(handlers::me))
        .route("/auth/logout", routing::post(handlers::logout))
        .route(
            "/auth/delete-account",
            routing::post(handlers::delete_account),
        )
        // Notes
        .route(
            "/notes",
            routing::get(handlers::note::list_notes).post(handlers::note::create_note),
        )
        // Todos
        .route(
            "/todos",
            routing::get(handlers::todo::list_todos).post(handlers::todo::create_todo),
        )
        // People
        .route(
            "/people",
            routing::get(handlers::person::list_people).post(handlers::person::create_person),
        );

    with_optional_rate_limit(router, config.enabled, config.protected)
}

fn with_optional_rate_limit(router: Router, enabled: bool, rule: RateLimitRule) -> Router {
    if !enabled {
        return router;
    }

    let Some(governor_conf) = GovernorConfigBuilder::default()
        .per_second(rule.per_second)
        .burst_size(rule.burst_size)
        .finish()
    else {
        tracing::warn!(?rule, "Invalid rate limit rule, route group left unlimited");
        return router;
    };

    router.layer(GovernorLayer::new(governor_conf))
}
