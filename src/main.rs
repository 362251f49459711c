mod config;
mod error;
mod handlers;
mod middleware;
mod migration;
mod models;
mod response;
mod routes;
mod services;
mod utils;

use axum::{extract::Extension, response::IntoResponse, routing::get, Json, Router};
use config::{
    auth::AuthConfig, cookie::CookieConfig, rate_limit::RateLimitConfig,
    security::SecurityHeadersConfig, session::SessionConfig,
};
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;
use serde_json::json;
use services::email::EmailService;
use std::env;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utils::{signed_token::PASSWORD_RESET_PURPOSE, SessionCodec, TokenSigner};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        // Auth routes
        crate::handlers::register,
        crate::handlers::verify_code,
        crate::handlers::resend_code,
        crate::handlers::login,
        crate::handlers::me,
        crate::handlers::logout,
        crate::handlers::forgot_password,
        crate::handlers::check_reset_token,
        crate::handlers::reset_password,
        crate::handlers::delete_account,
        // Note routes
        crate::handlers::note::list_notes,
        crate::handlers::note::create_note,
        // Todo routes
        crate::handlers::todo::list_todos,
        crate::handlers::todo::create_todo,
        // People routes
        crate::handlers::person::list_people,
        crate::handlers::person::create_person,
    ),
    components(
        schemas(
            crate::response::ApiResponse<serde_json::Value>,
            crate::error::AppError,
            // Auth
            crate::handlers::auth::RegisterRequest,
            crate::handlers::auth::RegisterResponse,
            crate::handlers::auth::VerifyCodeRequest,
            crate::handlers::auth::ResendCodeRequest,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::AuthResponse,
            crate::handlers::auth::UserResponse,
            crate::handlers::auth::ForgotPasswordRequest,
            crate::handlers::auth::ResetTokenResponse,
            crate::handlers::auth::ResetPasswordRequest,
            crate::handlers::auth::DeleteAccountRequest,
            // Notes
            crate::handlers::note::CreateNoteRequest,
            crate::handlers::note::NoteResponse,
            // Todos
            crate::handlers::todo::CreateTodoRequest,
            crate::handlers::todo::TodoResponse,
            crate::handlers::todo::TodoTreeNode,
            // People
            crate::handlers::person::CreatePersonRequest,
            crate::handlers::person::PersonResponse,
        )
    ),
    modifiers(&SessionCookieAddon),
    tags(
        (name = "auth", description = "Registration, verification, sessions and password reset"),
        (name = "notes", description = "Markdown notes"),
        (name = "todos", description = "Tasks and subtasks"),
        (name = "people", description = "Contacts"),
    )
)]
struct ApiDoc;

struct SessionCookieAddon;

impl Modify for SessionCookieAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(
                    utils::cookie::SESSION_COOKIE,
                ))),
            );
        }
    }
}

/// Everything `main` needs before it binds a socket.
struct Settings {
    session: SessionConfig,
    auth: AuthConfig,
    cookies: CookieConfig,
    security_headers: SecurityHeadersConfig,
    rate_limit: RateLimitConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notebook=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration before doing anything else
    let settings = validate_config()?;

    tracing::info!("Starting Notebook API v{}...", env!("CARGO_PKG_VERSION"));

    let db = config::database::get_database().await?;
    tracing::info!("Database connected successfully");

    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let sessions = SessionCodec::new(&settings.session);
    let signer = TokenSigner::new(settings.session.secret.as_bytes(), PASSWORD_RESET_PURPOSE)?;

    let email_service = EmailService::from_env();
    if email_service.is_configured() {
        tracing::info!("SMTP email service configured");
    } else {
        tracing::warn!("SMTP not configured, emails will be skipped");
    }

    let app = create_app(&settings.rate_limit)
        .layer(Extension(db))
        .layer(Extension(settings.auth))
        .layer(Extension(settings.cookies))
        .layer(Extension(settings.security_headers))
        .layer(Extension(sessions))
        .layer(Extension(signer))
        .layer(Extension(email_service));

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
fn validate_config() -> anyhow::Result<Settings> {
    let session = SessionConfig::from_env()?;
    let auth = AuthConfig::from_env();
    let cookies = CookieConfig::from_env();
    let security_headers = SecurityHeadersConfig::from_env();
    let rate_limit = RateLimitConfig::from_env();

    if auth.verification_code_ttl.is_none() {
        tracing::warn!("Verification codes are configured to never expire");
    }
    tracing::info!(
        reset_mode = ?auth.reset_mode,
        reveal_unknown_email = auth.reveal_unknown_reset_email,
        "Password reset configured"
    );

    Ok(Settings {
        session,
        auth,
        cookies,
        security_headers,
        rate_limit,
    })
}

fn build_cors_layer() -> CorsLayer {
    use axum::http::{header, HeaderValue, Method};

    let origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins_str == "*" {
        cors.allow_origin(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = origins_str
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        // Cookies only travel on credentialed requests, which need explicit origins.
        cors.allow_origin(origins).allow_credentials(true)
    }
}

fn create_app(rate_limit: &RateLimitConfig) -> Router {
    Router::new()
        .route("/", get(health_check))
        .merge(routes::create_routes(rate_limit))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(axum::middleware::from_fn(
            middleware::security::security_headers_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Health check successful", body = serde_json::Value)
    )
)]
async fn health_check(Extension(db): Extension<DatabaseConnection>) -> impl IntoResponse {
    let db_ok = db
        .query_one(Statement::from_string(
            db.get_database_backend(),
            "SELECT 1".to_string(),
        ))
        .await
        .is_ok();

    let status = if db_ok { "ok" } else { "degraded" };

    Json(json!({
        "status": status,
        "service": "Notebook API",
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_ok,
    }))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, gracefully shutting down...");
}
