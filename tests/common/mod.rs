#![allow(dead_code)]

use notebook::config::auth::AuthConfig;
use notebook::config::cookie::CookieConfig;
use notebook::config::rate_limit::RateLimitConfig;
use notebook::config::security::SecurityHeadersConfig;
use notebook::config::session::SessionConfig;
use notebook::services::email::{EmailService, SentEmail};
use notebook::utils::{signed_token::PASSWORD_RESET_PURPOSE, SessionCodec, TokenSigner};
use reqwest::Client;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use serde_json::Value;
use std::net::SocketAddr;

pub const TEST_SECRET: &str = "integration_test_secret_that_is_at_least_32_characters_long";
pub const PASSWORD: &str = "password_123";

pub struct TestApp {
    pub addr: String,
    pub db: DatabaseConnection,
    pub client: Client,
    pub mail: EmailService,
    pub config: AuthConfig,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.addr, path)
    }

    pub fn mails_to(&self, email: &str) -> Vec<SentEmail> {
        self.mail
            .sent()
            .into_iter()
            .filter(|m| m.to == email)
            .collect()
    }

    /// The code from the newest verification mail sent to `email`.
    pub fn last_code(&self, email: &str) -> String {
        let mails = self.mails_to(email);
        let mail = mails
            .iter()
            .rev()
            .find(|m| m.body.contains("code is: "))
            .unwrap_or_else(|| panic!("no verification mail for {email}"));
        let start = mail.body.find("code is: ").unwrap() + "code is: ".len();
        mail.body[start..start + 6].to_string()
    }

    /// The token from the newest reset mail sent to `email`.
    pub fn last_reset_token(&self, email: &str) -> String {
        let mails = self.mails_to(email);
        let mail = mails
            .iter()
            .rev()
            .find(|m| m.body.contains("/reset-password/"))
            .unwrap_or_else(|| panic!("no reset mail for {email}"));
        let start = mail.body.find("/reset-password/").unwrap() + "/reset-password/".len();
        mail.body[start..]
            .split_whitespace()
            .next()
            .unwrap()
            .to_string()
    }

    pub async fn register(&self, email: &str) -> reqwest::Response {
        self.client
            .post(self.url("/auth/register"))
            .json(&serde_json::json!({
                "name": "Test User",
                "email": email,
                "password": PASSWORD
            }))
            .send()
            .await
            .unwrap()
    }

    pub async fn verify(&self, email: &str, code: &str) -> reqwest::Response {
        self.client
            .post(self.url("/auth/verify"))
            .json(&serde_json::json!({ "email": email, "code": code }))
            .send()
            .await
            .unwrap()
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .unwrap()
    }

    /// Register, verify and log in; returns the session token.
    pub async fn create_verified_user(&self, email: &str) -> String {
        let resp = self.register(email).await;
        assert_eq!(resp.status(), 200, "register {email}");

        let code = self.last_code(email);
        let resp = self.verify(email, &code).await;
        assert_eq!(resp.status(), 200, "verify {email}");

        let resp = self.login(email, PASSWORD).await;
        assert_eq!(resp.status(), 200, "login {email}");
        let body: Value = resp.json().await.unwrap();
        body["data"]["token"]
            .as_str()
            .expect("login response carries a token")
            .to_string()
    }
}

pub fn test_config() -> AuthConfig {
    AuthConfig {
        bcrypt_cost: 4,
        ..AuthConfig::default()
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config()).await
}

/// Full router on a random port over a private in-memory SQLite database.
pub async fn spawn_app_with(config: AuthConfig) -> TestApp {
    let db = notebook::config::database::connect("sqlite::memory:", 1, 1)
        .await
        .expect("Failed to open in-memory database");
    notebook::migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let session = SessionConfig::new(TEST_SECRET).unwrap();
    let sessions = SessionCodec::new(&session);
    let signer = TokenSigner::new(TEST_SECRET.as_bytes(), PASSWORD_RESET_PURPOSE).unwrap();
    let mail = EmailService::in_memory();

    let app = axum::Router::new()
        .route("/", axum::routing::get(|| async { "ok" }))
        .merge(notebook::routes::create_routes(&RateLimitConfig::disabled()))
        .layer(axum::middleware::from_fn(
            notebook::middleware::security::security_headers_middleware,
        ))
        .layer(axum::extract::Extension(db.clone()))
        .layer(axum::extract::Extension(config))
        .layer(axum::extract::Extension(CookieConfig::default()))
        .layer(axum::extract::Extension(SecurityHeadersConfig::default()))
        .layer(axum::extract::Extension(sessions))
        .layer(axum::extract::Extension(signer))
        .layer(axum::extract::Extension(mail.clone()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    TestApp {
        addr: format!("http://{}", addr),
        db,
        client: Client::new(),
        mail,
        config,
    }
}
