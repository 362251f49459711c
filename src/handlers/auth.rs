use crate::config::{auth::AuthConfig, cookie::CookieConfig};
use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::UserModel;
use crate::response::ApiResponse;
use crate::services::auth::AuthService;
use crate::services::email::EmailService;
use crate::services::reset::{ResetRequestOutcome, ResetService};
use crate::services::verification::VerificationService;
use crate::utils::{
    cookie::{build_clear_cookie, build_session_cookie},
    SessionCodec, TokenSigner,
};
use anyhow::anyhow;
use axum::{
    extract::Path,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Extension, Json,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

const RESET_REQUESTED: &str =
    "If an account with that email exists, a password reset link has been sent.";

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Display name (1-150 characters)
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    /// Email address
    #[validate(email, length(max = 150))]
    pub email: String,
    /// Password (min 8 characters)
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    /// User ID
    pub user_id: i32,
    /// Address the verification code was sent to
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyCodeRequest {
    /// Email address used at registration
    #[validate(email)]
    pub email: String,
    /// 6-digit code from the verification email
    #[validate(length(min = 1, max = 16))]
    pub code: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResendCodeRequest {
    /// Email address used at registration
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Email address
    pub email: String,
    /// User password
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    /// Session token, also set as the `session` cookie
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    /// User ID
    pub id: i32,
    /// Email address
    pub email: String,
    /// Display name
    pub name: String,
    pub verified: bool,
}

impl From<UserModel> for UserResponse {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            verified: user.verified,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    /// Email address
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ResetTokenResponse {
    /// Account the token belongs to
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    /// New password (min 8 characters)
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteAccountRequest {
    /// Current password
    pub password: String,
}

fn validate<T: Validate>(payload: &T) -> AppResult<()> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Pending account created, code sent", body = RegisterResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 409, description = "Email already registered", body = AppError),
    ),
    tag = "auth"
)]
pub async fn register(
    Extension(db): Extension<DatabaseConnection>,
    Extension(config): Extension<AuthConfig>,
    Extension(email_service): Extension<EmailService>,
    Json(mut payload): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    payload.name = payload.name.trim().to_string();
    validate(&payload)?;

    let service = AuthService::new(db, config);
    let user = service
        .register(
            &payload.name,
            &payload.email,
            &payload.password,
            &email_service,
        )
        .await?;

    Ok(ApiResponse::with_message(
        RegisterResponse {
            user_id: user.id,
            email: user.email,
        },
        "Registration successful. Check your email for a verification code.",
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/verify",
    request_body = VerifyCodeRequest,
    responses(
        (status = 200, description = "Email verified", body = UserResponse),
        (status = 400, description = "Invalid or expired code", body = AppError),
    ),
    tag = "auth"
)]
pub async fn verify_code(
    Extension(db): Extension<DatabaseConnection>,
    Extension(config): Extension<AuthConfig>,
    Json(payload): Json<VerifyCodeRequest>,
) -> AppResult<impl IntoResponse> {
    validate(&payload)?;

    let service = VerificationService::new(db, config);
    let user = service.check_code(&payload.email, &payload.code).await?;

    Ok(ApiResponse::with_message(
        UserResponse::from(user),
        "Email verified. You can now log in.",
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/resend-code",
    request_body = ResendCodeRequest,
    responses(
        (status = 200, description = "Code re-sent if the account is pending", body = serde_json::Value),
        (status = 400, description = "Validation error", body = AppError),
    ),
    tag = "auth"
)]
pub async fn resend_code(
    Extension(db): Extension<DatabaseConnection>,
    Extension(config): Extension<AuthConfig>,
    Extension(email_service): Extension<EmailService>,
    Json(payload): Json<ResendCodeRequest>,
) -> AppResult<impl IntoResponse> {
    validate(&payload)?;

    let service = VerificationService::new(db, config);
    service.resend_code(&payload.email, &email_service).await?;

    Ok(ApiResponse::message(
        "If that account is awaiting verification, a new code has been sent.",
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = AppError),
        (status = 403, description = "Account not verified", body = AppError),
    ),
    tag = "auth"
)]
pub async fn login(
    Extension(db): Extension<DatabaseConnection>,
    Extension(config): Extension<AuthConfig>,
    Extension(sessions): Extension<SessionCodec>,
    Extension(cookies): Extension<CookieConfig>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let service = AuthService::new(db, config);
    let user = service.login(&payload.email, &payload.password).await?;
    let token = sessions.issue(user.id)?;
    tracing::info!(user_id = user.id, "User logged in");

    let response = AuthResponse {
        token: token.clone(),
        user: UserResponse::from(user),
    };

    let mut http_response = ApiResponse::ok(response).into_response();
    append_set_cookie(
        &mut http_response,
        &build_session_cookie(&cookies, &token, sessions.ttl_seconds()),
    )?;
    Ok(http_response)
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    security(("session" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "auth"
)]
pub async fn me(auth_user: AuthUser) -> AppResult<impl IntoResponse> {
    Ok(ApiResponse::ok(UserResponse::from(auth_user.user)))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    security(("session" = [])),
    responses(
        (status = 200, description = "Logout successful", body = serde_json::Value),
    ),
    tag = "auth"
)]
pub async fn logout(
    Extension(cookies): Extension<CookieConfig>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    tracing::info!(user_id = auth_user.user.id, "User logged out");
    let mut response = ApiResponse::message("You have been logged out.").into_response();
    append_set_cookie(&mut response, &build_clear_cookie(&cookies))?;
    Ok(response)
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset link sent if the account exists", body = serde_json::Value),
        (status = 400, description = "Validation error", body = AppError),
        (status = 404, description = "Unknown email (only when revealing is enabled)", body = AppError),
    ),
    tag = "auth"
)]
pub async fn forgot_password(
    Extension(db): Extension<DatabaseConnection>,
    Extension(config): Extension<AuthConfig>,
    Extension(signer): Extension<TokenSigner>,
    Extension(email_service): Extension<EmailService>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> AppResult<impl IntoResponse> {
    validate(&payload)?;

    let service = ResetService::new(db, config, signer);
    let outcome = service.request_reset(&payload.email, &email_service).await?;

    if outcome == ResetRequestOutcome::UnknownEmail && config.reveal_unknown_reset_email {
        return Err(AppError::NotFound(
            "No account found with that email address".to_string(),
        ));
    }

    Ok(ApiResponse::message(RESET_REQUESTED))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/reset-password/{token}",
    params(("token" = String, Path, description = "Token from the reset email")),
    responses(
        (status = 200, description = "Token is valid", body = ResetTokenResponse),
        (status = 400, description = "Invalid or expired token", body = AppError),
    ),
    tag = "auth"
)]
pub async fn check_reset_token(
    Extension(db): Extension<DatabaseConnection>,
    Extension(config): Extension<AuthConfig>,
    Extension(signer): Extension<TokenSigner>,
    Path(token): Path<String>,
) -> AppResult<impl IntoResponse> {
    let service = ResetService::new(db, config, signer);
    let user = service.validate_reset(&token).await?;

    Ok(ApiResponse::ok(ResetTokenResponse { email: user.email }))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/reset-password/{token}",
    params(("token" = String, Path, description = "Token from the reset email")),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset", body = serde_json::Value),
        (status = 400, description = "Invalid or expired token", body = AppError),
    ),
    tag = "auth"
)]
pub async fn reset_password(
    Extension(db): Extension<DatabaseConnection>,
    Extension(config): Extension<AuthConfig>,
    Extension(signer): Extension<TokenSigner>,
    Path(token): Path<String>,
    Json(payload): Json<ResetPasswordRequest>,
) -> AppResult<impl IntoResponse> {
    validate(&payload)?;

    let service = ResetService::new(db, config, signer);
    service.consume_reset(&token, &payload.password).await?;

    Ok(ApiResponse::message(
        "Your password has been reset. You can now log in.",
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/delete-account",
    security(("session" = [])),
    request_body = DeleteAccountRequest,
    responses(
        (status = 200, description = "Account and its data deleted", body = serde_json::Value),
        (status = 400, description = "Incorrect password", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "auth"
)]
pub async fn delete_account(
    Extension(db): Extension<DatabaseConnection>,
    Extension(config): Extension<AuthConfig>,
    Extension(cookies): Extension<CookieConfig>,
    auth_user: AuthUser,
    Json(payload): Json<DeleteAccountRequest>,
) -> AppResult<impl IntoResponse> {
    let service = AuthService::new(db, config);
    service
        .delete_account(auth_user.user.id, &payload.password)
        .await?;

    let mut response = ApiResponse::message("Your account has been deleted.").into_response();
    append_set_cookie(&mut response, &build_clear_cookie(&cookies))?;
    Ok(response)
}

fn append_set_cookie(response: &mut Response, cookie_value: &str) -> AppResult<()> {
    let value = HeaderValue::from_str(cookie_value).map_err(|e| {
        AppError::Internal(anyhow!("Failed to build Set-Cookie header value: {}", e))
    })?;
    response.headers_mut().append(header::SET_COOKIE, value);
    Ok(())
}
