use crate::{
    config::auth::AuthConfig,
    error::{AppError, AppResult},
    models::{user, User, UserModel},
    services::email::EmailService,
    utils::{
        hash_password,
        secret::{generate_verification_code, is_well_formed_code},
        verify_password,
    },
};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ConnectionTrait, DatabaseConnection, EntityTrait};

pub const INVALID_CODE: &str = "Invalid verification code";
pub const EXPIRED_CODE: &str = "Verification code has expired. Please register again.";

/// Email ownership check for newly registered accounts.
///
/// A 6-digit code is mailed to the user and only its bcrypt hash is kept.
/// When `AuthConfig::verification_code_ttl` is set the code carries an expiry
/// and a pending account whose code has expired is deleted on the next
/// attempt; without a ttl codes stay valid until used.
pub struct VerificationService {
    db: DatabaseConnection,
    config: AuthConfig,
}

impl VerificationService {
    pub fn new(db: DatabaseConnection, config: AuthConfig) -> Self {
        Self { db, config }
    }

    /// Store a fresh code for `user` on `conn` and mail it. Any earlier code
    /// stops working. Mail failures are returned to the caller, so running
    /// this inside a transaction keeps the row and the message in step.
    pub async fn issue_code<C: ConnectionTrait>(
        &self,
        conn: &C,
        user: UserModel,
        email_service: &EmailService,
    ) -> AppResult<UserModel> {
        let code = generate_verification_code()?;
        let code_hash = hash_password(&code, self.config.bcrypt_cost)?;
        let now = chrono::Utc::now().naive_utc();
        let expires = self.config.verification_code_ttl.map(|ttl| now + ttl);

        let mut active: user::ActiveModel = user.into();
        active.verification_code_hash = Set(Some(code_hash));
        active.verification_code_expires = Set(expires);
        active.updated_at = Set(now);
        let user = active.update(conn).await?;

        email_service
            .send_verification_code(&user.email, &code, self.config.verification_code_ttl)
            .await?;
        tracing::info!(user_id = user.id, "Verification code issued");

        Ok(user)
    }

    /// Accept `submitted` iff it matches the stored hash and, when an expiry
    /// is tracked, arrives before it. Success marks the account verified and
    /// forgets the code.
    pub async fn check_code(&self, email: &str, submitted: &str) -> AppResult<UserModel> {
        let invalid = || AppError::Validation(INVALID_CODE.to_string());

        let user = User::find_by_email(email)
            .one(&self.db)
            .await?
            .ok_or_else(invalid)?;
        if user.verified {
            return Err(invalid());
        }
        let code_hash = user.verification_code_hash.clone().ok_or_else(invalid)?;

        let now = chrono::Utc::now().naive_utc();
        if user.verification_lapsed(now) {
            User::delete_by_id(user.id).exec(&self.db).await?;
            tracing::info!(
                user_id = user.id,
                "Verification window lapsed, pending account removed"
            );
            return Err(AppError::Validation(EXPIRED_CODE.to_string()));
        }

        let submitted = submitted.trim();
        if !is_well_formed_code(submitted) || !verify_password(submitted, &code_hash)? {
            return Err(invalid());
        }

        let mut active: user::ActiveModel = user.into();
        active.verified = Set(true);
        active.verification_code_hash = Set(None);
        active.verification_code_expires = Set(None);
        active.updated_at = Set(now);
        let user = active.update(&self.db).await?;
        tracing::info!(user_id = user.id, "Email verified");

        Ok(user)
    }

    /// Mail a new code to a pending account. Unknown and already verified
    /// addresses are ignored so the response does not reveal either.
    pub async fn resend_code(&self, email: &str, email_service: &EmailService) -> AppResult<()> {
        match User::find_by_email(email).one(&self.db).await? {
            Some(user) if !user.verified => {
                self.issue_code(&self.db, user, email_service).await?;
            }
            _ => tracing::debug!("Resend requested for unknown or verified email"),
        }
        Ok(())
    }
}
