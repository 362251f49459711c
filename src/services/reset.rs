use crate::{
    config::auth::{AuthConfig, ResetTokenMode},
    error::{AppError, AppResult},
    models::{user, User, UserModel},
    services::email::EmailService,
    utils::{
        hash_password,
        secret::{generate_reset_token, hash_token},
        TokenSigner,
    },
};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection,
    EntityTrait, QueryFilter,
};

pub const INVALID_TOKEN: &str = "Invalid reset token";
pub const EXPIRED_TOKEN: &str = "Reset token has expired";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetRequestOutcome {
    Sent,
    UnknownEmail,
}

/// Password reset by emailed link.
///
/// In `Stored` mode a random token is mailed and its hash kept on the user
/// row; consuming it clears the row, so each token works once. In `Signed`
/// mode the token is an HMAC-signed `{email, issued_at}` payload checked
/// against `reset_token_ttl`; nothing is stored and a token can be replayed
/// until it ages out.
pub struct ResetService {
    db: DatabaseConnection,
    config: AuthConfig,
    signer: TokenSigner,
}

impl ResetService {
    pub fn new(db: DatabaseConnection, config: AuthConfig, signer: TokenSigner) -> Self {
        Self { db, config, signer }
    }

    pub async fn request_reset(
        &self,
        email: &str,
        email_service: &EmailService,
    ) -> AppResult<ResetRequestOutcome> {
        let Some(user) = User::find_by_email(email).one(&self.db).await? else {
            tracing::info!("Password reset requested for unknown email");
            return Ok(ResetRequestOutcome::UnknownEmail);
        };

        let now = chrono::Utc::now().naive_utc();
        let token = match self.config.reset_mode {
            ResetTokenMode::Stored => {
                let token = generate_reset_token()?;
                let mut active: user::ActiveModel = user.clone().into();
                active.reset_token_hash = Set(Some(hash_token(&token)));
                active.reset_token_expires = Set(Some(now + self.config.reset_token_ttl));
                active.updated_at = Set(now);
                active.update(&self.db).await?;
                token
            }
            ResetTokenMode::Signed => self
                .signer
                .issue_reset_token(&user.email, now.and_utc().timestamp())?,
        };

        email_service
            .send_password_reset(&user.email, &token, self.config.reset_token_ttl)
            .await?;
        tracing::info!(user_id = user.id, "Password reset link sent");

        Ok(ResetRequestOutcome::Sent)
    }

    /// Resolve `token` to its user without consuming it.
    pub async fn validate_reset(&self, token: &str) -> AppResult<UserModel> {
        let invalid = || AppError::Validation(INVALID_TOKEN.to_string());
        let now = chrono::Utc::now().naive_utc();

        match self.config.reset_mode {
            ResetTokenMode::Stored => {
                let user = User::find()
                    .filter(user::Column::ResetTokenHash.eq(hash_token(token)))
                    .one(&self.db)
                    .await?
                    .ok_or_else(invalid)?;
                match user.reset_token_expires {
                    Some(expires) if now <= expires => Ok(user),
                    _ => Err(AppError::Validation(EXPIRED_TOKEN.to_string())),
                }
            }
            ResetTokenMode::Signed => {
                let claims = self.signer.verify_reset_token(
                    token,
                    self.config.reset_token_ttl.num_seconds(),
                    now.and_utc().timestamp(),
                )?;
                User::find_by_email(&claims.email)
                    .one(&self.db)
                    .await?
                    .ok_or_else(invalid)
            }
        }
    }

    /// Validate `token` and overwrite the user's password.
    pub async fn consume_reset(&self, token: &str, new_password: &str) -> AppResult<()> {
        let user = self.validate_reset(token).await?;
        let new_hash = hash_password(new_password, self.config.bcrypt_cost)?;
        let now = chrono::Utc::now().naive_utc();

        match self.config.reset_mode {
            ResetTokenMode::Stored => {
                // Conditional on the token still being present, so two
                // concurrent submissions cannot both succeed.
                let result = User::update_many()
                    .col_expr(user::Column::PasswordHash, Expr::value(new_hash))
                    .col_expr(user::Column::ResetTokenHash, Expr::value(Option::<String>::None))
                    .col_expr(
                        user::Column::ResetTokenExpires,
                        Expr::value(Option::<chrono::NaiveDateTime>::None),
                    )
                    .col_expr(user::Column::UpdatedAt, Expr::value(now))
                    .filter(user::Column::Id.eq(user.id))
                    .filter(user::Column::ResetTokenHash.eq(hash_token(token)))
                    .exec(&self.db)
                    .await?;
                if result.rows_affected != 1 {
                    return Err(AppError::Validation(INVALID_TOKEN.to_string()));
                }
            }
            ResetTokenMode::Signed => {
                let mut active: user::ActiveModel = user.clone().into();
                active.password_hash = Set(new_hash);
                active.updated_at = Set(now);
                active.update(&self.db).await?;
            }
        }

        tracing::info!(user_id = user.id, "Password reset");
        Ok(())
    }
}
