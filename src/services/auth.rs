use crate::{
    config::auth::AuthConfig,
    error::{AppError, AppResult},
    models::{normalize_email, note, person, todo, user, Note, Person, Todo, User, UserModel},
    services::{email::EmailService, verification::VerificationService},
    utils::{hash_password, verify_password},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, SqlErr, TransactionTrait,
};

pub struct AuthService {
    db: DatabaseConnection,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(db: DatabaseConnection, config: AuthConfig) -> Self {
        Self { db, config }
    }

    /// Create a pending (unverified) account and mail its verification code.
    ///
    /// The row is only committed once the message has been handed to the
    /// mail transport. A pending account whose verification window has
    /// lapsed does not block the address; it is removed first.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        email_service: &EmailService,
    ) -> AppResult<UserModel> {
        let email = normalize_email(email);
        let now = chrono::Utc::now().naive_utc();

        if let Some(existing) = User::find_by_email(&email).one(&self.db).await? {
            if !existing.verification_lapsed(now) {
                return Err(duplicate_email());
            }
            User::delete_by_id(existing.id).exec(&self.db).await?;
            tracing::info!(
                user_id = existing.id,
                "Removed lapsed pending account before re-registration"
            );
        }

        let password_hash = hash_password(password, self.config.bcrypt_cost)?;

        let txn = self.db.begin().await?;
        let new_user = user::ActiveModel {
            email: Set(email),
            name: Set(name.trim().to_string()),
            password_hash: Set(password_hash),
            verified: Set(false),
            verification_code_hash: Set(None),
            verification_code_expires: Set(None),
            reset_token_hash: Set(None),
            reset_token_expires: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let user = new_user.insert(&txn).await.map_err(map_unique_violation)?;

        let user = VerificationService::new(self.db.clone(), self.config)
            .issue_code(&txn, user, email_service)
            .await?;
        txn.commit().await?;

        tracing::info!(user_id = user.id, "User registered, awaiting verification");
        Ok(user)
    }

    /// Check credentials. Correct credentials on an unverified account are
    /// still refused.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<UserModel> {
        let user = User::find_by_email(email)
            .one(&self.db)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        if !user.verified {
            return Err(AppError::AccountNotVerified);
        }

        Ok(user)
    }

    pub async fn get_user_by_id(&self, id: i32) -> AppResult<UserModel> {
        User::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }

    /// Remove the account and everything it owns after re-checking the
    /// password.
    pub async fn delete_account(&self, user_id: i32, password: &str) -> AppResult<()> {
        let user = self.get_user_by_id(user_id).await?;
        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Validation("Incorrect password".to_string()));
        }

        let txn = self.db.begin().await?;
        Note::delete_many()
            .filter(note::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        // Subtasks first so no row ever points at a deleted parent.
        Todo::delete_many()
            .filter(todo::Column::UserId.eq(user_id))
            .filter(todo::Column::ParentId.is_not_null())
            .exec(&txn)
            .await?;
        Todo::delete_many()
            .filter(todo::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        Person::delete_many()
            .filter(person::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        User::delete_by_id(user_id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!(user_id, "Account deleted");
        Ok(())
    }
}

fn duplicate_email() -> AppError {
    AppError::Conflict("Email address is already registered".to_string())
}

fn map_unique_violation(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => duplicate_email(),
        _ => err.into(),
    }
}
