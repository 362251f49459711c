use sea_orm::entity::prelude::*;
use sea_orm::{QueryFilter, Select};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub verified: bool,
    #[serde(skip_serializing)]
    pub verification_code_hash: Option<String>,
    pub verification_code_expires: Option<DateTime>,
    #[serde(skip_serializing)]
    pub reset_token_hash: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token_expires: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::note::Entity")]
    Note,
    #[sea_orm(has_many = "super::todo::Entity")]
    Todo,
    #[sea_orm(has_many = "super::person::Entity")]
    Person,
}

impl Related<super::note::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Note.def()
    }
}

impl Related<super::todo::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Todo.def()
    }
}

impl Related<super::person::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Person.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Emails are compared case-insensitively and stored in this form.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Entity {
    pub fn find_by_email(email: &str) -> Select<Entity> {
        Self::find().filter(Column::Email.eq(normalize_email(email)))
    }
}

/// What the auth gate needs to know about whoever is behind a session.
pub trait Identity {
    /// Stable id embedded in the session token.
    fn id(&self) -> i32;
    fn is_authenticated(&self) -> bool;
    /// Only active identities may hold a session.
    fn is_active(&self) -> bool;
}

impl Identity for Model {
    fn id(&self) -> i32 {
        self.id
    }

    fn is_authenticated(&self) -> bool {
        true
    }

    fn is_active(&self) -> bool {
        self.verified
    }
}

impl Model {
    /// A pending account whose verification window has closed.
    pub fn verification_lapsed(&self, now: DateTime) -> bool {
        !self.verified
            && self
                .verification_code_expires
                .is_some_and(|expires| now > expires)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn user(verified: bool, expires: Option<DateTime>) -> Model {
        let now = Utc::now().naive_utc();
        Model {
            id: 7,
            email: "a@x.com".to_string(),
            name: "A".to_string(),
            password_hash: String::new(),
            verified,
            verification_code_hash: None,
            verification_code_expires: expires,
            reset_token_hash: None,
            reset_token_expires: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn emails_are_normalised() {
        assert_eq!(normalize_email("  A@X.com "), "a@x.com");
    }

    #[test]
    fn only_verified_users_are_active() {
        assert!(user(true, None).is_active());
        assert!(!user(false, None).is_active());
        assert_eq!(user(true, None).id(), 7);
    }

    #[test]
    fn lapse_requires_tracked_expiry() {
        let now = Utc::now().naive_utc();
        assert!(user(false, Some(now - Duration::seconds(1))).verification_lapsed(now));
        assert!(!user(false, Some(now + Duration::seconds(60))).verification_lapsed(now));
        assert!(!user(false, None).verification_lapsed(now));
        assert!(!user(true, Some(now - Duration::seconds(1))).verification_lapsed(now));
    }
}
