use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::PersonModel;
use crate::response::ApiResponse;
use crate::services::person::{NewPerson, PersonService};
use axum::{response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePersonRequest {
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    /// Date of birth, free-form (max 50 characters)
    #[validate(length(min = 1, max = 50))]
    pub dob: String,
    /// How the user knows this person
    #[validate(length(min = 1, max = 150))]
    pub relationship: String,
    #[validate(length(max = 150))]
    pub education: Option<String>,
    #[validate(length(max = 250))]
    pub address: Option<String>,
    #[validate(length(max = 10))]
    pub gender: Option<String>,
    #[validate(length(max = 150))]
    pub work: Option<String>,
    #[validate(length(max = 250))]
    pub work_history: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PersonResponse {
    pub id: i32,
    pub name: String,
    pub dob: String,
    pub relationship: String,
    pub education: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub work: Option<String>,
    pub work_history: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
}

impl From<PersonModel> for PersonResponse {
    fn from(p: PersonModel) -> Self {
        Self {
            id: p.id,
            name: p.name,
            dob: p.dob,
            relationship: p.relationship,
            education: p.education,
            address: p.address,
            gender: p.gender,
            work: p.work,
            work_history: p.work_history,
            notes: p.notes,
            created_at: p.created_at.to_string(),
        }
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[utoipa::path(
    get,
    path = "/api/v1/people",
    security(("session" = [])),
    responses(
        (status = 200, description = "The current user's contacts, by name", body = Vec<PersonResponse>),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "people"
)]
pub async fn list_people(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let people = PersonService::new(db).list(auth_user.user.id).await?;
    let response: Vec<PersonResponse> = people.into_iter().map(PersonResponse::from).collect();
    Ok(ApiResponse::ok(response))
}

#[utoipa::path(
    post,
    path = "/api/v1/people",
    security(("session" = [])),
    request_body = CreatePersonRequest,
    responses(
        (status = 200, description = "Contact created", body = PersonResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "people"
)]
pub async fn create_person(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(mut payload): Json<CreatePersonRequest>,
) -> AppResult<impl IntoResponse> {
    payload.name = payload.name.trim().to_string();
    payload.dob = payload.dob.trim().to_string();
    payload.relationship = payload.relationship.trim().to_string();
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    let person = PersonService::new(db)
        .create(
            auth_user.user.id,
            NewPerson {
                name: payload.name,
                dob: payload.dob,
                relationship: payload.relationship,
                education: blank_to_none(payload.education),
                address: blank_to_none(payload.address),
                gender: blank_to_none(payload.gender),
                work: blank_to_none(payload.work),
                work_history: blank_to_none(payload.work_history),
                notes: blank_to_none(payload.notes),
            },
        )
        .await?;

    Ok(ApiResponse::with_message(
        PersonResponse::from(person),
        "Person added.",
    ))
}
