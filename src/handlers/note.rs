use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::NoteModel;
use crate::response::ApiResponse;
use crate::services::note::{NewNote, NoteService};
use crate::utils::render_markdown;
use axum::{extract::Query, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateNoteRequest {
    /// Note title (1-150 characters)
    #[validate(length(min = 1, max = 150))]
    pub title: String,
    /// Markdown body
    #[validate(length(min = 1))]
    pub content: String,
    /// Optional folder name (max 150 characters)
    #[validate(length(max = 150))]
    pub folder: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NoteListQuery {
    /// Only return notes filed under this folder
    pub folder: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NoteResponse {
    pub id: i32,
    pub title: String,
    /// Markdown source
    pub content: String,
    /// Sanitized HTML rendering of `content`
    pub content_html: String,
    pub folder: Option<String>,
    pub created_at: String,
}

impl From<NoteModel> for NoteResponse {
    fn from(n: NoteModel) -> Self {
        Self {
            id: n.id,
            title: n.title,
            content_html: render_markdown(&n.content),
            content: n.content,
            folder: n.folder,
            created_at: n.created_at.to_string(),
        }
    }
}

/// Blank folder names file the note nowhere.
fn normalize_folder(folder: Option<String>) -> Option<String> {
    folder
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
}

#[utoipa::path(
    get,
    path = "/api/v1/notes",
    security(("session" = [])),
    params(NoteListQuery),
    responses(
        (status = 200, description = "The current user's notes, newest first", body = Vec<NoteResponse>),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "notes"
)]
pub async fn list_notes(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Query(query): Query<NoteListQuery>,
) -> AppResult<impl IntoResponse> {
    let folder = normalize_folder(query.folder);
    let notes = NoteService::new(db)
        .list(auth_user.user.id, folder.as_deref())
        .await?;
    let response: Vec<NoteResponse> = notes.into_iter().map(NoteResponse::from).collect();
    Ok(ApiResponse::ok(response))
}

#[utoipa::path(
    post,
    path = "/api/v1/notes",
    security(("session" = [])),
    request_body = CreateNoteRequest,
    responses(
        (status = 200, description = "Note created", body = NoteResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "notes"
)]
pub async fn create_note(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(mut payload): Json<CreateNoteRequest>,
) -> AppResult<impl IntoResponse> {
    payload.title = payload.title.trim().to_string();
    payload.folder = normalize_folder(payload.folder);
    if payload.content.trim().is_empty() {
        payload.content.clear();
    }
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    let note = NoteService::new(db)
        .create(
            auth_user.user.id,
            NewNote {
                title: payload.title,
                content: payload.content,
                folder: payload.folder,
            },
        )
        .await?;

    Ok(ApiResponse::with_message(
        NoteResponse::from(note),
        "Note added.",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_folder_is_none() {
        assert_eq!(normalize_folder(Some("  ".into())), None);
        assert_eq!(normalize_folder(None), None);
        assert_eq!(
            normalize_folder(Some(" Work ".into())).as_deref(),
            Some("Work")
        );
    }
}
