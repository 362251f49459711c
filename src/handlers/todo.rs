use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::TodoModel;
use crate::response::ApiResponse;
use crate::services::todo::{TodoNode, TodoService};
use axum::{response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTodoRequest {
    /// Task text (1-150 characters)
    #[validate(length(min = 1, max = 150))]
    pub task: String,
    /// Top-level task to file this one under
    pub parent_id: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TodoResponse {
    pub id: i32,
    pub task: String,
    pub completed: bool,
    pub parent_id: Option<i32>,
    pub created_at: String,
}

impl From<TodoModel> for TodoResponse {
    fn from(t: TodoModel) -> Self {
        Self {
            id: t.id,
            task: t.task,
            completed: t.completed,
            parent_id: t.parent_id,
            created_at: t.created_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TodoTreeNode {
    #[serde(flatten)]
    pub todo: TodoResponse,
    pub subtasks: Vec<TodoResponse>,
}

impl From<TodoNode> for TodoTreeNode {
    fn from(node: TodoNode) -> Self {
        Self {
            todo: TodoResponse::from(node.todo),
            subtasks: node.subtasks.into_iter().map(TodoResponse::from).collect(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/todos",
    security(("session" = [])),
    responses(
        (status = 200, description = "Top-level tasks with nested subtasks", body = Vec<TodoTreeNode>),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "todos"
)]
pub async fn list_todos(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let tree = TodoService::new(db).list_tree(auth_user.user.id).await?;
    let response: Vec<TodoTreeNode> = tree.into_iter().map(TodoTreeNode::from).collect();
    Ok(ApiResponse::ok(response))
}

#[utoipa::path(
    post,
    path = "/api/v1/todos",
    security(("session" = [])),
    request_body = CreateTodoRequest,
    responses(
        (status = 200, description = "Task created", body = TodoResponse),
        (status = 400, description = "Validation error or parent is a subtask", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
        (status = 404, description = "Parent task not found", body = AppError),
    ),
    tag = "todos"
)]
pub async fn create_todo(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Json(mut payload): Json<CreateTodoRequest>,
) -> AppResult<impl IntoResponse> {
    payload.task = payload.task.trim().to_string();
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    let todo = TodoService::new(db)
        .create(auth_user.user.id, payload.task, payload.parent_id)
        .await?;

    let message = if todo.parent_id.is_some() {
        "Subtask added."
    } else {
        "Task added."
    };
    Ok(ApiResponse::with_message(TodoResponse::from(todo), message))
}
