use crate::{
    error::{AppError, AppResult},
    models::{todo, Todo, TodoModel},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use std::collections::HashMap;

/// A top-level task with its direct subtasks.
#[derive(Debug, Clone)]
pub struct TodoNode {
    pub todo: TodoModel,
    pub subtasks: Vec<TodoModel>,
}

pub struct TodoService {
    db: DatabaseConnection,
}

impl TodoService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Top-level tasks in creation order, each with its subtasks.
    pub async fn list_tree(&self, user_id: i32) -> AppResult<Vec<TodoNode>> {
        let todos = Todo::find()
            .filter(todo::Column::UserId.eq(user_id))
            .order_by_asc(todo::Column::Id)
            .all(&self.db)
            .await?;
        Ok(build_tree(todos))
    }

    /// Create a task, or a subtask when `parent_id` names one of the user's
    /// top-level tasks.
    pub async fn create(
        &self,
        user_id: i32,
        task: String,
        parent_id: Option<i32>,
    ) -> AppResult<TodoModel> {
        if let Some(parent_id) = parent_id {
            let parent = Todo::find_by_id(parent_id)
                .filter(todo::Column::UserId.eq(user_id))
                .one(&self.db)
                .await?
                .ok_or_else(|| AppError::not_found("Parent task"))?;
            if parent.parent_id.is_some() {
                return Err(AppError::Validation(
                    "Subtasks cannot have subtasks of their own".to_string(),
                ));
            }
        }

        let model = todo::ActiveModel {
            user_id: Set(user_id),
            task: Set(task),
            completed: Set(false),
            parent_id: Set(parent_id),
            created_at: Set(chrono::Utc::now().naive_utc()),
            ..Default::default()
        };
        Ok(model.insert(&self.db).await?)
    }
}

fn build_tree(todos: Vec<TodoModel>) -> Vec<TodoNode> {
    let (roots, children): (Vec<_>, Vec<_>) =
        todos.into_iter().partition(|t| t.parent_id.is_none());

    let mut by_parent: HashMap<i32, Vec<TodoModel>> = HashMap::new();
    for child in children {
        if let Some(parent_id) = child.parent_id {
            by_parent.entry(parent_id).or_default().push(child);
        }
    }

    roots
        .into_iter()
        .map(|todo| {
            let subtasks = by_parent.remove(&todo.id).unwrap_or_default();
            TodoNode { todo, subtasks }
        })
        .collect()
}
