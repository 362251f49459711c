use crate::{
    error::AppResult,
    models::{note, Note, NoteModel},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};

pub struct NewNote {
    pub title: String,
    pub content: String,
    pub folder: Option<String>,
}

pub struct NoteService {
    db: DatabaseConnection,
}

impl NoteService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Newest first, optionally restricted to one folder.
    pub async fn list(&self, user_id: i32, folder: Option<&str>) -> AppResult<Vec<NoteModel>> {
        let mut query = Note::find().filter(note::Column::UserId.eq(user_id));
        if let Some(folder) = folder {
            query = query.filter(note::Column::Folder.eq(folder));
        }

        let notes = query
            .order_by_desc(note::Column::CreatedAt)
            .order_by_desc(note::Column::Id)
            .all(&self.db)
            .await?;
        Ok(notes)
    }

    pub async fn create(&self, user_id: i32, new_note: NewNote) -> AppResult<NoteModel> {
        let model = note::ActiveModel {
            user_id: Set(user_id),
            title: Set(new_note.title),
            content: Set(new_note.content),
            folder: Set(new_note.folder),
            created_at: Set(chrono::Utc::now().naive_utc()),
            ..Default::default()
        };
        Ok(model.insert(&self.db).await?)
    }
}
