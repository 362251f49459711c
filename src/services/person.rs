use crate::{
    error::AppResult,
    models::{person, Person, PersonModel},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};

pub struct NewPerson {
    pub name: String,
    pub dob: String,
    pub relationship: String,
    pub education: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub work: Option<String>,
    pub work_history: Option<String>,
    pub notes: Option<String>,
}

pub struct PersonService {
    db: DatabaseConnection,
}

impl PersonService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self, user_id: i32) -> AppResult<Vec<PersonModel>> {
        let people = Person::find()
            .filter(person::Column::UserId.eq(user_id))
            .order_by_asc(person::Column::Name)
            .order_by_asc(person::Column::Id)
            .all(&self.db)
            .await?;
        Ok(people)
    }

    pub async fn create(&self, user_id: i32, new_person: NewPerson) -> AppResult<PersonModel> {
        let model = person::ActiveModel {
            user_id: Set(user_id),
            name: Set(new_person.name),
            dob: Set(new_person.dob),
            relationship: Set(new_person.relationship),
            education: Set(new_person.education),
            address: Set(new_person.address),
            gender: Set(new_person.gender),
            work: Set(new_person.work),
            work_history: Set(new_person.work_history),
            notes: Set(new_person.notes),
            created_at: Set(chrono::Utc::now().naive_utc()),
            ..Default::default()
        };
        Ok(model.insert(&self.db).await?)
    }
}
