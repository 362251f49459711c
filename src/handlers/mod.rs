pub mod auth;
pub mod note;
pub mod person;
pub mod todo;

pub use auth::*;
