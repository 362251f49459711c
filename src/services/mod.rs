pub mod auth;
pub mod email;
pub mod note;
pub mod person;
pub mod reset;
pub mod todo;
pub mod verification;
