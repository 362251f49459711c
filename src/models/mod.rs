pub mod note;
pub mod person;
pub mod todo;
pub mod user;

pub use note::{Entity as Note, Model as NoteModel};
pub use person::{Entity as Person, Model as PersonModel};
pub use todo::{Entity as Todo, Model as TodoModel};
pub use user::{normalize_email, Entity as User, Identity, Model as UserModel};
