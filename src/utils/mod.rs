pub mod cookie;
pub mod markdown;
pub mod password;
pub mod secret;
pub mod session;
pub mod signed_token;

pub use markdown::render_markdown;
pub use password::{hash_password, verify_password};
pub use session::SessionCodec;
pub use signed_token::TokenSigner;
