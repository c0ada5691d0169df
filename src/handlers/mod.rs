pub mod callback_handlers;
pub mod user_handlers;

pub use callback_handlers::oauth_callback;
pub use user_handlers::{get_user, health, list_users};
