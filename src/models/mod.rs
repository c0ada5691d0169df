pub mod auth_payload;
pub mod user;
pub mod validation;

pub use auth_payload::{AuthInfo, AuthPayload, CallbackBody};
pub use user::{NewUser, User};
pub use validation::{FieldError, ValidationErrors};
