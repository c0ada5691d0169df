pub mod identity_service;
pub mod token;
pub mod user_service;

pub use identity_service::{IdentityError, IdentityResolver, Resolution};
pub use token::friendly_token;
pub use user_service::{UserService, UserServiceError};
