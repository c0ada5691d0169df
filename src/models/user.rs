use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use super::validation::{self, ValidationErrors};

/// A user row resolved from a provider identity.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub provider: String,
    pub uid: String,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub email_verified: bool,
    pub created_at: Option<String>,
}

/// An unsaved user built from a callback payload.
///
/// `password` holds the plain generated token; the store only ever sees its hash.
#[derive(Clone, PartialEq, Eq)]
pub struct NewUser {
    pub provider: String,
    pub uid: String,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub password: String,
    pub email_verified: bool,
}

impl NewUser {
    /// Field-level checks that need no store access.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        validation::require_present(&mut errors, "provider", &self.provider);
        validation::require_present(&mut errors, "uid", &self.uid);
        validation::check_email(&mut errors, &self.email);
        validation::check_password(&mut errors, &self.password);

        errors.into_result()
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("provider", &self.provider)
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .field("avatar_url", &self.avatar_url)
            .field("password", &"[REDACTED]")
            .field("email_verified", &self.email_verified)
            .finish()
    }
}
