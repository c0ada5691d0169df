//! Record validation with Rails-style error messages.
//!
//! Rules mirror Devise's `validatable` defaults: email present, well formed and
//! unique, password between 6 and 128 characters.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

pub const PASSWORD_MIN_LENGTH: usize = 6;
pub const PASSWORD_MAX_LENGTH: usize = 128;
pub const EMAIL_MAX_LENGTH: usize = 255;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+$").expect("email pattern is a valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    /// `"email"` + `"is invalid"` -> `"Email is invalid"`
    pub fn full_message(&self) -> String {
        let mut chars = self.field.chars();
        let attribute = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        format!("{} {}", attribute.replace('_', " "), self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn on(&self, field: &str) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    pub fn full_messages(&self) -> Vec<String> {
        self.errors.iter().map(FieldError::full_message).collect()
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn email_taken() -> Self {
        let mut errors = Self::default();
        errors.add("email", "has already been taken");
        errors
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_messages().join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

pub fn require_present(errors: &mut ValidationErrors, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, "can't be blank");
    }
}

pub fn check_email(errors: &mut ValidationErrors, email: &str) {
    if email.trim().is_empty() {
        errors.add("email", "can't be blank");
        return;
    }
    if !EMAIL_REGEX.is_match(email) {
        errors.add("email", "is invalid");
    }
    if email.len() > EMAIL_MAX_LENGTH {
        errors.add(
            "email",
            format!("is too long (maximum is {} characters)", EMAIL_MAX_LENGTH),
        );
    }
}

pub fn check_password(errors: &mut ValidationErrors, password: &str) {
    let length = password.chars().count();
    if length == 0 {
        errors.add("password", "can't be blank");
    } else if length < PASSWORD_MIN_LENGTH {
        errors.add(
            "password",
            format!(
                "is too short (minimum is {} characters)",
                PASSWORD_MIN_LENGTH
            ),
        );
    } else if length > PASSWORD_MAX_LENGTH {
        errors.add(
            "password",
            format!(
                "is too long (maximum is {} characters)",
                PASSWORD_MAX_LENGTH
            ),
        );
    }
}

/// Devise strips and downcases authentication keys before saving.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_message_capitalizes_attribute() {
        let error = FieldError::new("full_name", "can't be blank");
        assert_eq!(error.full_message(), "Full name can't be blank");
    }

    #[test]
    fn test_check_email() {
        let cases = [
            ("a@b.com", true),
            ("ann.lee+tag@example.co.uk", true),
            ("no-at-sign", false),
            ("two@@example.com", false),
            ("space in@example.com", false),
            ("@example.com", false),
            ("ann@", false),
        ];

        for (email, valid) in cases {
            let mut errors = ValidationErrors::default();
            check_email(&mut errors, email);
            assert_eq!(errors.is_empty(), valid, "email: {}", email);
        }
    }

    #[test]
    fn test_blank_email_reports_only_blank() {
        let mut errors = ValidationErrors::default();
        check_email(&mut errors, "   ");
        assert_eq!(errors.on("email"), vec!["can't be blank"]);
    }

    #[test]
    fn test_overlong_email() {
        let email = format!("{}@example.com", "a".repeat(250));
        let mut errors = ValidationErrors::default();
        check_email(&mut errors, &email);
        assert_eq!(
            errors.full_messages(),
            vec!["Email is too long (maximum is 255 characters)".to_string()]
        );
    }

    #[test]
    fn test_password_length_bounds() {
        let mut errors = ValidationErrors::default();
        check_password(&mut errors, "short");
        assert_eq!(
            errors.full_messages(),
            vec!["Password is too short (minimum is 6 characters)".to_string()]
        );

        let mut errors = ValidationErrors::default();
        check_password(&mut errors, &"x".repeat(129));
        assert_eq!(errors.len(), 1);

        let mut errors = ValidationErrors::default();
        check_password(&mut errors, "sixsix");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_display_joins_messages() {
        let mut errors = ValidationErrors::default();
        errors.add("email", "is invalid");
        errors.add("uid", "can't be blank");
        assert_eq!(errors.to_string(), "Email is invalid, Uid can't be blank");
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ann@Example.COM "), "ann@example.com");
    }
}
