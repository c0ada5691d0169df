use std::env;

pub const DEFAULT_PROVIDERS: &[&str] = &["google_oauth2"];

/// Which providers may create accounts and how their profile email is trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    pub providers: Vec<String>,
    /// Accounts created through a provider start with a confirmed email.
    pub trust_provider_email: bool,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            providers: DEFAULT_PROVIDERS.iter().map(|p| p.to_string()).collect(),
            trust_provider_email: true,
        }
    }
}

impl IdentityConfig {
    pub fn from_env() -> Self {
        let providers = match env::var("OAUTH_PROVIDERS") {
            Ok(value) if !value.trim().is_empty() => parse_provider_list(&value),
            _ => Self::default().providers,
        };

        IdentityConfig {
            providers,
            trust_provider_email: env_flag("OAUTH_TRUST_PROVIDER_EMAIL", true),
        }
    }

    pub fn supports(&self, provider: &str) -> bool {
        self.providers.iter().any(|p| p == provider)
    }
}

pub fn parse_provider_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Case-insensitive boolean; `None` for anything unrecognised.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn env_flag(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => parse_flag(&value).unwrap_or_else(|| {
            tracing::warn!(key, value = %value, default, "Unrecognised boolean, using default");
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_supports_google_only() {
        let config = IdentityConfig::default();
        assert!(config.supports("google_oauth2"));
        assert!(!config.supports("github"));
        assert!(config.trust_provider_email);
    }

    #[test]
    fn test_parse_flag_ignores_case() {
        for value in ["1", "true", "TRUE", "Yes", "YES", "on", " On "] {
            assert_eq!(parse_flag(value), Some(true), "value: {}", value);
        }
        for value in ["0", "false", "False", "NO", "off", "OFF"] {
            assert_eq!(parse_flag(value), Some(false), "value: {}", value);
        }
        assert_eq!(parse_flag("maybe"), None);
        assert_eq!(parse_flag(""), None);
    }

    #[test]
    fn test_parse_provider_list() {
        assert_eq!(
            parse_provider_list(" google_oauth2, github ,,"),
            vec!["google_oauth2".to_string(), "github".to_string()]
        );
    }
}
