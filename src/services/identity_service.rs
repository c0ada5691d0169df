use crate::config::identity::IdentityConfig;
use crate::models::{
    auth_payload::{AuthInfo, AuthPayload},
    user::{NewUser, User},
    validation::{normalize_email, ValidationErrors},
};
use crate::repositories::user_repository::{RepositoryError, UserRepository};
use crate::services::token::{friendly_token, DEFAULT_TOKEN_LENGTH};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Invalid callback payload: {0}")]
    InvalidPayload(String),
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),
    #[error("Password hashing failed: {0}")]
    HashingError(String),
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

/// Outcome of resolving a callback payload.
///
/// `Rejected` carries the unsaved record and the reasons it could not be
/// stored; callers must check before starting a session.
#[derive(Debug, Clone)]
pub enum Resolution {
    Existing(User),
    Created(User),
    Rejected {
        user: NewUser,
        errors: ValidationErrors,
    },
}

impl Resolution {
    pub fn is_persisted(&self) -> bool {
        !matches!(self, Resolution::Rejected { .. })
    }

    pub fn was_created(&self) -> bool {
        matches!(self, Resolution::Created(_))
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Resolution::Existing(user) | Resolution::Created(user) => Some(user),
            Resolution::Rejected { .. } => None,
        }
    }

    pub fn into_user(self) -> Option<User> {
        match self {
            Resolution::Existing(user) | Resolution::Created(user) => Some(user),
            Resolution::Rejected { .. } => None,
        }
    }

    pub fn errors(&self) -> Option<&ValidationErrors> {
        match self {
            Resolution::Rejected { errors, .. } => Some(errors),
            _ => None,
        }
    }
}

/// Maps provider identities onto local users, creating them on first login.
pub struct IdentityResolver {
    repository: Arc<dyn UserRepository>,
    config: IdentityConfig,
}

impl IdentityResolver {
    pub fn new(repository: Arc<dyn UserRepository>, config: IdentityConfig) -> Self {
        Self { repository, config }
    }

    pub async fn resolve(&self, payload: &AuthPayload) -> Result<Resolution, IdentityError> {
        if payload.provider.trim().is_empty() {
            return Err(IdentityError::InvalidPayload(
                "provider must not be empty".to_string(),
            ));
        }
        if payload.uid.trim().is_empty() {
            return Err(IdentityError::InvalidPayload(
                "uid must not be empty".to_string(),
            ));
        }
        if !self.config.supports(&payload.provider) {
            return Err(IdentityError::UnsupportedProvider(payload.provider.clone()));
        }

        if let Some(user) = self
            .repository
            .find_by_provider_uid(&payload.provider, &payload.uid)
            .await?
        {
            tracing::debug!(
                user_id = user.id,
                provider = %user.provider,
                uid = %user.uid,
                "Resolved existing user"
            );
            return Ok(Resolution::Existing(user));
        }

        let new_user = self.build_user(&payload.provider, &payload.uid, &payload.info);
        self.create(new_user).await
    }

    fn build_user(&self, provider: &str, uid: &str, info: &AuthInfo) -> NewUser {
        NewUser {
            provider: provider.to_string(),
            uid: uid.to_string(),
            email: normalize_email(info.email.as_deref().unwrap_or_default()),
            full_name: info.name.clone(),
            avatar_url: info.image.clone(),
            password: friendly_token(DEFAULT_TOKEN_LENGTH),
            email_verified: self.config.trust_provider_email,
        }
    }

    async fn create(&self, new_user: NewUser) -> Result<Resolution, IdentityError> {
        let mut errors = new_user.validate().err().unwrap_or_default();

        // Uniqueness is only worth a query once the address itself is usable.
        if errors.on("email").is_empty() {
            if let Some(owner) = self.repository.find_by_email(&new_user.email).await? {
                if owner.provider == new_user.provider && owner.uid == new_user.uid {
                    // Stored by a concurrent login since our identity lookup.
                    return Ok(Resolution::Existing(owner));
                }
                errors.add("email", "has already been taken");
            }
        }

        if !errors.is_empty() {
            return Ok(reject(new_user, errors));
        }

        let password_hash = hash_password(&new_user.password)?;

        match self.repository.insert(&new_user, &password_hash).await {
            Ok(user) => {
                tracing::info!(
                    user_id = user.id,
                    provider = %user.provider,
                    uid = %user.uid,
                    email = %user.email,
                    "User saved successfully"
                );
                Ok(Resolution::Created(user))
            }
            Err(RepositoryError::AlreadyExists) => {
                // Another request won the insert; hand back its record.
                match self
                    .repository
                    .find_by_provider_uid(&new_user.provider, &new_user.uid)
                    .await?
                {
                    Some(user) => {
                        tracing::info!(
                            user_id = user.id,
                            provider = %user.provider,
                            uid = %user.uid,
                            "User created by a concurrent login, using existing record"
                        );
                        Ok(Resolution::Existing(user))
                    }
                    None => Ok(reject(new_user, ValidationErrors::email_taken())),
                }
            }
            Err(e) => Err(IdentityError::RepositoryError(e)),
        }
    }
}

fn reject(user: NewUser, errors: ValidationErrors) -> Resolution {
    tracing::error!(
        provider = %user.provider,
        uid = %user.uid,
        errors = ?errors.full_messages(),
        "User save failed"
    );
    Resolution::Rejected { user, errors }
}

fn hash_password(password: &str) -> Result<String, IdentityError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| IdentityError::HashingError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::user_repository::MockUserRepository;
    use mockall::predicate::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn google_payload(uid: &str, email: &str) -> AuthPayload {
        AuthPayload::new(
            "google_oauth2",
            uid,
            AuthInfo {
                email: Some(email.to_string()),
                name: Some("Ann".to_string()),
                image: Some("http://x/y.png".to_string()),
            },
        )
    }

    fn stored_user(id: i64, uid: &str, email: &str) -> User {
        User {
            id,
            provider: "google_oauth2".to_string(),
            uid: uid.to_string(),
            email: email.to_string(),
            full_name: Some("Ann".to_string()),
            avatar_url: Some("http://x/y.png".to_string()),
            password_hash: "hash".to_string(),
            email_verified: true,
            created_at: None,
        }
    }

    fn resolver(mock_repo: MockUserRepository) -> IdentityResolver {
        IdentityResolver::new(Arc::new(mock_repo), IdentityConfig::default())
    }

    #[tokio::test]
    async fn test_resolve_existing_user_skips_insert() {
        let mut mock_repo = MockUserRepository::new();
        let user = stored_user(1, "123", "a@b.com");

        let user_clone = user.clone();
        mock_repo
            .expect_find_by_provider_uid()
            .with(eq("google_oauth2"), eq("123"))
            .times(1)
            .returning(move |_, _| {
                let user = user_clone.clone();
                Box::pin(async move { Ok(Some(user)) })
            });

        let resolution = resolver(mock_repo)
            .resolve(&google_payload("123", "a@b.com"))
            .await
            .unwrap();

        assert!(matches!(resolution, Resolution::Existing(ref u) if *u == user));
        assert!(!resolution.was_created());
    }

    #[tokio::test]
    async fn test_resolve_creates_user_from_profile() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_find_by_provider_uid()
            .times(1)
            .returning(|_, _| Box::pin(async move { Ok(None) }));
        mock_repo
            .expect_find_by_email()
            .with(eq("a@b.com"))
            .times(1)
            .returning(|_| Box::pin(async move { Ok(None) }));
        mock_repo
            .expect_insert()
            .withf(|user: &NewUser, hash: &str| {
                user.provider == "google_oauth2"
                    && user.uid == "123"
                    && user.email == "a@b.com"
                    && user.full_name.as_deref() == Some("Ann")
                    && user.avatar_url.as_deref() == Some("http://x/y.png")
                    && user.password.len() >= DEFAULT_TOKEN_LENGTH
                    && user.email_verified
                    && hash.starts_with("$argon2")
                    && !hash.contains(&user.password)
            })
            .times(1)
            .returning(|_, _| Box::pin(async move { Ok(stored_user(1, "123", "a@b.com")) }));

        let resolution = resolver(mock_repo)
            .resolve(&google_payload("123", "a@b.com"))
            .await
            .unwrap();

        assert!(resolution.was_created());
        assert_eq!(resolution.user().map(|u| u.id), Some(1));
    }

    #[tokio::test]
    async fn test_resolve_normalizes_email() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_find_by_provider_uid()
            .returning(|_, _| Box::pin(async move { Ok(None) }));
        mock_repo
            .expect_find_by_email()
            .with(eq("ann@example.com"))
            .times(1)
            .returning(|_| Box::pin(async move { Ok(None) }));
        mock_repo
            .expect_insert()
            .withf(|user: &NewUser, _: &str| user.email == "ann@example.com")
            .times(1)
            .returning(|_, _| {
                Box::pin(async move { Ok(stored_user(2, "123", "ann@example.com")) })
            });

        let resolution = resolver(mock_repo)
            .resolve(&google_payload("123", "  Ann@Example.com "))
            .await
            .unwrap();

        assert!(resolution.was_created());
    }

    #[tokio::test]
    async fn test_resolve_malformed_email_is_rejected_without_insert() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_find_by_provider_uid()
            .times(1)
            .returning(|_, _| Box::pin(async move { Ok(None) }));

        let resolution = resolver(mock_repo)
            .resolve(&google_payload("123", "not-an-email"))
            .await
            .unwrap();

        match resolution {
            Resolution::Rejected { user, errors } => {
                assert!(!user.is_valid());
                assert_eq!(user.uid, "123");
                assert_eq!(errors.full_messages(), vec!["Email is invalid".to_string()]);
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resolve_missing_email_is_rejected() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_find_by_provider_uid()
            .returning(|_, _| Box::pin(async move { Ok(None) }));

        let payload = AuthPayload::new("google_oauth2", "123", AuthInfo::default());
        let resolution = resolver(mock_repo).resolve(&payload).await.unwrap();

        assert!(!resolution.is_persisted());
        assert_eq!(
            resolution.errors().map(|e| e.full_messages()),
            Some(vec!["Email can't be blank".to_string()])
        );
    }

    #[tokio::test]
    async fn test_resolve_email_taken_by_other_identity() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_find_by_provider_uid()
            .returning(|_, _| Box::pin(async move { Ok(None) }));
        mock_repo.expect_find_by_email().times(1).returning(|_| {
            Box::pin(async move { Ok(Some(stored_user(5, "other-uid", "a@b.com"))) })
        });

        let resolution = resolver(mock_repo)
            .resolve(&google_payload("123", "a@b.com"))
            .await
            .unwrap();

        assert_eq!(
            resolution.errors().map(|e| e.full_messages()),
            Some(vec!["Email has already been taken".to_string()])
        );
    }

    #[tokio::test]
    async fn test_resolve_email_owned_by_same_identity_returns_it() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_find_by_provider_uid()
            .times(1)
            .returning(|_, _| Box::pin(async move { Ok(None) }));
        mock_repo.expect_find_by_email().times(1).returning(|_| {
            Box::pin(async move { Ok(Some(stored_user(4, "123", "a@b.com"))) })
        });
        mock_repo.expect_insert().times(0);

        let resolution = resolver(mock_repo)
            .resolve(&google_payload("123", "a@b.com"))
            .await
            .unwrap();

        assert!(matches!(resolution, Resolution::Existing(ref u) if u.id == 4));
    }

    #[tokio::test]
    async fn test_resolve_lost_insert_race_returns_winner() {
        let mut mock_repo = MockUserRepository::new();
        let lookups = Arc::new(AtomicUsize::new(0));

        let counter = lookups.clone();
        mock_repo
            .expect_find_by_provider_uid()
            .times(2)
            .returning(move |_, _| {
                let call = counter.fetch_add(1, Ordering::SeqCst);
                Box::pin(async move {
                    if call == 0 {
                        Ok(None)
                    } else {
                        Ok(Some(stored_user(9, "123", "a@b.com")))
                    }
                })
            });
        mock_repo
            .expect_find_by_email()
            .returning(|_| Box::pin(async move { Ok(None) }));
        mock_repo
            .expect_insert()
            .times(1)
            .returning(|_, _| Box::pin(async move { Err(RepositoryError::AlreadyExists) }));

        let resolution = resolver(mock_repo)
            .resolve(&google_payload("123", "a@b.com"))
            .await
            .unwrap();

        assert!(matches!(resolution, Resolution::Existing(ref u) if u.id == 9));
        assert_eq!(lookups.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_resolve_lost_email_race_is_rejected() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_find_by_provider_uid()
            .times(2)
            .returning(|_, _| Box::pin(async move { Ok(None) }));
        mock_repo
            .expect_find_by_email()
            .returning(|_| Box::pin(async move { Ok(None) }));
        mock_repo
            .expect_insert()
            .times(1)
            .returning(|_, _| Box::pin(async move { Err(RepositoryError::AlreadyExists) }));

        let resolution = resolver(mock_repo)
            .resolve(&google_payload("123", "a@b.com"))
            .await
            .unwrap();

        assert_eq!(
            resolution.errors().map(|e| e.full_messages()),
            Some(vec!["Email has already been taken".to_string()])
        );
    }

    #[tokio::test]
    async fn test_resolve_blank_uid_is_invalid_payload() {
        let mock_repo = MockUserRepository::new();

        let result = resolver(mock_repo)
            .resolve(&google_payload("  ", "a@b.com"))
            .await;

        assert!(matches!(result, Err(IdentityError::InvalidPayload(_))));
    }

    #[tokio::test]
    async fn test_resolve_unsupported_provider() {
        let mock_repo = MockUserRepository::new();

        let payload = AuthPayload::new("github", "123", AuthInfo::default());
        let result = resolver(mock_repo).resolve(&payload).await;

        assert!(matches!(
            result,
            Err(IdentityError::UnsupportedProvider(ref p)) if p == "github"
        ));
    }

    #[tokio::test]
    async fn test_resolve_untrusted_provider_email_is_unverified() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_find_by_provider_uid()
            .returning(|_, _| Box::pin(async move { Ok(None) }));
        mock_repo
            .expect_find_by_email()
            .returning(|_| Box::pin(async move { Ok(None) }));
        mock_repo
            .expect_insert()
            .withf(|user: &NewUser, _: &str| !user.email_verified)
            .times(1)
            .returning(|_, _| Box::pin(async move { Ok(stored_user(1, "123", "a@b.com")) }));

        let config = IdentityConfig {
            trust_provider_email: false,
            ..IdentityConfig::default()
        };
        let resolver = IdentityResolver::new(Arc::new(mock_repo), config);

        let resolution = resolver
            .resolve(&google_payload("123", "a@b.com"))
            .await
            .unwrap();
        assert!(resolution.was_created());
    }

    #[tokio::test]
    async fn test_resolve_propagates_database_errors() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo.expect_find_by_provider_uid().returning(|_, _| {
            Box::pin(async move { Err(RepositoryError::Database(sqlx::Error::PoolTimedOut)) })
        });

        let result = resolver(mock_repo)
            .resolve(&google_payload("123", "a@b.com"))
            .await;

        assert!(matches!(result, Err(IdentityError::RepositoryError(_))));
    }
}
