use crate::models::user::User;
use crate::repositories::user_repository::{RepositoryError, UserRepository};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    #[error("User not found")]
    UserNotFound,
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

/// Read-side queries over resolved users.
pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    pub async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, UserServiceError> {
        Ok(self.repository.find_by_id(id).await?)
    }

    pub async fn get_user(&self, id: i64) -> Result<User, UserServiceError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserServiceError::UserNotFound)
    }

    pub async fn find_user_by_identity(
        &self,
        provider: &str,
        uid: &str,
    ) -> Result<Option<User>, UserServiceError> {
        Ok(self.repository.find_by_provider_uid(provider, uid).await?)
    }

    pub async fn list_users(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<User>, UserServiceError> {
        Ok(self.repository.list_users(limit, offset).await?)
    }

    pub async fn count_users(&self) -> Result<i64, UserServiceError> {
        Ok(self.repository.count().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::user_repository::MockUserRepository;
    use mockall::predicate::*;

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_find_by_id()
            .with(eq(1))
            .times(1)
            .returning(|_| Box::pin(async move { Ok(None) }));

        let service = UserService::new(Arc::new(mock_repo));

        let result = service.get_user(1).await;
        assert!(matches!(result, Err(UserServiceError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_find_user_by_identity_passes_key() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_find_by_provider_uid()
            .with(eq("google_oauth2"), eq("abc"))
            .times(1)
            .returning(|_, _| Box::pin(async move { Ok(None) }));

        let service = UserService::new(Arc::new(mock_repo));

        let result = service.find_user_by_identity("google_oauth2", "abc").await;
        assert!(matches!(result, Ok(None)));
    }
}
