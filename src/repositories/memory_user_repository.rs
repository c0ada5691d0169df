use crate::models::user::{NewUser, User};
use crate::repositories::user_repository::{
    RepositoryError, RepositoryResult, UserRepository, DEFAULT_LIST_LIMIT,
};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Process-local store with the same uniqueness rules as the `users` table.
#[derive(Default)]
pub struct InMemoryUserRepository {
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    users: Vec<User>,
    next_id: i64,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_provider_uid(
        &self,
        provider: &str,
        uid: &str,
    ) -> RepositoryResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .find(|u| u.provider == provider && u.uid == uid)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, user: &NewUser, password_hash: &str) -> RepositoryResult<User> {
        let mut state = self.state.write().await;

        let taken = state.users.iter().any(|u| {
            (u.provider == user.provider && u.uid == user.uid)
                || u.email.eq_ignore_ascii_case(&user.email)
        });
        if taken {
            return Err(RepositoryError::AlreadyExists);
        }

        state.next_id += 1;
        let stored = User {
            id: state.next_id,
            provider: user.provider.clone(),
            uid: user.uid.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            avatar_url: user.avatar_url.clone(),
            password_hash: password_hash.to_string(),
            email_verified: user.email_verified,
            created_at: None,
        };
        state.users.push(stored.clone());

        Ok(stored)
    }

    async fn list_users(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> RepositoryResult<Vec<User>> {
        let limit = usize::try_from(limit.unwrap_or(DEFAULT_LIST_LIMIT)).unwrap_or(0);
        let offset = usize::try_from(offset.unwrap_or(0)).unwrap_or(0);

        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .rev()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self) -> RepositoryResult<i64> {
        let state = self.state.read().await;
        Ok(state.users.len() as i64)
    }
}
