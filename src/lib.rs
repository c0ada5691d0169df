pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

// Make test_utils available for both unit tests and integration tests
pub mod test_utils;

use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub identity_resolver: Arc<services::identity_service::IdentityResolver>,
    pub user_service: Arc<services::user_service::UserService>,
    pub bridge_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(
        user_repository: Arc<dyn repositories::UserRepository>,
        identity: config::IdentityConfig,
        bridge_token: Option<String>,
    ) -> Self {
        AppState {
            identity_resolver: Arc::new(services::IdentityResolver::new(
                user_repository.clone(),
                identity,
            )),
            user_service: Arc::new(services::UserService::new(user_repository)),
            bridge_token: bridge_token.map(Arc::from),
        }
    }
}
