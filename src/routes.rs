use crate::{handlers, middleware::require_bridge_token, AppState};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    // Everything but the health check is reserved for the authentication middleware
    let bridge_routes = Router::new()
        .route("/auth/{provider}/callback", post(handlers::oauth_callback))
        .route("/users", get(handlers::list_users))
        .route("/users/{id}", get(handlers::get_user))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_bridge_token,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(bridge_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
