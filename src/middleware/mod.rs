pub mod bridge_auth;

pub use bridge_auth::require_bridge_token;
