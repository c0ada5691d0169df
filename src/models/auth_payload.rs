use serde::{Deserialize, Serialize};

/// Profile claims carried by a provider callback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthInfo {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// A verified callback payload handed over by the authentication middleware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthPayload {
    pub provider: String,
    pub uid: String,
    #[serde(default)]
    pub info: AuthInfo,
}

impl AuthPayload {
    pub fn new(provider: impl Into<String>, uid: impl Into<String>, info: AuthInfo) -> Self {
        Self {
            provider: provider.into(),
            uid: uid.into(),
            info,
        }
    }
}

/// Callback body when the provider comes from the request path.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackBody {
    pub uid: String,
    #[serde(default)]
    pub info: AuthInfo,
}

impl CallbackBody {
    pub fn into_payload(self, provider: String) -> AuthPayload {
        AuthPayload {
            provider,
            uid: self.uid,
            info: self.info,
        }
    }
}
