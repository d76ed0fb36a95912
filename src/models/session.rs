use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of the signed-in user, passed explicitly into every scheduling
/// call instead of being read from ambient storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    pub user_id: Uuid,
    pub token: String,
}

impl SessionContext {
    pub fn new(user_id: Uuid, token: impl Into<String>) -> Self {
        Self {
            user_id,
            token: token.into(),
        }
    }
}
