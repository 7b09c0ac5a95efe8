//! Identity provider contract.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::Subscription;

/// The signed-in account as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Provider-issued stable user identifier.
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Principal {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            display_name: None,
        }
    }
}

/// Callback invoked with the current principal (or `None` when signed out)
/// on every identity state change.
pub type IdentityCallback = Arc<dyn Fn(Option<Principal>) + Send + Sync>;

/// Long-lived identity state stream.
///
/// Implementations emit the current state once on subscribe and again on
/// every subsequent change, until the returned guard is dropped.
pub trait IdentityProvider: Send + Sync {
    fn subscribe_identity(&self, on_change: IdentityCallback) -> Subscription;
}
