//! Profile document store contract.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProfileStreamError;

use super::Subscription;

/// Per-user profile document, synced from the remote document store.
///
/// `house_id` is the onboarding marker: `None` means the user has not yet
/// created or joined a house, which is a legitimate observed state distinct
/// from the document not existing at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub house_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Decode a raw document as stored in the document database.
    pub fn from_document(
        user_id: &str,
        data: serde_json::Value,
    ) -> Result<Self, ProfileStreamError> {
        serde_json::from_value(data).map_err(|source| ProfileStreamError::Decode {
            user_id: user_id.to_string(),
            source,
        })
    }
}

/// One emission from a profile document subscription.
#[derive(Debug)]
pub enum ProfileEvent {
    /// The document's current state. `exists == false` means the document is
    /// not present (data is ignored in that case).
    Snapshot {
        exists: bool,
        data: serde_json::Value,
    },
    /// Stream-level failure. The subscription stays alive.
    Error(ProfileStreamError),
}

/// Callback invoked on every profile document change or stream error.
pub type ProfileCallback = Arc<dyn Fn(ProfileEvent) + Send + Sync>;

/// Long-lived per-user profile document stream.
///
/// Implementations emit the current document state once on subscribe and on
/// every subsequent change, until the returned guard is dropped.
pub trait ProfileStore: Send + Sync {
    fn subscribe_profile(&self, user_id: &str, on_event: ProfileCallback) -> Subscription;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_camel_case_document() {
        let doc = serde_json::json!({
            "houseId": "house-1",
            "displayName": "Alice",
        });
        let profile = UserProfile::from_document("u1", doc).unwrap();
        assert_eq!(profile.house_id.as_deref(), Some("house-1"));
        assert_eq!(profile.display_name.as_deref(), Some("Alice"));
        assert!(profile.created_at.is_none());
    }

    #[test]
    fn null_house_id_decodes_as_none() {
        let doc = serde_json::json!({ "houseId": null });
        let profile = UserProfile::from_document("u1", doc).unwrap();
        assert!(profile.house_id.is_none());
    }

    #[test]
    fn missing_fields_default() {
        let profile = UserProfile::from_document("u1", serde_json::json!({})).unwrap();
        assert!(profile.house_id.is_none());
        assert!(profile.display_name.is_none());
    }

    #[test]
    fn malformed_document_reports_decode_error() {
        let doc = serde_json::json!({ "houseId": 42 });
        let err = UserProfile::from_document("u1", doc).unwrap_err();
        assert!(matches!(err, ProfileStreamError::Decode { ref user_id, .. } if user_id == "u1"));
    }
}
