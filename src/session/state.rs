//! Session state types.

use serde::Serialize;
use uuid::Uuid;

use crate::services::identity::Principal;
use crate::services::profile::UserProfile;

/// What the reconciler currently knows about the profile document.
///
/// `NotLoaded` means the subscription has not delivered anything yet for the
/// current principal; `Missing` means the store reported the document does
/// not exist. The distinction matters: routing decisions wait for `NotLoaded`
/// to resolve but treat `Missing` as a legitimate house-less state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ProfileSlot {
    #[default]
    NotLoaded,
    Missing,
    Loaded(UserProfile),
}

impl ProfileSlot {
    /// Whether the subscription has reported anything at all.
    pub fn is_loaded(&self) -> bool {
        !matches!(self, Self::NotLoaded)
    }

    pub fn house_id(&self) -> Option<&str> {
        match self {
            Self::Loaded(profile) => profile.house_id.as_deref(),
            _ => None,
        }
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        match self {
            Self::Loaded(profile) => Some(profile),
            _ => None,
        }
    }
}

/// Read-only view of the session, handed to listeners and descendant screens.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub principal: Option<Principal>,
    pub user_profile: Option<UserProfile>,
    pub loading: bool,
    pub is_authenticated: bool,
}

/// Opaque token identifying a registered session listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}
