//! In-memory backend for development and tests.
//!
//! Implements all three collaborator contracts over process-local state, with
//! the same observable behavior as the hosted backend: subscriptions emit the
//! current state immediately and on every change, house operations mutate the
//! member's profile document and notify its subscribers, invite codes are
//! six uppercase characters, and houses cap at [`HOUSE_MEMBER_CAP`] members.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::{HouseError, ProfileStreamError};
use crate::nav::{NavigationLocation, Navigator};

use super::Subscription;
use super::house::{HOUSE_MEMBER_CAP, HouseService, INVITE_CODE_LEN};
use super::identity::{IdentityCallback, IdentityProvider, Principal};
use super::profile::{ProfileCallback, ProfileEvent, ProfileStore};

/// A house record as the backend stores it.
#[derive(Debug, Clone)]
struct House {
    id: String,
    name: String,
    invite_code: String,
    members: Vec<String>,
}

#[derive(Default)]
struct BackendState {
    current: Option<Principal>,
    houses: HashMap<String, House>,
    /// Raw profile documents keyed by user id, exactly as the document
    /// database would hold them (camelCase JSON).
    profiles: HashMap<String, serde_json::Value>,
}

type IdentityListeners = Arc<Mutex<HashMap<Uuid, IdentityCallback>>>;
type ProfileListeners = Arc<Mutex<HashMap<String, HashMap<Uuid, ProfileCallback>>>>;

/// Process-local identity + document + house backend.
///
/// Shared as `Arc<MemoryBackend>`; the same instance serves all three
/// `Arc<dyn Trait>` seams.
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<BackendState>,
    identity_listeners: IdentityListeners,
    profile_listeners: ProfileListeners,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sign a user in and notify identity subscribers.
    pub fn sign_in(&self, principal: Principal) {
        {
            let mut state = self.state.lock().unwrap();
            state.current = Some(principal.clone());
        }
        self.notify_identity(Some(principal));
    }

    /// Sign the current user out and notify identity subscribers.
    pub fn sign_out(&self) {
        {
            let mut state = self.state.lock().unwrap();
            state.current = None;
        }
        self.notify_identity(None);
    }

    /// Replace a user's profile document and notify its subscribers.
    pub fn set_profile_document(&self, user_id: &str, doc: serde_json::Value) {
        {
            let mut state = self.state.lock().unwrap();
            state.profiles.insert(user_id.to_string(), doc);
        }
        self.notify_profile(user_id);
    }

    /// Delete a user's profile document and notify its subscribers.
    pub fn remove_profile_document(&self, user_id: &str) {
        {
            let mut state = self.state.lock().unwrap();
            state.profiles.remove(user_id);
        }
        self.notify_profile(user_id);
    }

    /// Push a stream-level error to a user's profile subscribers.
    pub fn emit_profile_error(&self, user_id: &str, reason: &str) {
        for callback in self.profile_callbacks(user_id) {
            callback(ProfileEvent::Error(ProfileStreamError::Stream {
                user_id: user_id.to_string(),
                reason: reason.to_string(),
            }));
        }
    }

    /// Number of live profile subscriptions for a user. Lets tests observe
    /// teardown.
    pub fn profile_subscription_count(&self, user_id: &str) -> usize {
        self.profile_listeners
            .lock()
            .unwrap()
            .get(user_id)
            .map(HashMap::len)
            .unwrap_or(0)
    }

    /// Invite code of the house a user belongs to, if any.
    pub fn invite_code_for(&self, user_id: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        let house_id = state
            .profiles
            .get(user_id)
            .and_then(|doc| doc.get("houseId"))
            .and_then(|v| v.as_str())?;
        state
            .houses
            .get(house_id)
            .map(|house| house.invite_code.clone())
    }

    /// Member uids of a house.
    pub fn house_members(&self, house_id: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .houses
            .get(house_id)
            .map(|house| house.members.clone())
            .unwrap_or_default()
    }

    fn house_id_of(state: &BackendState, user_id: &str) -> Option<String> {
        state
            .profiles
            .get(user_id)
            .and_then(|doc| doc.get("houseId"))
            .and_then(|v| v.as_str())
            .map(String::from)
    }

    fn add_member(state: &mut BackendState, user_id: &str, house_id: &str) {
        let doc = state
            .profiles
            .entry(user_id.to_string())
            .or_insert_with(|| serde_json::json!({ "createdAt": Utc::now() }));
        doc["houseId"] = serde_json::Value::String(house_id.to_string());
    }

    // Callbacks are invoked with no backend lock held: a callback may
    // re-enter the backend (e.g. to subscribe or unsubscribe).
    fn notify_identity(&self, principal: Option<Principal>) {
        let callbacks: Vec<IdentityCallback> = self
            .identity_listeners
            .lock()
            .unwrap()
            .values()
            .cloned()
            .collect();
        for callback in callbacks {
            callback(principal.clone());
        }
    }

    fn profile_callbacks(&self, user_id: &str) -> Vec<ProfileCallback> {
        self.profile_listeners
            .lock()
            .unwrap()
            .get(user_id)
            .map(|subs| subs.values().cloned().collect())
            .unwrap_or_default()
    }

    fn notify_profile(&self, user_id: &str) {
        let snapshot = self.profile_snapshot(user_id);
        for callback in self.profile_callbacks(user_id) {
            callback(profile_event(&snapshot));
        }
    }

    fn profile_snapshot(&self, user_id: &str) -> Option<serde_json::Value> {
        self.state.lock().unwrap().profiles.get(user_id).cloned()
    }
}

fn profile_event(doc: &Option<serde_json::Value>) -> ProfileEvent {
    match doc {
        Some(data) => ProfileEvent::Snapshot {
            exists: true,
            data: data.clone(),
        },
        None => ProfileEvent::Snapshot {
            exists: false,
            data: serde_json::Value::Null,
        },
    }
}

fn new_invite_code() -> String {
    Uuid::new_v4()
        .simple()
        .to_string()
        .to_uppercase()
        .chars()
        .take(INVITE_CODE_LEN)
        .collect()
}

impl IdentityProvider for MemoryBackend {
    fn subscribe_identity(&self, on_change: IdentityCallback) -> Subscription {
        let id = Uuid::new_v4();
        self.identity_listeners
            .lock()
            .unwrap()
            .insert(id, Arc::clone(&on_change));

        // Initial emission with the current state, matching the hosted
        // provider's observable contract.
        let current = self.state.lock().unwrap().current.clone();
        on_change(current);

        let listeners = Arc::clone(&self.identity_listeners);
        Subscription::new(move || {
            listeners.lock().unwrap().remove(&id);
        })
    }
}

impl ProfileStore for MemoryBackend {
    fn subscribe_profile(&self, user_id: &str, on_event: ProfileCallback) -> Subscription {
        let id = Uuid::new_v4();
        self.profile_listeners
            .lock()
            .unwrap()
            .entry(user_id.to_string())
            .or_default()
            .insert(id, Arc::clone(&on_event));

        let snapshot = self.profile_snapshot(user_id);
        on_event(profile_event(&snapshot));

        let listeners = Arc::clone(&self.profile_listeners);
        let key = user_id.to_string();
        Subscription::new(move || {
            let mut map = listeners.lock().unwrap();
            if let Some(subs) = map.get_mut(&key) {
                subs.remove(&id);
                if subs.is_empty() {
                    map.remove(&key);
                }
            }
        })
    }
}

#[async_trait]
impl HouseService for MemoryBackend {
    async fn create_house(&self, user_id: &str, name: &str) -> Result<(), HouseError> {
        {
            let mut state = self.state.lock().unwrap();
            if Self::house_id_of(&state, user_id).is_some() {
                return Err(HouseError::AlreadyInHouse);
            }
            let house = House {
                id: Uuid::new_v4().to_string(),
                name: name.to_string(),
                invite_code: new_invite_code(),
                members: vec![user_id.to_string()],
            };
            let house_id = house.id.clone();
            tracing::info!(house = %house.name, code = %house.invite_code, "House created");
            state.houses.insert(house_id.clone(), house);
            Self::add_member(&mut state, user_id, &house_id);
        }
        self.notify_profile(user_id);
        Ok(())
    }

    async fn join_house(&self, user_id: &str, invite_code: &str) -> Result<(), HouseError> {
        {
            let mut state = self.state.lock().unwrap();
            if Self::house_id_of(&state, user_id).is_some() {
                return Err(HouseError::AlreadyInHouse);
            }
            let house_id = state
                .houses
                .values()
                .find(|house| house.invite_code == invite_code)
                .map(|house| house.id.clone())
                .ok_or(HouseError::InvalidCode)?;
            let house = state
                .houses
                .get_mut(&house_id)
                .ok_or_else(|| HouseError::Other("house vanished".to_string()))?;
            if house.members.len() >= HOUSE_MEMBER_CAP {
                return Err(HouseError::HouseFull);
            }
            house.members.push(user_id.to_string());
            Self::add_member(&mut state, user_id, &house_id);
        }
        self.notify_profile(user_id);
        Ok(())
    }
}

/// Navigator that records every replace, for tests and the demo binary.
pub struct MemoryNavigator {
    location: Mutex<NavigationLocation>,
    replaced: Mutex<Vec<String>>,
}

impl MemoryNavigator {
    pub fn new(initial_path: &str) -> Self {
        Self {
            location: Mutex::new(NavigationLocation::from_path(initial_path)),
            replaced: Mutex::new(Vec::new()),
        }
    }

    /// Every path passed to `replace`, oldest first.
    pub fn replaced_paths(&self) -> Vec<String> {
        self.replaced.lock().unwrap().clone()
    }

    /// Move to a path without recording a redirect (user-initiated
    /// navigation).
    pub fn go_to(&self, path: &str) {
        *self.location.lock().unwrap() = NavigationLocation::from_path(path);
    }
}

impl Navigator for MemoryNavigator {
    fn current_location(&self) -> NavigationLocation {
        self.location.lock().unwrap().clone()
    }

    fn replace(&self, path: &str) {
        *self.location.lock().unwrap() = NavigationLocation::from_path(path);
        self.replaced.lock().unwrap().push(path.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_house_id(event: &ProfileEvent) -> Option<String> {
        match event {
            ProfileEvent::Snapshot { exists: true, data } => data
                .get("houseId")
                .and_then(|v| v.as_str())
                .map(String::from),
            _ => None,
        }
    }

    #[test]
    fn identity_subscription_emits_current_state_and_changes() {
        let backend = MemoryBackend::new();
        let seen: Arc<Mutex<Vec<Option<String>>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = backend.subscribe_identity(Arc::new(move |p| {
            sink.lock().unwrap().push(p.map(|p| p.uid));
        }));

        backend.sign_in(Principal::new("u1"));
        backend.sign_out();

        let seen = seen.lock().unwrap();
        assert_eq!(*seen, vec![None, Some("u1".to_string()), None]);
    }

    #[test]
    fn dropped_subscription_receives_nothing() {
        let backend = MemoryBackend::new();
        let seen = Arc::new(Mutex::new(0usize));
        let sink = Arc::clone(&seen);
        let sub = backend.subscribe_identity(Arc::new(move |_| {
            *sink.lock().unwrap() += 1;
        }));
        drop(sub);
        backend.sign_in(Principal::new("u1"));
        assert_eq!(*seen.lock().unwrap(), 1); // only the initial emission
    }

    #[test]
    fn profile_subscription_count_tracks_teardown() {
        let backend = MemoryBackend::new();
        let sub = backend.subscribe_profile("u1", Arc::new(|_| {}));
        assert_eq!(backend.profile_subscription_count("u1"), 1);
        drop(sub);
        assert_eq!(backend.profile_subscription_count("u1"), 0);
    }

    #[tokio::test]
    async fn create_house_updates_profile_and_notifies() {
        let backend = MemoryBackend::new();
        let seen: Arc<Mutex<Vec<Option<String>>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = backend.subscribe_profile(
            "u1",
            Arc::new(move |event| {
                sink.lock().unwrap().push(event_house_id(&event));
            }),
        );

        backend.create_house("u1", "Maple House").await.unwrap();

        let seen = seen.lock().unwrap();
        // Initial not-found emission, then the document with a house id.
        assert_eq!(seen.len(), 2);
        assert!(seen[0].is_none());
        assert!(seen[1].is_some());
    }

    #[tokio::test]
    async fn create_twice_is_already_in_house() {
        let backend = MemoryBackend::new();
        backend.create_house("u1", "First").await.unwrap();
        let err = backend.create_house("u1", "Second").await.unwrap_err();
        assert_eq!(err, HouseError::AlreadyInHouse);
    }

    #[tokio::test]
    async fn join_with_bad_code_is_invalid() {
        let backend = MemoryBackend::new();
        let err = backend.join_house("u1", "ZZZZZZ").await.unwrap_err();
        assert_eq!(err, HouseError::InvalidCode);
    }

    #[tokio::test]
    async fn join_via_invite_code() {
        let backend = MemoryBackend::new();
        backend.create_house("owner", "Shared").await.unwrap();
        let code = backend.invite_code_for("owner").unwrap();
        assert_eq!(code.len(), INVITE_CODE_LEN);

        backend.join_house("guest", &code).await.unwrap();
        let doc = backend.profile_snapshot("guest").unwrap();
        assert!(doc.get("houseId").and_then(|v| v.as_str()).is_some());
    }

    #[tokio::test]
    async fn member_cap_is_enforced() {
        let backend = MemoryBackend::new();
        backend.create_house("m0", "Crowded").await.unwrap();
        let code = backend.invite_code_for("m0").unwrap();
        for i in 1..HOUSE_MEMBER_CAP {
            backend.join_house(&format!("m{i}"), &code).await.unwrap();
        }
        let err = backend.join_house("overflow", &code).await.unwrap_err();
        assert_eq!(err, HouseError::HouseFull);
    }

    #[test]
    fn navigator_records_replacements() {
        let nav = MemoryNavigator::new("/");
        nav.replace("/(auth)/login");
        nav.go_to("/(auth)/register");
        assert_eq!(nav.replaced_paths(), ["/(auth)/login"]);
        assert_eq!(nav.current_location().path(), "/(auth)/register");
    }
}
