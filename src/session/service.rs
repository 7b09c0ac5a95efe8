//! SessionService — wires the reconciler to the identity and profile streams.
//!
//! Constructed once at process start with its collaborators injected; owns
//! the live subscriptions and enforces exactly one profile subscription per
//! non-null principal, keyed by uid. Listener notification happens here,
//! after the reconciler lock is released, so listeners may read back through
//! their handles.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use crate::config::RouteConfig;
use crate::nav::Navigator;
use crate::services::Subscription;
use crate::services::identity::{IdentityProvider, Principal};
use crate::services::profile::{ProfileEvent, ProfileStore};

use super::reconciler::SessionReconciler;
use super::state::{ListenerId, SessionSnapshot};

type SessionListener = Arc<dyn Fn(&SessionSnapshot) + Send + Sync>;

struct SessionSubs {
    identity: Option<Subscription>,
    /// Live profile subscription, keyed by the uid it was opened for.
    profile: Option<(String, Subscription)>,
}

struct SessionInner {
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
    reconciler: Mutex<SessionReconciler>,
    subs: Mutex<SessionSubs>,
    listeners: Mutex<HashMap<ListenerId, SessionListener>>,
}

/// Owns the session state machine and its upstream subscriptions.
///
/// Dropping the service cancels both subscriptions; handles created via
/// [`handle`](Self::handle) do not keep it alive.
pub struct SessionService {
    inner: Arc<SessionInner>,
}

impl SessionService {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileStore>,
        navigator: Arc<dyn Navigator>,
        routes: RouteConfig,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                identity,
                profiles,
                reconciler: Mutex::new(SessionReconciler::new(routes, navigator)),
                subs: Mutex::new(SessionSubs {
                    identity: None,
                    profile: None,
                }),
                listeners: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Subscribe to the identity stream and start reconciling.
    ///
    /// Providers emit the current state synchronously from subscribe, so the
    /// first routing decision can happen before this returns.
    pub fn start(&self) {
        let weak = Arc::downgrade(&self.inner);
        let sub = self
            .inner
            .identity
            .subscribe_identity(Arc::new(move |principal| {
                if let Some(inner) = weak.upgrade() {
                    SessionInner::handle_identity(&inner, principal);
                }
            }));
        self.inner.subs.lock().unwrap().identity = Some(sub);
    }

    /// Read-only handle for the screen tree.
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.reconciler.lock().unwrap().snapshot()
    }

    pub fn should_render(&self) -> bool {
        self.inner.reconciler.lock().unwrap().should_render()
    }

    /// The rendering layer reports a location change.
    pub fn on_location_change(&self) {
        self.inner.reconciler.lock().unwrap().on_location_change();
    }
}

impl SessionInner {
    fn handle_identity(inner: &Arc<SessionInner>, principal: Option<Principal>) {
        // Update the reconciler first so a changed principal has already
        // cleared the profile slot before any new emission lands.
        let snapshot = {
            let mut reconciler = inner.reconciler.lock().unwrap();
            reconciler.on_identity(principal.clone());
            reconciler.snapshot()
        };
        inner.notify(&snapshot);

        // Reconcile the profile subscription with the reconciler lock
        // released: providers may emit synchronously from subscribe.
        let desired = principal.map(|p| p.uid);
        let mut subs = inner.subs.lock().unwrap();
        let current = subs.profile.as_ref().map(|(uid, _)| uid.clone());
        if current == desired {
            return;
        }
        // Dropping the guard tears down the old subscription before the new
        // one opens; stale profile data must not leak across sessions.
        subs.profile = None;
        if let Some(uid) = desired {
            let weak = Arc::downgrade(inner);
            let sub_uid = uid.clone();
            let sub = inner.profiles.subscribe_profile(
                &uid,
                Arc::new(move |event| {
                    if let Some(inner) = weak.upgrade() {
                        inner.handle_profile(&sub_uid, event);
                    }
                }),
            );
            subs.profile = Some((uid, sub));
        }
    }

    fn handle_profile(&self, uid: &str, event: ProfileEvent) {
        let snapshot = {
            let mut reconciler = self.reconciler.lock().unwrap();
            if reconciler.principal_uid() != Some(uid) {
                // Emission from a subscription torn down mid-flight.
                tracing::debug!(user = uid, "Discarding stale profile emission");
                return;
            }
            reconciler.on_profile_event(event);
            reconciler.snapshot()
        };
        self.notify(&snapshot);
    }

    // No lock is held while a listener runs: listeners may read back
    // through their handles or adjust subscriptions.
    fn notify(&self, snapshot: &SessionSnapshot) {
        let listeners: Vec<SessionListener> =
            self.listeners.lock().unwrap().values().cloned().collect();
        for listener in listeners {
            listener(snapshot);
        }
    }
}

/// Cloneable read-only view of the session for descendant screens.
///
/// Holds only a weak reference: using a handle after its `SessionService` is
/// gone is a programming error and panics at access time.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Weak<SessionInner>,
}

impl SessionHandle {
    fn inner(&self) -> Arc<SessionInner> {
        self.inner
            .upgrade()
            .expect("session handle used after its SessionService was dropped")
    }

    /// Current `{principal, user_profile, loading, is_authenticated}` view.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner().reconciler.lock().unwrap().snapshot()
    }

    pub fn should_render(&self) -> bool {
        self.inner().reconciler.lock().unwrap().should_render()
    }

    pub fn on_location_change(&self) {
        self.inner().reconciler.lock().unwrap().on_location_change();
    }

    /// Register a listener notified synchronously after every session
    /// mutation, with no session lock held.
    pub fn subscribe(
        &self,
        listener: impl Fn(&SessionSnapshot) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = ListenerId::new();
        self.inner()
            .listeners
            .lock()
            .unwrap()
            .insert(id, Arc::new(listener));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) {
        self.inner().listeners.lock().unwrap().remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::memory::{MemoryBackend, MemoryNavigator};

    fn service_over(
        backend: &Arc<MemoryBackend>,
        nav: &Arc<MemoryNavigator>,
    ) -> SessionService {
        SessionService::new(
            backend.clone() as Arc<dyn IdentityProvider>,
            backend.clone() as Arc<dyn ProfileStore>,
            nav.clone() as Arc<dyn Navigator>,
            RouteConfig::default(),
        )
    }

    #[test]
    fn sign_out_tears_down_profile_subscription() {
        let backend = Arc::new(MemoryBackend::new());
        let nav = Arc::new(MemoryNavigator::new("/"));
        let service = service_over(&backend, &nav);
        service.start();

        backend.sign_in(Principal::new("u1"));
        assert_eq!(backend.profile_subscription_count("u1"), 1);

        backend.sign_out();
        assert_eq!(backend.profile_subscription_count("u1"), 0);
        assert!(service.snapshot().user_profile.is_none());
        assert!(!service.snapshot().is_authenticated);
    }

    #[test]
    fn principal_change_swaps_profile_subscription() {
        let backend = Arc::new(MemoryBackend::new());
        let nav = Arc::new(MemoryNavigator::new("/"));
        let service = service_over(&backend, &nav);
        service.start();

        backend.sign_in(Principal::new("u1"));
        backend.sign_in(Principal::new("u2"));
        assert_eq!(backend.profile_subscription_count("u1"), 0);
        assert_eq!(backend.profile_subscription_count("u2"), 1);
    }

    #[test]
    fn repeated_emission_of_same_principal_keeps_subscription() {
        let backend = Arc::new(MemoryBackend::new());
        let nav = Arc::new(MemoryNavigator::new("/"));
        let service = service_over(&backend, &nav);
        service.start();

        backend.sign_in(Principal::new("u1"));
        // Token refresh: same uid emitted again.
        backend.sign_in(Principal::new("u1"));
        assert_eq!(backend.profile_subscription_count("u1"), 1);
        assert!(service.snapshot().is_authenticated);
    }

    #[test]
    fn dropping_the_service_cancels_subscriptions() {
        let backend = Arc::new(MemoryBackend::new());
        let nav = Arc::new(MemoryNavigator::new("/"));
        let service = service_over(&backend, &nav);
        service.start();
        backend.sign_in(Principal::new("u1"));

        drop(service);
        assert_eq!(backend.profile_subscription_count("u1"), 0);
        // Further emissions find no listeners; nothing panics.
        backend.sign_out();
    }

    #[test]
    #[should_panic(expected = "session handle used after its SessionService was dropped")]
    fn handle_outliving_service_panics_on_access() {
        let backend = Arc::new(MemoryBackend::new());
        let nav = Arc::new(MemoryNavigator::new("/"));
        let service = service_over(&backend, &nav);
        let handle = service.handle();
        drop(service);
        let _ = handle.snapshot();
    }

    #[test]
    fn handle_exposes_read_only_context() {
        let backend = Arc::new(MemoryBackend::new());
        let nav = Arc::new(MemoryNavigator::new("/(tabs)/index"));
        let service = service_over(&backend, &nav);
        service.start();

        backend.set_profile_document("u1", serde_json::json!({ "houseId": "h1" }));
        backend.sign_in(Principal::new("u1"));

        let snapshot = service.handle().snapshot();
        assert!(snapshot.is_authenticated);
        assert_eq!(
            snapshot.user_profile.and_then(|p| p.house_id),
            Some("h1".to_string())
        );
        assert!(!snapshot.loading);
    }

    #[test]
    fn listeners_observe_every_mutation() {
        let backend = Arc::new(MemoryBackend::new());
        let nav = Arc::new(MemoryNavigator::new("/"));
        let service = service_over(&backend, &nav);
        service.start();

        let handle = service.handle();
        let seen: Arc<Mutex<Vec<bool>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = handle.subscribe(move |snapshot| {
            sink.lock().unwrap().push(snapshot.is_authenticated);
        });

        // Sign-in mutates twice (identity change, then profile emission).
        backend.sign_in(Principal::new("u1"));
        backend.sign_out();
        assert_eq!(*seen.lock().unwrap(), vec![true, true, false]);

        handle.unsubscribe(id);
        backend.sign_in(Principal::new("u1"));
        assert_eq!(seen.lock().unwrap().len(), 3);
    }

    #[test]
    fn listener_can_read_back_through_its_handle() {
        let backend = Arc::new(MemoryBackend::new());
        let nav = Arc::new(MemoryNavigator::new("/"));
        let service = service_over(&backend, &nav);
        service.start();

        // A listener that re-reads session state through its own handle
        // must not deadlock, and must see the state it was notified with.
        let handle = service.handle();
        let reader = service.handle();
        let seen: Arc<Mutex<Vec<bool>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _id = handle.subscribe(move |snapshot| {
            let live = reader.snapshot();
            sink.lock()
                .unwrap()
                .push(live.is_authenticated == snapshot.is_authenticated);
        });

        backend.sign_in(Principal::new("u1"));
        backend.sign_out();

        let seen = seen.lock().unwrap();
        assert!(!seen.is_empty());
        assert!(seen.iter().all(|&consistent| consistent));
    }
}
