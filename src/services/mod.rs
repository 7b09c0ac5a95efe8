//! Collaborator contracts — identity provider, profile store, house service.

pub mod house;
pub mod identity;
pub mod memory;
pub mod profile;

pub use house::HouseService;
pub use identity::{IdentityProvider, Principal};
pub use memory::{MemoryBackend, MemoryNavigator};
pub use profile::{ProfileEvent, ProfileStore, UserProfile};

/// Cancel-on-drop guard returned by every subscribe call.
///
/// Dropping the guard (or calling [`unsubscribe`](Self::unsubscribe)) detaches
/// the callback; no emission is delivered after that point.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Explicitly cancel the subscription.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
