//! Session reconciliation — the routing state machine at the heart of the app.

pub mod reconciler;
pub mod service;
pub mod state;

pub use reconciler::SessionReconciler;
pub use service::{SessionHandle, SessionService};
pub use state::{ListenerId, ProfileSlot, SessionSnapshot};
