//! SessionReconciler — folds identity, profile, and location into one
//! routing decision.
//!
//! Three independently-updating signals feed this state machine: the identity
//! stream, the profile document stream, and the current navigation location.
//! Every mutation ends with an explicit `reroute()`; there is no hidden
//! reactivity. Listener fan-out lives in the owning
//! [`SessionService`](super::service::SessionService).

use std::sync::Arc;

use crate::config::RouteConfig;
use crate::nav::{Navigator, RouteClass};
use crate::services::identity::Principal;
use crate::services::profile::{ProfileEvent, UserProfile};

use super::state::{ProfileSlot, SessionSnapshot};

/// Outcome of one evaluation of the routing table.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Decision {
    redirect: Option<String>,
    mark_done: bool,
}

/// The session state machine.
///
/// Holds the derived tuple (principal, profile, loading, latch) and the
/// routing decision logic. Subscription lifecycle lives in
/// [`SessionService`](super::service::SessionService); this type only
/// consumes emissions.
pub struct SessionReconciler {
    routes: RouteConfig,
    navigator: Arc<dyn Navigator>,
    principal: Option<Principal>,
    profile: ProfileSlot,
    /// True until the identity stream has fired once and, if a principal is
    /// present, the profile stream has fired once for it.
    loading: bool,
    /// One-way latch: set the first time a routing decision is made, never
    /// reset for the lifetime of this instance.
    initial_nav_done: bool,
}

impl SessionReconciler {
    pub fn new(routes: RouteConfig, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            routes,
            navigator,
            principal: None,
            profile: ProfileSlot::NotLoaded,
            loading: true,
            initial_nav_done: false,
        }
    }

    /// Identity stream emission: the current principal, or `None` on
    /// sign-out.
    pub fn on_identity(&mut self, principal: Option<Principal>) {
        match principal {
            None => {
                // Nothing to wait for when signed out: clear the profile and
                // stop loading in the same update.
                self.principal = None;
                self.profile = ProfileSlot::NotLoaded;
                self.loading = false;
            }
            Some(principal) => {
                let changed = self
                    .principal
                    .as_ref()
                    .map(|current| current.uid != principal.uid)
                    .unwrap_or(true);
                if changed {
                    // Fresh principal: the previous profile must not leak
                    // across sessions, and routing waits for the new one.
                    self.profile = ProfileSlot::NotLoaded;
                    self.loading = true;
                }
                self.principal = Some(principal);
            }
        }
        self.reroute();
    }

    /// Profile stream emission for the current principal.
    pub fn on_profile_event(&mut self, event: ProfileEvent) {
        let Some(uid) = self.principal.as_ref().map(|p| p.uid.clone()) else {
            // Raced a sign-out; the slot is already cleared.
            return;
        };
        match event {
            ProfileEvent::Snapshot { exists: true, data } => {
                match UserProfile::from_document(&uid, data) {
                    Ok(profile) => self.profile = ProfileSlot::Loaded(profile),
                    Err(err) => {
                        // Keep the previous value; a broken snapshot must not
                        // blank a working session.
                        tracing::error!(user = %uid, error = %err, "Profile document decode failed");
                    }
                }
            }
            ProfileEvent::Snapshot { exists: false, .. } => {
                // Absence is a valid state (account created, house not yet
                // set up), not a failure.
                tracing::warn!(user = %uid, "Profile document does not exist");
                self.profile = ProfileSlot::Missing;
            }
            ProfileEvent::Error(err) => {
                tracing::error!(user = %uid, error = %err, "Profile stream error");
            }
        }
        self.loading = false;
        self.reroute();
    }

    /// The rendering layer reports that the location changed underneath us.
    pub fn on_location_change(&mut self) {
        self.reroute();
    }

    /// Recompute the routing decision against the current location.
    ///
    /// Skipped entirely while loading; a redirect whose target the location
    /// already satisfies is suppressed, which is what prevents redirect
    /// loops.
    fn reroute(&mut self) {
        if self.loading {
            return;
        }
        let location = self.navigator.current_location();
        let class = RouteClass::of(&location, &self.routes);
        let decision = self.decide(class);

        if let Some(target) = decision.redirect {
            if !location.is_at(&target) {
                tracing::debug!(from = %location, to = %target, "Session redirect");
                self.navigator.replace(&target);
            }
        }
        if decision.mark_done {
            self.initial_nav_done = true;
        }
    }

    /// The decision table, evaluated in precedence order; first match wins.
    fn decide(&self, class: RouteClass) -> Decision {
        let signed_in = self.principal.is_some();
        let profile_loaded = self.profile.is_loaded();
        let has_house = self.profile.house_id().is_some();

        // 1. Signed out anywhere outside the auth group: go to login.
        if !signed_in && !class.in_auth_group {
            return Decision {
                redirect: Some(self.routes.login_path()),
                mark_done: true,
            };
        }
        // 2. Signed in without a house: onboarding is not done, go to
        //    house-setup from anywhere but house-setup itself.
        if signed_in && profile_loaded && !has_house && !class.on_house_setup {
            return Decision {
                redirect: Some(self.routes.house_setup_path()),
                mark_done: true,
            };
        }
        if signed_in && profile_loaded && has_house {
            // 3. Fully set up but stuck on house-setup or lingering in the
            //    auth group (login/register are exempt): go to the app.
            if class.on_house_setup
                || (class.in_auth_group && !class.on_login && !class.on_register)
            {
                return Decision {
                    redirect: Some(self.routes.landing_path()),
                    mark_done: true,
                };
            }
            // 4. First stabilization landed somewhere that is neither the
            //    auth group nor the app: go to the app.
            if !self.initial_nav_done && !class.in_tabs_group && !class.in_auth_group {
                return Decision {
                    redirect: Some(self.routes.landing_path()),
                    mark_done: true,
                };
            }
            // 5. First stable state needs no correction.
            if !self.initial_nav_done {
                return Decision {
                    redirect: None,
                    mark_done: true,
                };
            }
        }
        // 6. Signed out and already in the auth group: nothing to fix.
        if !signed_in && class.in_auth_group && !self.initial_nav_done {
            return Decision {
                redirect: None,
                mark_done: true,
            };
        }
        Decision {
            redirect: None,
            mark_done: false,
        }
    }

    /// Current read-only view for descendant screens.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            principal: self.principal.clone(),
            user_profile: self.profile.profile().cloned(),
            loading: self.loading,
            is_authenticated: self.principal.is_some(),
        }
    }

    /// Uid of the current principal, if any.
    pub fn principal_uid(&self) -> Option<&str> {
        self.principal.as_ref().map(|p| p.uid.as_str())
    }

    pub fn initial_navigation_done(&self) -> bool {
        self.initial_nav_done
    }

    /// Render gate: suppress children only before the first routing decision,
    /// while the session is still indeterminate. After the latch is set a
    /// profile-stream hiccup must never blank the screen.
    pub fn should_render(&self) -> bool {
        !(self.loading && !self.initial_nav_done)
    }
}
