//! House-setup form state.
//!
//! Two mutually exclusive modals (create vs. join) sharing one loading flag
//! and one error slot. The form never navigates on success: the session
//! reconciler observes the resulting profile-document change and performs
//! the post-onboarding redirect itself.

use crate::error::HouseError;
use crate::services::house::{HouseService, INVITE_CODE_LEN};

use super::messages::message_for;

/// Which modal is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupMode {
    Create,
    Join,
}

/// State behind the house-setup screen.
#[derive(Debug, Default)]
pub struct HouseSetup {
    mode: Option<SetupMode>,
    name: String,
    code: String,
    loading: bool,
    error: Option<&'static str>,
}

impl HouseSetup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Option<SetupMode> {
        self.mode
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// True while a submit is in flight; the submit control is disabled.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&'static str> {
        self.error
    }

    pub fn open_create(&mut self) {
        self.mode = Some(SetupMode::Create);
        self.error = None;
    }

    pub fn open_join(&mut self) {
        self.mode = Some(SetupMode::Join);
        self.error = None;
    }

    /// Dismiss the open modal and reset its inputs.
    pub fn cancel(&mut self) {
        self.mode = None;
        self.name.clear();
        self.code.clear();
        self.error = None;
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
        self.error = None;
    }

    /// Invite code input: uppercased and truncated to six characters as
    /// typed.
    pub fn set_code(&mut self, code: &str) {
        self.code = code.to_uppercase().chars().take(INVITE_CODE_LEN).collect();
        self.error = None;
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self) -> bool {
        if self.loading {
            return false;
        }
        match self.mode {
            Some(SetupMode::Create) => !self.name.trim().is_empty(),
            Some(SetupMode::Join) => self.code.chars().count() == INVITE_CODE_LEN,
            None => false,
        }
    }

    /// Submit the open modal for `user_id`. Returns true on success, in
    /// which case the modal is closed and inputs are cleared; on failure the
    /// modal stays open with a mapped error message.
    ///
    /// A single call is in flight at a time, gated by the loading flag. No
    /// automatic retry: the user re-taps submit.
    pub async fn submit(&mut self, houses: &dyn HouseService, user_id: &str) -> bool {
        if !self.can_submit() {
            return false;
        }
        let mode = match self.mode {
            Some(mode) => mode,
            None => return false,
        };
        self.loading = true;
        self.error = None;

        let result = match mode {
            SetupMode::Create => houses.create_house(user_id, self.name.trim()).await,
            SetupMode::Join => houses.join_house(user_id, &self.code).await,
        };
        self.loading = false;

        match result {
            Ok(()) => {
                self.cancel();
                true
            }
            Err(error) => {
                tracing::warn!(user = user_id, ?mode, %error, "House setup submit failed");
                self.error = Some(message_for(&error));
                false
            }
        }
    }
}
