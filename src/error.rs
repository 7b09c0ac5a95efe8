//! Error types for the Hearth session core.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("House service error: {0}")]
    House(#[from] HouseError),

    #[error("Profile stream error: {0}")]
    Profile(#[from] ProfileStreamError),
}

/// Errors reported by the remote house service.
///
/// This is a closed set: the service contract defines exactly these failure
/// codes, and anything outside them arrives as `Other` with the raw code
/// preserved for logging.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HouseError {
    #[error("Invite code does not match any house")]
    InvalidCode,

    #[error("House is at its member limit")]
    HouseFull,

    #[error("User already belongs to a house")]
    AlreadyInHouse,

    #[error("House service failure: {0}")]
    Other(String),
}

/// Profile-subscription failures.
///
/// Non-fatal by contract: the reconciler logs them, keeps the previously
/// observed profile, and clears its loading flag so the UI is never stuck.
#[derive(Debug, thiserror::Error)]
pub enum ProfileStreamError {
    #[error("Profile stream for user {user_id} failed: {reason}")]
    Stream { user_id: String, reason: String },

    #[error("Profile document for user {user_id} failed to decode: {source}")]
    Decode {
        user_id: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for the session core.
pub type Result<T> = std::result::Result<T, Error>;
