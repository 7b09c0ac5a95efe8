//! House service contract.

use async_trait::async_trait;

use crate::error::HouseError;

/// Maximum members per house, enforced by the house service.
pub const HOUSE_MEMBER_CAP: usize = 8;

/// Length of an invite code. Codes are uppercase alphanumeric.
pub const INVITE_CODE_LEN: usize = 6;

/// Remote house operations.
///
/// Both operations mutate the caller's profile document as a side effect on
/// success; callers observe the result through their profile subscription
/// rather than a return value.
#[async_trait]
pub trait HouseService: Send + Sync {
    /// Create a new house named `name` and make `user_id` its first member.
    async fn create_house(&self, user_id: &str, name: &str) -> Result<(), HouseError>;

    /// Join the house whose invite code is `invite_code`.
    async fn join_house(&self, user_id: &str, invite_code: &str) -> Result<(), HouseError>;
}
