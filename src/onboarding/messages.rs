//! User-facing messages for house service error codes.
//!
//! A closed table: the service contract fixes the codes, the product copy
//! fixes the strings. Unrecognized codes fall back to a generic retry
//! message.

use crate::error::HouseError;

pub const MSG_INVALID_CODE: &str =
    "That invite code doesn't match any house. Double-check it and try again.";

pub const MSG_HOUSE_FULL: &str =
    "This house already has 8 members. Upgrade your plan to add more.";

pub const MSG_ALREADY_IN_HOUSE: &str =
    "You already belong to a house. Leave it before creating or joining another.";

pub const MSG_TRY_AGAIN: &str = "Something went wrong. Please try again.";

/// Map a house service error to its fixed user-facing string.
pub fn message_for(error: &HouseError) -> &'static str {
    match error {
        HouseError::InvalidCode => MSG_INVALID_CODE,
        HouseError::HouseFull => MSG_HOUSE_FULL,
        HouseError::AlreadyInHouse => MSG_ALREADY_IN_HOUSE,
        HouseError::Other(_) => MSG_TRY_AGAIN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_has_a_message() {
        assert_eq!(message_for(&HouseError::InvalidCode), MSG_INVALID_CODE);
        assert_eq!(message_for(&HouseError::HouseFull), MSG_HOUSE_FULL);
        assert_eq!(
            message_for(&HouseError::AlreadyInHouse),
            MSG_ALREADY_IN_HOUSE
        );
        assert_eq!(
            message_for(&HouseError::Other("code 500".to_string())),
            MSG_TRY_AGAIN
        );
    }

    #[test]
    fn house_full_copy_names_the_member_cap() {
        assert!(MSG_HOUSE_FULL.contains("8 members"));
        assert!(MSG_HOUSE_FULL.to_lowercase().contains("upgrade"));
    }
}
