//! House-setup onboarding — create a house or join one by invite code.

pub mod form;
pub mod messages;

pub use form::{HouseSetup, SetupMode};
pub use messages::message_for;
