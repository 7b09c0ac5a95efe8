//! Hearth — session and onboarding core for the household app.

pub mod config;
pub mod error;
pub mod nav;
pub mod onboarding;
pub mod services;
pub mod session;
