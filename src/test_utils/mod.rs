//! Test utilities for use case and HTTP-level testing.
//!
//! This module provides:
//! - Test data factories for creating valid waitlist entries
//! - In-memory implementations of the store, verifier, mail and rate limit ports
//! - `TestAppStateBuilder` for constructing an `AppState` around those mocks

mod app_state_builder;
mod factories;
mod waitlist_mocks;

pub use app_state_builder::*;
pub use factories::*;
pub use waitlist_mocks::*;
