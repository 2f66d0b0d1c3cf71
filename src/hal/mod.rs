//! Pin layer implementations.
//!
//! This module contains concrete implementations of
//! [`PinLayer`](crate::traits::PinLayer).
//!
//! # Available Implementations
//!
//! - `mock`: Recording pin layer for tests and the desktop simulator
//! - `board`: Adapter over `embedded-hal` 1.0 I2C and delay plus a
//!   platform GPIO bank (requires `embedded-hal` feature)

pub mod mock;

#[cfg(feature = "embedded-hal")]
pub mod board;

pub use mock::*;

#[cfg(feature = "embedded-hal")]
pub use board::*;
