//! Trait definitions for hardware abstraction.
//!
//! This module defines the single seam between the drivers and the host
//! platform, which lets beatbot:
//! - Run on a microcontroller through a board-specific pin layer
//! - Run on desktop against the recording mock in [`crate::hal::mock`]
//!
//! # Submodules
//!
//! - `hardware`: [`PinLayer`] trait, [`Level`], pin identifiers and limits

pub mod hardware;

pub use hardware::*;
