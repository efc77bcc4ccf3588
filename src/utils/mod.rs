//! Utility Module
//!
//! - [`time`]: frame clocks driving the animation player

pub mod time;

pub use time::{FixedStep, FrameClock};
