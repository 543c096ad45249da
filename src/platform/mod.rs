//! Platform abstraction layer
//!
//! Turns raw device events into the polled snapshot the game consumes.

pub mod input;

pub use input::{InputSnapshot, InputState, Key};
