//! Integration test modules for mixdown
//!
//! - engine: Builder validation, batch loading, mute toggles
//! - mixing: Mix contents for loaded sessions
//! - playback: State machine, output and visualizer lifecycle

pub mod engine;
pub mod mixing;
pub mod playback;
