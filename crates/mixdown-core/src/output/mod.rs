//! Live output implementations.
//!
//! - [`HeadlessOutput`]: timer-driven, no device. Feeds the signal tap only.
//! - `CpalOutput` (feature `cpal`): default output device.

mod headless;
pub use headless::HeadlessOutput;

#[cfg(feature = "cpal")]
mod cpal;
#[cfg(feature = "cpal")]
pub use self::cpal::CpalOutput;

/// Samples the signal tap can hold before new ones are dropped.
pub const DEFAULT_TAP_CAPACITY: usize = 16384;
