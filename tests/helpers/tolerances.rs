//! Tolerance constants for mix comparisons.

/// Floating point rounding errors (sums of two float samples).
pub const FLOAT_EPSILON: f32 = 1e-6;

/// Values below this are considered silent (~-80dB).
pub const SILENCE_THRESHOLD: f32 = 0.0001;
