#![cfg_attr(not(any(feature = "std", test)), no_std)]

pub mod sample;
pub use sample::*;

pub mod step_detection;
pub use step_detection::*;

pub mod calories;
pub use calories::*;

/// Minimum change of the vertical-axis signal, relative to the value at the last accepted step,
/// for a sample to count as a step.
///
pub const THRESHOLD: f32 = 0.1;

/// In milliseconds; minimum spacing between the timestamps of two accepted steps.
///
pub const MIN_INTERVAL_MS: u64 = 800;

/// In milliseconds; how long the step window stays open after an accepted step. This is wall
/// clock time measured by whoever drives the session, not sample time.
///
pub const DEBOUNCE_MS: u64 = 1200;
