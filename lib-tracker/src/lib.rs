//! Drives a step detection session from a live sample source and keeps a presentation
//! collaborator up to date with the step count, activity and calorie estimate.
//!
//! Everything that mutates the session runs on a single tokio task: incoming samples, the timer
//! that closes the step window and reset requests from the user.

pub mod error;
pub use error::*;

pub mod source;
pub use source::*;

pub mod presentation;
pub use presentation::*;

pub mod tracker;
pub use tracker::*;

#[cfg(test)]
mod tests;
