//! Shared foundational types used across the critpath workspace.
//!
//! Holds the [`Frequency`] value type used when converting a critical path
//! delay into a clock bound.

#![warn(missing_docs)]

pub mod frequency;

pub use frequency::{Frequency, ParseFrequencyError};
