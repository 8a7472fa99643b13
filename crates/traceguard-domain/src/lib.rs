//! Pure policy evaluation (no IO).
//!
//! Input: a normalized work context constructed elsewhere.
//! Output: violations + verdict.

#![forbid(unsafe_code)]

pub mod normalize;
pub mod policy;

mod engine;
pub mod rules;

pub use engine::{Evaluation, evaluate};
pub use normalize::normalize;

#[cfg(test)]
mod proptest;
#[cfg(test)]
mod test_support;
