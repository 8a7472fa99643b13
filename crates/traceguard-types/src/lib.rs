//! Stable DTOs and IDs used across the traceguard workspace.
//!
//! This crate is intentionally boring:
//! - data types for work contexts, violations, incidents, and guard results
//! - stable string IDs and codes
//! - explain registry for remediation guidance

#![forbid(unsafe_code)]

pub mod context;
pub mod explain;
pub mod ids;
pub mod incident;

pub use context::{PolicyContext, RawContext};
pub use explain::{Explanation, lookup_explanation};
pub use incident::{GuardResult, Incident, Severity, Verdict, Violation};
