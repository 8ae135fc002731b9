//! Core problem types for the faultkit error pipeline
//!
//! This crate provides pure data types for error normalization, with no
//! dependencies on HTTP frameworks. It includes:
//! - RFC 9457 Problem Details (`Problem`)
//! - Status-to-type resolution (`problem_type_for`)
//! - The typed error carrying a problem (`ProblemError`)
//! - The failure taxonomy consumed by the inbound classifier (`Failure`)
//! - JSON encoding with a configurable Unicode escaping policy (`json`)
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod error;
pub mod json;
pub mod problem;
pub mod texts;
pub mod types;

pub use error::{Failure, ProblemError, ValidationFailure};
pub use json::{UnicodePolicy, UnicodeRange};
pub use problem::{ErrorEntry, Problem, STANDARD_MEMBERS, is_standard_member};
pub use texts::{APPLICATION_JSON, APPLICATION_PROBLEM_JSON, APPLICATION_PROBLEM_JSON_UTF8};
pub use types::problem_type_for;
