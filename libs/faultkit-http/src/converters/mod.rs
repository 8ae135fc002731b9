//! Converters from downstream error bodies to problems
//!
//! Each converter assumes one payload schema. A converter never fails: any
//! parse error or schema mismatch is reported as `None` ("no match") and the
//! chain moves on to the next converter with the same, untouched payload.

mod field_violations;
mod message;
mod problem_details;

pub use field_violations::{FieldViolationConverter, ViolationStyle};
pub use message::MessageConverter;
pub use problem_details::ProblemDetailsConverter;

use faultkit_problem::Problem;

/// Capability shared by all converters.
///
/// Converters are stateless, built once at startup and invoked concurrently
/// from many requests.
pub trait ProblemConverter: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Priority; lower values are tried first.
    fn order(&self) -> i32;

    /// Disabled converters are dropped when the chain is built.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Try to parse `payload` under this converter's schema.
    fn try_convert(&self, payload: &[u8]) -> Option<Problem>;
}
