use faultkit_problem::Problem;

use super::ProblemConverter;

/// Accepts payloads that already are RFC 9457 problems with a title.
#[derive(Debug, Clone, Copy)]
pub struct ProblemDetailsConverter {
    order: i32,
    enabled: bool,
}

impl ProblemDetailsConverter {
    pub const DEFAULT_ORDER: i32 = 200;

    #[must_use]
    pub const fn new() -> Self {
        Self {
            order: Self::DEFAULT_ORDER,
            enabled: true,
        }
    }

    #[must_use]
    pub const fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl Default for ProblemDetailsConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProblemConverter for ProblemDetailsConverter {
    fn name(&self) -> &'static str {
        "problem_details"
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn try_convert(&self, payload: &[u8]) -> Option<Problem> {
        serde_json::from_slice::<Problem>(payload)
            .ok()
            .filter(Problem::has_title)
    }
}
