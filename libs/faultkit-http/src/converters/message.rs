use faultkit_problem::{Problem, is_standard_member, texts};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::ProblemConverter;

#[derive(Debug, Deserialize)]
struct MessageBody {
    #[serde(alias = "Message")]
    message: String,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

/// Accepts a single object carrying a `message` member, such as
/// `{"message": "Name field required"}`.
///
/// The message becomes the problem detail; any other members of the object
/// (`messageDetail`, `modelState`, ...) are kept as extensions, except those
/// named like a standard problem member.
#[derive(Debug, Clone, Copy)]
pub struct MessageConverter {
    order: i32,
    enabled: bool,
}

impl MessageConverter {
    pub const DEFAULT_ORDER: i32 = 300;

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

impl Default for MessageConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProblemConverter for MessageConverter {
    fn name(&self) -> &'static str {
        "message"
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn try_convert(&self, payload: &[u8]) -> Option<Problem> {
        let body: MessageBody = serde_json::from_slice(payload).ok()?;
        if body.message.trim().is_empty() {
            return None;
        }

        let mut problem = Problem::titled(texts::RELATED_SERVICE).with_detail(body.message);
        problem.extensions = body
            .rest
            .into_iter()
            .filter(|(key, _)| !is_standard_member(key))
            .collect();
        Some(problem)
    }
}
