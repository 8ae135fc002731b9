use faultkit_problem::{ErrorEntry, Problem, texts};
use serde::{Deserialize, Serialize};

use super::ProblemConverter;

/// How matched field violations are rendered into the problem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationStyle {
    /// One `{code, description}` entry per field key under the `errors` extension.
    #[default]
    Extensions,
    /// A single human-readable `detail` listing every violation.
    Detail,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViolationRecord {
    #[serde(default)]
    ref_keys: Option<Vec<String>>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    is_critical: bool,
}

impl ViolationRecord {
    fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }

    fn keys(&self) -> &[String] {
        self.ref_keys.as_deref().unwrap_or_default()
    }
}

/// Accepts a non-empty list of field violation records:
/// `[{"refKeys": ["name"], "message": "...", "isCritical": true}]`.
#[derive(Debug, Clone, Copy)]
pub struct FieldViolationConverter {
    order: i32,
    enabled: bool,
    style: ViolationStyle,
}

impl FieldViolationConverter {
    pub const DEFAULT_ORDER: i32 = 100;

    #[must_use]
    pub const fn new() -> Self {
        Self {
            order: Self::DEFAULT_ORDER,
            enabled: true,
            style: ViolationStyle::Extensions,
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

    #[must_use]
    pub const fn with_style(mut self, style: ViolationStyle) -> Self {
        self.style = style;
        self
    }

    fn with_error_entries(records: &[ViolationRecord]) -> Problem {
        let errors: Vec<ErrorEntry> = records
            .iter()
            .filter_map(|r| r.message().map(|m| (r, m)))
            .flat_map(|(r, message)| r.keys().iter().map(move |k| ErrorEntry::new(k, message)))
            .collect();

        let mut problem =
            Problem::titled(texts::RELATED_SERVICE).with_detail(texts::REQUEST_VIOLATION);
        if let Ok(value) = serde_json::to_value(errors) {
            problem.extensions.insert("errors".to_owned(), value);
        }
        problem
    }

    fn with_detail_text(records: &[ViolationRecord]) -> Problem {
        let mut lines = Vec::new();
        for record in records {
            let Some(message) = record.message() else {
                continue;
            };
            let critical = if record.is_critical { "yes" } else { "no" };
            if record.keys().is_empty() {
                lines.push(format!("message: {message}, critical: {critical}"));
            }
            for key in record.keys() {
                lines.push(format!(
                    "field: {key}, message: {message}, critical: {critical}"
                ));
            }
        }

        let detail = if lines.is_empty() {
            texts::REQUEST_VIOLATION.to_owned()
        } else {
            lines.join("; ")
        };
        Problem::titled(texts::RELATED_SERVICE).with_detail(detail)
    }
}

impl Default for FieldViolationConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProblemConverter for FieldViolationConverter {
    fn name(&self) -> &'static str {
        "field_violations"
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn try_convert(&self, payload: &[u8]) -> Option<Problem> {
        let records: Vec<ViolationRecord> = serde_json::from_slice(payload).ok()?;
        if records.is_empty() {
            return None;
        }

        Some(match self.style {
            ViolationStyle::Extensions => Self::with_error_entries(&records),
            ViolationStyle::Detail => Self::with_detail_text(&records),
        })
    }
}
