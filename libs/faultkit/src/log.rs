//! What gets logged for a classified failure

use faultkit_problem::Problem;

use crate::classifier::Severity;

const FORWARDED_PREFIX: &str = "Related service returned a problem";

/// Log message plus an ordered list of structured arguments.
///
/// Arguments are only present when the underlying value is; emitting a
/// record never fails on missing problem members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemLog {
    message: String,
    args: Vec<(&'static str, String)>,
}

impl ProblemLog {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_arg(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.args.push((name, value.into()));
        self
    }

    /// Record for a problem forwarded from a downstream service.
    ///
    /// Title (without its trailing period), trimmed detail, status and, when
    /// non-empty, the serialized extensions each add a token to the message
    /// and an argument, in that order.
    #[must_use]
    pub fn forwarded(problem: &Problem) -> Self {
        let mut args = Vec::new();
        if let Some(title) = problem.title.as_deref() {
            args.push(("title", strip_period(title.trim()).to_owned()));
        }
        if let Some(detail) = problem.detail.as_deref() {
            args.push(("detail", detail.trim().to_owned()));
        }
        if let Some(status) = problem.status {
            args.push(("status", status.to_string()));
        }
        if !problem.extensions.is_empty()
            && let Ok(dump) = serde_json::to_string(&problem.extensions)
        {
            args.push(("extensions", dump));
        }

        let tokens: Vec<String> = args
            .iter()
            .map(|(name, value)| format!("{}: {value}", capitalize(name)))
            .collect();
        let message = if tokens.is_empty() {
            FORWARDED_PREFIX.to_owned()
        } else {
            format!("{FORWARDED_PREFIX}. {}", tokens.join(", "))
        };

        Self { message, args }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn args(&self) -> &[(&'static str, String)] {
        &self.args
    }

    #[must_use]
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Emit the record through `tracing` at the given severity.
    pub fn emit(&self, severity: Severity) {
        macro_rules! emit_at {
            ($level:ident) => {
                tracing::$level!(
                    title = self.arg("title"),
                    detail = self.arg("detail"),
                    status = self.arg("status"),
                    extensions = self.arg("extensions"),
                    kind = self.arg("kind"),
                    error = self.arg("error"),
                    "{}",
                    self.message
                )
            };
        }

        match severity {
            Severity::Warning => emit_at!(warn),
            Severity::Error => emit_at!(error),
        }
    }
}

fn strip_period(title: &str) -> &str {
    title.strip_suffix('.').unwrap_or(title)
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
