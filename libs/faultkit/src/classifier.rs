//! Inbound failure classification
//!
//! Pure decision step: maps one [`Failure`] to the problem to write, the
//! response status, the log severity and the log record. Logging and writing
//! happen in [`ProblemHandler`](crate::response::ProblemHandler).

use faultkit_problem::{Failure, Problem, ProblemError, ValidationFailure, texts};
use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::log::ProblemLog;

/// Log severity chosen for a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// Response status used for problems forwarded from downstream services.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatusPolicy {
    /// Any 4xx problem responds 400, any 5xx problem responds 502.
    #[default]
    Legacy,
    /// Respond with the problem's own status.
    Passthrough,
}

/// Outcome of classifying one failure.
#[derive(Debug, Clone)]
pub struct Classification {
    pub problem: Problem,
    pub response_status: StatusCode,
    pub severity: Severity,
    pub log: ProblemLog,
}

impl Classification {
    fn fresh(status: StatusCode, problem: Problem, severity: Severity, log: ProblemLog) -> Self {
        Self {
            problem: problem.stamped(status),
            response_status: status,
            severity,
            log,
        }
    }
}

/// Classify a failure. Exactly one category applies.
#[must_use]
pub fn classify(failure: Failure, policy: ResponseStatusPolicy) -> Classification {
    match failure {
        Failure::Validation(v) => validation(v),
        Failure::Cancelled => Classification::fresh(
            StatusCode::REQUEST_TIMEOUT,
            Problem::titled(texts::CANCELLED),
            Severity::Warning,
            ProblemLog::new(texts::CANCELLED),
        ),
        Failure::Problem(err) => forwarded(err, policy),
        Failure::Transport { message, .. } => Classification::fresh(
            StatusCode::BAD_GATEWAY,
            Problem::titled(texts::RELATED_SERVICE),
            Severity::Error,
            ProblemLog::new(texts::RELATED_SERVICE).with_arg("error", message),
        ),
        Failure::Unclassified { kind, message } => unclassified(&kind, message),
    }
}

fn validation(v: ValidationFailure) -> Classification {
    let log = ProblemLog::new(format!("Validation error, message: {}", v.message));
    let title = if v.message.trim().is_empty() {
        texts::VALIDATION.to_owned()
    } else {
        v.message
    };
    let mut problem = Problem::titled(title);
    problem.detail = v.detail;
    Classification::fresh(StatusCode::BAD_REQUEST, problem, Severity::Warning, log)
}

fn forwarded(err: ProblemError, policy: ResponseStatusPolicy) -> Classification {
    let Some(status) = err.problem().status_code() else {
        return unclassified("ProblemError", err.to_string());
    };

    let (severity, fixed) = match status.as_u16() {
        400..=499 => (Severity::Warning, StatusCode::BAD_REQUEST),
        500.. => (Severity::Error, StatusCode::BAD_GATEWAY),
        _ => return unclassified("ProblemError", err.to_string()),
    };
    let response_status = match policy {
        ResponseStatusPolicy::Legacy => fixed,
        ResponseStatusPolicy::Passthrough => status,
    };

    let problem = err.into_problem();
    Classification {
        log: ProblemLog::forwarded(&problem),
        problem,
        response_status,
        severity,
    }
}

fn unclassified(kind: &str, message: String) -> Classification {
    Classification::fresh(
        StatusCode::INTERNAL_SERVER_ERROR,
        Problem::titled(texts::INTERNAL),
        Severity::Error,
        ProblemLog::new(format!("{} Failure kind: {kind}", texts::INTERNAL))
            .with_arg("kind", kind)
            .with_arg("error", message),
    )
}
