//! Typed errors carried from the point of detection to the error boundary

use std::any::type_name;
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::problem::Problem;

/// Shared, cloneable error source.
pub type SharedError = Arc<dyn StdError + Send + Sync + 'static>;

/// Error carrying exactly one classified [`Problem`].
///
/// Raised by the outbound classifier when a downstream call fails, and
/// consumed once by the inbound classifier at the request boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemError {
    problem: Problem,
}

impl ProblemError {
    #[must_use]
    pub fn new(problem: Problem) -> Self {
        Self { problem }
    }

    #[must_use]
    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    #[must_use]
    pub fn into_problem(self) -> Problem {
        self.problem
    }
}

impl fmt::Display for ProblemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = self.problem.title.as_deref().unwrap_or("untitled problem");
        match self.problem.status {
            Some(status) => write!(f, "problem {status}: {title}"),
            None => write!(f, "problem: {title}"),
        }
    }
}

impl StdError for ProblemError {}

impl From<Problem> for ProblemError {
    fn from(problem: Problem) -> Self {
        Self::new(problem)
    }
}

/// Local validation failure raised by request handling code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationFailure {
    /// Summary of the violated rule; becomes the problem title.
    pub message: String,
    /// Detail message reported by the validation engine, if any.
    pub detail: Option<String>,
}

impl ValidationFailure {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Failure taxonomy understood by the inbound classifier.
///
/// Produced at the point of detection; a single exhaustive match at the
/// boundary decides status, log severity and response body.
#[derive(Debug, Clone, Error)]
pub enum Failure {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationFailure),

    #[error("operation cancelled or deadline exceeded")]
    Cancelled,

    #[error(transparent)]
    Problem(#[from] ProblemError),

    #[error("downstream transport failure: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<SharedError>,
    },

    #[error("unclassified failure ({kind}): {message}")]
    Unclassified {
        kind: Cow<'static, str>,
        message: String,
    },
}

impl From<Problem> for Failure {
    fn from(problem: Problem) -> Self {
        Self::Problem(ProblemError::new(problem))
    }
}

impl Failure {
    /// Transport failure wrapping the error returned by an HTTP client.
    #[must_use]
    pub fn transport<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Transport {
            message: err.to_string(),
            source: Some(Arc::new(err)),
        }
    }

    /// Unclassified failure recording the concrete error type name.
    #[must_use]
    pub fn unclassified<E>(err: &E) -> Self
    where
        E: StdError + ?Sized,
    {
        Self::Unclassified {
            kind: Cow::Borrowed(type_name::<E>()),
            message: err.to_string(),
        }
    }

    /// Classify an arbitrary error.
    ///
    /// The `source()` chain is searched for a known failure kind; if none is
    /// found the failure is unclassified and records the type name of `err`.
    #[must_use]
    pub fn from_error<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::recognize(&err).unwrap_or_else(|| Self::unclassified(&err))
    }

    /// Search the `source()` chain of `err` for a known failure kind.
    #[must_use]
    pub fn recognize(err: &(dyn StdError + 'static)) -> Option<Self> {
        let mut current = Some(err);
        while let Some(e) = current {
            if let Some(failure) = e.downcast_ref::<Failure>() {
                return Some(failure.clone());
            }
            if let Some(v) = e.downcast_ref::<ValidationFailure>() {
                return Some(Self::Validation(v.clone()));
            }
            if let Some(p) = e.downcast_ref::<ProblemError>() {
                return Some(Self::Problem(p.clone()));
            }
            if let Some(io) = e.downcast_ref::<std::io::Error>()
                && io.kind() == std::io::ErrorKind::TimedOut
            {
                return Some(Self::Cancelled);
            }
            current = e.source();
        }
        None
    }

    /// Short name of the failure category, used in logs.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Validation(_) => "validation",
            Self::Cancelled => "cancelled",
            Self::Problem(_) => "problem",
            Self::Transport { .. } => "transport",
            Self::Unclassified { kind, .. } => kind,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use http::StatusCode;

    #[derive(Debug, Error)]
    #[error("wrapper")]
    struct Wrapper(#[source] ProblemError);

    #[derive(Debug, Error)]
    #[error("plain failure")]
    struct Plain;

    #[test]
    fn problem_error_display_includes_status_and_title() {
        let err = ProblemError::new(Problem::for_status(StatusCode::BAD_GATEWAY, "Boom"));
        assert_eq!(err.to_string(), "problem 502: Boom");
    }

    #[test]
    fn from_error_finds_problem_in_source_chain() {
        let inner = ProblemError::new(Problem::titled("inner"));
        let failure = Failure::from_error(Wrapper(inner.clone()));
        match failure {
            Failure::Problem(p) => assert_eq!(p, inner),
            other => panic!("expected problem failure, got {other:?}"),
        }
    }

    #[test]
    fn from_error_recognises_validation() {
        let failure = Failure::from_error(ValidationFailure::new("Field X is required"));
        assert!(matches!(failure, Failure::Validation(v) if v.message == "Field X is required"));
    }

    #[test]
    fn from_error_maps_timed_out_io_to_cancelled() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "slow");
        assert!(matches!(Failure::from_error(io), Failure::Cancelled));
    }

    #[test]
    fn unknown_errors_record_type_name() {
        let failure = Failure::from_error(Plain);
        match failure {
            Failure::Unclassified { kind, message } => {
                assert!(kind.ends_with("Plain"), "kind was {kind}");
                assert_eq!(message, "plain failure");
            }
            other => panic!("expected unclassified, got {other:?}"),
        }
    }

    #[test]
    fn transport_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let failure = Failure::transport(io);
        assert!(failure.source().is_some());
        assert_eq!(failure.kind(), "transport");
    }
}
