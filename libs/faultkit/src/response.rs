//! Writing problems as `application/problem+json` responses

use axum::body::Body;
use axum::response::{IntoResponse, Response};
use faultkit_problem::{APPLICATION_PROBLEM_JSON_UTF8, Failure, Problem, UnicodePolicy, json};
use http::{HeaderValue, StatusCode, header};

use crate::classifier::{ResponseStatusPolicy, classify};
use crate::config::ExceptionHandlingConfig;

const FALLBACK_BODY: &[u8] = br#"{"title":"Internal service error.","status":500}"#;

/// A problem plus the status it is written with.
///
/// The response status is not necessarily the problem's own `status`:
/// forwarded problems keep the downstream status in the body.
#[derive(Debug, Clone)]
pub struct ProblemResponse {
    pub status: StatusCode,
    pub problem: Problem,
    pub unicode: UnicodePolicy,
}

impl ProblemResponse {
    #[must_use]
    pub fn new(status: StatusCode, problem: Problem) -> Self {
        Self {
            status,
            problem,
            unicode: UnicodePolicy::default(),
        }
    }

    #[must_use]
    pub fn with_unicode(mut self, unicode: UnicodePolicy) -> Self {
        self.unicode = unicode;
        self
    }
}

impl IntoResponse for ProblemResponse {
    fn into_response(self) -> Response {
        let body = json::to_vec(&self.problem, &self.unicode).unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to serialize problem");
            FALLBACK_BODY.to_vec()
        });

        let mut resp = Response::new(Body::from(body));
        *resp.status_mut() = self.status;
        resp.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(APPLICATION_PROBLEM_JSON_UTF8),
        );
        resp
    }
}

/// Classifies, logs and writes a failure.
#[derive(Debug, Clone, Default)]
pub struct ProblemHandler {
    policy: ResponseStatusPolicy,
    unicode: UnicodePolicy,
}

impl ProblemHandler {
    #[must_use]
    pub fn new(policy: ResponseStatusPolicy, unicode: UnicodePolicy) -> Self {
        Self { policy, unicode }
    }

    #[must_use]
    pub fn from_config(config: &ExceptionHandlingConfig) -> Self {
        Self::new(config.response_status_policy, config.unicode.clone())
    }

    /// Render `failure` without logging it.
    #[must_use]
    pub fn render(&self, failure: Failure) -> ProblemResponse {
        let c = classify(failure, self.policy);
        ProblemResponse::new(c.response_status, c.problem).with_unicode(self.unicode.clone())
    }

    /// Classify `failure`, log it once and build the response.
    #[must_use]
    pub fn handle(&self, failure: Failure) -> Response {
        let c = classify(failure, self.policy);
        c.log.emit(c.severity);
        ProblemResponse::new(c.response_status, c.problem)
            .with_unicode(self.unicode.clone())
            .into_response()
    }
}
