//! The inbound failure boundary
//!
//! [`handle_failures`] wraps the rest of the request pipeline. Handlers
//! report failures by returning [`ApiError`]; the boundary also turns its
//! own deadline and handler panics into failures. Each failure is
//! classified, logged and written exactly once, here.

use std::any::Any;
use std::borrow::Cow;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::{Request, State};
use axum::middleware::{Next, from_fn_with_state};
use axum::response::{IntoResponse, Response};
use faultkit_problem::{Failure, Problem, ProblemError, ValidationFailure};
use futures_util::FutureExt;

use crate::config::ExceptionHandlingConfig;
use crate::response::ProblemHandler;

/// Failure waiting in a response for the boundary to handle.
#[derive(Debug, Clone)]
struct UnhandledFailure(Failure);

/// Handler error type.
///
/// Without a [`FailureBoundary`] the failure is still rendered with the
/// default settings, but it is not logged.
#[derive(Debug)]
pub struct ApiError(pub Failure);

impl From<Failure> for ApiError {
    fn from(failure: Failure) -> Self {
        Self(failure)
    }
}

impl From<ProblemError> for ApiError {
    fn from(err: ProblemError) -> Self {
        Self(err.into())
    }
}

impl From<ValidationFailure> for ApiError {
    fn from(err: ValidationFailure) -> Self {
        Self(err.into())
    }
}

impl From<Problem> for ApiError {
    fn from(problem: Problem) -> Self {
        Self(problem.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut resp = ProblemHandler::default()
            .render(self.0.clone())
            .into_response();
        resp.extensions_mut().insert(UnhandledFailure(self.0));
        resp
    }
}

/// State of the boundary middleware.
#[derive(Debug, Clone, Default)]
pub struct FailureBoundary {
    handler: Arc<ProblemHandler>,
    request_timeout: Option<Duration>,
}

impl FailureBoundary {
    #[must_use]
    pub fn new(handler: ProblemHandler) -> Self {
        Self {
            handler: Arc::new(handler),
            request_timeout: None,
        }
    }

    #[must_use]
    pub fn from_config(config: &ExceptionHandlingConfig) -> Self {
        let mut boundary = Self::new(ProblemHandler::from_config(config));
        boundary.request_timeout = config.request_timeout();
        boundary
    }

    /// Fail requests still running after `timeout` as cancelled.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Wrap every route of `router`. Install it as the outermost layer so
    /// failures from other middleware are covered too.
    #[must_use]
    pub fn install<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.layer(from_fn_with_state(self, handle_failures))
    }
}

/// Boundary middleware function; see [`FailureBoundary::install`].
pub async fn handle_failures(
    State(boundary): State<FailureBoundary>,
    request: Request,
    next: Next,
) -> Response {
    let run = AssertUnwindSafe(next.run(request)).catch_unwind();

    let outcome = match boundary.request_timeout {
        Some(limit) => {
            if let Ok(outcome) = tokio::time::timeout(limit, run).await {
                outcome
            } else {
                return boundary.handler.handle(Failure::Cancelled);
            }
        }
        None => run.await,
    };

    let mut response = match outcome {
        Ok(response) => response,
        Err(panic) => {
            return boundary.handler.handle(Failure::Unclassified {
                kind: Cow::Borrowed("panic"),
                message: panic_message(panic.as_ref()),
            });
        }
    };

    match response.extensions_mut().remove::<UnhandledFailure>() {
        Some(UnhandledFailure(failure)) => boundary.handler.handle(failure),
        None => response,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_owned()
    }
}
