//! Inbound failure boundary for axum services
//!
//! Every failure surfacing from request handling is classified exactly once
//! into a problem, a response status and a log severity, then logged and
//! written as `application/problem+json`:
//!
//! | Failure | Log | Response |
//! |---|---|---|
//! | validation | warn | 400 |
//! | cancelled / deadline | warn | 408 |
//! | downstream problem, 4xx | warn | 400 |
//! | downstream problem, 5xx | error | 502 |
//! | downstream transport | error | 502 |
//! | anything else | error | 500 |
//!
//! Downstream problems respond with the fixed 400/502 unless
//! [`ResponseStatusPolicy::Passthrough`] is configured.
//!
//! # Example
//!
//! ```ignore
//! use faultkit::{ApiError, FailureBoundary};
//!
//! async fn handler() -> Result<Json<User>, ApiError> {
//!     Ok(Json(users.get_as("http://users.internal/users/1").await?))
//! }
//!
//! let router = FailureBoundary::from_config(&config).install(Router::new().route("/", get(handler)));
//! ```
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod classifier;
pub mod config;
pub mod log;
pub mod middleware;
pub mod response;
pub mod telemetry;

pub use classifier::{Classification, ResponseStatusPolicy, Severity, classify};
pub use config::{ConfigError, ExceptionHandlingConfig, load_config};
pub use log::ProblemLog;
pub use middleware::{ApiError, FailureBoundary, handle_failures};
pub use response::{ProblemHandler, ProblemResponse};
pub use telemetry::{LoggingConfig, TelemetryError, init_logging};

pub use faultkit_http as http_client;
pub use faultkit_problem as problem;
pub use faultkit_problem::{Failure, Problem, ProblemError, ValidationFailure};
