#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Downstream error conversion for faultkit
//!
//! This crate turns failed downstream HTTP responses into typed failures:
//! - An ordered chain of converters parses an unknown error body into a
//!   [`Problem`](faultkit_problem::Problem); the first converter producing a
//!   titled problem wins, and unrecognised bodies fall back to plain text
//! - [`ResponseClassifier`] checks a completed response, drains the body of a
//!   failed one through the chain and raises a [`ProblemError`](faultkit_problem::ProblemError)
//! - [`HttpService`] wraps any `tower::Service` HTTP client with
//!   `get_as`/`post_as`/`put_as`/`delete` helpers that feed every response
//!   through the classifier
//!
//! # Example
//!
//! ```ignore
//! use faultkit_http::{ConverterChain, HttpService};
//!
//! let service = HttpService::new(client, ConverterChain::default());
//! let user: User = service.get_as("http://users.internal/users/42").await?;
//! ```

mod chain;
mod config;
pub mod converters;
mod outbound;
mod service;

pub use chain::ConverterChain;
pub use config::{ConverterSettings, ConvertersConfig, DEFAULT_MAX_ERROR_BODY_SIZE};
pub use converters::{
    FieldViolationConverter, MessageConverter, ProblemConverter, ProblemDetailsConverter,
    ViolationStyle,
};
pub use outbound::ResponseClassifier;
pub use service::{HttpService, RequestBody};
