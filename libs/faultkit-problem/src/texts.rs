//! Fixed problem titles and media types

/// Content type for Problem Details as per RFC 9457.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// Content type written on problem responses.
pub const APPLICATION_PROBLEM_JSON_UTF8: &str = "application/problem+json; charset=utf-8";

pub const APPLICATION_JSON: &str = "application/json";

pub const INTERNAL: &str = "Internal service error.";

pub const RELATED_SERVICE: &str = "An error occurred while contacting a related service.";

pub const CANCELLED: &str = "The request timed out or was cancelled.";

pub const VALIDATION: &str = "Validation error.";

pub const REQUEST_VIOLATION: &str = "Request requirement violations were detected.";
