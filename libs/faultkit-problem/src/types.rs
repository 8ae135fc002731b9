//! Status-to-type resolution
//!
//! Maps well-known HTTP status codes to stable RFC 7231 section references
//! used as the problem `type`. Unmapped codes resolve to `None`.

use http::StatusCode;

const TYPES: &[(StatusCode, &str)] = &[
    (
        StatusCode::BAD_REQUEST,
        "https://tools.ietf.org/html/rfc7231#section-6.5.1",
    ),
    (
        StatusCode::REQUEST_TIMEOUT,
        "https://tools.ietf.org/html/rfc7231#section-6.5.7",
    ),
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "https://tools.ietf.org/html/rfc7231#section-6.6.1",
    ),
    (
        StatusCode::BAD_GATEWAY,
        "https://tools.ietf.org/html/rfc7231#section-6.6.3",
    ),
];

/// Resolve the problem type reference for a status code.
#[must_use]
pub fn problem_type_for(status: StatusCode) -> Option<&'static str> {
    TYPES
        .iter()
        .find(|(code, _)| *code == status)
        .map(|(_, type_url)| *type_url)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn well_known_codes_resolve() {
        assert_eq!(
            problem_type_for(StatusCode::BAD_REQUEST),
            Some("https://tools.ietf.org/html/rfc7231#section-6.5.1")
        );
        assert_eq!(
            problem_type_for(StatusCode::REQUEST_TIMEOUT),
            Some("https://tools.ietf.org/html/rfc7231#section-6.5.7")
        );
        assert_eq!(
            problem_type_for(StatusCode::INTERNAL_SERVER_ERROR),
            Some("https://tools.ietf.org/html/rfc7231#section-6.6.1")
        );
        assert_eq!(
            problem_type_for(StatusCode::BAD_GATEWAY),
            Some("https://tools.ietf.org/html/rfc7231#section-6.6.3")
        );
    }

    #[test]
    fn other_codes_are_unset() {
        for code in [200, 201, 301, 401, 404, 409, 422, 501, 503, 504] {
            let status = StatusCode::from_u16(code).unwrap();
            assert!(problem_type_for(status).is_none(), "{code} must be unset");
        }
    }
}
