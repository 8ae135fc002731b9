use bytes::Bytes;
use faultkit_problem::{Failure, ProblemError};
use http::{Response, StatusCode};
use http_body::Body;
use http_body_util::{BodyExt, Limited};
use tower::BoxError;

use crate::chain::ConverterChain;
use crate::config::DEFAULT_MAX_ERROR_BODY_SIZE;

/// Outbound failure classifier.
///
/// Passes successful responses through untouched. For any other status the
/// body is drained once, converted by the chain and stamped with the
/// response status and its problem type, and the result is raised as
/// [`Failure::Problem`].
#[derive(Debug, Clone)]
pub struct ResponseClassifier {
    chain: ConverterChain,
    max_body_size: usize,
}

impl ResponseClassifier {
    #[must_use]
    pub fn new(chain: ConverterChain) -> Self {
        Self {
            chain,
            max_body_size: DEFAULT_MAX_ERROR_BODY_SIZE,
        }
    }

    /// Cap on bytes read from a response body.
    #[must_use]
    pub fn with_max_body_size(mut self, limit: usize) -> Self {
        self.max_body_size = limit;
        self
    }

    /// Check a completed response.
    ///
    /// # Errors
    /// Returns [`Failure::Problem`] carrying the classified problem when the
    /// status is not 2xx, or [`Failure::Transport`] when the error body
    /// cannot be read.
    pub async fn ensure_success<B>(&self, response: Response<B>) -> Result<Response<B>, Failure>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = self.read_body(response.into_body()).await?;
        let error = self.classify(status, &body);
        tracing::debug!(
            status = status.as_u16(),
            title = error.problem().title.as_deref(),
            "downstream call failed"
        );
        Err(Failure::Problem(error))
    }

    /// Convert an already buffered error body into a stamped problem error.
    #[must_use]
    pub fn classify(&self, status: StatusCode, body: &[u8]) -> ProblemError {
        ProblemError::new(self.chain.convert(body).stamped(status))
    }

    /// Drain `body` to the end, enforcing the size cap.
    ///
    /// # Errors
    /// Returns [`Failure::Transport`] on read errors or when the cap is exceeded.
    pub async fn read_body<B>(&self, body: B) -> Result<Bytes, Failure>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        Limited::new(body, self.max_body_size)
            .collect()
            .await
            .map(http_body_util::Collected::to_bytes)
            .map_err(body_failure)
    }
}

impl Default for ResponseClassifier {
    fn default() -> Self {
        Self::new(ConverterChain::default())
    }
}

pub(crate) fn body_failure(err: BoxError) -> Failure {
    if let Some(known) = Failure::recognize(&*err) {
        return known;
    }
    Failure::Transport {
        message: format!("failed to read response body: {err}"),
        source: Some(err.into()),
    }
}
