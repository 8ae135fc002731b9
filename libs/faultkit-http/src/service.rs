use bytes::Bytes;
use faultkit_problem::{APPLICATION_JSON, Failure};
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{Method, Request, Response};
use http_body::Body;
use http_body_util::Full;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tower::{BoxError, Service, ServiceExt};

use crate::chain::ConverterChain;
use crate::outbound::ResponseClassifier;

/// Request body type sent by [`HttpService`].
pub type RequestBody = Full<Bytes>;

/// Outbound helper over any HTTP client exposed as a `tower::Service`.
///
/// Every completed response goes through the [`ResponseClassifier`] before
/// its body is read, so callers either get a decoded value or a [`Failure`]
/// ready to propagate to the inbound boundary.
#[derive(Debug, Clone)]
pub struct HttpService<S> {
    inner: S,
    classifier: ResponseClassifier,
}

impl<S> HttpService<S> {
    #[must_use]
    pub fn new(inner: S, chain: ConverterChain) -> Self {
        Self::with_classifier(inner, ResponseClassifier::new(chain))
    }

    #[must_use]
    pub fn with_classifier(inner: S, classifier: ResponseClassifier) -> Self {
        Self { inner, classifier }
    }

    #[must_use]
    pub fn classifier(&self) -> &ResponseClassifier {
        &self.classifier
    }
}

impl<S, B> HttpService<S>
where
    S: Service<Request<RequestBody>, Response = Response<B>> + Clone,
    S::Error: Into<BoxError>,
    B: Body,
    B::Error: Into<BoxError>,
{
    /// Send a request and classify the response.
    ///
    /// # Errors
    /// Returns [`Failure::Transport`] (or [`Failure::Cancelled`] on a timeout)
    /// when the client fails, and [`Failure::Problem`] for non-2xx responses.
    pub async fn send(&self, request: Request<RequestBody>) -> Result<Response<B>, Failure> {
        let method = request.method().clone();
        let uri = request.uri().clone();

        let mut svc = self.inner.clone();
        let response = svc
            .ready()
            .await
            .map_err(call_failure)?
            .call(request)
            .await
            .map_err(|e| {
                let failure = call_failure(e);
                tracing::debug!(%method, %uri, error = %failure, "downstream call did not complete");
                failure
            })?;

        self.classifier.ensure_success(response).await
    }

    /// `GET` and decode a JSON body.
    ///
    /// # Errors
    /// See [`HttpService::send`]; decoding errors are unclassified failures.
    pub async fn get_as<T: DeserializeOwned>(&self, uri: &str) -> Result<T, Failure> {
        let response = self.send(build(Method::GET, uri, None)?).await?;
        self.decode(response).await
    }

    /// `POST` a JSON body and decode the JSON response.
    ///
    /// # Errors
    /// See [`HttpService::get_as`].
    pub async fn post_as<T, R>(&self, uri: &str, body: &T) -> Result<R, Failure>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .send(build(Method::POST, uri, Some(encode(body)?))?)
            .await?;
        self.decode(response).await
    }

    /// `PUT` a JSON body and decode the JSON response.
    ///
    /// # Errors
    /// See [`HttpService::get_as`].
    pub async fn put_as<T, R>(&self, uri: &str, body: &T) -> Result<R, Failure>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .send(build(Method::PUT, uri, Some(encode(body)?))?)
            .await?;
        self.decode(response).await
    }

    /// `DELETE` and discard the response body.
    ///
    /// # Errors
    /// See [`HttpService::send`].
    pub async fn delete(&self, uri: &str) -> Result<(), Failure> {
        let response = self.send(build(Method::DELETE, uri, None)?).await?;
        self.classifier.read_body(response.into_body()).await?;
        Ok(())
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response<B>) -> Result<T, Failure> {
        let bytes = self.classifier.read_body(response.into_body()).await?;
        serde_json::from_slice(&bytes).map_err(|e| Failure::unclassified(&e))
    }
}

fn encode<T: Serialize + ?Sized>(body: &T) -> Result<Bytes, Failure> {
    serde_json::to_vec(body)
        .map(Bytes::from)
        .map_err(|e| Failure::unclassified(&e))
}

fn build(method: Method, uri: &str, body: Option<Bytes>) -> Result<Request<RequestBody>, Failure> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(ACCEPT, APPLICATION_JSON);
    if body.is_some() {
        builder = builder.header(CONTENT_TYPE, APPLICATION_JSON);
    }
    builder
        .body(Full::new(body.unwrap_or_default()))
        .map_err(|e| Failure::unclassified(&e))
}

fn call_failure<E: Into<BoxError>>(err: E) -> Failure {
    let err: BoxError = err.into();
    if err.is::<tower::timeout::error::Elapsed>() {
        return Failure::Cancelled;
    }
    if let Some(known) = Failure::recognize(&*err) {
        return known;
    }
    Failure::Transport {
        message: err.to_string(),
        source: Some(err.into()),
    }
}
