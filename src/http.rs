//! Transport primitives for token exchanges and management API calls.
//!
//! The module exposes [`ApiTransport`] alongside [`ResponseMetadata`] so downstream
//! crates can plug in custom HTTP stacks (or scripted fakes in tests) without
//! touching the request pipeline. Every outbound call, including the token
//! exchange, funnels through a single [`ApiTransport::execute`] invocation that
//! takes a fully-built [`HttpRequest`] and returns the raw [`HttpResponse`].

// crates.io
use http::{HeaderMap, StatusCode, header::RETRY_AFTER};
// self
use crate::{
	_prelude::*,
	error::{DecodeError, TransportError},
};

/// Request type accepted by [`ApiTransport`].
pub type HttpRequest = http::Request<Vec<u8>>;
/// Response type produced by [`ApiTransport`].
pub type HttpResponse = http::Response<Vec<u8>>;
/// Boxed future returned by [`ApiTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing management API calls.
///
/// The trait is the client's only dependency on an HTTP stack. Implementations must
/// be `Send + Sync + 'static` so a single transport can be shared between the token
/// cache and the request pipeline behind an `Arc`. Non-2xx responses are not errors
/// at this layer; implementations return them as regular [`HttpResponse`] values and
/// reserve [`TransportError`] for network and IO failures.
pub trait ApiTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and resolves with the complete response.
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_>;
}

/// Metadata extracted from a response for classification and logging.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
	/// HTTP status code returned by the endpoint.
	pub status: u16,
	/// Retry-After hint expressed as a relative duration, when present and positive.
	pub retry_after: Option<StdDuration>,
}
impl ResponseMetadata {
	/// Captures status and retry hints from `response`.
	pub fn from_response(response: &HttpResponse) -> Self {
		Self {
			status: response.status().as_u16(),
			retry_after: parse_retry_after(response.headers()),
		}
	}

	/// Returns `true` when the endpoint signaled a rate limit.
	pub fn is_rate_limited(&self) -> bool {
		self.status == StatusCode::TOO_MANY_REQUESTS.as_u16()
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Redirects are never followed, so the bearer header stays on the tenant origin.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Builds a transport backed by a fresh reqwest client with redirects disabled.
	pub fn new() -> Result<Self, crate::error::ConfigError> {
		let client =
			ReqwestClient::builder().redirect(reqwest::redirect::Policy::none()).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiTransport for ReqwestTransport {
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let url = request.uri().to_string();
			let request: reqwest::Request =
				request.try_into().map_err(|e| TransportError::network(&url, e))?;
			let response =
				client.execute(request).await.map_err(|e| TransportError::network(&url, e))?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await.map_err(|e| TransportError::network(&url, e))?;
			let mut response_new = HttpResponse::new(body.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

/// Parses the integer-seconds `retry-after` header.
///
/// Absent, malformed, and zero values yield `None` so callers fall back to their
/// default delay.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<StdDuration> {
	let value = headers.get(RETRY_AFTER)?;
	let secs = value.to_str().ok()?.trim().parse::<u64>().ok()?;

	(secs > 0).then(|| StdDuration::from_secs(secs))
}

/// Decodes a JSON body, reporting the failing JSON path on mismatch.
pub(crate) fn decode_json<T>(endpoint: &str, body: &[u8]) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut de = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut de)
		.map_err(|source| DecodeError::Json { endpoint: endpoint.to_owned(), source }.into())
}

/// Lossy UTF-8 view of a response body for error reporting.
pub(crate) fn body_text(response: &HttpResponse) -> String {
	String::from_utf8_lossy(response.body()).into_owned()
}
