//! Rate-governed, authenticated request pipeline.
//!
//! [`ManagementClient::request`] executes one logical API call as an explicit
//! bounded loop: admit through the [`RateGovernor`], fetch a bearer token from
//! the [`TokenCache`], send, then classify the response. HTTP 429 responses are
//! retried while the per-call budget lasts; every retry waits for the
//! `retry-after` hint (or the configured default) and re-enters the loop at the
//! admission step, so retried attempts consume governor slots like any other.
//!
//! Terminal states map onto [`Result<Option<T>>`](crate::error::Result):
//! `Ok(Some(value))` for 2xx bodies, `Ok(None)` for HTTP 204, [`Error::Api`]
//! for other non-2xx statuses (including an exhausted 429 budget), [`Error::Decode`]
//! for any other 2xx body that is empty or not the expected JSON, and
//! [`Error::Authentication`] propagated from the token exchange.

mod metrics;

pub use metrics::PipelineMetrics;

// crates.io
use http::{
	HeaderValue, Method, StatusCode,
	header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
// self
use crate::{
	_prelude::*,
	auth::{TokenCache, TokenSecret},
	config::ClientConfig,
	error::{ConfigError, DecodeError},
	governor::RateGovernor,
	http::{self as transport, ApiTransport, HttpRequest, HttpResponse, ResponseMetadata},
	obs::{self, CallKind, CallOutcome, CallSpan},
	resources::ListParams,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

/// Transient description of one management API call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiCall {
	/// HTTP verb.
	pub method: Method,
	/// Path segments below `/api/v2/`, percent-encoded when the URL is built.
	pub segments: Vec<String>,
	/// Query parameters in insertion order.
	pub query: Vec<(String, String)>,
	/// Pre-encoded JSON body.
	pub body: Option<Vec<u8>>,
}
impl ApiCall {
	/// Creates a call for `method` against `segments`.
	pub fn new<I, S>(method: Method, segments: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			method,
			segments: segments.into_iter().map(Into::into).collect(),
			query: Vec::new(),
			body: None,
		}
	}

	/// `GET` shorthand.
	pub fn get<I, S>(segments: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::new(Method::GET, segments)
	}

	/// `POST` shorthand.
	pub fn post<I, S>(segments: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::new(Method::POST, segments)
	}

	/// `PATCH` shorthand.
	pub fn patch<I, S>(segments: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::new(Method::PATCH, segments)
	}

	/// `DELETE` shorthand.
	pub fn delete<I, S>(segments: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::new(Method::DELETE, segments)
	}

	/// Appends a query parameter.
	pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
		self.query.push((key.into(), value.to_string()));

		self
	}

	/// Appends a query parameter when `value` is present.
	pub fn query_opt<V>(self, key: impl Into<String>, value: Option<V>) -> Self
	where
		V: ToString,
	{
		match value {
			Some(value) => self.query(key, value),
			None => self,
		}
	}

	/// Appends pagination parameters.
	pub fn paginate(self, params: &ListParams) -> Self {
		self.query_opt("page", params.page).query_opt("per_page", params.per_page)
	}

	/// Serializes `body` as the JSON request payload.
	pub fn json<B>(mut self, body: &B) -> Result<Self>
	where
		B: ?Sized + Serialize,
	{
		let encoded =
			serde_json::to_vec(body).map_err(|source| ConfigError::EncodeBody { source })?;

		self.body = Some(encoded);

		Ok(self)
	}

	/// Slash-joined path, used to label logs and decode errors.
	pub fn path(&self) -> String {
		self.segments.join("/")
	}

	fn url(&self, config: &ClientConfig) -> Url {
		let mut url = config.api_url(&self.segments);

		if !self.query.is_empty() {
			url.query_pairs_mut().extend_pairs(&self.query);
		}

		url
	}
}

/// Outcome of [`ManagementClient::test_connection`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionTest {
	/// `true` when a token was issued and the management API answered.
	pub success: bool,
	/// Failure description when `success` is `false`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

/// Authenticated, rate-governed client for the management API.
///
/// The token cache and the governor window are the only shared mutable state;
/// both guard themselves, so one client can serve many concurrent tasks.
pub struct ManagementClient {
	config: Arc<ClientConfig>,
	transport: Arc<dyn ApiTransport>,
	tokens: TokenCache,
	governor: RateGovernor,
	metrics: PipelineMetrics,
}
impl ManagementClient {
	/// Creates a client that sends every request through `transport`.
	pub fn with_transport<T>(config: ClientConfig, transport: T) -> Self
	where
		T: ApiTransport,
	{
		Self::with_shared_transport(config, Arc::new(transport))
	}

	/// Creates a client over a transport already shared with other components.
	pub fn with_shared_transport(config: ClientConfig, transport: Arc<dyn ApiTransport>) -> Self {
		let config = Arc::new(config);

		Self {
			tokens: TokenCache::new(config.clone(), transport.clone()),
			governor: RateGovernor::new(config.rate_limit_per_second),
			metrics: PipelineMetrics::default(),
			config,
			transport,
		}
	}

	/// Validated configuration backing this client.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Token cache shared by every call.
	pub fn tokens(&self) -> &TokenCache {
		&self.tokens
	}

	/// Rate governor shared by every call.
	pub fn governor(&self) -> &RateGovernor {
		&self.governor
	}

	/// Pipeline counters.
	pub fn metrics(&self) -> &PipelineMetrics {
		&self.metrics
	}

	/// Returns a valid management API token, acquiring one if needed.
	pub async fn get_token(&self) -> Result<TokenSecret> {
		self.tokens.get_token().await
	}

	/// Checks credentials and reachability; failures are reported, never returned.
	pub async fn test_connection(&self) -> ConnectionTest {
		let probe = async {
			self.get_token().await?;
			self.list_clients(ListParams::default().per_page(1)).await
		};

		match probe.await {
			Ok(_) => ConnectionTest { success: true, error: None },
			Err(e) => ConnectionTest { success: false, error: Some(e.to_string()) },
		}
	}

	/// Executes `call` and decodes the response body as `T`.
	///
	/// Resolves to `Ok(None)` for HTTP 204 without parsing; every other 2xx body must be JSON.
	pub async fn request<T>(&self, call: ApiCall) -> Result<Option<T>>
	where
		T: DeserializeOwned,
	{
		self.observed(async {
			let response = self.dispatch(&call).await?;

			classify(&call.path(), response)
		})
		.await
	}

	/// Like [`request`](Self::request) but treats HTTP 204 as a decode failure.
	pub(crate) async fn fetch<T>(&self, call: ApiCall) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let endpoint = call.path();

		self.request(call).await?.ok_or_else(|| DecodeError::EmptyBody { endpoint }.into())
	}

	/// Executes `call`, checks the status, and discards the response body.
	pub(crate) async fn send(&self, call: ApiCall) -> Result<()> {
		self.observed(async {
			let response = self.dispatch(&call).await?;

			ensure_success(response).map(|_| ())
		})
		.await
	}

	async fn observed<T, F>(&self, call: F) -> Result<T>
	where
		F: Future<Output = Result<T>>,
	{
		const KIND: CallKind = CallKind::ApiRequest;

		let span = CallSpan::new(KIND, "request");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span.instrument(call).await;

		match &result {
			Ok(_) => {
				self.metrics.record_success();
				obs::record_call_outcome(KIND, CallOutcome::Success);
			},
			Err(_) => {
				self.metrics.record_failure();
				obs::record_call_outcome(KIND, CallOutcome::Failure);
			},
		}

		result
	}

	/// Runs the admission, authentication, and send loop; returns the final response.
	async fn dispatch(&self, call: &ApiCall) -> Result<HttpResponse> {
		let url = call.url(&self.config);
		let mut retries_remaining = self.config.max_retries;

		loop {
			self.governor.admit().await;

			let token = self.tokens.get_token().await?;
			let request = build_request(call, &url, &token)?;

			self.metrics.record_attempt();

			let response = self.transport.execute(request).await?;
			let meta = ResponseMetadata::from_response(&response);

			if meta.is_rate_limited() && retries_remaining > 0 {
				let delay = meta.retry_after.unwrap_or(self.config.default_retry_delay);

				retries_remaining -= 1;
				self.metrics.record_retry();
				obs::record_call_outcome(CallKind::ApiRequest, CallOutcome::Retry);
				obs::log_rate_limited(url.as_str(), retries_remaining, delay);
				tokio::time::sleep(delay).await;

				continue;
			}

			return Ok(response);
		}
	}
}
#[cfg(feature = "reqwest")]
impl ManagementClient {
	/// Creates a client backed by the crate's default reqwest transport.
	pub fn new(config: ClientConfig) -> Result<Self> {
		Ok(Self::with_transport(config, ReqwestTransport::new()?))
	}
}
impl Debug for ManagementClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ManagementClient")
			.field("domain", &self.config.domain)
			.field("client_id", &self.config.client_id)
			.field("rate_limit_per_second", &self.config.rate_limit_per_second)
			.field("metrics", &self.metrics)
			.finish()
	}
}

fn build_request(call: &ApiCall, url: &Url, token: &TokenSecret) -> Result<HttpRequest> {
	let mut authorization = HeaderValue::from_str(&token.bearer())
		.map_err(|e| ConfigError::from(http::Error::from(e)))?;

	authorization.set_sensitive(true);

	let request = http::Request::builder()
		.method(call.method.clone())
		.uri(url.as_str())
		.header(AUTHORIZATION, authorization)
		.header(CONTENT_TYPE, "application/json")
		.header(ACCEPT, "application/json")
		.body(call.body.clone().unwrap_or_default())
		.map_err(ConfigError::from)?;

	Ok(request)
}

fn ensure_success(response: HttpResponse) -> Result<HttpResponse> {
	let status = response.status();

	if !status.is_success() {
		return Err(Error::Api { status: status.as_u16(), body: transport::body_text(&response) });
	}

	Ok(response)
}

fn classify<T>(endpoint: &str, response: HttpResponse) -> Result<Option<T>>
where
	T: DeserializeOwned,
{
	if response.status() == StatusCode::NO_CONTENT {
		return Ok(None);
	}

	let response = ensure_success(response)?;

	transport::decode_json(endpoint, response.body()).map(Some)
}
