//! Token cache with a safety margin and singleflight refreshes.
//!
//! [`TokenCache::get_token`] returns the cached bearer token while it is fresh
//! (`now < expires_at - safety_margin`) and otherwise performs a client-credentials
//! exchange against `POST /oauth/token`. Callers that race a refresh wait on one
//! shared guard and re-check the cache once it is released, so a burst of
//! concurrent callers triggers a single exchange.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// crates.io
use http::{
	Method,
	header::{ACCEPT, CONTENT_TYPE},
};
// self
use crate::{
	_prelude::*,
	auth::{Credential, TokenResponse, TokenSecret},
	config::ClientConfig,
	error::ConfigError,
	http::{self as transport, ApiTransport},
	obs::{self, CallKind, CallOutcome, CallSpan},
};

/// JSON body posted to the token endpoint.
#[derive(Serialize)]
struct ClientCredentialsGrant<'a> {
	grant_type: &'static str,
	client_id: &'a str,
	client_secret: &'a str,
	audience: &'a str,
}

/// Owns the single cached [`Credential`] for one client configuration.
pub struct TokenCache {
	config: Arc<ClientConfig>,
	transport: Arc<dyn ApiTransport>,
	credential: RwLock<Option<Credential>>,
	refresh_guard: AsyncMutex<()>,
	acquisitions: AtomicU64,
}
impl TokenCache {
	/// Creates an empty cache that exchanges credentials through `transport`.
	pub fn new(config: Arc<ClientConfig>, transport: Arc<dyn ApiTransport>) -> Self {
		Self {
			config,
			transport,
			credential: RwLock::new(None),
			refresh_guard: AsyncMutex::new(()),
			acquisitions: AtomicU64::new(0),
		}
	}

	/// Determines whether `credential` must be reacquired at `now`.
	pub fn should_refresh(
		credential: Option<&Credential>,
		now: OffsetDateTime,
		margin: Duration,
	) -> bool {
		credential.is_none_or(|record| !record.is_fresh_at(now, margin))
	}

	/// Returns a valid bearer token, exchanging client credentials when the cache is stale.
	pub async fn get_token(&self) -> Result<TokenSecret> {
		if let Some(token) = self.cached_at(OffsetDateTime::now_utc()) {
			return Ok(token);
		}

		let _singleflight = self.refresh_guard.lock().await;

		// Another caller may have refreshed while this one waited on the guard.
		if let Some(token) = self.cached_at(OffsetDateTime::now_utc()) {
			return Ok(token);
		}

		let credential = self.acquire().await?;
		let token = credential.access_token.clone();

		*self.credential.write() = Some(credential);

		Ok(token)
	}

	/// Returns a snapshot of the cached credential, fresh or not.
	pub fn credential(&self) -> Option<Credential> {
		self.credential.read().clone()
	}

	/// Drops the cached credential so the next call reacquires.
	pub fn invalidate(&self) {
		*self.credential.write() = None;
	}

	/// Number of token exchanges performed so far (successful or not).
	pub fn acquisitions(&self) -> u64 {
		self.acquisitions.load(Ordering::Relaxed)
	}

	fn cached_at(&self, now: OffsetDateTime) -> Option<TokenSecret> {
		let guard = self.credential.read();

		if Self::should_refresh(guard.as_ref(), now, self.config.token_safety_margin) {
			None
		} else {
			guard.as_ref().map(|record| record.access_token.clone())
		}
	}

	async fn acquire(&self) -> Result<Credential> {
		const KIND: CallKind = CallKind::TokenExchange;

		let span = CallSpan::new(KIND, "client_credentials");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);
		self.acquisitions.fetch_add(1, Ordering::Relaxed);

		let result = span
			.instrument(async move {
				let grant = ClientCredentialsGrant {
					grant_type: "client_credentials",
					client_id: &self.config.client_id,
					client_secret: self.config.client_secret.expose(),
					audience: &self.config.audience,
				};
				let body = serde_json::to_vec(&grant)
					.map_err(|source| ConfigError::EncodeBody { source })?;
				let request = http::Request::builder()
					.method(Method::POST)
					.uri(self.config.token_url().as_str())
					.header(CONTENT_TYPE, "application/json")
					.header(ACCEPT, "application/json")
					.body(body)
					.map_err(ConfigError::from)?;
				let response = self.transport.execute(request).await?;

				if !response.status().is_success() {
					return Err(Error::Authentication {
						status: response.status().as_u16(),
						body: transport::body_text(&response),
					});
				}

				let payload: TokenResponse =
					transport::decode_json("oauth/token", response.body())?;
				let credential = Credential::from_response(payload, OffsetDateTime::now_utc());

				obs::log_token_acquired(credential.expires_at);

				Ok(credential)
			})
			.await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}
}
impl Debug for TokenCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCache")
			.field("client_id", &self.config.client_id)
			.field("credential", &*self.credential.read())
			.field("acquisitions", &self.acquisitions())
			.finish()
	}
}
