//! Rate-governed, token-caching client for identity-management REST APIs: machine-to-machine
//! credentials, sliding-window admission, and typed resource CRUD in one crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod governor;
pub mod http;
pub mod obs;
pub mod resources;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::collections::VecDeque;
	// crates.io
	use ::http::{HeaderValue, StatusCode, header::RETRY_AFTER};
	// self
	use crate::{
		client::ManagementClient,
		config::{ClientConfig, Scheme},
		http::{ApiTransport, HttpRequest, HttpResponse, TransportFuture},
	};

	/// Request captured by [`ScriptedTransport`].
	#[derive(Clone, Debug)]
	pub struct RecordedRequest {
		/// HTTP method label.
		pub method: String,
		/// Path plus query string.
		pub path_and_query: String,
		/// `authorization` header value, if any.
		pub authorization: Option<String>,
		/// Raw request body.
		pub body: Vec<u8>,
	}

	/// Canned response served by [`ScriptedTransport`].
	#[derive(Clone, Debug)]
	pub struct ScriptedReply {
		/// Status code to return.
		pub status: u16,
		/// Response body.
		pub body: String,
		/// Optional `retry-after` header value.
		pub retry_after: Option<&'static str>,
	}
	impl ScriptedReply {
		/// Reply with `status` and a JSON (or plain text) `body`.
		pub fn json(status: u16, body: impl Into<String>) -> Self {
			Self { status, body: body.into(), retry_after: None }
		}

		/// HTTP 429 reply with an optional `retry-after` header.
		pub fn throttled(retry_after: Option<&'static str>) -> Self {
			Self { status: 429, body: "Too Many Requests".into(), retry_after }
		}

		fn into_response(self) -> HttpResponse {
			let mut response = HttpResponse::new(self.body.into_bytes());

			*response.status_mut() =
				StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

			if let Some(value) = self.retry_after {
				response.headers_mut().insert(RETRY_AFTER, HeaderValue::from_static(value));
			}

			response
		}
	}

	/// In-process transport that answers token exchanges with a fixed reply and every other
	/// request from a FIFO script. An exhausted script answers HTTP 500.
	#[derive(Clone, Debug)]
	pub struct ScriptedTransport {
		token_reply: ScriptedReply,
		script: Arc<Mutex<VecDeque<ScriptedReply>>>,
		requests: Arc<Mutex<Vec<RecordedRequest>>>,
	}
	impl ScriptedTransport {
		/// Creates a transport whose token endpoint issues `token` valid for one day.
		pub fn new(token: &str) -> Self {
			Self::with_token_reply(ScriptedReply::json(
				200,
				format!(
					"{{\"access_token\":\"{token}\",\"token_type\":\"Bearer\",\"expires_in\":86400}}"
				),
			))
		}

		/// Creates a transport with a custom token endpoint reply.
		pub fn with_token_reply(token_reply: ScriptedReply) -> Self {
			Self { token_reply, script: Default::default(), requests: Default::default() }
		}

		/// Queues a reply for the next management API call.
		pub fn push(&self, reply: ScriptedReply) -> &Self {
			self.script.lock().push_back(reply);

			self
		}

		/// Returns every request observed so far.
		pub fn requests(&self) -> Vec<RecordedRequest> {
			self.requests.lock().clone()
		}

		/// Returns the management API requests (token exchanges excluded).
		pub fn api_requests(&self) -> Vec<RecordedRequest> {
			self.requests().into_iter().filter(|r| !r.path_and_query.starts_with("/oauth/")).collect()
		}

		/// Counts token exchanges observed so far.
		pub fn token_requests(&self) -> usize {
			self.requests().iter().filter(|r| r.path_and_query.starts_with("/oauth/")).count()
		}
	}
	impl ApiTransport for ScriptedTransport {
		fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
			let path_and_query =
				request.uri().path_and_query().map(|p| p.to_string()).unwrap_or_default();
			let recorded = RecordedRequest {
				method: request.method().to_string(),
				authorization: request
					.headers()
					.get(::http::header::AUTHORIZATION)
					.and_then(|v| v.to_str().ok())
					.map(str::to_owned),
				body: request.body().clone(),
				path_and_query: path_and_query.clone(),
			};

			self.requests.lock().push(recorded);

			let reply = if path_and_query.starts_with("/oauth/") {
				self.token_reply.clone()
			} else {
				self.script
					.lock()
					.pop_front()
					.unwrap_or_else(|| ScriptedReply::json(500, "script exhausted"))
			};

			Box::pin(async move { Ok(reply.into_response()) })
		}
	}

	/// Builds a plain-HTTP configuration for `domain` (a mock server address).
	pub fn test_config(domain: &str) -> ClientConfig {
		ClientConfig::builder(domain, "test-client", "test-secret")
			.scheme(Scheme::Http)
			.build()
			.expect("Test configuration should build.")
	}

	/// Builds a client backed by `transport` with the default test configuration.
	pub fn scripted_client(transport: &ScriptedTransport) -> ManagementClient {
		ManagementClient::with_transport(test_config("tenant.test"), transport.clone())
	}

	/// Builds a reqwest-backed client pointed at an `httpmock` server address.
	#[cfg(feature = "reqwest")]
	pub fn reqwest_test_client(address: &str) -> ManagementClient {
		ManagementClient::new(test_config(address))
			.expect("Reqwest-backed test client should build.")
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
		time::Duration as StdDuration,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use httpmock as _;
