//! Client-level error types shared by the token cache, the request pipeline, and resources.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration or request construction problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS); surfaced without classification.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// A successful response carried a body that did not match the expected shape.
	#[error(transparent)]
	Decode(#[from] DecodeError),

	/// The token endpoint rejected the client-credentials exchange.
	#[error("Authentication failed with HTTP {status}: {body}")]
	Authentication {
		/// HTTP status returned by the token endpoint.
		status: u16,
		/// Raw response body text.
		body: String,
	},
	/// A management API call returned a non-success status.
	#[error("API request failed with HTTP {status}: {body}")]
	Api {
		/// HTTP status returned by the resource endpoint.
		status: u16,
		/// Raw response body text.
		body: String,
	},
}
impl Error {
	/// Returns the HTTP status carried by authentication and API failures.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Authentication { status, .. } | Self::Api { status, .. } => Some(*status),
			_ => None,
		}
	}

	/// Returns the raw upstream body carried by authentication and API failures.
	pub fn body(&self) -> Option<&str> {
		match self {
			Self::Authentication { body, .. } | Self::Api { body, .. } => Some(body),
			_ => None,
		}
	}

	/// `true` for HTTP 401 responses, from either the token or the resource endpoint.
	pub fn is_unauthorized(&self) -> bool {
		self.status() == Some(401)
	}

	/// `true` for HTTP 403 responses (missing management API permissions).
	pub fn is_forbidden(&self) -> bool {
		self.status() == Some(403)
	}

	/// `true` for HTTP 404 responses.
	pub fn is_not_found(&self) -> bool {
		self.status() == Some(404)
	}

	/// `true` once the retry budget for HTTP 429 responses has been exhausted.
	pub fn is_rate_limited(&self) -> bool {
		matches!(self, Self::Api { status: 429, .. })
	}
}

/// Configuration and request construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] http::Error),
	/// Request body could not be serialized to JSON.
	#[error("Request body could not be encoded as JSON.")]
	EncodeBody {
		/// Underlying serializer failure.
		#[source]
		source: serde_json::Error,
	},

	/// Tenant domain is empty.
	#[error("Tenant domain is required.")]
	MissingDomain,
	/// Tenant domain does not form a valid base URL.
	#[error("Tenant domain `{domain}` is not a valid host.")]
	InvalidDomain {
		/// Domain value that failed validation.
		domain: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Client identifier is empty.
	#[error("Client identifier is required.")]
	MissingClientId,
	/// Client secret is empty.
	#[error("Client secret is required.")]
	MissingClientSecret,
	/// Requests-per-second quota must be at least one.
	#[error("Rate limit must allow at least one request per second.")]
	InvalidRateLimit,
	/// Required environment variable is absent.
	#[error("Environment variable `{name}` is not set.")]
	MissingEnv {
		/// Variable name.
		name: &'static str,
	},
	/// Environment variable holds a value that cannot be parsed.
	#[error("Environment variable `{name}` holds an invalid value: {value}.")]
	InvalidEnv {
		/// Variable name.
		name: &'static str,
		/// Raw value that failed parsing.
		value: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {url}.")]
	Network {
		/// Target URL of the failed request.
		url: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred during transport.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(
		url: impl Into<String>,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { url: url.into(), source: Box::new(src) }
	}
}

/// Body decoding failures for successful responses.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// JSON body did not match the expected shape.
	#[error("Response body from {endpoint} did not match the expected shape.")]
	Json {
		/// Path (or `oauth/token`) that produced the body.
		endpoint: String,
		/// Structured parsing failure including the offending JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// A typed lookup received HTTP 204 or an empty body.
	#[error("Response from {endpoint} carried no body.")]
	EmptyBody {
		/// Path that produced the empty response.
		endpoint: String,
	},
}
