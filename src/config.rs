//! Client configuration: tenant domain, client credentials, and pipeline tuning knobs.
//!
//! Values are validated once by [`ClientConfigBuilder::build`] so the token cache,
//! rate governor, and request pipeline can rely on well-formed URLs and non-zero
//! quotas without re-checking on every call.

/// Builder API for assembling client configurations.
pub mod builder;

pub use builder::*;

// std
use std::env;
// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// URL scheme used to reach the tenant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
	#[default]
	/// TLS-protected HTTP; the only scheme real tenants accept.
	Https,
	/// Plain HTTP for local mock servers.
	Http,
}
impl Scheme {
	/// Returns the scheme label used when composing URLs.
	pub const fn as_str(self) -> &'static str {
		match self {
			Scheme::Https => "https",
			Scheme::Http => "http",
		}
	}
}
impl Display for Scheme {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Immutable configuration consumed by [`crate::client::ManagementClient`].
#[derive(Clone, Debug)]
pub struct ClientConfig {
	/// Normalized tenant host (optionally with port), without scheme or trailing slash.
	pub domain: String,
	/// Base URL derived from the scheme and domain.
	pub base_url: Url,
	/// Machine-to-machine client identifier.
	pub client_id: String,
	/// Machine-to-machine client secret.
	pub client_secret: TokenSecret,
	/// Audience requested during the client-credentials exchange.
	pub audience: String,
	/// Maximum admitted requests per rolling one-second window.
	pub rate_limit_per_second: u32,
	/// Number of HTTP 429 retries granted to each call.
	pub max_retries: u32,
	/// Delay applied when a 429 response carries no usable `retry-after` hint.
	pub default_retry_delay: StdDuration,
	/// Lead time before expiry at which cached tokens are treated as stale.
	pub token_safety_margin: Duration,
}
impl ClientConfig {
	/// Default quota, one below the upstream ceiling of 10 requests per second.
	pub const DEFAULT_RATE_LIMIT_PER_SECOND: u32 = 8;
	/// Default retry budget for rate-limited calls.
	pub const DEFAULT_MAX_RETRIES: u32 = 3;
	/// Default delay when `retry-after` is missing or unusable.
	pub const DEFAULT_RETRY_DELAY: StdDuration = StdDuration::from_secs(1);
	/// Default token safety margin.
	pub const DEFAULT_TOKEN_SAFETY_MARGIN: Duration = Duration::minutes(5);

	/// Creates a builder seeded with the three required values.
	pub fn builder(
		domain: impl Into<String>,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> ClientConfigBuilder {
		ClientConfigBuilder::new(domain, client_id, client_secret)
	}

	/// Loads configuration from the environment.
	///
	/// Env vars:
	/// - `IDENTITY_MGMT_DOMAIN` [required]
	/// - `IDENTITY_MGMT_CLIENT_ID` [required]
	/// - `IDENTITY_MGMT_CLIENT_SECRET` [required]
	/// - `IDENTITY_MGMT_AUDIENCE` (default: `https://<domain>/api/v2/`)
	/// - `IDENTITY_MGMT_RATE_LIMIT` (default: 8)
	pub fn from_env() -> Result<Self, ConfigError> {
		let domain = required_env("IDENTITY_MGMT_DOMAIN")?;
		let client_id = required_env("IDENTITY_MGMT_CLIENT_ID")?;
		let client_secret = required_env("IDENTITY_MGMT_CLIENT_SECRET")?;
		let mut builder = Self::builder(domain, client_id, client_secret);

		if let Ok(audience) = env::var("IDENTITY_MGMT_AUDIENCE") {
			builder = builder.audience(audience);
		}
		if let Ok(raw) = env::var("IDENTITY_MGMT_RATE_LIMIT") {
			let rate = raw.trim().parse::<u32>().map_err(|_| ConfigError::InvalidEnv {
				name: "IDENTITY_MGMT_RATE_LIMIT",
				value: raw.clone(),
			})?;

			builder = builder.rate_limit_per_second(rate);
		}

		builder.build()
	}

	/// Token endpoint URL (`{base}/oauth/token`).
	pub fn token_url(&self) -> Url {
		self.endpoint(["oauth", "token"])
	}

	/// Management API URL for `segments` below `/api/v2/`; each segment is percent-encoded.
	pub fn api_url<I, S>(&self, segments: I) -> Url
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut url = self.endpoint(["api", "v2"]);

		if let Ok(mut path) = url.path_segments_mut() {
			path.extend(segments);
		}

		url
	}

	fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
		let mut url = self.base_url.clone();

		// `base_url` is always http(s), so it can be a base.
		if let Ok(mut path) = url.path_segments_mut() {
			path.pop_if_empty().extend(segments);
		}

		url
	}
}

fn required_env(name: &'static str) -> Result<String, ConfigError> {
	env::var(name).map_err(|_| ConfigError::MissingEnv { name })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const VARS: [&str; 5] = [
		"IDENTITY_MGMT_DOMAIN",
		"IDENTITY_MGMT_CLIENT_ID",
		"IDENTITY_MGMT_CLIENT_SECRET",
		"IDENTITY_MGMT_AUDIENCE",
		"IDENTITY_MGMT_RATE_LIMIT",
	];

	fn set(name: &str, value: &str) {
		// SAFETY: `from_env_reads_and_validates_variables` is the only test touching these
		// variables, and it runs them sequentially on one thread.
		unsafe { env::set_var(name, value) };
	}

	fn unset(name: &str) {
		// SAFETY: see `set`.
		unsafe { env::remove_var(name) };
	}

	// All environment cases live in one test so no other test races on the process env.
	#[test]
	fn from_env_reads_and_validates_variables() {
		set("IDENTITY_MGMT_DOMAIN", "https://tenant.example.com/");
		set("IDENTITY_MGMT_CLIENT_ID", "env-client");
		set("IDENTITY_MGMT_CLIENT_SECRET", "env-secret");
		set("IDENTITY_MGMT_AUDIENCE", "https://api.example.com/");
		set("IDENTITY_MGMT_RATE_LIMIT", " 5 ");

		let config = ClientConfig::from_env().expect("Complete environment should load.");

		assert_eq!(config.domain, "tenant.example.com");
		assert_eq!(config.client_id, "env-client");
		assert_eq!(config.client_secret.expose(), "env-secret");
		assert_eq!(config.audience, "https://api.example.com/");
		assert_eq!(config.rate_limit_per_second, 5);

		unset("IDENTITY_MGMT_AUDIENCE");
		unset("IDENTITY_MGMT_RATE_LIMIT");

		let defaults = ClientConfig::from_env().expect("Optional variables may be absent.");

		assert_eq!(defaults.audience, "https://tenant.example.com/api/v2/");
		assert_eq!(defaults.rate_limit_per_second, ClientConfig::DEFAULT_RATE_LIMIT_PER_SECOND);

		unset("IDENTITY_MGMT_CLIENT_SECRET");

		assert!(matches!(
			ClientConfig::from_env(),
			Err(ConfigError::MissingEnv { name: "IDENTITY_MGMT_CLIENT_SECRET" })
		));

		set("IDENTITY_MGMT_CLIENT_SECRET", "env-secret");
		set("IDENTITY_MGMT_RATE_LIMIT", "abc");

		match ClientConfig::from_env() {
			Err(ConfigError::InvalidEnv { name, value }) => {
				assert_eq!(name, "IDENTITY_MGMT_RATE_LIMIT");
				assert_eq!(value, "abc");
			},
			other => panic!("Expected an invalid rate limit, got {other:?}."),
		}

		for name in VARS {
			unset(name);
		}
	}
}
