// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	config::{ClientConfig, Scheme},
	error::ConfigError,
};

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	/// Tenant domain as supplied by the caller.
	pub domain: String,
	/// Client identifier as supplied by the caller.
	pub client_id: String,
	/// Client secret as supplied by the caller.
	pub client_secret: TokenSecret,
	/// Optional audience override.
	pub audience: Option<String>,
	/// Requests admitted per rolling second.
	pub rate_limit_per_second: u32,
	/// Retry budget for HTTP 429 responses.
	pub max_retries: u32,
	/// Fallback retry delay.
	pub default_retry_delay: StdDuration,
	/// Token safety margin.
	pub token_safety_margin: Duration,
	/// URL scheme used to reach the tenant.
	pub scheme: Scheme,
}
impl ClientConfigBuilder {
	/// Creates a builder with the default tuning values.
	pub fn new(
		domain: impl Into<String>,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Self {
		Self {
			domain: domain.into(),
			client_id: client_id.into(),
			client_secret: TokenSecret::new(client_secret),
			audience: None,
			rate_limit_per_second: ClientConfig::DEFAULT_RATE_LIMIT_PER_SECOND,
			max_retries: ClientConfig::DEFAULT_MAX_RETRIES,
			default_retry_delay: ClientConfig::DEFAULT_RETRY_DELAY,
			token_safety_margin: ClientConfig::DEFAULT_TOKEN_SAFETY_MARGIN,
			scheme: Scheme::default(),
		}
	}

	/// Overrides the audience (defaults to `https://{domain}/api/v2/`).
	pub fn audience(mut self, audience: impl Into<String>) -> Self {
		self.audience = Some(audience.into());

		self
	}

	/// Overrides the per-second admission quota.
	pub fn rate_limit_per_second(mut self, rate: u32) -> Self {
		self.rate_limit_per_second = rate;

		self
	}

	/// Overrides the HTTP 429 retry budget.
	pub fn max_retries(mut self, retries: u32) -> Self {
		self.max_retries = retries;

		self
	}

	/// Overrides the fallback retry delay.
	pub fn default_retry_delay(mut self, delay: StdDuration) -> Self {
		self.default_retry_delay = delay;

		self
	}

	/// Overrides the token safety margin; negative values clamp to zero.
	pub fn token_safety_margin(mut self, margin: Duration) -> Self {
		self.token_safety_margin = if margin.is_negative() { Duration::ZERO } else { margin };

		self
	}

	/// Overrides the URL scheme. Only mock servers should use [`Scheme::Http`].
	pub fn scheme(mut self, scheme: Scheme) -> Self {
		self.scheme = scheme;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let domain = normalize_domain(&self.domain);

		if domain.is_empty() {
			return Err(ConfigError::MissingDomain);
		}
		if self.client_id.trim().is_empty() {
			return Err(ConfigError::MissingClientId);
		}
		if self.client_secret.expose().is_empty() {
			return Err(ConfigError::MissingClientSecret);
		}
		if self.rate_limit_per_second == 0 {
			return Err(ConfigError::InvalidRateLimit);
		}

		let base_url = Url::parse(&format!("{}://{domain}/", self.scheme))
			.map_err(|source| ConfigError::InvalidDomain { domain: domain.clone(), source })?;
		let audience = self.audience.unwrap_or_else(|| format!("https://{domain}/api/v2/"));

		Ok(ClientConfig {
			domain,
			base_url,
			client_id: self.client_id.trim().to_owned(),
			client_secret: self.client_secret,
			audience,
			rate_limit_per_second: self.rate_limit_per_second,
			max_retries: self.max_retries,
			default_retry_delay: self.default_retry_delay,
			token_safety_margin: self.token_safety_margin,
		})
	}
}

fn normalize_domain(raw: &str) -> String {
	let trimmed = raw.trim();
	let without_scheme = trimmed
		.strip_prefix("https://")
		.or_else(|| trimmed.strip_prefix("http://"))
		.unwrap_or(trimmed);

	without_scheme.trim_end_matches('/').to_owned()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn defaults_follow_upstream_limits() {
		let config = ClientConfig::builder("tenant.example.com", "cid", "secret")
			.build()
			.expect("Default configuration should build.");

		assert_eq!(config.rate_limit_per_second, 8);
		assert_eq!(config.max_retries, 3);
		assert_eq!(config.default_retry_delay, StdDuration::from_secs(1));
		assert_eq!(config.token_safety_margin, Duration::minutes(5));
		assert_eq!(config.audience, "https://tenant.example.com/api/v2/");
		assert_eq!(config.token_url().as_str(), "https://tenant.example.com/oauth/token");
		assert_eq!(
			config.api_url(["roles", "rol 1", "permissions"]).as_str(),
			"https://tenant.example.com/api/v2/roles/rol%201/permissions"
		);
	}

	#[test]
	fn domain_is_normalized() {
		let config = ClientConfig::builder(" https://tenant.example.com/ ", "cid", "secret")
			.build()
			.expect("Scheme-prefixed domain should normalize.");

		assert_eq!(config.domain, "tenant.example.com");
		assert_eq!(config.base_url.as_str(), "https://tenant.example.com/");
	}

	#[test]
	fn http_scheme_keeps_https_audience() {
		let config = ClientConfig::builder("127.0.0.1:8080", "cid", "secret")
			.scheme(Scheme::Http)
			.build()
			.expect("Mock server configuration should build.");

		assert_eq!(config.token_url().as_str(), "http://127.0.0.1:8080/oauth/token");
		assert_eq!(config.audience, "https://127.0.0.1:8080/api/v2/");
	}

	#[test]
	fn build_rejects_missing_values() {
		assert!(matches!(
			ClientConfig::builder("", "cid", "secret").build(),
			Err(ConfigError::MissingDomain)
		));
		assert!(matches!(
			ClientConfig::builder("tenant", " ", "secret").build(),
			Err(ConfigError::MissingClientId)
		));
		assert!(matches!(
			ClientConfig::builder("tenant", "cid", "").build(),
			Err(ConfigError::MissingClientSecret)
		));
		assert!(matches!(
			ClientConfig::builder("tenant", "cid", "secret").rate_limit_per_second(0).build(),
			Err(ConfigError::InvalidRateLimit)
		));
		assert!(matches!(
			ClientConfig::builder("bad host", "cid", "secret").build(),
			Err(ConfigError::InvalidDomain { .. })
		));
	}

	#[test]
	fn negative_margin_clamps_to_zero() {
		let config = ClientConfig::builder("tenant", "cid", "secret")
			.token_safety_margin(Duration::seconds(-5))
			.build()
			.expect("Configuration should build.");

		assert_eq!(config.token_safety_margin, Duration::ZERO);
	}
}
