//! Cached bearer credential and the token endpoint's wire response.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Body returned by `POST /oauth/token` for the client-credentials grant.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenResponse {
	/// Issued bearer token.
	pub access_token: TokenSecret,
	/// Token type label (normally `Bearer`).
	#[serde(default = "TokenResponse::default_token_type")]
	pub token_type: String,
	/// Declared lifetime in seconds.
	pub expires_in: i64,
	/// Granted scopes, space-delimited.
	#[serde(default)]
	pub scope: Option<String>,
}
impl TokenResponse {
	fn default_token_type() -> String {
		"Bearer".into()
	}
}

/// Bearer token paired with the expiry computed when it was issued.
///
/// The token and its expiry are only ever replaced together.
#[derive(Clone)]
pub struct Credential {
	/// Bearer token; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Token type label.
	pub token_type: String,
	/// Granted scopes, if the provider reported them.
	pub scope: Option<String>,
	/// Instant the credential was stored.
	pub issued_at: OffsetDateTime,
	/// Absolute expiry (`issued_at + expires_in`).
	pub expires_at: OffsetDateTime,
}
impl Credential {
	/// Builds a credential from a token endpoint response received at `issued_at`.
	pub fn from_response(response: TokenResponse, issued_at: OffsetDateTime) -> Self {
		Self {
			access_token: response.access_token,
			token_type: response.token_type,
			scope: response.scope,
			issued_at,
			expires_at: issued_at.saturating_add(Duration::seconds(response.expires_in)),
		}
	}

	/// Returns `true` while `now` is strictly before `expires_at - margin`.
	pub fn is_fresh_at(&self, now: OffsetDateTime, margin: Duration) -> bool {
		now < self.expires_at.saturating_sub(margin)
	}

	/// Returns `true` once the credential is past its absolute expiry.
	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		now >= self.expires_at
	}

	/// Remaining lifetime at `now`, clamped at zero.
	pub fn remaining_at(&self, now: OffsetDateTime) -> Duration {
		let remaining = self.expires_at - now;

		if remaining.is_negative() { Duration::ZERO } else { remaining }
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credential")
			.field("access_token", &"<redacted>")
			.field("token_type", &self.token_type)
			.field("scope", &self.scope)
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn credential(issued_at: OffsetDateTime, expires_in: i64) -> Credential {
		Credential::from_response(
			TokenResponse {
				access_token: TokenSecret::new("tok"),
				token_type: "Bearer".into(),
				expires_in,
				scope: None,
			},
			issued_at,
		)
	}

	#[test]
	fn expiry_is_issued_at_plus_lifetime() {
		let record = credential(macros::datetime!(2025-01-01 00:00 UTC), 86_400);

		assert_eq!(record.expires_at, macros::datetime!(2025-01-02 00:00 UTC));
		assert!(!record.is_expired_at(macros::datetime!(2025-01-01 23:59 UTC)));
		assert!(record.is_expired_at(macros::datetime!(2025-01-02 00:00 UTC)));
	}

	#[test]
	fn freshness_honors_the_safety_margin_boundary() {
		let now = macros::datetime!(2025-01-01 12:00 UTC);
		let margin = Duration::minutes(5);
		let mut record = credential(now, 0);

		record.expires_at = now + margin - Duration::milliseconds(1);

		assert!(!record.is_fresh_at(now, margin));

		record.expires_at = now + margin;

		assert!(!record.is_fresh_at(now, margin));

		record.expires_at = now + margin + Duration::milliseconds(1);

		assert!(record.is_fresh_at(now, margin));
	}

	#[test]
	fn remaining_clamps_at_zero() {
		let now = macros::datetime!(2025-01-01 12:00 UTC);
		let record = credential(now, 60);

		assert_eq!(record.remaining_at(now), Duration::seconds(60));
		assert_eq!(record.remaining_at(now + Duration::hours(1)), Duration::ZERO);
	}

	#[test]
	fn debug_redacts_token() {
		let record = credential(macros::datetime!(2025-01-01 00:00 UTC), 60);

		assert!(!format!("{record:?}").contains("tok\""));
	}

	#[test]
	fn token_response_defaults_optional_fields() {
		let response: TokenResponse =
			serde_json::from_str("{\"access_token\":\"tok\",\"expires_in\":86400}")
				.expect("Minimal token response should parse.");

		assert_eq!(response.token_type, "Bearer");
		assert_eq!(response.expires_in, 86_400);
		assert!(response.scope.is_none());
	}
}
