// self
use crate::{_prelude::*, obs::CallKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// A span builder used by the token cache and request pipeline.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the provided call kind + stage.
	pub fn new(kind: CallKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("identity_mgmt.call", call = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a warning when the upstream answered HTTP 429 and the call will be re-sent.
pub fn log_rate_limited(url: &str, retries_remaining: u32, delay: StdDuration) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(
			url,
			retries_remaining,
			delay_ms = millis(delay),
			"Upstream rate limit hit; retrying."
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (url, retries_remaining, delay);
	}
}

/// Emits a debug event when the rate governor delays a caller.
pub fn log_governor_wait(admitted: usize, wait: StdDuration) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(admitted, wait_ms = millis(wait), "Rate governor delaying call.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (admitted, wait);
	}
}

/// Emits a debug event after a fresh credential was stored.
pub fn log_token_acquired(expires_at: OffsetDateTime) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(%expires_at, "Acquired management API token.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = expires_at;
	}
}

/// Whole milliseconds of `duration`, saturating at `u64::MAX`.
#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
fn millis(duration: StdDuration) -> u64 {
	u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
