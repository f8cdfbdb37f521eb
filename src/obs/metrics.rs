// self
use crate::{
	_prelude::*,
	obs::{CallKind, CallOutcome},
};

/// Records a call outcome via the global metrics recorder (when enabled).
pub fn record_call_outcome(kind: CallKind, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"identity_mgmt_call_total",
			"call" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records how long the rate governor held a caller back (when enabled).
pub fn record_governor_wait(wait: StdDuration) {
	#[cfg(feature = "metrics")]
	{
		metrics::histogram!("identity_mgmt_governor_wait_seconds").record(wait.as_secs_f64());
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = wait;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_noop_without_metrics() {
		record_call_outcome(CallKind::ApiRequest, CallOutcome::Retry);
		record_governor_wait(StdDuration::from_millis(10));
	}
}
