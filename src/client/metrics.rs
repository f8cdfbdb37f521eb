// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for request pipeline activity.
#[derive(Debug, Default)]
pub struct PipelineMetrics {
	attempts: AtomicU64,
	retries: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
}
impl PipelineMetrics {
	/// Returns the number of HTTP attempts sent, retried attempts included.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of HTTP 429 waits the pipeline performed.
	pub fn retries(&self) -> u64 {
		self.retries.load(Ordering::Relaxed)
	}

	/// Returns the number of calls that resolved successfully.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of calls that failed.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_retry(&self) {
		self.retries.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.success.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failure.fetch_add(1, Ordering::Relaxed);
	}
}
