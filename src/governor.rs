//! Sliding-window rate governor for outbound management API calls.
//!
//! The governor records the instant of every admitted call and, before admitting
//! another, purges entries that fell out of the trailing one-second window. When the
//! window is already at quota the caller is delayed (never rejected) until the oldest
//! entry ages out, plus a small buffer for timer jitter. Admissions pass one at a time
//! through an async gate held across the wait, so they are served in arrival order and
//! the windowed count never exceeds the quota. The window itself sits behind a short
//! synchronous lock that is never held across an `.await`, so introspection never
//! waits on a sleeping admission.

// std
use std::{
	collections::VecDeque,
	sync::atomic::{AtomicU64, Ordering},
};
// crates.io
use tokio::time::Instant;
// self
use crate::{_prelude::*, obs};

/// Trailing interval over which admissions are counted.
pub const WINDOW: StdDuration = StdDuration::from_millis(1_000);
/// Extra delay added to every computed wait.
pub const WAIT_BUFFER: StdDuration = StdDuration::from_millis(10);

/// Result of evaluating the window at a given instant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
	/// The call may proceed immediately.
	Allow,
	/// The call must wait before it can be admitted.
	Delay(RetryDirective),
}

/// Advises callers when admission becomes possible after a [`RateLimitDecision::Delay`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryDirective {
	/// Instant at which the call can be admitted.
	pub earliest_admission_at: Instant,
	/// Wait from the evaluation instant until `earliest_admission_at`.
	pub wait: StdDuration,
	/// Admissions still inside the window at evaluation time.
	pub admitted: usize,
}

/// Client-side ceiling of `quota` admitted calls per rolling second.
#[derive(Debug)]
pub struct RateGovernor {
	quota: usize,
	gate: AsyncMutex<()>,
	window: Mutex<VecDeque<Instant>>,
	waits: AtomicU64,
}
impl RateGovernor {
	/// Creates a governor admitting at most `per_second` calls per rolling second.
	///
	/// A zero quota is treated as one.
	pub fn new(per_second: u32) -> Self {
		let quota = usize::try_from(per_second.max(1)).unwrap_or(usize::MAX);

		Self {
			quota,
			gate: AsyncMutex::new(()),
			window: Mutex::new(VecDeque::with_capacity(quota)),
			waits: AtomicU64::new(0),
		}
	}

	/// Configured per-second quota.
	pub fn quota(&self) -> usize {
		self.quota
	}

	/// Number of admissions that had to wait so far.
	pub fn waits(&self) -> u64 {
		self.waits.load(Ordering::Relaxed)
	}

	/// Blocks until the caller may proceed, then records the admission.
	pub async fn admit(&self) {
		let _turn = self.gate.lock().await;

		loop {
			let now = Instant::now();
			let decision = {
				let mut window = self.window.lock();

				purge(&mut window, now);

				let decision = evaluate(&window, now, self.quota);

				if decision == RateLimitDecision::Allow {
					window.push_back(now);
				}

				decision
			};

			match decision {
				RateLimitDecision::Allow => return,
				RateLimitDecision::Delay(directive) => {
					self.waits.fetch_add(1, Ordering::Relaxed);
					obs::log_governor_wait(directive.admitted, directive.wait);
					obs::record_governor_wait(directive.wait);
					tokio::time::sleep(directive.wait).await;
				},
			}
		}
	}

	/// Evaluates the window at `now` without recording or purging anything.
	///
	/// Returns immediately even while another caller sleeps inside [`admit`](Self::admit).
	pub fn decide(&self, now: Instant) -> RateLimitDecision {
		let live = self
			.window
			.lock()
			.iter()
			.copied()
			.filter(|at| is_live(*at, now))
			.collect::<VecDeque<_>>();

		evaluate(&live, now, self.quota)
	}

	/// Admissions recorded inside the trailing window ending now.
	pub fn admitted_in_window(&self) -> usize {
		let now = Instant::now();

		self.window.lock().iter().filter(|at| is_live(**at, now)).count()
	}
}

fn is_live(at: Instant, now: Instant) -> bool {
	match now.checked_sub(WINDOW) {
		Some(window_start) => at > window_start,
		None => true,
	}
}

fn purge(window: &mut VecDeque<Instant>, now: Instant) {
	while window.front().is_some_and(|oldest| !is_live(*oldest, now)) {
		window.pop_front();
	}
}

/// Assumes `window` holds only live entries in admission order.
fn evaluate(window: &VecDeque<Instant>, now: Instant, quota: usize) -> RateLimitDecision {
	if window.len() < quota {
		return RateLimitDecision::Allow;
	}

	let Some(oldest) = window.front().copied() else {
		return RateLimitDecision::Allow;
	};
	// oldest - (now - WINDOW) + WAIT_BUFFER
	let earliest_admission_at = oldest + WINDOW + WAIT_BUFFER;
	let wait = earliest_admission_at.saturating_duration_since(now);

	if wait.is_zero() {
		return RateLimitDecision::Allow;
	}

	RateLimitDecision::Delay(RetryDirective { earliest_admission_at, wait, admitted: window.len() })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn assert_window_invariant(admissions: &[Instant], quota: usize) {
		let mut sorted = admissions.to_vec();

		sorted.sort();

		for pair in sorted.windows(quota + 1) {
			let span = pair[quota] - pair[0];

			assert!(
				span >= WINDOW,
				"{} admissions landed within {span:?}, exceeding the quota of {quota}.",
				quota + 1
			);
		}
	}

	// Paused timers may round a deadline up to the next millisecond tick.
	fn assert_elapsed_near(start: Instant, expected: StdDuration) {
		let elapsed = start.elapsed();

		assert!(
			elapsed >= expected && elapsed <= expected + StdDuration::from_millis(5),
			"Expected roughly {expected:?}, observed {elapsed:?}."
		);
	}

	#[tokio::test(start_paused = true)]
	async fn admits_up_to_quota_without_waiting() {
		let governor = RateGovernor::new(3);
		let start = Instant::now();

		for _ in 0..3 {
			governor.admit().await;
		}

		assert_eq!(start.elapsed(), StdDuration::ZERO);
		assert_eq!(governor.admitted_in_window(), 3);
		assert_eq!(governor.waits(), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn excess_call_waits_for_oldest_to_age_out_plus_buffer() {
		let governor = RateGovernor::new(2);
		let start = Instant::now();

		governor.admit().await;
		governor.admit().await;

		match governor.decide(Instant::now()) {
			RateLimitDecision::Delay(directive) => {
				assert_eq!(directive.wait, WINDOW + WAIT_BUFFER);
				assert_eq!(directive.admitted, 2);
			},
			other => panic!("Expected a delay, got {other:?}."),
		}

		governor.admit().await;

		assert_elapsed_near(start, WINDOW + WAIT_BUFFER);
		assert_eq!(governor.waits(), 1);
		// Both earlier admissions aged out; only the delayed one remains.
		assert_eq!(governor.admitted_in_window(), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn wait_accounts_for_partially_aged_window() {
		let governor = RateGovernor::new(2);
		let start = Instant::now();

		governor.admit().await;
		tokio::time::sleep(StdDuration::from_millis(400)).await;
		governor.admit().await;
		governor.admit().await;

		// The first admission ages out 1000ms after start, plus the buffer.
		assert_elapsed_near(start, WINDOW + WAIT_BUFFER);
	}

	#[tokio::test(start_paused = true)]
	async fn entries_exactly_one_window_old_are_purged() {
		let governor = RateGovernor::new(1);

		governor.admit().await;
		tokio::time::sleep(WINDOW).await;

		assert_eq!(governor.decide(Instant::now()), RateLimitDecision::Allow);
	}

	#[tokio::test(start_paused = true)]
	async fn sequential_admissions_respect_sliding_window() {
		let quota = 5;
		let governor = RateGovernor::new(quota);
		let mut admissions = Vec::new();

		for i in 0..23_u64 {
			governor.admit().await;
			admissions.push(Instant::now());
			tokio::time::sleep(StdDuration::from_millis(37 * (i % 4))).await;
		}

		assert_window_invariant(&admissions, quota as usize);
	}

	#[tokio::test(start_paused = true)]
	async fn concurrent_admissions_respect_sliding_window() {
		let quota = 4;
		let governor = Arc::new(RateGovernor::new(quota));
		let handles = (0..17)
			.map(|_| {
				let governor = governor.clone();

				tokio::spawn(async move {
					governor.admit().await;

					Instant::now()
				})
			})
			.collect::<Vec<_>>();
		let mut admissions = Vec::new();

		for handle in handles {
			admissions.push(handle.await.expect("Admission task should not panic."));
		}

		assert_window_invariant(&admissions, quota as usize);
		assert!(governor.waits() >= 3);
	}

	#[tokio::test(start_paused = true)]
	async fn introspection_does_not_wait_behind_sleeping_admission() {
		let governor = Arc::new(RateGovernor::new(1));

		governor.admit().await;

		let waiter = {
			let governor = governor.clone();

			tokio::spawn(async move { governor.admit().await })
		};

		tokio::time::sleep(StdDuration::from_millis(100)).await;

		let start = Instant::now();

		assert_eq!(governor.admitted_in_window(), 1);
		assert!(matches!(governor.decide(Instant::now()), RateLimitDecision::Delay(_)));
		assert_eq!(start.elapsed(), StdDuration::ZERO);
		assert!(!waiter.is_finished());

		waiter.await.expect("Waiting admission should complete.");

		assert_eq!(governor.waits(), 1);
		assert_eq!(governor.admitted_in_window(), 1);
	}

	#[test]
	fn zero_quota_is_treated_as_one() {
		assert_eq!(RateGovernor::new(0).quota(), 1);
	}
}
