//! Single pending deadline with cancel-and-replace semantics.

use std::time::Duration;

use tokio::time::Instant;

/// One cancellable scheduled action, used for debouncing.
///
/// Arming an already armed task replaces its deadline, so any burst of
/// `arm` calls collapses into a single firing `delay` after the last one.
/// The task does not run anything itself: its owner polls
/// [`take_due`](Self::take_due) or awaits [`fired`](Self::fired).
#[derive(Debug, Clone)]
pub struct ScheduledTask {
	delay: Duration,
	deadline: Option<Instant>,
}

impl ScheduledTask {
	pub const fn new(delay: Duration) -> Self {
		Self { delay, deadline: None }
	}

	pub const fn delay(&self) -> Duration {
		self.delay
	}

	pub fn set_delay(&mut self, delay: Duration) {
		self.delay = delay;
	}

	/// Arms (or re-arms) the task to fire `delay` after `now`.
	///
	/// Returns `true` when a previously armed deadline was replaced.
	pub fn arm(&mut self, now: Instant) -> bool {
		self.deadline.replace(now + self.delay).is_some()
	}

	/// Disarms the task. Returns whether it was armed.
	pub fn cancel(&mut self) -> bool {
		self.deadline.take().is_some()
	}

	pub const fn deadline(&self) -> Option<Instant> {
		self.deadline
	}

	pub const fn is_armed(&self) -> bool {
		self.deadline.is_some()
	}

	/// Disarms and returns `true` if the deadline has passed at `now`.
	pub fn take_due(&mut self, now: Instant) -> bool {
		match self.deadline {
			Some(deadline) if deadline <= now => {
				self.deadline = None;
				true
			}
			_ => false,
		}
	}

	/// Resolves once the deadline passes; never resolves while disarmed.
	///
	/// Does not disarm; pair with [`take_due`](Self::take_due).
	pub async fn fired(&self) {
		match self.deadline {
			Some(deadline) => tokio::time::sleep_until(deadline).await,
			None => std::future::pending().await,
		}
	}
}
