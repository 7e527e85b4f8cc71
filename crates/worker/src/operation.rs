//! Cancellable handle to spawned work.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::{Cancel, CancellationSignal, TaskClass};

/// Cloneable handle to a spawned task producing a `T`.
///
/// Cancellation is cooperative: cancelling fires the task's token, and the
/// task is dropped at its next suspension point. A value produced before
/// cancellation stays observable, so cancelling a finished operation is a
/// harmless no-op. Clones share the same task and token.
pub struct Operation<T> {
	token: CancellationToken,
	/// Tokens cancelled together with this one (parts of a combined operation).
	linked: Arc<[CancellationToken]>,
	result: watch::Receiver<Option<T>>,
}

impl<T> Clone for Operation<T> {
	fn clone(&self) -> Self {
		Self {
			token: self.token.clone(),
			linked: Arc::clone(&self.linked),
			result: self.result.clone(),
		}
	}
}

impl<T> fmt::Debug for Operation<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Operation")
			.field("cancelled", &self.token.is_cancelled())
			.field("finished", &self.is_finished())
			.field("linked", &self.linked.len())
			.finish()
	}
}

impl<T> Operation<T>
where
	T: Clone + Send + Sync + 'static,
{
	/// Spawns `make(token)` on the current runtime.
	///
	/// The future is dropped as soon as the token fires; long-running work
	/// may also poll the token itself.
	pub fn spawn<F, Fut>(class: TaskClass, make: F) -> Self
	where
		F: FnOnce(CancellationToken) -> Fut,
		Fut: Future<Output = T> + Send + 'static,
	{
		let token = CancellationToken::new();
		let (tx, result) = watch::channel(None);
		let fut = make(token.clone());
		let task_token = token.clone();

		crate::spawn(class, async move {
			tokio::select! {
				biased;
				_ = task_token.cancelled() => trace!("operation.cancelled"),
				value = fut => {
					let _ = tx.send(Some(value));
				}
			}
		});

		Self {
			token,
			linked: Arc::from([]),
			result,
		}
	}

	/// An operation that already completed with `value`.
	pub fn ready(value: T) -> Self {
		let (_tx, result) = watch::channel(Some(value));
		Self {
			token: CancellationToken::new(),
			linked: Arc::from([]),
			result,
		}
	}

	/// Combines `parts` into one operation resolving to their values in order.
	///
	/// Cancelling the combined operation cancels every part; a part that
	/// ends without a value cancels the combined operation and its siblings.
	pub fn join_all(class: TaskClass, parts: Vec<Operation<T>>) -> Operation<Vec<T>> {
		let token = CancellationToken::new();
		let (tx, result) = watch::channel(None);
		let linked: Arc<[CancellationToken]> = parts.iter().map(|p| p.token.clone()).collect();
		let task_token = token.clone();

		crate::spawn(class, async move {
			let mut values = Vec::with_capacity(parts.len());
			for (index, part) in parts.iter().enumerate() {
				match part.wait().await {
					Ok(value) => values.push(value),
					Err(signal) => {
						debug!(index, %signal, "operation.join_all part failed");
						task_token.cancel();
						parts.iter().for_each(Operation::cancel);
						return;
					}
				}
			}
			if !task_token.is_cancelled() {
				let _ = tx.send(Some(values));
			}
		});

		Operation { token, linked, result }
	}

	/// Waits for the value.
	///
	/// A value that arrived before cancellation wins over the cancellation.
	pub async fn wait(&self) -> Result<T, CancellationSignal> {
		let mut rx = self.result.clone();
		loop {
			if let Some(value) = rx.borrow_and_update().clone() {
				return Ok(value);
			}
			if self.token.is_cancelled() {
				return Err(CancellationSignal::Cancelled);
			}

			tokio::select! {
				biased;
				changed = rx.changed() => {
					if changed.is_err() {
						return match rx.borrow().clone() {
							Some(value) => Ok(value),
							None if self.token.is_cancelled() => Err(CancellationSignal::Cancelled),
							None => Err(CancellationSignal::Abandoned),
						};
					}
				}
				_ = self.token.cancelled() => {}
			}
		}
	}

	/// The value, if the operation already completed.
	pub fn try_result(&self) -> Option<T> {
		self.result.borrow().clone()
	}
}

impl<T> Operation<T> {
	pub fn cancel(&self) {
		self.token.cancel();
		for linked in self.linked.iter() {
			linked.cancel();
		}
	}

	pub fn is_cancelled(&self) -> bool {
		self.token.is_cancelled()
	}

	pub fn is_finished(&self) -> bool {
		self.result.borrow().is_some()
	}

	/// Whether a value may still arrive.
	pub fn is_pending(&self) -> bool {
		!self.is_finished() && !self.is_cancelled()
	}

	/// Returns true when both handles refer to the same task.
	pub fn same_task(&self, other: &Self) -> bool {
		self.result.same_channel(&other.result)
	}
}

impl<T> Cancel for Operation<T> {
	fn cancel(&self) {
		Operation::cancel(self);
	}
}
