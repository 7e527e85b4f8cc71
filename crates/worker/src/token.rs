use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Advisory cancellation capability of an outstanding operation.
///
/// Implementations must be idempotent and must tolerate being cancelled
/// after the operation already completed.
pub trait Cancel {
	fn cancel(&self);
}

impl Cancel for CancellationToken {
	fn cancel(&self) {
		CancellationToken::cancel(self);
	}
}

impl<C: Cancel + ?Sized> Cancel for std::rc::Rc<C> {
	fn cancel(&self) {
		(**self).cancel();
	}
}

impl<C: Cancel + ?Sized> Cancel for std::sync::Arc<C> {
	fn cancel(&self) {
		(**self).cancel();
	}
}

/// Why an operation produced no value.
///
/// Only observed between an operation and whoever awaits it; callers decide
/// whether it is an application error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CancellationSignal {
	/// Cancellation was requested before a value was produced.
	#[error("operation cancelled")]
	Cancelled,
	/// The task ended without a value and without being cancelled (panic or abort).
	#[error("operation ended without a result")]
	Abandoned,
}
