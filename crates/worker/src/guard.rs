//! At-most-one outstanding operation per logical slot.

use tracing::trace;

use crate::Cancel;

/// Keeps a single current operation, cancelling its predecessor on replacement.
///
/// The predecessor is cancelled *before* the factory for the new operation
/// runs. Operation sources that coalesce identical outstanding requests
/// would otherwise hand back the very operation about to be cancelled.
#[derive(Debug)]
pub struct SingleInFlight<O> {
	name: &'static str,
	current: Option<O>,
	generation: u64,
}

impl<O: Cancel> SingleInFlight<O> {
	pub const fn new(name: &'static str) -> Self {
		Self {
			name,
			current: None,
			generation: 0,
		}
	}

	/// Cancels the current operation (if any), then stores and returns `factory()`.
	pub fn run(&mut self, factory: impl FnOnce() -> O) -> &O {
		if let Some(previous) = self.current.take() {
			trace!(guard = self.name, generation = self.generation, "single_in_flight.cancel_previous");
			previous.cancel();
		}
		self.generation = self.generation.wrapping_add(1);
		self.current.insert(factory())
	}

	pub fn current(&self) -> Option<&O> {
		self.current.as_ref()
	}

	/// Generation of the current operation; bumped by every [`run`](Self::run).
	pub const fn generation(&self) -> u64 {
		self.generation
	}

	pub const fn is_current(&self, generation: u64) -> bool {
		self.current.is_some() && self.generation == generation
	}

	/// Cancels and forgets the current operation. Returns whether one existed.
	pub fn cancel(&mut self) -> bool {
		match self.current.take() {
			Some(op) => {
				trace!(guard = self.name, generation = self.generation, "single_in_flight.cancel");
				op.cancel();
				true
			}
			None => false,
		}
	}

	/// Releases the operation of `generation` once it completed.
	///
	/// Completions of superseded generations are ignored and return `None`.
	pub fn finish(&mut self, generation: u64) -> Option<O> {
		if self.is_current(generation) {
			self.current.take()
		} else {
			trace!(guard = self.name, stale = generation, current = self.generation, "single_in_flight.stale_finish");
			None
		}
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use super::*;

	#[derive(Debug)]
	struct Recorded {
		id: u32,
		log: Rc<RefCell<Vec<String>>>,
	}

	impl Cancel for Recorded {
		fn cancel(&self) {
			self.log.borrow_mut().push(format!("cancel {}", self.id));
		}
	}

	fn factory(id: u32, log: &Rc<RefCell<Vec<String>>>) -> impl FnOnce() -> Recorded {
		let log = Rc::clone(log);
		move || {
			log.borrow_mut().push(format!("create {id}"));
			Recorded { id, log }
		}
	}

	#[test]
	fn test_first_run_cancels_nothing() {
		let log = Rc::new(RefCell::new(Vec::new()));
		let mut guard = SingleInFlight::new("fetch");
		assert_eq!(guard.run(factory(1, &log)).id, 1);
		assert_eq!(*log.borrow(), ["create 1"]);
	}

	#[test]
	fn test_previous_is_cancelled_before_factory_runs() {
		let log = Rc::new(RefCell::new(Vec::new()));
		let mut guard = SingleInFlight::new("fetch");
		guard.run(factory(1, &log));
		guard.run(factory(2, &log));

		assert_eq!(*log.borrow(), ["create 1", "cancel 1", "create 2"]);
		assert_eq!(guard.current().map(|op| op.id), Some(2));
	}

	#[test]
	fn test_generation_tracks_runs() {
		let log = Rc::new(RefCell::new(Vec::new()));
		let mut guard = SingleInFlight::new("fetch");
		guard.run(factory(1, &log));
		let first = guard.generation();
		guard.run(factory(2, &log));
		let second = guard.generation();

		assert_ne!(first, second);
		assert!(guard.finish(first).is_none());
		assert!(guard.is_current(second));
		assert_eq!(guard.finish(second).map(|op| op.id), Some(2));
		assert!(guard.current().is_none());
		// a finished operation is not cancelled by the next run
		guard.run(factory(3, &log));
		assert!(!log.borrow().contains(&"cancel 2".to_string()));
	}

	#[test]
	fn test_explicit_cancel() {
		let log = Rc::new(RefCell::new(Vec::new()));
		let mut guard = SingleInFlight::new("fetch");
		assert!(!guard.cancel());
		guard.run(factory(1, &log));
		assert!(guard.cancel());
		assert!(!guard.cancel());
		assert_eq!(*log.borrow(), ["create 1", "cancel 1"]);
	}
}
