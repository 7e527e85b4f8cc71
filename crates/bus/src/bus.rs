use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap as HashMap;
use tracing::{debug, trace};

use crate::{SourceId, Topic};

type Handler<P> = Rc<dyn Fn(&P, SourceId)>;
type Validator = Rc<dyn Fn() -> bool>;

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription {
	topic: Topic,
	id: u64,
}

impl Subscription {
	pub fn topic(&self) -> &Topic {
		&self.topic
	}
}

/// Synchronous topic bus with vetoable publishing.
///
/// One instance per page session, shared by reference (`Rc`) with the
/// components that publish or listen.
pub struct EventBus<P> {
	subscribers: RefCell<HashMap<Topic, Vec<(u64, Handler<P>)>>>,
	/// Per-topic validators keyed by caller-chosen identifier, in insertion order.
	validators: RefCell<HashMap<Topic, IndexMap<Box<str>, Validator>>>,
	next_subscription: Cell<u64>,
	next_source: Cell<u64>,
}

impl<P> Default for EventBus<P> {
	fn default() -> Self {
		Self::new()
	}
}

impl<P> fmt::Debug for EventBus<P> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let subscribers: HashMap<Topic, usize> = self
			.subscribers
			.borrow()
			.iter()
			.map(|(t, subs)| (t.clone(), subs.len()))
			.collect();
		let validators: HashMap<Topic, Vec<Box<str>>> = self
			.validators
			.borrow()
			.iter()
			.map(|(t, v)| (t.clone(), v.keys().cloned().collect()))
			.collect();
		f.debug_struct("EventBus")
			.field("subscribers", &subscribers)
			.field("validators", &validators)
			.finish()
	}
}

impl<P> EventBus<P> {
	pub fn new() -> Self {
		Self {
			subscribers: RefCell::new(HashMap::default()),
			validators: RefCell::new(HashMap::default()),
			next_subscription: Cell::new(0),
			next_source: Cell::new(0),
		}
	}

	/// Allocates a fresh publisher identity, never equal to [`SourceId::ANONYMOUS`].
	pub fn new_source(&self) -> SourceId {
		let next = self.next_source.get() + 1;
		self.next_source.set(next);
		SourceId::from_raw(next)
	}

	/// Registers `handler` for `topic`. Handlers run in registration order.
	pub fn subscribe(&self, topic: impl Into<Topic>, handler: impl Fn(&P, SourceId) + 'static) -> Subscription {
		let topic = topic.into();
		let id = self.next_subscription.get() + 1;
		self.next_subscription.set(id);

		self.subscribers
			.borrow_mut()
			.entry(topic.clone())
			.or_default()
			.push((id, Rc::new(handler)));
		trace!(%topic, id, "bus.subscribe");

		Subscription { topic, id }
	}

	/// Removes a subscription. Returns `false` if it was already gone.
	pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
		let mut subscribers = self.subscribers.borrow_mut();
		let Some(list) = subscribers.get_mut(subscription.topic.as_str()) else {
			return false;
		};
		let before = list.len();
		list.retain(|(id, _)| *id != subscription.id);
		let removed = list.len() != before;
		if list.is_empty() {
			subscribers.remove(subscription.topic.as_str());
		}
		removed
	}

	/// Publishes `payload` on `topic` unless a validator vetoes it.
	///
	/// Returns `true` when delivered (including to zero subscribers) and
	/// `false` when vetoed. Subscribers added during this delivery do not
	/// see this payload; subscribers removed during it still do.
	pub fn publish(&self, topic: &str, payload: &P, source: SourceId) -> bool {
		let validators: Vec<(Box<str>, Validator)> = self
			.validators
			.borrow()
			.get(topic)
			.map(|v| v.iter().map(|(id, f)| (id.clone(), Rc::clone(f))).collect())
			.unwrap_or_default();

		for (id, allow) in validators {
			if !allow() {
				debug!(topic, validator = &*id, %source, "bus.publish vetoed");
				return false;
			}
		}

		let handlers: Vec<Handler<P>> = self
			.subscribers
			.borrow()
			.get(topic)
			.map(|subs| subs.iter().map(|(_, h)| Rc::clone(h)).collect())
			.unwrap_or_default();
		trace!(topic, %source, subscribers = handlers.len(), "bus.publish");

		for handler in handlers {
			handler(payload, source);
		}
		true
	}

	/// Registers a publish guard for `topic` under `id`.
	///
	/// Guards from unrelated components coexist; re-using an `id` replaces
	/// that component's previous guard only.
	pub fn add_publish_validator(&self, topic: impl Into<Topic>, id: impl Into<Box<str>>, predicate: impl Fn() -> bool + 'static) {
		let topic = topic.into();
		let id = id.into();
		trace!(%topic, validator = &*id, "bus.add_publish_validator");
		self.validators
			.borrow_mut()
			.entry(topic)
			.or_default()
			.insert(id, Rc::new(predicate));
	}

	/// Removes the guard registered under `id`. Returns `false` if absent.
	pub fn remove_publish_validator(&self, topic: &str, id: &str) -> bool {
		let mut validators = self.validators.borrow_mut();
		let Some(for_topic) = validators.get_mut(topic) else {
			return false;
		};
		let removed = for_topic.shift_remove(id).is_some();
		if for_topic.is_empty() {
			validators.remove(topic);
		}
		removed
	}

	pub fn subscriber_count(&self, topic: &str) -> usize {
		self.subscribers.borrow().get(topic).map_or(0, Vec::len)
	}

	pub fn validator_count(&self, topic: &str) -> usize {
		self.validators.borrow().get(topic).map_or(0, IndexMap::len)
	}
}

#[cfg(test)]
mod tests;
