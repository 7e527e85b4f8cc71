//! The fragment/state synchronizer.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use folio_bus::{EventBus, SourceId, Subscription};
use folio_state::{SlotSchema, State, StateBuilder, Strictness};
use folio_worker::ScheduledTask;
use indexmap::IndexMap;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::fragment::{self, FragmentRecord};
use crate::{FragmentWrite, Location, RouterConfig, WriteMode};

/// Whether the next inbound fragment may be the router's own write.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EchoState {
	/// Any inbound fragment is treated as external.
	#[default]
	AwaitingExternalChange,
	/// The router wrote this fragment and has not seen it come back yet.
	SelfWriteInFlight(String),
}

/// Observable router phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterPhase {
	/// No fragment write pending.
	Idle,
	/// Slot states changed since the last write; the debounce timer is armed.
	Normalizing,
}

#[derive(Debug)]
struct SlotEntry {
	schema: Arc<SlotSchema>,
	last_known: Option<State>,
	/// Bumped on every external change.
	revision: u64,
}

#[derive(Debug)]
struct RouterCore {
	slots: Vec<SlotEntry>,
	/// Field names declared by any registered slot.
	known_fields: Vec<&'static str>,
	strictness: Strictness,
	echo: EchoState,
	debounce: ScheduledTask,
	pending_mode: Option<WriteMode>,
}

impl RouterCore {
	fn schedule(&mut self, mode: WriteMode) {
		let mode = self.pending_mode.map_or(mode, |pending| pending.merge(mode));
		self.pending_mode = Some(mode);
		let rearmed = self.debounce.arm(Instant::now());
		debug!(%mode, rearmed, "router.schedule");
	}

	/// Records a slot change published by someone other than the router.
	fn record_external(&mut self, index: usize, state: &State) {
		let entry = &mut self.slots[index];
		if state.slot() != entry.schema.name {
			warn!(
				expected = entry.schema.name,
				got = state.slot(),
				topic = entry.schema.topic,
				"router.slot_mismatch"
			);
			return;
		}
		if entry.last_known.as_ref() == Some(state) {
			trace!(slot = entry.schema.name, "router.slot_unchanged");
			return;
		}
		entry.last_known = Some(state.clone());
		entry.revision += 1;
		debug!(slot = entry.schema.name, "router.slot_changed");
		self.schedule(WriteMode::Push);
	}

	/// Decides what a fragment means for slot `index`: the state to
	/// publish, if any.
	fn resolve(&self, index: usize, record: &FragmentRecord) -> Option<State> {
		let entry = &self.slots[index];
		let schema = entry.schema.as_ref();
		let built = StateBuilder::new(schema, self.strictness)
			.allow_foreign(self.known_fields.iter().copied())
			.extend(record)
			.build();

		match built {
			Ok(state) if entry.last_known.as_ref() == Some(&state) => None,
			Ok(state) => Some(state),
			Err(error) if entry.last_known.is_none() => {
				debug!(slot = schema.name, %error, "router.fragment_rejected, using default");
				match StateBuilder::build_default(schema) {
					Ok(state) => Some(state),
					Err(error) => {
						warn!(slot = schema.name, %error, "router.default_invalid");
						None
					}
				}
			}
			Err(error) => {
				debug!(slot = schema.name, %error, "router.fragment_rejected, keeping last known");
				None
			}
		}
	}

	fn canonical_fragment(&self) -> String {
		let mut merged: IndexMap<&str, String> = IndexMap::new();
		for state in self.slots.iter().filter_map(|s| s.last_known.as_ref()) {
			merged.extend(state.to_pairs());
		}
		fragment::encode(merged)
	}
}

/// Keeps registered state slots and the URL fragment consistent.
///
/// The router is the sole writer of the fragment. Slot changes reach it as
/// bus publishes on each slot's topic; fragment changes are fed in through
/// [`on_fragment_changed`](Self::on_fragment_changed). Both arm a single
/// debounce timer; the owner drives it with [`next_deadline`](Self::next_deadline)
/// and [`flush_due`](Self::flush_due).
///
/// The router's own publishes carry [`source`](Self::source) so its
/// subscription can ignore them.
pub struct StateRouter {
	bus: Rc<EventBus<State>>,
	source: SourceId,
	core: Rc<RefCell<RouterCore>>,
	subscriptions: Vec<Subscription>,
}

impl StateRouter {
	pub fn new(bus: Rc<EventBus<State>>, config: &RouterConfig) -> Self {
		let source = bus.new_source();
		let strictness = if config.strict_fragments {
			Strictness::Strict
		} else {
			Strictness::Lenient
		};
		Self {
			bus,
			source,
			core: Rc::new(RefCell::new(RouterCore {
				slots: Vec::new(),
				known_fields: Vec::new(),
				strictness,
				echo: EchoState::default(),
				debounce: ScheduledTask::new(config.debounce()),
				pending_mode: None,
			})),
			subscriptions: Vec::new(),
		}
	}

	/// Registers a slot and subscribes to its topic.
	///
	/// Registration order is the order in which fragments are applied and
	/// fields are merged.
	///
	/// # Panics
	///
	/// If a slot with the same name or topic is already registered.
	pub fn register(&mut self, schema: Arc<SlotSchema>) {
		let index = {
			let mut core = self.core.borrow_mut();
			if let Some(existing) = core
				.slots
				.iter()
				.find(|s| s.schema.name == schema.name || s.schema.topic == schema.topic)
			{
				panic!(
					"slot `{}` ({}) collides with registered slot `{}` ({})",
					schema.name, schema.topic, existing.schema.name, existing.schema.topic
				);
			}
			for name in schema.field_names() {
				if !core.known_fields.contains(&name) {
					core.known_fields.push(name);
				}
			}
			core.slots.push(SlotEntry {
				schema: Arc::clone(&schema),
				last_known: None,
				revision: 0,
			});
			core.slots.len() - 1
		};

		let own = self.source;
		let core: Weak<RefCell<RouterCore>> = Rc::downgrade(&self.core);
		let subscription = self.bus.subscribe(schema.topic, move |state: &State, source| {
			if source == own {
				return;
			}
			if let Some(core) = core.upgrade() {
				core.borrow_mut().record_external(index, state);
			}
		});
		self.subscriptions.push(subscription);
		debug!(slot = schema.name, topic = schema.topic, "router.register");
	}

	/// Applies an inbound fragment (leading `#` optional).
	///
	/// Never fails: slots that reject the fragment keep their last known
	/// state, or receive their default on first load. A canonical rewrite
	/// replacing the current history entry is always scheduled.
	pub fn on_fragment_changed(&self, raw: &str) {
		let raw = raw.strip_prefix('#').unwrap_or(raw);
		{
			let mut core = self.core.borrow_mut();
			if let EchoState::SelfWriteInFlight(expected) = std::mem::take(&mut core.echo)
				&& expected == raw
			{
				debug!(fragment = raw, "router.self_echo skipped");
				return;
			}
		}

		let record = fragment::parse(raw);
		let slots = self.core.borrow().slots.len();
		for index in 0..slots {
			// No borrow may be held across the publish: subscribers can
			// publish back into the router.
			let (resolved, topic, revision) = {
				let core = self.core.borrow();
				let entry = &core.slots[index];
				(core.resolve(index, &record), entry.schema.topic, entry.revision)
			};
			let Some(state) = resolved else {
				continue;
			};
			if !self.bus.publish(topic, &state, self.source) {
				debug!(topic, "router.publish vetoed");
				continue;
			}
			let mut core = self.core.borrow_mut();
			let entry = &mut core.slots[index];
			// A subscriber may have published a newer state during delivery.
			if entry.revision == revision {
				entry.last_known = Some(state);
			} else {
				debug!(topic, "router.publish superseded");
			}
		}

		self.core.borrow_mut().schedule(WriteMode::Replace);
	}

	/// When the pending fragment write is due, if one is pending.
	pub fn next_deadline(&self) -> Option<Instant> {
		self.core.borrow().debounce.deadline()
	}

	/// Writes the canonical fragment if the debounce deadline has passed
	/// at `now`.
	pub fn flush_due(&self, now: Instant, location: &mut dyn Location) -> Option<FragmentWrite> {
		if !self.core.borrow_mut().debounce.take_due(now) {
			return None;
		}
		self.flush(location)
	}

	/// Writes the canonical fragment immediately, disarming the timer.
	pub fn flush_now(&self, location: &mut dyn Location) -> Option<FragmentWrite> {
		self.core.borrow_mut().debounce.cancel();
		self.flush(location)
	}

	fn flush(&self, location: &mut dyn Location) -> Option<FragmentWrite> {
		let mut core = self.core.borrow_mut();
		let mode = core.pending_mode.take().unwrap_or(WriteMode::Replace);
		let fragment = core.canonical_fragment();
		if fragment == location.fragment() {
			debug!(%fragment, "router.flush unchanged");
			return None;
		}
		core.echo = EchoState::SelfWriteInFlight(fragment.clone());
		drop(core);

		location.write(&fragment, mode);
		debug!(%fragment, %mode, "router.flush");
		Some(FragmentWrite { fragment, mode })
	}

	/// The fragment the current slot states serialize to.
	pub fn canonical_fragment(&self) -> String {
		self.core.borrow().canonical_fragment()
	}

	pub fn last_known(&self, slot: &str) -> Option<State> {
		let core = self.core.borrow();
		core.slots
			.iter()
			.find(|s| s.schema.name == slot)
			.and_then(|s| s.last_known.clone())
	}

	/// Registered slot names in registration order.
	pub fn slot_names(&self) -> Vec<&'static str> {
		self.core.borrow().slots.iter().map(|s| s.schema.name).collect()
	}

	/// Schema of a registered slot.
	pub fn schema(&self, slot: &str) -> Option<Arc<SlotSchema>> {
		let core = self.core.borrow();
		core.slots
			.iter()
			.find(|s| s.schema.name == slot)
			.map(|s| Arc::clone(&s.schema))
	}

	/// Identity the router publishes under.
	pub const fn source(&self) -> SourceId {
		self.source
	}

	pub fn phase(&self) -> RouterPhase {
		if self.core.borrow().debounce.is_armed() {
			RouterPhase::Normalizing
		} else {
			RouterPhase::Idle
		}
	}

	/// Mode the pending write will use, if one is pending.
	pub fn pending_mode(&self) -> Option<WriteMode> {
		self.core.borrow().pending_mode
	}

	pub fn echo_state(&self) -> EchoState {
		self.core.borrow().echo.clone()
	}
}

impl Drop for StateRouter {
	fn drop(&mut self) {
		for subscription in &self.subscriptions {
			self.bus.unsubscribe(subscription);
		}
	}
}

impl std::fmt::Debug for StateRouter {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("StateRouter")
			.field("source", &self.source)
			.field("core", &self.core)
			.finish_non_exhaustive()
	}
}
