use std::cell::{Cell, RefCell};
use std::rc::Rc;

use pretty_assertions::assert_eq;

use super::*;

fn recorder(bus: &EventBus<String>, topic: &str, tag: &'static str, log: &Rc<RefCell<Vec<String>>>) -> Subscription {
	let log = Rc::clone(log);
	bus.subscribe(topic, move |payload: &String, _| log.borrow_mut().push(format!("{tag}:{payload}")))
}

#[test]
fn test_delivery_follows_registration_order() {
	let bus = EventBus::new();
	let log = Rc::new(RefCell::new(Vec::new()));
	recorder(&bus, "/search", "a", &log);
	recorder(&bus, "/search", "b", &log);
	recorder(&bus, "/other", "c", &log);

	assert!(bus.publish("/search", &"cats".to_string(), SourceId::ANONYMOUS));
	assert_eq!(*log.borrow(), ["a:cats", "b:cats"]);
}

#[test]
fn test_publish_without_subscribers_succeeds() {
	let bus: EventBus<u32> = EventBus::new();
	assert!(bus.publish("/nobody", &1, SourceId::ANONYMOUS));
}

#[test]
fn test_source_is_passed_through() {
	let bus: EventBus<u32> = EventBus::new();
	let me = bus.new_source();
	let seen = Rc::new(Cell::new(None));
	let seen_in = Rc::clone(&seen);
	bus.subscribe("/t", move |_, source| seen_in.set(Some(source)));

	bus.publish("/t", &1, me);
	assert_eq!(seen.get(), Some(me));
	assert_ne!(me, SourceId::ANONYMOUS);
	assert_ne!(me, bus.new_source());
}

#[test]
fn test_veto_blocks_every_subscriber() {
	let bus = EventBus::new();
	let log = Rc::new(RefCell::new(Vec::new()));
	recorder(&bus, "/search", "a", &log);

	bus.add_publish_validator("/search", "dirty-form", || false);
	assert!(!bus.publish("/search", &"cats".to_string(), SourceId::ANONYMOUS));
	assert!(log.borrow().is_empty());
}

#[test]
fn test_validators_are_anded() {
	let bus: EventBus<u32> = EventBus::new();
	let open = Rc::new(Cell::new(true));
	let open_in = Rc::clone(&open);
	bus.add_publish_validator("/t", "always", || true);
	bus.add_publish_validator("/t", "switch", move || open_in.get());

	assert!(bus.publish("/t", &1, SourceId::ANONYMOUS));
	open.set(false);
	assert!(!bus.publish("/t", &1, SourceId::ANONYMOUS));
}

#[test]
fn test_validators_are_scoped_to_their_topic() {
	let bus: EventBus<u32> = EventBus::new();
	bus.add_publish_validator("/a", "block", || false);
	assert!(!bus.publish("/a", &1, SourceId::ANONYMOUS));
	assert!(bus.publish("/b", &1, SourceId::ANONYMOUS));
}

#[test]
fn test_remove_validator_by_identifier() {
	let bus: EventBus<u32> = EventBus::new();
	bus.add_publish_validator("/t", "editor", || false);
	bus.add_publish_validator("/t", "upload", || false);
	assert_eq!(bus.validator_count("/t"), 2);

	assert!(bus.remove_publish_validator("/t", "editor"));
	assert!(!bus.publish("/t", &1, SourceId::ANONYMOUS));
	assert!(bus.remove_publish_validator("/t", "upload"));
	assert!(bus.publish("/t", &1, SourceId::ANONYMOUS));
	assert!(!bus.remove_publish_validator("/t", "upload"));
	assert_eq!(bus.validator_count("/t"), 0);
}

#[test]
fn test_readding_identifier_replaces_guard() {
	let bus: EventBus<u32> = EventBus::new();
	bus.add_publish_validator("/t", "form", || false);
	bus.add_publish_validator("/t", "form", || true);
	assert_eq!(bus.validator_count("/t"), 1);
	assert!(bus.publish("/t", &1, SourceId::ANONYMOUS));
}

#[test]
fn test_unsubscribe() {
	let bus = EventBus::new();
	let log = Rc::new(RefCell::new(Vec::new()));
	let a = recorder(&bus, "/t", "a", &log);
	recorder(&bus, "/t", "b", &log);

	assert!(bus.unsubscribe(&a));
	assert!(!bus.unsubscribe(&a));
	bus.publish("/t", &"x".to_string(), SourceId::ANONYMOUS);
	assert_eq!(*log.borrow(), ["b:x"]);
	assert_eq!(bus.subscriber_count("/t"), 1);
}

#[test]
fn test_handlers_may_publish_reentrantly() {
	let bus: Rc<EventBus<u32>> = Rc::new(EventBus::new());
	let log = Rc::new(RefCell::new(Vec::new()));

	let chained = Rc::downgrade(&bus);
	bus.subscribe("/first", move |n, source| {
		if let Some(bus) = chained.upgrade() {
			bus.publish("/second", &(n + 1), source);
		}
	});
	let log_in = Rc::clone(&log);
	bus.subscribe("/second", move |n, _| log_in.borrow_mut().push(*n));

	assert!(bus.publish("/first", &1, SourceId::ANONYMOUS));
	assert_eq!(*log.borrow(), [2]);
}

#[test]
fn test_subscriber_added_during_delivery_misses_current_publish() {
	let bus: Rc<EventBus<u32>> = Rc::new(EventBus::new());
	let late_calls = Rc::new(Cell::new(0));

	let weak = Rc::downgrade(&bus);
	let late = Rc::clone(&late_calls);
	bus.subscribe("/t", move |_, _| {
		if let Some(bus) = weak.upgrade() {
			let late = Rc::clone(&late);
			bus.subscribe("/t", move |_, _| late.set(late.get() + 1));
		}
	});

	bus.publish("/t", &1, SourceId::ANONYMOUS);
	assert_eq!(late_calls.get(), 0);
	bus.publish("/t", &1, SourceId::ANONYMOUS);
	assert_eq!(late_calls.get(), 1);
}
