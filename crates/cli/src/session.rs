//! One page session: bus, router and an in-memory address bar.

use std::rc::Rc;

use folio_bus::{EventBus, SourceId};
use folio_router::{FragmentWrite, Location, MemoryLocation, RouterConfig, StateRouter, fragment};
use folio_state::{State, StateBuilder, Strictness, slots};
use tokio::time::Instant;
use tracing::debug;

use crate::command::{Command, HELP};

const VETO_ID: &str = "folio-cli";

pub struct Session {
	bus: Rc<EventBus<State>>,
	router: StateRouter,
	location: MemoryLocation,
	/// Identity of the simulated views.
	ui: SourceId,
}

impl Session {
	/// Opens a page on `fragment` with the built-in slots registered.
	pub fn open(config: &RouterConfig, fragment: &str) -> Self {
		let bus = Rc::new(EventBus::new());
		let mut router = StateRouter::new(Rc::clone(&bus), config);
		router.register(slots::search());
		router.register(slots::browse_context());
		let ui = bus.new_source();
		let location = MemoryLocation::new(fragment);
		router.on_fragment_changed(location.fragment());
		Self {
			bus,
			router,
			location,
			ui,
		}
	}

	pub fn next_deadline(&self) -> Option<Instant> {
		self.router.next_deadline()
	}

	/// Flushes a due write and delivers its change notification back, the
	/// way a browser fires `hashchange` after the router writes.
	pub fn flush_due(&mut self, now: Instant) -> Option<FragmentWrite> {
		let write = self.router.flush_due(now, &mut self.location)?;
		self.router.on_fragment_changed(&write.fragment);
		Some(write)
	}

	/// Runs one command, returning the lines to print.
	pub fn execute(&mut self, command: Command) -> Vec<String> {
		match command {
			Command::Hash(raw) => {
				let fragment = self.location.navigate(&raw).to_owned();
				self.router.on_fragment_changed(&fragment);
				Vec::new()
			}
			Command::Set { slot, fields } => self.set(&slot, &fields),
			Command::Veto(slot) => self.with_topic(&slot, |bus, topic| {
				bus.add_publish_validator(topic, VETO_ID, || false);
				format!("vetoing {slot}")
			}),
			Command::Unveto(slot) => self.with_topic(&slot, |bus, topic| {
				if bus.remove_publish_validator(topic, VETO_ID) {
					format!("unvetoed {slot}")
				} else {
					format!("{slot} was not vetoed")
				}
			}),
			Command::Back => match self.location.back().map(str::to_owned) {
				Some(fragment) => {
					self.router.on_fragment_changed(&fragment);
					vec![format!("at #{fragment}")]
				}
				None => vec!["no earlier history entry".into()],
			},
			Command::Forward => match self.location.forward().map(str::to_owned) {
				Some(fragment) => {
					self.router.on_fragment_changed(&fragment);
					vec![format!("at #{fragment}")]
				}
				None => vec!["no later history entry".into()],
			},
			Command::Show => self.show(),
			Command::Help => HELP.lines().map(str::to_owned).collect(),
		}
	}

	fn set(&self, slot: &str, fields: &str) -> Vec<String> {
		let Some(schema) = self.router.schema(slot) else {
			return vec![format!("unknown slot `{slot}`")];
		};
		let record = fragment::parse(fields);
		let state = match self.router.last_known(slot) {
			Some(current) => StateBuilder::from_state(&schema, &current).extend(&record).build(),
			None => StateBuilder::new(&schema, Strictness::Lenient).extend(&record).build(),
		};
		match state {
			Ok(state) if self.bus.publish(schema.topic, &state, self.ui) => {
				debug!(slot, "cli.set published");
				Vec::new()
			}
			Ok(_) => vec![format!("vetoed {slot}")],
			Err(error) => vec![format!("error: {error}")],
		}
	}

	fn show(&self) -> Vec<String> {
		let mut lines: Vec<String> = self
			.router
			.slot_names()
			.into_iter()
			.map(|slot| match self.router.last_known(slot) {
				Some(state) => format!("{slot}: {}", fragment::encode(state.to_pairs())),
				None => format!("{slot}: (unset)"),
			})
			.collect();
		lines.push(format!("location: #{}", self.location.fragment()));
		lines
	}

	fn with_topic(&self, slot: &str, f: impl FnOnce(&EventBus<State>, &str) -> String) -> Vec<String> {
		match self.router.schema(slot) {
			Some(schema) => vec![f(&self.bus, schema.topic)],
			None => vec![format!("unknown slot `{slot}`")],
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	fn command(line: &str) -> Command {
		line.parse().unwrap()
	}

	async fn settle(session: &mut Session) -> Option<FragmentWrite> {
		let deadline = session.next_deadline()?;
		tokio::time::sleep_until(deadline).await;
		session.flush_due(Instant::now())
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn test_first_load_is_normalized_in_place() {
		let mut session = Session::open(&RouterConfig::default(), "#page=-4&junk");
		let write = settle(&mut session).await.unwrap();
		assert_eq!(write.fragment, "query=&page=1&context=browse&subcontext=");
		assert_eq!(write.mode.as_str(), "replace");
		assert_eq!(settle(&mut session).await, None);
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn test_set_pushes_merged_fragment() {
		let mut session = Session::open(&RouterConfig::default(), "");
		settle(&mut session).await;

		assert!(session.execute(command("set search query=cats")).is_empty());
		assert!(session.execute(command("set browse-context context=module&subcontext=9")).is_empty());
		let write = settle(&mut session).await.unwrap();
		assert_eq!(write.fragment, "query=cats&page=1&context=module&subcontext=9");
		assert_eq!(write.mode.as_str(), "push");
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn test_set_keeps_unmentioned_fields() {
		let mut session = Session::open(&RouterConfig::default(), "query=cats");
		session.execute(command("set search page=3"));
		let search = session.router.last_known("search").unwrap();
		assert_eq!(search.str("query"), Some("cats"));
		assert_eq!(search.int("page"), Some(3));
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn test_set_reports_errors_and_vetoes() {
		let mut session = Session::open(&RouterConfig::default(), "");
		assert_eq!(
			session.execute(command("set search page=0")),
			["error: search: field `page` must be an integer >= 1, got 0"]
		);
		assert_eq!(session.execute(command("veto search")), ["vetoing search"]);
		assert_eq!(session.execute(command("set search query=x")), ["vetoed search"]);
		assert_eq!(session.execute(command("unveto search")), ["unvetoed search"]);
		assert_eq!(session.execute(command("unveto search")), ["search was not vetoed"]);
		assert_eq!(session.execute(command("set nowhere a=1")), ["unknown slot `nowhere`"]);
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn test_back_replays_history() {
		let mut session = Session::open(&RouterConfig::default(), "");
		settle(&mut session).await;
		session.execute(command("set search query=cats"));
		settle(&mut session).await;

		let lines = session.execute(command("back"));
		assert_eq!(lines, ["at #query=&page=1&context=browse&subcontext="]);
		assert_eq!(session.router.last_known("search").unwrap().str("query"), Some(""));
		assert_eq!(session.execute(command("back")), ["no earlier history entry"]);
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn test_show_lists_slots_and_location() {
		let mut session = Session::open(&RouterConfig::default(), "query=a+b");
		settle(&mut session).await;
		assert_eq!(
			session.execute(Command::Show),
			[
				"search: query=a+b&page=1",
				"browse-context: context=browse&subcontext=",
				"location: #query=a+b&page=1&context=browse&subcontext=",
			]
		);
	}
}
