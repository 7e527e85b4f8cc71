//! Built-in slots of the browse pages.
//!
//! Field sets are disjoint so both slots can share one URL fragment.

use std::sync::{Arc, LazyLock};

use crate::{FieldRule, FieldSpec, Result, SlotSchema, State, StateBuilder, Strictness};

pub const SEARCH_TOPIC: &str = "/search/state";
pub const BROWSE_CONTEXT_TOPIC: &str = "/browse/context";

/// Browse contexts a page may be opened in.
pub const BROWSE_CONTEXTS: &[&str] = &["browse", "collection", "module"];

static SEARCH: LazyLock<Arc<SlotSchema>> = LazyLock::new(|| {
	Arc::new(
		SlotSchema::new("search", SEARCH_TOPIC)
			.field(FieldSpec::str("query").default_value(""))
			.field(FieldSpec::int("page").default_value(1).rule(FieldRule::MinInt(1))),
	)
});

static BROWSE_CONTEXT: LazyLock<Arc<SlotSchema>> = LazyLock::new(|| {
	Arc::new(
		SlotSchema::new("browse-context", BROWSE_CONTEXT_TOPIC)
			.field(
				FieldSpec::str("context")
					.default_value("browse")
					.rule(FieldRule::OneOf(BROWSE_CONTEXTS)),
			)
			.field(FieldSpec::str("subcontext").default_value("")),
	)
});

/// Search query and result page: `query` (string, default empty) and
/// `page` (integer >= 1, default 1).
pub fn search() -> Arc<SlotSchema> {
	Arc::clone(&SEARCH)
}

/// Browse context: `context` (one of [`BROWSE_CONTEXTS`]) and a free-form
/// `subcontext` identifier.
pub fn browse_context() -> Arc<SlotSchema> {
	Arc::clone(&BROWSE_CONTEXT)
}

/// Typed view of a `search` slot state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchState(State);

impl SearchState {
	pub fn builder() -> SearchBuilder {
		SearchBuilder(StateBuilder::new(&SEARCH, Strictness::Lenient))
	}

	/// Wraps `state` if it belongs to the `search` slot.
	pub fn from_state(state: State) -> Option<Self> {
		(state.slot() == SEARCH.name).then_some(Self(state))
	}

	pub fn query(&self) -> &str {
		self.0.str("query").unwrap_or_default()
	}

	pub fn page(&self) -> i64 {
		self.0.int("page").unwrap_or(1)
	}

	/// Builder seeded with this state, for deriving a successor.
	pub fn to_builder(&self) -> SearchBuilder {
		SearchBuilder(StateBuilder::from_state(&SEARCH, &self.0))
	}

	pub fn as_state(&self) -> &State {
		&self.0
	}

	pub fn into_state(self) -> State {
		self.0
	}
}

/// Chaining setters for a [`SearchState`].
#[derive(Debug, Clone)]
pub struct SearchBuilder(StateBuilder<'static>);

impl SearchBuilder {
	pub fn query(self, query: impl Into<String>) -> Self {
		Self(self.0.set("query", query.into()))
	}

	pub fn page(self, page: i64) -> Self {
		Self(self.0.set("page", page))
	}

	pub fn build(&self) -> Result<SearchState> {
		self.0.build().map(SearchState)
	}
}

/// Typed view of a `browse-context` slot state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseContextState(State);

impl BrowseContextState {
	pub fn builder() -> BrowseContextBuilder {
		BrowseContextBuilder(StateBuilder::new(&BROWSE_CONTEXT, Strictness::Lenient))
	}

	pub fn from_state(state: State) -> Option<Self> {
		(state.slot() == BROWSE_CONTEXT.name).then_some(Self(state))
	}

	pub fn context(&self) -> &str {
		self.0.str("context").unwrap_or("browse")
	}

	pub fn subcontext(&self) -> &str {
		self.0.str("subcontext").unwrap_or_default()
	}

	pub fn as_state(&self) -> &State {
		&self.0
	}

	pub fn into_state(self) -> State {
		self.0
	}
}

#[derive(Debug, Clone)]
pub struct BrowseContextBuilder(StateBuilder<'static>);

impl BrowseContextBuilder {
	pub fn context(self, context: impl Into<String>) -> Self {
		Self(self.0.set("context", context.into()))
	}

	pub fn subcontext(self, subcontext: impl Into<String>) -> Self {
		Self(self.0.set("subcontext", subcontext.into()))
	}

	pub fn build(&self) -> Result<BrowseContextState> {
		self.0.build().map(BrowseContextState)
	}
}
