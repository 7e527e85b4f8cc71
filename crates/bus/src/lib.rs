//! Topic-based publish/subscribe for page components.
//!
//! [`EventBus`] delivers payloads synchronously, in registration order, to
//! every subscriber of a topic. Before delivery, every publish validator
//! registered for the topic is consulted; a single `false` vetoes the
//! publish and nothing is delivered.
//!
//! The bus is single-threaded and re-entrant: handlers may publish,
//! subscribe or unsubscribe while a delivery is in progress. Each publish
//! works on a snapshot of the subscriber list taken when it starts.
//!
//! Publishers pass a [`SourceId`] so subscribers that also publish can
//! recognise and skip echoes of their own events. The bus never filters on
//! it by itself.

mod bus;
mod topic;

pub use bus::{EventBus, Subscription};
pub use topic::{SourceId, Topic};
