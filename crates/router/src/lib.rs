//! URL fragment routing for Folio pages.
//!
//! [`StateRouter`] owns the page's state slots and keeps them in step with
//! one serialized fragment:
//!
//! ```text
//!  location ──on_fragment_changed──► parse ──► build per slot ──► bus.publish
//!     ▲                                                               │
//!     └── flush_due ◄── debounce ◄── slot change (other source) ◄─────┘
//! ```
//!
//! Malformed fragments never surface as errors: affected slots keep their
//! last good state and the fragment is rewritten to its canonical form.

mod config;
pub mod fragment;
mod location;
mod router;

pub use config::{ConfigError, RouterConfig};
pub use location::{FragmentWrite, Location, MemoryLocation, WriteMode};
pub use router::{EchoState, RouterPhase, StateRouter};
