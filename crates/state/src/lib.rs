//! Page state slots for Folio.
//!
//! A *slot* is one named facet of the page state (the search query and page,
//! the browse context, ...). Each slot is described by a [`SlotSchema`]: an
//! ordered list of typed [`FieldSpec`]s with defaults and rules. Raw input,
//! whether parsed out of the URL fragment or typed into a view, is turned into
//! an immutable [`State`] by a [`StateBuilder`], which fails closed with a
//! [`ValidationError`] instead of ever producing a partial state.
//!
//! # Build pipeline
//!
//! ```text
//! raw record ──► defaults ──► recognised fields ──► kind coercion
//!                                                      │
//!                               rules ◄── normalize ◄──┘
//! ```
//!
//! The built-in schemas used by the browse pages live in [`slots`].

mod builder;
mod error;
mod schema;
pub mod slots;
mod value;

pub use builder::{StateBuilder, Strictness};
pub use error::{Result, ValidationError};
pub use schema::{FieldRule, FieldSpec, NormalizeFn, SlotSchema};
pub use value::{FieldKind, FieldValue, State, StateFields};
