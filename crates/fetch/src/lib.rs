//! REST access for Folio views.
//!
//! [`RestClient`] wraps a [`Transport`] and hands back every request as a
//! cancellable [`Operation`](folio_worker::Operation). Identical outstanding
//! `GET`s are coalesced into one shared operation, which is why callers
//! replacing a request must cancel the old one *before* issuing the new one
//! (see [`folio_worker::SingleInFlight`]).

mod client;
mod error;
mod request;

pub use client::{PendingResponse, RestClient, Transport};
pub use error::{FetchError, Result};
pub use request::{Method, Request, Response};
