//! Asynchronous work primitives shared by Folio components.
//!
//! * [`Operation`]: a cloneable handle to a spawned task carrying a
//!   cooperative cancellation token.
//! * [`SingleInFlight`]: at most one outstanding operation per logical slot;
//!   starting a new one cancels the previous one first.
//! * [`ScheduledTask`]: a single cancellable pending deadline, used to
//!   debounce bursts of work into one action.

mod class;
mod guard;
mod operation;
mod schedule;
mod spawn;
mod token;

pub use class::TaskClass;
pub use guard::SingleInFlight;
pub use operation::Operation;
pub use schedule::ScheduledTask;
pub use spawn::spawn;
pub use token::{Cancel, CancellationSignal};
pub use tokio_util::sync::CancellationToken;
