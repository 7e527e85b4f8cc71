/// Execution classes used for task observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Work whose result a view is waiting on (fetches behind a search box).
	Interactive,
	/// Work nobody is blocked on (prefetches, combined fetch bookkeeping).
	Background,
}

impl TaskClass {
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Interactive => "interactive",
			Self::Background => "background",
		}
	}
}
