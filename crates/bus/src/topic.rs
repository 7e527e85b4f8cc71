use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Name of a class of events on the bus.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Topic(Arc<str>);

impl Topic {
	pub fn new(name: impl AsRef<str>) -> Self {
		Self(Arc::from(name.as_ref()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl Borrow<str> for Topic {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl AsRef<str> for Topic {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl From<&str> for Topic {
	fn from(name: &str) -> Self {
		Self::new(name)
	}
}

impl From<String> for Topic {
	fn from(name: String) -> Self {
		Self(Arc::from(name))
	}
}

impl fmt::Display for Topic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Identity of a publisher, used by subscribers to detect their own echoes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(u64);

impl SourceId {
	/// Publisher that does not care about echoes (views, tests, scripts).
	pub const ANONYMOUS: SourceId = SourceId(0);

	pub(crate) const fn from_raw(raw: u64) -> Self {
		Self(raw)
	}

	pub const fn as_u64(self) -> u64 {
		self.0
	}
}

impl fmt::Display for SourceId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "source#{}", self.0)
	}
}
