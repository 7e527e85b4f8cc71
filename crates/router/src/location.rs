//! Address-bar abstraction and history write modes.

/// How a fragment write interacts with navigation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteMode {
	/// Adds a history entry.
	Push,
	/// Overwrites the current history entry.
	Replace,
}

impl WriteMode {
	/// Combines the modes requested within one debounce window.
	///
	/// A single `Replace` anywhere in the batch makes the whole batch replace.
	pub const fn merge(self, other: Self) -> Self {
		match (self, other) {
			(Self::Push, Self::Push) => Self::Push,
			_ => Self::Replace,
		}
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Push => "push",
			Self::Replace => "replace",
		}
	}
}

impl std::fmt::Display for WriteMode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A fragment write performed by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentWrite {
	pub fragment: String,
	pub mode: WriteMode,
}

/// The externally visible fragment store (a browser address bar, a test
/// double, ...).
///
/// Fragments are exchanged without the leading `#`.
pub trait Location {
	fn fragment(&self) -> &str;

	fn write(&mut self, fragment: &str, mode: WriteMode);
}

/// In-memory [`Location`] with a linear history stack.
#[derive(Debug, Clone)]
pub struct MemoryLocation {
	entries: Vec<String>,
	index: usize,
	writes: Vec<FragmentWrite>,
}

impl Default for MemoryLocation {
	fn default() -> Self {
		Self::new("")
	}
}

impl MemoryLocation {
	/// Location opened on `fragment` (leading `#` optional).
	pub fn new(fragment: &str) -> Self {
		Self {
			entries: vec![strip_hash(fragment).to_owned()],
			index: 0,
			writes: Vec::new(),
		}
	}

	/// Steps back one history entry and returns the fragment now shown, or
	/// `None` at the oldest entry.
	///
	/// Like a browser, this does not notify anyone: feed the result to
	/// [`StateRouter::on_fragment_changed`](crate::StateRouter::on_fragment_changed).
	pub fn back(&mut self) -> Option<&str> {
		self.index = self.index.checked_sub(1)?;
		Some(&self.entries[self.index])
	}

	/// Steps forward one history entry, if any.
	pub fn forward(&mut self) -> Option<&str> {
		if self.index + 1 >= self.entries.len() {
			return None;
		}
		self.index += 1;
		Some(&self.entries[self.index])
	}

	/// Simulates the user editing the address bar: pushes `fragment`
	/// without recording it as a router write.
	pub fn navigate(&mut self, fragment: &str) -> &str {
		self.push_entry(strip_hash(fragment).to_owned());
		&self.entries[self.index]
	}

	pub fn history_len(&self) -> usize {
		self.entries.len()
	}

	pub fn history(&self) -> &[String] {
		&self.entries
	}

	/// Every write received through [`Location::write`], oldest first.
	pub fn writes(&self) -> &[FragmentWrite] {
		&self.writes
	}

	fn push_entry(&mut self, fragment: String) {
		self.entries.truncate(self.index + 1);
		self.entries.push(fragment);
		self.index = self.entries.len() - 1;
	}
}

impl Location for MemoryLocation {
	fn fragment(&self) -> &str {
		&self.entries[self.index]
	}

	fn write(&mut self, fragment: &str, mode: WriteMode) {
		match mode {
			WriteMode::Push => self.push_entry(fragment.to_owned()),
			WriteMode::Replace => self.entries[self.index] = fragment.to_owned(),
		}
		self.writes.push(FragmentWrite {
			fragment: fragment.to_owned(),
			mode,
		});
	}
}

fn strip_hash(fragment: &str) -> &str {
	fragment.strip_prefix('#').unwrap_or(fragment)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_merge_replace_wins() {
		use WriteMode::*;
		assert_eq!(Push.merge(Push), Push);
		assert_eq!(Push.merge(Replace), Replace);
		assert_eq!(Replace.merge(Push), Replace);
	}

	#[test]
	fn test_push_and_replace_history() {
		let mut location = MemoryLocation::new("#a=1");
		location.write("a=2", WriteMode::Push);
		location.write("a=3", WriteMode::Replace);
		assert_eq!(location.history(), ["a=1", "a=3"]);
		assert_eq!(location.fragment(), "a=3");

		assert_eq!(location.back(), Some("a=1"));
		assert_eq!(location.back(), None);
		assert_eq!(location.forward(), Some("a=3"));
		assert_eq!(location.forward(), None);
	}

	#[test]
	fn test_push_after_back_drops_forward_entries() {
		let mut location = MemoryLocation::new("a=1");
		location.write("a=2", WriteMode::Push);
		location.back();
		location.write("a=9", WriteMode::Push);
		assert_eq!(location.history(), ["a=1", "a=9"]);
		assert_eq!(location.writes().len(), 2);
	}

	#[test]
	fn test_navigate_is_not_a_write() {
		let mut location = MemoryLocation::default();
		assert_eq!(location.navigate("#page=2"), "page=2");
		assert_eq!(location.history_len(), 2);
		assert!(location.writes().is_empty());
	}
}
