use std::fmt;

use indexmap::IndexMap;

/// Ordered field storage of a [`State`], in schema order.
pub type StateFields = IndexMap<String, FieldValue>;

/// Scalar type of a slot field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
	/// UTF-8 string, possibly empty.
	Str,
	/// Signed 64-bit integer.
	Int,
}

impl FieldKind {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Str => "string",
			Self::Int => "integer",
		}
	}

	/// Coerces `value` into this kind.
	///
	/// Integers accept base-10 strings (surrounding whitespace trimmed);
	/// strings accept integers through their decimal rendering. Returns `None`
	/// when the value cannot be represented.
	pub fn coerce(self, value: &FieldValue) -> Option<FieldValue> {
		match (self, value) {
			(Self::Str, FieldValue::Str(s)) => Some(FieldValue::Str(s.clone())),
			(Self::Str, FieldValue::Int(n)) => Some(FieldValue::Str(n.to_string())),
			(Self::Int, FieldValue::Int(n)) => Some(FieldValue::Int(*n)),
			(Self::Int, FieldValue::Str(s)) => s.trim().parse::<i64>().ok().map(FieldValue::Int),
		}
	}
}

impl fmt::Display for FieldKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A single scalar field value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
	Str(String),
	Int(i64),
}

impl FieldValue {
	pub const fn kind(&self) -> FieldKind {
		match self {
			Self::Str(_) => FieldKind::Str,
			Self::Int(_) => FieldKind::Int,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Str(s) => Some(s),
			Self::Int(_) => None,
		}
	}

	pub const fn as_int(&self) -> Option<i64> {
		match self {
			Self::Int(n) => Some(*n),
			Self::Str(_) => None,
		}
	}
}

/// Renders the value the way it appears in a URL fragment (before encoding).
impl fmt::Display for FieldValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Str(s) => f.write_str(s),
			Self::Int(n) => write!(f, "{n}"),
		}
	}
}

impl From<&str> for FieldValue {
	fn from(value: &str) -> Self {
		Self::Str(value.to_owned())
	}
}

impl From<String> for FieldValue {
	fn from(value: String) -> Self {
		Self::Str(value)
	}
}

impl From<&String> for FieldValue {
	fn from(value: &String) -> Self {
		Self::Str(value.clone())
	}
}

impl From<i64> for FieldValue {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}

impl From<i32> for FieldValue {
	fn from(value: i32) -> Self {
		Self::Int(i64::from(value))
	}
}

impl From<u32> for FieldValue {
	fn from(value: u32) -> Self {
		Self::Int(i64::from(value))
	}
}

/// Validated value of one slot.
///
/// Only a [`StateBuilder`](crate::StateBuilder) creates states, so every
/// field declared by the slot's schema is present and satisfies its rule.
/// States are replaced wholesale on change; there are no setters.
/// Equality is structural.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
	slot: &'static str,
	fields: StateFields,
}

impl State {
	pub(crate) fn new(slot: &'static str, fields: StateFields) -> Self {
		Self { slot, fields }
	}

	/// Name of the slot this state belongs to.
	pub const fn slot(&self) -> &'static str {
		self.slot
	}

	pub fn get(&self, field: &str) -> Option<&FieldValue> {
		self.fields.get(field)
	}

	/// String field accessor; `None` for missing or integer fields.
	pub fn str(&self, field: &str) -> Option<&str> {
		self.get(field).and_then(FieldValue::as_str)
	}

	/// Integer field accessor; `None` for missing or string fields.
	pub fn int(&self, field: &str) -> Option<i64> {
		self.get(field).and_then(FieldValue::as_int)
	}

	pub fn fields(&self) -> &StateFields {
		&self.fields
	}

	/// Iterates `(name, rendered value)` pairs in schema order.
	pub fn to_pairs(&self) -> impl Iterator<Item = (&str, String)> + '_ {
		self.fields.iter().map(|(k, v)| (k.as_str(), v.to_string()))
	}
}
