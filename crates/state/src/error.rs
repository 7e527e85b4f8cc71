//! Error types for state construction.

use thiserror::Error;

use crate::FieldKind;

/// Raised by [`StateBuilder::build`](crate::StateBuilder::build) when raw
/// input cannot be turned into a valid [`State`](crate::State).
///
/// Always recoverable: the caller keeps whatever state it had before.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
	/// Strict build saw a key that no known slot declares.
	#[error("{slot}: unknown field `{field}`")]
	UnknownField {
		/// Slot being built.
		slot: &'static str,
		/// The offending key.
		field: String,
	},

	/// A field without a default was not supplied.
	#[error("{slot}: missing required field `{field}`")]
	MissingField { slot: &'static str, field: &'static str },

	/// A value could not be coerced into the field's kind.
	#[error("{slot}: field `{field}` expects {expected}, got {value:?}")]
	InvalidType {
		slot: &'static str,
		field: &'static str,
		expected: FieldKind,
		/// Rendered form of the rejected value.
		value: String,
	},

	/// A coerced value broke the field's rule.
	#[error("{slot}: field `{field}` {reason}")]
	RuleViolation {
		slot: &'static str,
		field: &'static str,
		reason: String,
	},

	/// The slot's normalize hook rejected the record.
	#[error("{slot}: {reason}")]
	Normalize { slot: &'static str, reason: String },
}

impl ValidationError {
	/// Slot whose build failed.
	pub const fn slot(&self) -> &'static str {
		match self {
			Self::UnknownField { slot, .. }
			| Self::MissingField { slot, .. }
			| Self::InvalidType { slot, .. }
			| Self::RuleViolation { slot, .. }
			| Self::Normalize { slot, .. } => slot,
		}
	}
}

/// Result type for state construction.
pub type Result<T> = std::result::Result<T, ValidationError>;
