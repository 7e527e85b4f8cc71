use crate::{FieldKind, FieldValue, StateFields};

/// Slot-level normalization hook, run after coercion and before rule checks.
///
/// May rewrite values in place (clamping, trimming, deriving one field from
/// another). Returning `Err` fails the build with the given reason.
pub type NormalizeFn = fn(&mut StateFields) -> Result<(), String>;

/// Business rule attached to a field.
#[derive(Debug, Clone, Copy)]
pub enum FieldRule {
	/// No constraint beyond the field kind.
	Any,
	/// Integer at least this large.
	MinInt(i64),
	/// String drawn from a fixed set.
	OneOf(&'static [&'static str]),
	/// Arbitrary check returning a human-readable reason on failure.
	Custom(fn(&FieldValue) -> Result<(), String>),
}

impl FieldRule {
	pub fn check(&self, value: &FieldValue) -> Result<(), String> {
		match (self, value) {
			(Self::Any, _) => Ok(()),
			(Self::MinInt(min), FieldValue::Int(n)) if n >= min => Ok(()),
			(Self::MinInt(min), _) => Err(format!("must be an integer >= {min}, got {value}")),
			(Self::OneOf(allowed), FieldValue::Str(s)) if allowed.contains(&s.as_str()) => Ok(()),
			(Self::OneOf(allowed), _) => Err(format!("must be one of {allowed:?}, got {:?}", value.to_string())),
			(Self::Custom(check), _) => check(value),
		}
	}
}

/// Typed descriptor of one slot field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
	pub name: &'static str,
	pub kind: FieldKind,
	/// Value used when input omits the field; `None` makes it required.
	pub default: Option<FieldValue>,
	pub rule: FieldRule,
}

impl FieldSpec {
	/// A required string field with no rule.
	pub const fn str(name: &'static str) -> Self {
		Self {
			name,
			kind: FieldKind::Str,
			default: None,
			rule: FieldRule::Any,
		}
	}

	/// A required integer field with no rule.
	pub const fn int(name: &'static str) -> Self {
		Self {
			name,
			kind: FieldKind::Int,
			default: None,
			rule: FieldRule::Any,
		}
	}

	pub fn default_value(mut self, value: impl Into<FieldValue>) -> Self {
		self.default = Some(value.into());
		self
	}

	pub const fn rule(mut self, rule: FieldRule) -> Self {
		self.rule = rule;
		self
	}
}

/// Ordered field schema of one slot.
#[derive(Debug, Clone)]
pub struct SlotSchema {
	/// Slot name, unique per page.
	pub name: &'static str,
	/// Event-bus topic carrying this slot's state changes.
	pub topic: &'static str,
	pub fields: Vec<FieldSpec>,
	pub normalize: Option<NormalizeFn>,
}

impl SlotSchema {
	pub const fn new(name: &'static str, topic: &'static str) -> Self {
		Self {
			name,
			topic,
			fields: Vec::new(),
			normalize: None,
		}
	}

	pub fn field(mut self, spec: FieldSpec) -> Self {
		debug_assert!(
			self.field_spec(spec.name).is_none(),
			"duplicate field `{}` in slot `{}`",
			spec.name,
			self.name
		);
		self.fields.push(spec);
		self
	}

	pub fn normalize(mut self, hook: NormalizeFn) -> Self {
		self.normalize = Some(hook);
		self
	}

	pub fn field_spec(&self, name: &str) -> Option<&FieldSpec> {
		self.fields.iter().find(|f| f.name == name)
	}

	/// Declared field names in schema order.
	pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.fields.iter().map(|f| f.name)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_min_int_rule() {
		let rule = FieldRule::MinInt(1);
		assert!(rule.check(&FieldValue::Int(1)).is_ok());
		assert!(rule.check(&FieldValue::Int(0)).is_err());
		assert!(rule.check(&FieldValue::from("1")).is_err());
	}

	#[test]
	fn test_one_of_rule_reports_allowed_values() {
		let rule = FieldRule::OneOf(&["a", "b"]);
		assert!(rule.check(&"a".into()).is_ok());
		let reason = rule.check(&"c".into()).unwrap_err();
		assert!(reason.contains("\"a\""), "{reason}");
	}
}
