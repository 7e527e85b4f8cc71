//! Raw input to [`State`] construction.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;

use crate::{FieldValue, Result, SlotSchema, State, StateFields, ValidationError};

/// How a build treats keys the slot does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
	/// Undeclared keys are ignored.
	#[default]
	Lenient,
	/// Undeclared keys fail the build unless declared foreign via
	/// [`StateBuilder::allow_foreign`].
	Strict,
}

/// Accumulates raw field input for one slot and validates it into a [`State`].
///
/// `set`/`get` are the accessor pair used before [`build`](Self::build);
/// `extend` copies a whole raw record (typically a parsed URL fragment).
#[derive(Debug, Clone)]
pub struct StateBuilder<'a> {
	schema: &'a SlotSchema,
	strictness: Strictness,
	raw: IndexMap<String, FieldValue>,
	foreign: FxHashSet<&'a str>,
}

impl<'a> StateBuilder<'a> {
	pub fn new(schema: &'a SlotSchema, strictness: Strictness) -> Self {
		Self {
			schema,
			strictness,
			raw: IndexMap::new(),
			foreign: FxHashSet::default(),
		}
	}

	/// Lenient builder seeded with the fields of an existing state.
	pub fn from_state(schema: &'a SlotSchema, state: &State) -> Self {
		let mut builder = Self::new(schema, Strictness::Lenient);
		builder.raw.extend(state.fields().iter().map(|(k, v)| (k.clone(), v.clone())));
		builder
	}

	pub const fn schema(&self) -> &'a SlotSchema {
		self.schema
	}

	/// Raw (not yet coerced) value of `field`.
	pub fn get(&self, field: &str) -> Option<&FieldValue> {
		self.raw.get(field)
	}

	pub fn set(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
		self.raw.insert(field.into(), value.into());
		self
	}

	pub fn extend<K, V>(mut self, record: impl IntoIterator<Item = (K, V)>) -> Self
	where
		K: Into<String>,
		V: Into<FieldValue>,
	{
		self.raw.extend(record.into_iter().map(|(k, v)| (k.into(), v.into())));
		self
	}

	/// Declares keys owned by sibling slots sharing the same raw record.
	///
	/// Only meaningful for [`Strictness::Strict`]: these keys are skipped
	/// rather than rejected.
	pub fn allow_foreign(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
		self.foreign.extend(names);
		self
	}

	/// Validates the accumulated input.
	///
	/// Applies defaults, copies recognised fields, coerces kinds, runs the
	/// schema's normalize hook and finally checks every field rule. Nothing
	/// partial is ever returned.
	pub fn build(&self) -> Result<State> {
		let slot = self.schema.name;

		if self.strictness == Strictness::Strict
			&& let Some(key) = self
				.raw
				.keys()
				.find(|k| self.schema.field_spec(k).is_none() && !self.foreign.contains(k.as_str()))
		{
			return Err(ValidationError::UnknownField {
				slot,
				field: key.clone(),
			});
		}

		let mut fields = StateFields::with_capacity(self.schema.fields.len());
		for spec in &self.schema.fields {
			let value = match self.raw.get(spec.name) {
				Some(raw) => spec.kind.coerce(raw).ok_or_else(|| ValidationError::InvalidType {
					slot,
					field: spec.name,
					expected: spec.kind,
					value: raw.to_string(),
				})?,
				None => spec
					.default
					.clone()
					.ok_or(ValidationError::MissingField { slot, field: spec.name })?,
			};
			fields.insert(spec.name.to_owned(), value);
		}

		if let Some(normalize) = self.schema.normalize {
			normalize(&mut fields).map_err(|reason| ValidationError::Normalize { slot, reason })?;
		}

		for spec in &self.schema.fields {
			let value = fields
				.get(spec.name)
				.ok_or(ValidationError::MissingField { slot, field: spec.name })?;
			if value.kind() != spec.kind {
				return Err(ValidationError::InvalidType {
					slot,
					field: spec.name,
					expected: spec.kind,
					value: value.to_string(),
				});
			}
			spec.rule.check(value).map_err(|reason| ValidationError::RuleViolation {
				slot,
				field: spec.name,
				reason,
			})?;
		}
		// normalize may only rewrite declared fields
		fields.retain(|k, _| self.schema.field_spec(k).is_some());

		Ok(State::new(slot, fields))
	}

	/// Builds the slot's default state (no input at all).
	pub fn build_default(schema: &'a SlotSchema) -> Result<State> {
		Self::new(schema, Strictness::Lenient).build()
	}
}
