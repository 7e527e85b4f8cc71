//! URL fragment codec.
//!
//! A fragment is a flat `key=value&key=value` record using form encoding.
//! Parsing is best effort: malformed segments are dropped one by one, the
//! fragment as a whole never fails.

use indexmap::IndexMap;
use url::form_urlencoded;

/// Flat, insertion-ordered key/value record carried by a fragment.
pub type FragmentRecord = IndexMap<String, String>;

/// Parses `raw` (with or without its leading `#`).
///
/// Empty segments, segments without `=` and empty keys are ignored. A key
/// seen twice keeps its last value.
pub fn parse(raw: &str) -> FragmentRecord {
	let raw = raw.strip_prefix('#').unwrap_or(raw);
	let mut record = FragmentRecord::new();
	for segment in raw.split('&') {
		if !segment.contains('=') {
			continue;
		}
		// Segment-wise so one bad pair cannot swallow its neighbours.
		if let Some((key, value)) = form_urlencoded::parse(segment.as_bytes()).next()
			&& !key.is_empty()
		{
			record.insert(key.into_owned(), value.into_owned());
		}
	}
	record
}

/// Serializes `pairs` in iteration order, without a leading `#`.
pub fn encode<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> String
where
	K: AsRef<str>,
	V: AsRef<str>,
{
	let mut serializer = form_urlencoded::Serializer::new(String::new());
	for (key, value) in pairs {
		serializer.append_pair(key.as_ref(), value.as_ref());
	}
	serializer.finish()
}
