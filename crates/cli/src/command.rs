//! Line commands understood by the session.

use std::str::FromStr;

use thiserror::Error;

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
	/// The address bar changed to this fragment.
	Hash(String),
	/// A view publishes a new state for `slot`, given as `k=v&k=v`.
	Set { slot: String, fields: String },
	Veto(String),
	Unveto(String),
	Back,
	Forward,
	Show,
	Help,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ParseCommandError(pub String);

impl FromStr for Command {
	type Err = ParseCommandError;

	fn from_str(line: &str) -> Result<Self, Self::Err> {
		let line = line.trim();
		if let Some(fragment) = line.strip_prefix('#') {
			return Ok(Self::Hash(fragment.to_owned()));
		}

		let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
		let rest = rest.trim();
		let slot = || {
			if rest.is_empty() {
				Err(ParseCommandError(format!("`{word}` needs a slot name")))
			} else {
				Ok(rest.to_owned())
			}
		};

		match word {
			"hash" => Ok(Self::Hash(rest.to_owned())),
			"set" => {
				let (slot, fields) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
				if slot.is_empty() {
					return Err(ParseCommandError("`set` needs a slot name".into()));
				}
				Ok(Self::Set {
					slot: slot.to_owned(),
					fields: fields.trim().to_owned(),
				})
			}
			"veto" => slot().map(Self::Veto),
			"unveto" => slot().map(Self::Unveto),
			"back" => Ok(Self::Back),
			"forward" => Ok(Self::Forward),
			"show" => Ok(Self::Show),
			"help" | "?" => Ok(Self::Help),
			other => Err(ParseCommandError(format!("unknown command `{other}` (try `help`)"))),
		}
	}
}

pub const HELP: &str = "\
#<fragment> | hash <fragment>   external fragment change
set <slot> k=v&k=v              publish a state from a view
veto <slot> | unveto <slot>     block or unblock publishes for a slot
back | forward                  navigate history
show                            print every slot's state";
