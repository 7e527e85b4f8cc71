//! Router configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Errors loading a [`RouterConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// Error parsing TOML syntax or an unexpected key.
	#[error("TOML parse error: {0}")]
	Parse(#[from] toml::de::Error),
}

/// Tunables of a [`StateRouter`](crate::StateRouter).
///
/// ```toml
/// debounce_ms = 50
/// strict_fragments = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterConfig {
	/// Quiet period before the fragment is rewritten. Zero flushes on the
	/// next loop turn.
	pub debounce_ms: u64,
	/// Reject fragment keys that no registered slot declares.
	pub strict_fragments: bool,
}

impl Default for RouterConfig {
	fn default() -> Self {
		Self {
			debounce_ms: 0,
			strict_fragments: true,
		}
	}
}

impl RouterConfig {
	pub const fn debounce(&self) -> Duration {
		Duration::from_millis(self.debounce_ms)
	}

	pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(source)?)
	}

	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let source = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&source)
	}
}
