use thiserror::Error;

/// Failure of a REST round-trip.
///
/// `Clone` so one outcome can be shared by every holder of a coalesced request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
	/// The server answered with an error status.
	#[error("{method} {path} failed with status {status}")]
	Status {
		method: &'static str,
		path: String,
		status: u16,
	},

	/// The request never produced a response.
	#[error("transport error: {0}")]
	Transport(String),

	/// The response body did not have the expected shape.
	#[error("cannot decode response body: {0}")]
	Decode(String),
}

impl From<serde_json::Error> for FetchError {
	fn from(error: serde_json::Error) -> Self {
		Self::Decode(error.to_string())
	}
}

/// Result type for REST calls.
pub type Result<T> = std::result::Result<T, FetchError>;
