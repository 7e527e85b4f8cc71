use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
	Get,
	Post,
	Put,
	Delete,
}

impl Method {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Get => "GET",
			Self::Post => "POST",
			Self::Put => "PUT",
			Self::Delete => "DELETE",
		}
	}
}

/// One REST call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
	pub method: Method,
	pub path: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub body: Option<Value>,
}

impl Request {
	pub fn get(path: impl Into<String>) -> Self {
		Self {
			method: Method::Get,
			path: path.into(),
			body: None,
		}
	}

	pub fn post(path: impl Into<String>, body: Value) -> Self {
		Self {
			method: Method::Post,
			path: path.into(),
			body: Some(body),
		}
	}

	pub fn put(path: impl Into<String>, body: Value) -> Self {
		Self {
			method: Method::Put,
			path: path.into(),
			body: Some(body),
		}
	}

	pub fn delete(path: impl Into<String>) -> Self {
		Self {
			method: Method::Delete,
			path: path.into(),
			body: None,
		}
	}
}

/// Decoded server answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
	pub status: u16,
	#[serde(default)]
	pub body: Value,
}

impl Response {
	pub fn ok(body: Value) -> Self {
		Self { status: 200, body }
	}

	pub const fn is_success(&self) -> bool {
		self.status >= 200 && self.status < 300
	}

	/// Deserializes the body into `T`.
	pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
		Ok(T::deserialize(&self.body)?)
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn test_json_decoding() {
		#[derive(Deserialize)]
		struct Page {
			total: u32,
		}

		let response = Response::ok(json!({ "total": 3 }));
		assert_eq!(response.json::<Page>().unwrap().total, 3);
		assert!(response.json::<Vec<u32>>().is_err());
	}

	#[test]
	fn test_request_wire_shape() {
		let value = serde_json::to_value(Request::delete("/modules/4")).unwrap();
		assert_eq!(value, json!({ "method": "DELETE", "path": "/modules/4" }));
	}
}
