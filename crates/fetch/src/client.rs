use std::sync::Arc;

use async_trait::async_trait;
use folio_worker::{Operation, TaskClass};
use parking_lot::Mutex;
use rustc_hash::FxHashMap as HashMap;
use serde_json::Value;
use tracing::{debug, trace};

use crate::{FetchError, Request, Response, Result};

/// Outstanding REST call.
pub type PendingResponse = Operation<Result<Response>>;

/// Wire-level executor behind [`RestClient`] (HTTP stack, test fake, ...).
#[async_trait]
pub trait Transport: Send + Sync + 'static {
	async fn execute(&self, request: Request) -> Result<Response>;
}

/// REST client issuing cancellable requests.
pub struct RestClient<T> {
	transport: Arc<T>,
	/// Outstanding `GET`s by path, shared between identical callers.
	in_flight_gets: Mutex<HashMap<String, PendingResponse>>,
}

impl<T: Transport> RestClient<T> {
	pub fn new(transport: T) -> Self {
		Self {
			transport: Arc::new(transport),
			in_flight_gets: Mutex::new(HashMap::default()),
		}
	}

	pub fn transport(&self) -> &T {
		&self.transport
	}

	/// Issues a `GET`, joining an identical outstanding one if present.
	///
	/// Joined callers share one operation: cancelling it cancels it for all.
	pub fn get(&self, path: &str) -> PendingResponse {
		let mut table = self.in_flight_gets.lock();
		table.retain(|_, op| op.is_pending());

		if let Some(existing) = table.get(path) {
			debug!(path, "fetch.get coalesced");
			return existing.clone();
		}

		let op = self.dispatch(Request::get(path));
		table.insert(path.to_owned(), op.clone());
		op
	}

	pub fn post(&self, path: &str, body: Value) -> PendingResponse {
		self.dispatch(Request::post(path, body))
	}

	pub fn put(&self, path: &str, body: Value) -> PendingResponse {
		self.dispatch(Request::put(path, body))
	}

	pub fn delete(&self, path: &str) -> PendingResponse {
		self.dispatch(Request::delete(path))
	}

	/// Fetches several paths as one operation; cancelling it cancels every part.
	pub fn combined<'a>(&self, paths: impl IntoIterator<Item = &'a str>) -> Operation<Vec<Result<Response>>> {
		let parts = paths.into_iter().map(|path| self.get(path)).collect();
		Operation::join_all(TaskClass::Background, parts)
	}

	/// Number of distinct outstanding `GET`s.
	pub fn in_flight_gets(&self) -> usize {
		let mut table = self.in_flight_gets.lock();
		table.retain(|_, op| op.is_pending());
		table.len()
	}

	fn dispatch(&self, request: Request) -> PendingResponse {
		let transport = Arc::clone(&self.transport);
		trace!(method = request.method.as_str(), path = %request.path, "fetch.dispatch");
		PendingResponse::spawn(TaskClass::Interactive, move |_| async move {
			let method = request.method;
			let path = request.path.clone();
			let response = transport.execute(request).await?;
			if response.is_success() {
				Ok(response)
			} else {
				Err(FetchError::Status {
					method: method.as_str(),
					path,
					status: response.status,
				})
			}
		})
	}
}

impl<T> std::fmt::Debug for RestClient<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RestClient")
			.field("in_flight_gets", &self.in_flight_gets.lock().len())
			.finish_non_exhaustive()
	}
}
