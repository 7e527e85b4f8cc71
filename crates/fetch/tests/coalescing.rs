use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use folio_fetch::{FetchError, Request, Response, RestClient, Transport};
use folio_worker::{CancellationSignal, SingleInFlight};
use serde_json::json;

/// Answers every request after a fixed latency, echoing the path.
#[derive(Default)]
struct SlowEcho {
	calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Transport for SlowEcho {
	async fn execute(&self, request: Request) -> folio_fetch::Result<Response> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		tokio::time::sleep(Duration::from_millis(100)).await;
		if request.path.starts_with("/missing") {
			return Ok(Response {
				status: 404,
				body: json!(null),
			});
		}
		Ok(Response::ok(json!({ "path": request.path })))
	}
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_identical_gets_share_one_request() {
	let client = RestClient::new(SlowEcho::default());
	let a = client.get("/collections");
	let b = client.get("/collections");

	assert!(a.same_task(&b));
	assert_eq!(client.in_flight_gets(), 1);
	let body = b.wait().await.unwrap().unwrap().body;
	assert_eq!(body, json!({ "path": "/collections" }));
	assert_eq!(client.transport().calls.load(Ordering::SeqCst), 1);
	assert_eq!(client.in_flight_gets(), 0);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_writes_are_never_coalesced() {
	let client = RestClient::new(SlowEcho::default());
	let a = client.post("/modules", json!({ "name": "a" }));
	let b = client.post("/modules", json!({ "name": "a" }));
	assert!(!a.same_task(&b));
	a.wait().await.unwrap().unwrap();
	b.wait().await.unwrap().unwrap();
	assert_eq!(client.transport().calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_error_status_becomes_fetch_error() {
	let client = RestClient::new(SlowEcho::default());
	let outcome = client.delete("/missing/7").wait().await.unwrap();
	assert_eq!(
		outcome,
		Err(FetchError::Status {
			method: "DELETE",
			path: "/missing/7".into(),
			status: 404,
		})
	);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_create_then_cancel_kills_the_new_request() {
	let client = RestClient::new(SlowEcho::default());
	let old = client.get("/search?q=cats");
	// Wrong order: the replacement joins the outstanding request...
	let new = client.get("/search?q=cats");
	// ...so cancelling the old one takes the new one down with it.
	old.cancel();
	assert_eq!(new.wait().await, Err(CancellationSignal::Cancelled));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_guard_cancels_before_reissuing() {
	let client = RestClient::new(SlowEcho::default());
	let mut guard = SingleInFlight::new("search");

	let first = guard.run(|| client.get("/search?q=cats")).clone();
	let second = guard.run(|| client.get("/search?q=cats")).clone();

	assert!(first.is_cancelled());
	assert!(!second.same_task(&first));
	assert_eq!(first.wait().await, Err(CancellationSignal::Cancelled));
	assert!(second.wait().await.unwrap().is_ok());
	assert_eq!(client.transport().calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_combined_fetch() {
	let client = RestClient::new(SlowEcho::default());
	let combined = client.combined(["/collections", "/missing/x", "/modules"]);
	let results = combined.wait().await.unwrap();

	assert_eq!(results.len(), 3);
	assert!(results[0].is_ok());
	assert!(matches!(results[1], Err(FetchError::Status { status: 404, .. })));
	assert_eq!(results[2].as_ref().unwrap().body, json!({ "path": "/modules" }));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn test_cancelling_combined_cancels_parts() {
	let client = RestClient::new(SlowEcho::default());
	let combined = client.combined(["/collections", "/modules"]);
	let part = client.get("/collections");
	combined.cancel();

	assert!(part.is_cancelled());
	assert_eq!(combined.wait().await, Err(CancellationSignal::Cancelled));
	assert_eq!(client.in_flight_gets(), 0);
}
