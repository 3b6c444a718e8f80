mod common;

use serde_json::Value;

use common::MockBackend;
use scout_client::{Error, RequestOptions, backend::SearchRequest};
use scout_domain::SearchFilters;

#[tokio::test]
async fn retries_until_third_attempt_succeeds() {
	let mock = MockBackend::default();

	mock.script("/api/ping", 500, "boom").script("/api/ping", 503, "busy").script(
		"/api/ping",
		200,
		r#"{"ok":true}"#,
	);

	let (base_url, shutdown) = mock.start().await;
	let value: Value = common::client(&base_url)
		.request("/api/ping", &RequestOptions::get())
		.await
		.expect("request failed");

	assert_eq!(value["ok"], true);
	assert_eq!(mock.calls("/api/ping").len(), 3);

	let _ = shutdown.send(());
}

#[tokio::test]
async fn exhausted_retries_keep_last_status() {
	let mock = MockBackend::default();

	for body in ["first", "second", "third"] {
		mock.script("/api/ping", 500, body);
	}

	let (base_url, shutdown) = mock.start().await;
	let err = common::client(&base_url)
		.request::<Value>("/api/ping", &RequestOptions::get())
		.await
		.expect_err("Expected failure.");
	let Error::HttpStatus { status, code, message } = err else {
		panic!("Expected HttpStatus, got {err:?}.");
	};

	assert_eq!(status, 500);
	assert_eq!(code, "500");
	assert_eq!(message, "third");
	assert_eq!(mock.calls("/api/ping").len(), 3);

	let _ = shutdown.send(());
}

#[tokio::test]
async fn client_errors_are_attempted_once() {
	let mock = MockBackend::default();

	mock.script("/api/ping", 404, "missing").script("/api/ping", 200, "{}");

	let (base_url, shutdown) = mock.start().await;
	let err = common::client(&base_url)
		.request::<Value>("/api/ping", &RequestOptions::get())
		.await
		.expect_err("Expected failure.");

	assert_eq!(err.status(), Some(404));
	assert_eq!(mock.calls("/api/ping").len(), 1);

	let _ = shutdown.send(());
}

#[tokio::test]
async fn rate_limits_are_retried() {
	let mock = MockBackend::default();

	mock.script("/api/ping", 429, "slow down").script("/api/ping", 200, "[1,2]");

	let (base_url, shutdown) = mock.start().await;
	let value: Vec<u32> = common::client(&base_url)
		.request("/api/ping", &RequestOptions::get())
		.await
		.expect("request failed");

	assert_eq!(value, vec![1, 2]);
	assert_eq!(mock.calls("/api/ping").len(), 2);

	let _ = shutdown.send(());
}

#[tokio::test]
async fn malformed_json_is_a_decode_error_without_retry() {
	let mock = MockBackend::default();

	mock.script("/api/ping", 200, "<html>").script("/api/ping", 200, "{}");

	let (base_url, shutdown) = mock.start().await;
	let err = common::client(&base_url)
		.request::<Value>("/api/ping", &RequestOptions::get())
		.await
		.expect_err("Expected failure.");

	assert!(matches!(err, Error::Decode { .. }));
	assert_eq!(mock.calls("/api/ping").len(), 1);

	let _ = shutdown.send(());
}

#[tokio::test]
async fn search_posts_query_and_reads_results() {
	let mock = MockBackend::default();

	mock.script(
		"/api/search",
		200,
		r#"{"results":[{"id":"7","symbol":"ARB","name":"Arbitrum"}]}"#,
	);

	let (base_url, shutdown) = mock.start().await;
	let filters =
		SearchFilters { chains: Some(vec!["ethereum".to_string()]), ..Default::default() };
	let results = common::client(&base_url)
		.search(&SearchRequest {
			query: "Layer2 low-cap",
			original_query: "cheap rollups",
			top_k: 20,
			filters: &filters,
		})
		.await
		.expect("search failed");

	assert_eq!(results.len(), 1);
	assert_eq!(results[0].symbol, "ARB");

	let calls = mock.calls("/api/search");
	let body: Value = serde_json::from_str(&calls[0].body).expect("body is not json");

	assert_eq!(body["query"], "Layer2 low-cap");
	assert_eq!(body["original_query"], "cheap rollups");
	assert_eq!(body["top_k"], 20);
	assert_eq!(body["filters"]["chains"][0], "ethereum");

	let _ = shutdown.send(());
}

#[tokio::test]
async fn token_details_reads_one_candidate() {
	let mock = MockBackend::default();

	mock.script("/api/tokens/42", 200, r#"{"id":"42","symbol":"LINK","name":"Chainlink"}"#);

	let (base_url, shutdown) = mock.start().await;
	let token = common::client(&base_url).token_details("42").await.expect("details failed");

	assert_eq!(token.name, "Chainlink");

	let _ = shutdown.send(());
}
