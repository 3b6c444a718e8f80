use std::{
	future::IntoFuture,
	sync::{Arc, Mutex},
};

use axum::{
	Json, Router,
	extract::State,
	http::{HeaderMap, StatusCode},
	response::IntoResponse,
	routing,
};
use serde_json::{Map, Value};
use tokio::{
	net::TcpListener,
	sync::{oneshot, oneshot::Sender},
};

use scout_config::AiProviderConfig;
use scout_domain::{Candidate, CandidateSummary};
use scout_providers::{Error, keywords, ranking, report};

#[derive(Clone)]
struct MockModel {
	reply: Option<String>,
	requests: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}
impl MockModel {
	fn replying(reply: &str) -> Self {
		Self { reply: Some(reply.to_string()), requests: Arc::new(Mutex::new(Vec::new())) }
	}

	fn failing() -> Self {
		Self { reply: None, requests: Arc::new(Mutex::new(Vec::new())) }
	}

	fn requests(&self) -> Vec<(Option<String>, Value)> {
		self.requests.lock().expect("Request log poisoned.").clone()
	}
}

async fn start_model_server(model: MockModel) -> (String, Sender<()>) {
	let app =
		Router::new().route("/v1/generate", routing::post(generate_handler)).with_state(model);
	let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind model server.");
	let addr = listener.local_addr().expect("Failed to read model server address.");
	let (tx, rx) = oneshot::channel();
	let server = axum::serve(listener, app).with_graceful_shutdown(async move {
		let _ = rx.await;
	});

	tokio::spawn(async move {
		let _ = server.into_future().await;
	});

	(format!("http://{addr}"), tx)
}

async fn generate_handler(
	State(model): State<MockModel>,
	headers: HeaderMap,
	Json(payload): Json<Value>,
) -> impl IntoResponse {
	let auth = headers
		.get("authorization")
		.and_then(|value| value.to_str().ok())
		.map(|value| value.to_string());

	model.requests.lock().expect("Request log poisoned.").push((auth, payload));

	let Some(reply) = model.reply else {
		return StatusCode::INTERNAL_SERVER_ERROR.into_response();
	};

	Json(serde_json::json!({
		"candidates": [{ "content": { "parts": [{ "text": reply }] } }],
		"usageMetadata": { "totalTokenCount": 321 }
	}))
	.into_response()
}

fn provider_config(api_base: String, api_key: Option<&str>) -> AiProviderConfig {
	let mut default_headers = Map::new();

	default_headers.insert("x-client".to_string(), Value::String("scout-tests".to_string()));

	AiProviderConfig {
		provider_id: "mock".to_string(),
		api_base,
		path: "/v1/generate".to_string(),
		api_key: api_key.map(|key| key.to_string()),
		timeout_ms: 5_000,
		default_headers,
	}
}

#[test]
fn auth_headers_carry_bearer_and_defaults() {
	let mut defaults = Map::new();

	defaults.insert("x-client".to_string(), Value::String("scout".to_string()));

	let headers = scout_providers::auth_headers("secret", &defaults).expect("headers failed");

	assert_eq!(headers.get("authorization").and_then(|v| v.to_str().ok()), Some("Bearer secret"));
	assert_eq!(headers.get("x-client").and_then(|v| v.to_str().ok()), Some("scout"));
}

#[test]
fn auth_headers_reject_non_string_defaults() {
	let mut defaults = Map::new();

	defaults.insert("x-retries".to_string(), Value::from(3));

	let err = scout_providers::auth_headers("secret", &defaults).expect_err("Expected error.");

	assert!(matches!(err, Error::InvalidConfig { .. }));
}

#[tokio::test]
async fn keyword_extraction_sends_prompt_and_parses_list() {
	let model = MockModel::replying("DeFi, cross-chain ,low-cap");
	let (api_base, shutdown) = start_model_server(model.clone()).await;
	let cfg = provider_config(api_base, Some("test-key"));
	let keywords = keywords::extract_keywords(&cfg, "cheap cross-chain DeFi tokens")
		.await
		.expect("extraction failed");

	assert_eq!(keywords, vec!["DeFi", "cross-chain", "low-cap"]);

	let requests = model.requests();

	assert_eq!(requests.len(), 1);

	let (auth, body) = &requests[0];

	assert_eq!(auth.as_deref(), Some("Bearer test-key"));

	let prompt = body["contents"][0]["parts"][0]["text"].as_str().expect("prompt missing");

	assert!(prompt.contains("cheap cross-chain DeFi tokens"));
	assert_eq!(body["generationConfig"]["maxOutputTokens"], 100);

	let _ = shutdown.send(());
}

#[tokio::test]
async fn ranking_prompt_lists_ids_and_returns_order() {
	let model = MockModel::replying("C,A");
	let (api_base, shutdown) = start_model_server(model.clone()).await;
	let cfg = provider_config(api_base, Some("test-key"));
	let summaries: Vec<CandidateSummary> = ["A", "B", "C"]
		.into_iter()
		.map(|id| Candidate::new(id, format!("T{id}"), format!("Token {id}")).summary(200))
		.collect();
	let ids = ranking::rank(&cfg, "oracle", &summaries).await.expect("ranking failed");

	assert_eq!(ids, vec!["C", "A"]);

	let requests = model.requests();
	let prompt = requests[0].1["contents"][0]["parts"][0]["text"].as_str().expect("prompt missing");

	assert!(prompt.contains("id=B | TB (Token B)"));

	let _ = shutdown.send(());
}

#[tokio::test]
async fn report_generation_keeps_usage_and_sections() {
	let model = MockModel::replying("## Project overview\nOracles.\n\n## Summary\nSolid.");
	let (api_base, shutdown) = start_model_server(model.clone()).await;
	let cfg = provider_config(api_base, Some("test-key"));
	let token = Candidate::new("2", "LINK", "Chainlink");
	let report = report::generate_report(&cfg, &token, Some("Focus on staking."))
		.await
		.expect("report failed");

	assert_eq!(report.token_symbol, "LINK");
	assert_eq!(report.tokens_used, 321);
	assert_eq!(report.sections.len(), 2);
	assert_eq!(report.section("Summary"), Some("Solid."));

	let body = &model.requests()[0].1;

	assert_eq!(body["generationConfig"]["maxOutputTokens"], 2_048);

	let _ = shutdown.send(());
}

#[tokio::test]
async fn upstream_failure_surfaces_as_http_error() {
	let model = MockModel::failing();
	let (api_base, shutdown) = start_model_server(model.clone()).await;
	let cfg = provider_config(api_base, Some("test-key"));
	let err = keywords::extract_keywords(&cfg, "anything").await.expect_err("Expected failure.");

	assert!(matches!(err, Error::Reqwest(_)));
	assert_eq!(model.requests().len(), 1);

	let _ = shutdown.send(());
}

#[tokio::test]
async fn missing_api_key_fails_before_any_request() {
	let model = MockModel::replying("DeFi");
	let (api_base, shutdown) = start_model_server(model.clone()).await;
	let cfg = provider_config(api_base, None);
	let err = keywords::extract_keywords(&cfg, "anything").await.expect_err("Expected failure.");

	assert!(matches!(err, Error::InvalidConfig { .. }));
	assert!(model.requests().is_empty());

	let _ = shutdown.send(());
}
