#![allow(dead_code)]

use std::{
	collections::{HashMap, VecDeque},
	future::IntoFuture,
	sync::{Arc, Mutex},
	time::Duration,
};

use axum::{
	Router,
	extract::State,
	http::{HeaderMap, StatusCode, Uri},
	response::IntoResponse,
};
use tokio::{
	net::TcpListener,
	sync::{oneshot, oneshot::Sender},
};

use scout_client::{RequestClient, RetryPolicy};

#[derive(Debug, Clone)]
pub struct Recorded {
	pub path: String,
	pub authorization: Option<String>,
	pub body: String,
}

#[derive(Default)]
struct MockState {
	scripts: HashMap<String, VecDeque<(u16, String)>>,
	log: Vec<Recorded>,
}

/// Backend double that answers each path from a queue of scripted responses and records every
/// request it receives. Unscripted requests get a 404.
#[derive(Clone, Default)]
pub struct MockBackend {
	state: Arc<Mutex<MockState>>,
}
impl MockBackend {
	pub fn script(&self, path: &str, status: u16, body: impl Into<String>) -> &Self {
		self.state
			.lock()
			.expect("Mock state poisoned.")
			.scripts
			.entry(path.to_string())
			.or_default()
			.push_back((status, body.into()));

		self
	}

	pub fn log(&self) -> Vec<Recorded> {
		self.state.lock().expect("Mock state poisoned.").log.clone()
	}

	pub fn calls(&self, path: &str) -> Vec<Recorded> {
		self.log().into_iter().filter(|recorded| recorded.path == path).collect()
	}

	pub async fn start(&self) -> (String, Sender<()>) {
		let app = Router::new().fallback(handle).with_state(self.clone());
		let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind backend.");
		let addr = listener.local_addr().expect("Failed to read backend address.");
		let (tx, rx) = oneshot::channel();
		let server = axum::serve(listener, app).with_graceful_shutdown(async move {
			let _ = rx.await;
		});

		tokio::spawn(async move {
			let _ = server.into_future().await;
		});

		(format!("http://{addr}"), tx)
	}
}

async fn handle(
	State(mock): State<MockBackend>,
	uri: Uri,
	headers: HeaderMap,
	body: String,
) -> impl IntoResponse {
	let mut state = mock.state.lock().expect("Mock state poisoned.");
	let path = uri.path().to_string();
	let authorization = headers
		.get("authorization")
		.and_then(|value| value.to_str().ok())
		.map(|value| value.to_string());

	state.log.push(Recorded { path: path.clone(), authorization, body });

	let Some((status, body)) = state.scripts.get_mut(&path).and_then(|queue| queue.pop_front())
	else {
		return (StatusCode::NOT_FOUND, "unscripted".to_string());
	};

	(StatusCode::from_u16(status).expect("Invalid scripted status."), body)
}

pub fn client(base_url: &str) -> RequestClient {
	RequestClient::with_policy(
		base_url,
		Duration::from_secs(5),
		RetryPolicy { attempts: 3, base_delay: Duration::from_millis(1) },
	)
	.expect("Failed to build client.")
}

pub fn auth_body(token: &str, refresh_token: &str) -> String {
	serde_json::json!({
		"user": {
			"id": "u1",
			"email": "ada@scout.io",
			"username": "ada",
			"createdAt": "2026-01-02T03:04:05Z",
			"subscription": "pro"
		},
		"token": token,
		"refreshToken": refresh_token
	})
	.to_string()
}
