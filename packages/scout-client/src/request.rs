use std::time::Duration;

use reqwest::{
	Client, StatusCode,
	header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Error, Result};
use scout_config::{Api, Retry};

const MAX_BACKOFF_EXPONENT: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Total attempts, including the first one.
	pub attempts: u32,
	pub base_delay: Duration,
}
impl RetryPolicy {
	pub fn from_config(cfg: &Retry) -> Self {
		Self { attempts: cfg.attempts.max(1), base_delay: Duration::from_millis(cfg.base_delay_ms) }
	}

	/// Delay after the failed `attempt` (1-based): `base_delay * 2^(attempt - 1)`.
	pub fn delay_after(&self, attempt: u32) -> Duration {
		let exp = attempt.max(1).saturating_sub(1).min(MAX_BACKOFF_EXPONENT);

		self.base_delay.saturating_mul(1_u32 << exp)
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Method {
	#[default]
	Get,
	Post,
	Put,
	Delete,
}
impl Method {
	fn as_reqwest(self) -> reqwest::Method {
		match self {
			Self::Get => reqwest::Method::GET,
			Self::Post => reqwest::Method::POST,
			Self::Put => reqwest::Method::PUT,
			Self::Delete => reqwest::Method::DELETE,
		}
	}
}

#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
	pub method: Method,
	pub body: Option<Value>,
	/// Merged on top of the default `Content-Type: application/json`.
	pub headers: Vec<(String, String)>,
}
impl RequestOptions {
	pub fn get() -> Self {
		Self::default()
	}

	pub fn post(body: Value) -> Self {
		Self { method: Method::Post, body: Some(body), headers: Vec::new() }
	}

	pub fn put(body: Value) -> Self {
		Self { method: Method::Put, body: Some(body), headers: Vec::new() }
	}

	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		let name = name.into();

		self.headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
		self.headers.push((name, value.into()));

		self
	}
}

/// JSON-over-HTTP client for the backend API with exponential-backoff retries.
#[derive(Debug, Clone)]
pub struct RequestClient {
	http: Client,
	base_url: String,
	retry: RetryPolicy,
}
impl RequestClient {
	pub fn new(api: &Api, retry: &Retry) -> Result<Self> {
		Self::with_policy(
			&api.base_url,
			Duration::from_millis(api.timeout_ms),
			RetryPolicy::from_config(retry),
		)
	}

	pub fn with_policy(base_url: &str, timeout: Duration, retry: RetryPolicy) -> Result<Self> {
		let http = Client::builder().timeout(timeout).build()?;

		Ok(Self { http, base_url: base_url.trim_end_matches('/').to_string(), retry })
	}

	pub fn retry_policy(&self) -> RetryPolicy {
		self.retry
	}

	/// Sends `options` to `endpoint`, retrying transport errors, 408, 429 and 5xx responses.
	/// Any other failure, and the last failure once attempts run out, is returned as is.
	pub async fn request<T>(&self, endpoint: &str, options: &RequestOptions) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let headers = build_headers(&options.headers)?;
		let mut attempt = 1;

		loop {
			match self.send_once(endpoint, options, headers.clone()).await {
				Ok(value) => return Ok(value),
				Err(err) if err.is_retryable() && attempt < self.retry.attempts => {
					let delay = self.retry.delay_after(attempt);

					tracing::warn!(
						endpoint,
						attempt,
						delay_ms = delay.as_millis() as u64,
						error = %err,
						"Backend request failed. Retrying."
					);

					tokio::time::sleep(delay).await;

					attempt += 1;
				},
				Err(err) => return Err(err),
			}
		}
	}

	async fn send_once<T>(
		&self,
		endpoint: &str,
		options: &RequestOptions,
		headers: HeaderMap,
	) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let url = format!("{}{endpoint}", self.base_url);
		let mut builder = self.http.request(options.method.as_reqwest(), url).headers(headers);

		if let Some(body) = options.body.as_ref() {
			builder = builder.body(serde_json::to_vec(body)?);
		}

		let res = builder.send().await?;
		let status = res.status();
		let text = res.text().await?;

		if !status.is_success() {
			return Err(status_error(status, text));
		}

		let raw = if text.trim().is_empty() { "null" } else { text.as_str() };

		serde_json::from_str(raw)
			.map_err(|source| Error::Decode { endpoint: endpoint.to_string(), source })
	}
}

fn build_headers(extra: &[(String, String)]) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

	for (name, value) in extra {
		let name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| Error::InvalidInput {
			message: format!("Invalid header name {name:?}: {err}."),
		})?;
		let value = HeaderValue::from_str(value).map_err(|err| Error::InvalidInput {
			message: format!("Invalid value for header {name}: {err}."),
		})?;

		headers.insert(name, value);
	}

	Ok(headers)
}

fn status_error(status: StatusCode, body: String) -> Error {
	let message = if body.trim().is_empty() {
		status.canonical_reason().unwrap_or("Request failed").to_string()
	} else {
		body
	};

	Error::HttpStatus { status: status.as_u16(), code: status.as_u16().to_string(), message }
}
