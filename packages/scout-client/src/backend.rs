//! Typed calls against the token search backend.

use serde::{Deserialize, Serialize};

use crate::{RequestClient, RequestOptions, Result};
use scout_domain::{Candidate, SearchFilters};

#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest<'a> {
	pub query: &'a str,
	pub original_query: &'a str,
	pub top_k: u32,
	pub filters: &'a SearchFilters,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
	#[serde(default)]
	results: Vec<Candidate>,
}

impl RequestClient {
	/// `POST /api/search`. `top_k` is sent as given; callers widen it for reranking headroom.
	pub async fn search(&self, req: &SearchRequest<'_>) -> Result<Vec<Candidate>> {
		let body = serde_json::to_value(req)?;
		let res: SearchResponse = self.request("/api/search", &RequestOptions::post(body)).await?;

		Ok(res.results)
	}

	/// `GET /api/tokens/{id}`.
	pub async fn token_details(&self, id: &str) -> Result<Candidate> {
		self.request(&format!("/api/tokens/{id}"), &RequestOptions::get()).await
	}
}
