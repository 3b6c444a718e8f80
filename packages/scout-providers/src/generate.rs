use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};
use scout_config::AiProviderConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
	pub temperature: f32,
	pub max_output_tokens: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
	pub content: String,
	pub tokens_used: u32,
}

/// Sends one prompt to the content-generation endpoint and returns the first candidate's text.
pub async fn generate(
	cfg: &AiProviderConfig,
	prompt: &str,
	params: GenerationParams,
) -> Result<Generation> {
	let Some(api_key) = cfg.api_key.as_deref() else {
		return Err(Error::InvalidConfig { message: "AI api_key is not configured.".to_string() });
	};
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"contents": [{ "parts": [{ "text": prompt }] }],
		"generationConfig": {
			"temperature": params.temperature,
			"maxOutputTokens": params.max_output_tokens,
		},
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let status = res.status();

	if !status.is_success() {
		tracing::warn!(
			provider_id = %cfg.provider_id,
			status = status.as_u16(),
			"AI generation request was rejected."
		);
	}

	let json: Value = res.error_for_status()?.json().await?;

	parse_generation(json).inspect_err(|err| {
		tracing::warn!(
			provider_id = %cfg.provider_id,
			error = %err,
			"AI generation response is unusable."
		);
	})
}

fn parse_generation(json: Value) -> Result<Generation> {
	let content = json
		.get("candidates")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|candidate| candidate.get("content"))
		.and_then(|content| content.get("parts"))
		.and_then(|v| v.as_array())
		.and_then(|parts| parts.first())
		.and_then(|part| part.get("text"))
		.and_then(|text| text.as_str())
		.ok_or_else(|| Error::invalid_response("Generation response is missing candidate text."))?;
	let tokens_used = json
		.get("usageMetadata")
		.and_then(|usage| usage.get("totalTokenCount"))
		.and_then(|v| v.as_u64())
		.unwrap_or(0) as u32;

	Ok(Generation { content: content.to_string(), tokens_used })
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reads_first_candidate_text_and_usage() {
		let json = serde_json::json!({
			"candidates": [
				{ "content": { "parts": [{ "text": "DeFi,oracle" }] } },
				{ "content": { "parts": [{ "text": "ignored" }] } }
			],
			"usageMetadata": { "totalTokenCount": 17 }
		});
		let generation = parse_generation(json).expect("parse failed");

		assert_eq!(generation.content, "DeFi,oracle");
		assert_eq!(generation.tokens_used, 17);
	}

	#[test]
	fn missing_text_is_invalid_response() {
		let json = serde_json::json!({ "candidates": [] });
		let err = parse_generation(json).expect_err("Expected invalid response.");

		assert!(matches!(err, Error::InvalidResponse { .. }));
	}
}
