use crate::{Error, GenerationParams, Result, generate};
use scout_config::AiProviderConfig;

const MAX_KEYWORDS: usize = 16;
const PARAMS: GenerationParams = GenerationParams { temperature: 0.3, max_output_tokens: 100 };

pub async fn extract_keywords(cfg: &AiProviderConfig, query: &str) -> Result<Vec<String>> {
	let generation = generate::generate(cfg, &build_prompt(query), PARAMS).await?;

	parse_keyword_list(&generation.content)
}

fn build_prompt(query: &str) -> String {
	format!(
		"You are a professional crypto analyst. Read the user's token search request and extract \
		 the key search terms.\n\n\
		 Request: {query}\n\n\
		 Consider these dimensions:\n\
		 1. Technology (DeFi, NFT, Layer2, cross-chain, ...)\n\
		 2. Use case (payments, gaming, metaverse, storage, ...)\n\
		 3. Market profile (low-cap, high-growth, stable, ...)\n\
		 4. Ecosystem (Ethereum, BSC, Polygon, ...)\n\
		 5. Project maturity (new project, established project, novel technology, ...)\n\n\
		 Reply with only the 5-8 most relevant keywords separated by commas, with no explanation.\n\n\
		 Example: DeFi,low-cap,Ethereum,liquidity mining,innovation"
	)
}

/// Parses `item ("," item)*`. Items are trimmed and must be non-empty and single-line.
pub fn parse_keyword_list(content: &str) -> Result<Vec<String>> {
	let trimmed = content.trim();

	if trimmed.is_empty() {
		return Err(Error::invalid_response("Keyword response is empty."));
	}

	let mut keywords = Vec::new();

	for raw in trimmed.split(',') {
		let item = raw.trim();

		if item.is_empty() {
			return Err(Error::invalid_response("Keyword response contains an empty item."));
		}
		if item.contains(['\n', '\r']) {
			return Err(Error::invalid_response("Keyword response is not a single comma list."));
		}

		keywords.push(item.to_string());
	}

	if keywords.len() > MAX_KEYWORDS {
		return Err(Error::invalid_response(format!(
			"Keyword response has {} items; at most {MAX_KEYWORDS} are allowed.",
			keywords.len()
		)));
	}

	Ok(keywords)
}
