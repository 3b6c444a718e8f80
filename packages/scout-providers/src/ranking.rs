use crate::{Error, GenerationParams, Result, generate};
use scout_config::AiProviderConfig;
use scout_domain::CandidateSummary;

const PARAMS: GenerationParams = GenerationParams { temperature: 0.2, max_output_tokens: 100 };

/// Asks the model to order `summaries` by relevance to `query`; returns ids, best first.
pub async fn rank(
	cfg: &AiProviderConfig,
	query: &str,
	summaries: &[CandidateSummary],
) -> Result<Vec<String>> {
	if summaries.is_empty() {
		return Ok(Vec::new());
	}

	let generation = generate::generate(cfg, &build_prompt(query, summaries), PARAMS).await?;

	parse_ranked_ids(&generation.content)
}

fn build_prompt(query: &str, summaries: &[CandidateSummary]) -> String {
	let listing = summaries
		.iter()
		.map(|summary| {
			let mut line = format!("- id={} | {} ({})", summary.id, summary.symbol, summary.name);

			if !summary.category.is_empty() {
				line.push_str(&format!(" | category: {}", summary.category));
			}
			if !summary.tags.is_empty() {
				line.push_str(&format!(" | tags: {}", summary.tags.join(", ")));
			}

			line.push_str(&format!(" | {}", summary.description));

			line
		})
		.collect::<Vec<_>>()
		.join("\n");

	format!(
		"You are a professional crypto analyst. Order the tokens below by how well they match the \
		 user's request.\n\n\
		 Request: {query}\n\n\
		 Tokens:\n{listing}\n\n\
		 Weigh functional fit, use-case relevance, technical fit, market positioning and growth \
		 potential.\n\n\
		 Reply with only the token ids from best to worst match, separated by commas.\n\n\
		 Example: 2,5,1,3,4"
	)
}

/// Parses `id ("," id)*`. Ids are trimmed and must be non-empty with no inner whitespace.
pub fn parse_ranked_ids(content: &str) -> Result<Vec<String>> {
	let trimmed = content.trim();

	if trimmed.is_empty() {
		return Err(Error::invalid_response("Ranking response is empty."));
	}

	trimmed
		.split(',')
		.map(|raw| {
			let id = raw.trim();

			if id.is_empty() {
				return Err(Error::invalid_response("Ranking response contains an empty id."));
			}
			if id.chars().any(char::is_whitespace) {
				return Err(Error::invalid_response(format!(
					"Ranking response id {id:?} contains whitespace."
				)));
			}

			Ok(id.to_string())
		})
		.collect()
}
