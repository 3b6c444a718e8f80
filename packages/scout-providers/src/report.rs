use time::OffsetDateTime;

use crate::{Error, GenerationParams, Result, generate};
use scout_config::AiProviderConfig;
use scout_domain::{Candidate, Report, ReportSection};

const PARAMS: GenerationParams = GenerationParams { temperature: 0.4, max_output_tokens: 2_048 };
const SECTION_TITLES: [(&str, &str); 8] = [
	("Project overview", "what the project does, product and business, founders and team"),
	("Technology", "technology used, innovation, technical strengths and risks"),
	("Token economics", "token utility, fairness of launch and distribution, value capture"),
	("Community", "size and quality of the community, marketing, growth potential"),
	("Ecosystem", "the ecosystem the project belongs to and its prospects"),
	("Risks", "technical, market, regulatory and competitive risks"),
	("Investment view", "score from 1 to 10, recommendation, price target and time frame"),
	("Summary", "overall assessment and key takeaways"),
];

pub async fn generate_report(
	cfg: &AiProviderConfig,
	token: &Candidate,
	context: Option<&str>,
) -> Result<Report> {
	let generation = generate::generate(cfg, &build_prompt(token, context), PARAMS).await?;
	let sections = parse_report_sections(&generation.content)?;

	Ok(Report {
		token_id: token.id.clone(),
		token_symbol: token.symbol.clone(),
		token_name: token.name.clone(),
		generated_at: OffsetDateTime::now_utc(),
		content: generation.content,
		tokens_used: generation.tokens_used,
		sections,
	})
}

fn build_prompt(token: &Candidate, context: Option<&str>) -> String {
	let price_change = token
		.price_change_24h
		.map(|change| format!("{change}%"))
		.unwrap_or_else(|| "n/a".to_string());
	let template = SECTION_TITLES
		.iter()
		.map(|(title, hint)| format!("## {title}\n[{hint}]"))
		.collect::<Vec<_>>()
		.join("\n\n");
	let context = context.map(|text| format!("\nAdditional context: {text}\n")).unwrap_or_default();

	format!(
		"You are a senior crypto research analyst. Write a professional in-depth research report \
		 for the token below.\n\n\
		 Token:\n\
		 - Name: {name} ({symbol})\n\
		 - Description: {description}\n\
		 - Contract address: {contract}\n\
		 - Website: {website}\n\
		 - Whitepaper: {whitepaper}\n\
		 - Twitter: {twitter}\n\
		 - Circulating supply: {circulating}\n\
		 - Total supply: {total}\n\
		 - Market cap: {market_cap}\n\
		 - 24h volume: {volume}\n\
		 - 24h change: {price_change}\n{context}\n\
		 Use exactly the following section headers. Omit a section when there is not enough \
		 information for it.\n\n{template}\n\n\
		 Keep the analysis objective and the figures accurate.",
		name = token.name,
		symbol = token.symbol,
		description = or_na(&token.description),
		contract = or_na(token.contract_address.as_deref().unwrap_or_default()),
		website = or_na(&token.website),
		whitepaper = or_na(&token.whitepaper_url),
		twitter = or_na(&token.twitter_url),
		circulating = or_na(&token.circulating_supply),
		total = or_na(&token.total_supply),
		market_cap = or_na(token.market_cap.as_deref().unwrap_or_default()),
		volume = or_na(token.volume_24h.as_deref().unwrap_or_default()),
	)
}

fn or_na(value: &str) -> &str {
	if value.trim().is_empty() { "n/a" } else { value }
}

/// Splits markdown into `## ` sections. A section body runs until the next `## ` line or the end
/// of the text; anything before the first header is ignored.
pub fn parse_report_sections(content: &str) -> Result<Vec<ReportSection>> {
	let mut sections = Vec::new();
	let mut current: Option<(String, Vec<&str>)> = None;

	for line in content.lines() {
		if let Some(title) = line.strip_prefix("## ") {
			if let Some((title, body)) = current.take() {
				sections.push(finish_section(title, &body));
			}

			current = Some((title.trim().to_string(), Vec::new()));

			continue;
		}

		if let Some((_, body)) = current.as_mut() {
			body.push(line);
		}
	}

	if let Some((title, body)) = current.take() {
		sections.push(finish_section(title, &body));
	}

	if sections.is_empty() {
		return Err(Error::invalid_response("Report response has no '## ' sections."));
	}
	if sections.iter().any(|section| section.title.is_empty()) {
		return Err(Error::invalid_response("Report response has a section with an empty title."));
	}

	Ok(sections)
}

fn finish_section(title: String, body: &[&str]) -> ReportSection {
	ReportSection { title, body: body.join("\n").trim().to_string() }
}
