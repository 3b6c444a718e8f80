use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::Candidate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSection {
	pub title: String,
	pub body: String,
}

/// AI research report for one token. `sections` keeps the order the headers appeared in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
	pub token_id: String,
	pub token_symbol: String,
	pub token_name: String,
	#[serde(with = "time::serde::rfc3339")]
	pub generated_at: OffsetDateTime,
	pub content: String,
	pub tokens_used: u32,
	pub sections: Vec<ReportSection>,
}
impl Report {
	pub fn section(&self, title: &str) -> Option<&str> {
		self.sections
			.iter()
			.find(|section| section.title == title)
			.map(|section| section.body.as_str())
	}

	/// Basic report built from the token's own attributes when generation fails.
	pub fn fallback(token: &Candidate, generated_at: OffsetDateTime) -> Self {
		let description = token.description.trim();
		let overview =
			if description.is_empty() { "No description available." } else { description };
		let basic_info = format!(
			"- Contract address: {}\n- Website: {}\n- Circulating supply: {}",
			or_unknown(token.contract_address.as_deref().unwrap_or_default()),
			or_unknown(&token.website),
			or_unknown(&token.circulating_supply),
		);
		let content = format!(
			"# {} ({}) basic report\n\n## Overview\n{overview}\n\n## Basic information\n\
			 {basic_info}\n\n*Detailed analysis is unavailable; showing basic information only.*",
			token.name, token.symbol,
		);

		Self {
			token_id: token.id.clone(),
			token_symbol: token.symbol.clone(),
			token_name: token.name.clone(),
			generated_at,
			content,
			tokens_used: 0,
			sections: vec![
				ReportSection { title: "Overview".to_string(), body: overview.to_string() },
				ReportSection { title: "Basic information".to_string(), body: basic_info },
			],
		}
	}
}

fn or_unknown(value: &str) -> &str {
	if value.trim().is_empty() { "n/a" } else { value }
}
