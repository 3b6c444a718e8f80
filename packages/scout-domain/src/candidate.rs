use serde::{Deserialize, Serialize};

/// One token produced by the search pipeline.
///
/// `id` is stable across re-ranking. `rank` is only meaningful after the final ordering has been
/// applied, at which point it runs `1..=N` in list order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
	pub id: String,
	#[serde(default)]
	pub rank: u32,
	pub symbol: String,
	pub name: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub circulating_supply: String,
	#[serde(default)]
	pub total_supply: String,
	#[serde(default)]
	pub logo: String,
	#[serde(default)]
	pub whitepaper_url: String,
	#[serde(default)]
	pub twitter_url: String,
	#[serde(default)]
	pub website: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub contract_address: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub market_cap: Option<String>,
	#[serde(default, rename = "volume24h", skip_serializing_if = "Option::is_none")]
	pub volume_24h: Option<String>,
	#[serde(default, rename = "priceChange24h", skip_serializing_if = "Option::is_none")]
	pub price_change_24h: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub price: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub category: Option<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub tags: Vec<String>,
}
impl Candidate {
	pub fn new(id: impl Into<String>, symbol: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			rank: 0,
			symbol: symbol.into(),
			name: name.into(),
			description: String::new(),
			circulating_supply: String::new(),
			total_supply: String::new(),
			logo: String::new(),
			whitepaper_url: String::new(),
			twitter_url: String::new(),
			website: String::new(),
			contract_address: None,
			market_cap: None,
			volume_24h: None,
			price_change_24h: None,
			price: None,
			category: None,
			tags: Vec::new(),
		}
	}

	/// Compact view sent to the ranking model.
	pub fn summary(&self, description_chars: usize) -> CandidateSummary {
		CandidateSummary {
			id: self.id.clone(),
			symbol: self.symbol.clone(),
			name: self.name.clone(),
			description: truncate_chars(&self.description, description_chars).to_string(),
			category: self.category.clone().unwrap_or_default(),
			tags: self.tags.clone(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateSummary {
	pub id: String,
	pub symbol: String,
	pub name: String,
	pub description: String,
	pub category: String,
	pub tags: Vec<String>,
}

/// Reassigns `rank` as `1..=N` following slice order.
pub fn assign_ranks(candidates: &mut [Candidate]) {
	for (index, candidate) in candidates.iter_mut().enumerate() {
		candidate.rank = index as u32 + 1;
	}
}

pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
	match text.char_indices().nth(max_chars) {
		Some((end, _)) => &text[..end],
		None => text,
	}
}
