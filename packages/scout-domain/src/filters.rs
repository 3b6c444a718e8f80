use serde::{Deserialize, Serialize};

/// Optional constraints sent alongside a search query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub market_cap_min: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub market_cap_max: Option<f64>,
	#[serde(default, rename = "volume24hMin", skip_serializing_if = "Option::is_none")]
	pub volume_24h_min: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub categories: Option<Vec<String>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub chains: Option<Vec<String>>,
}
impl SearchFilters {
	/// Canonical form used for cache keys: list entries are trimmed, de-duplicated and sorted, and
	/// an empty list is the same as an absent one.
	pub fn normalized(&self) -> Self {
		Self {
			market_cap_min: self.market_cap_min,
			market_cap_max: self.market_cap_max,
			volume_24h_min: self.volume_24h_min,
			categories: normalize_list(self.categories.as_deref()),
			chains: normalize_list(self.chains.as_deref()),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.normalized() == Self::default()
	}
}

fn normalize_list(items: Option<&[String]>) -> Option<Vec<String>> {
	let mut out: Vec<String> = items
		.unwrap_or_default()
		.iter()
		.map(|item| item.trim().to_string())
		.filter(|item| !item.is_empty())
		.collect();

	out.sort();
	out.dedup();

	if out.is_empty() { None } else { Some(out) }
}
