use std::collections::HashSet;

use scout_domain::{SearchFilters, fallback, keywords, ranking};

#[test]
fn fallback_candidates_are_renderable() {
	let candidates = fallback::fallback_candidates();
	let ids: HashSet<_> = candidates.iter().map(|c| c.id.as_str()).collect();

	assert!(!candidates.is_empty());
	assert_eq!(ids.len(), candidates.len());

	for (index, candidate) in candidates.iter().enumerate() {
		assert_eq!(candidate.rank as usize, index + 1);
		assert!(!candidate.symbol.is_empty());
	}
}

#[test]
fn ranking_preserves_every_candidate() {
	let candidates = fallback::fallback_candidates();
	let ranked = ranking::apply_ranking(candidates.clone(), &["2".to_string()]);

	assert_eq!(ranked.len(), candidates.len());
	assert_eq!(ranked[0].symbol, "LINK");
	assert_eq!(ranked[1].symbol, "MATIC");
}

#[test]
fn fallback_keywords_never_exceed_five() {
	let query = keywords::VOCABULARY.join(" ");

	assert_eq!(keywords::fallback_keywords(&query, 5).len(), 5);
	assert!(keywords::fallback_keywords("nothing relevant here", 5).is_empty());
}

#[test]
fn filters_serialize_without_absent_fields() {
	let filters = SearchFilters { market_cap_max: Some(1_000_000.0), ..Default::default() };
	let json = serde_json::to_value(&filters).expect("encode failed");

	assert_eq!(json, serde_json::json!({ "marketCapMax": 1_000_000.0 }));
}
