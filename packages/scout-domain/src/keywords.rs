/// Terms the local extractor recognizes when the AI extractor is unavailable.
pub const VOCABULARY: [&str; 12] = [
	"DeFi",
	"NFT",
	"GameFi",
	"Layer2",
	"cross-chain",
	"stablecoin",
	"low-cap",
	"high-growth",
	"innovation",
	"ecosystem",
	"mining",
	"staking",
];

/// Returns vocabulary terms mentioned in `query`, case-insensitively, in vocabulary order and
/// capped at `limit`.
pub fn fallback_keywords(query: &str, limit: usize) -> Vec<String> {
	let lowered = query.to_lowercase();

	VOCABULARY
		.iter()
		.filter(|term| lowered.contains(&term.to_lowercase()))
		.take(limit)
		.map(|term| term.to_string())
		.collect()
}

/// Query sent to retrieval: the keywords joined by a space, or the original text when there are
/// none.
pub fn enhanced_query(keywords: &[String], original: &str) -> String {
	let joined = keywords
		.iter()
		.map(|keyword| keyword.trim())
		.filter(|keyword| !keyword.is_empty())
		.collect::<Vec<_>>()
		.join(" ");

	if joined.is_empty() { original.to_string() } else { joined }
}
