pub mod candidate;
pub mod fallback;
pub mod filters;
pub mod keywords;
pub mod ranking;
pub mod report;
pub mod session;

pub use candidate::{Candidate, CandidateSummary};
pub use filters::SearchFilters;
pub use report::{Report, ReportSection};
pub use session::{AuthResponse, ProfileUpdate, Session, Subscription, User};

/// Trims, applies NFKC and collapses inner whitespace runs to a single space.
pub fn normalize_query(query: &str) -> String {
	use unicode_normalization::UnicodeNormalization;

	let composed: String = query.nfkc().collect();

	composed.split_whitespace().collect::<Vec<_>>().join(" ")
}
