use std::sync::Arc;

use crate::{Clock, Providers, SystemClock, search};
use scout_config::AiProviderConfig;
use scout_domain::{Candidate, Report};

const REPORT_CONTEXT: &str =
	"The reader is evaluating related tokens. Give professional, actionable investment analysis.";

/// Deep research reports with a local fallback when generation fails.
pub struct ReportService {
	ai: AiProviderConfig,
	providers: Providers,
	clock: Arc<dyn Clock>,
}
impl ReportService {
	pub fn new(ai: AiProviderConfig, providers: Providers) -> Self {
		Self::with_clock(ai, providers, Arc::new(SystemClock))
	}

	pub fn with_clock(ai: AiProviderConfig, providers: Providers, clock: Arc<dyn Clock>) -> Self {
		Self { ai, providers, clock }
	}

	/// Generates a report for `token`, preferring the backend's copy of its details. Never fails:
	/// a generation error yields [`Report::fallback`] with `tokens_used == 0`.
	pub async fn generate_report(&self, token: &Candidate) -> Report {
		let enhanced = search::token_details(&self.providers, &token.id)
			.await
			.unwrap_or_else(|| token.clone());

		match self.providers.report.generate(&self.ai, &enhanced, Some(REPORT_CONTEXT)).await {
			Ok(report) => {
				tracing::info!(
					token_id = %report.token_id,
					tokens_used = report.tokens_used,
					section_count = report.sections.len(),
					"Report generated."
				);

				report
			},
			Err(err) => {
				tracing::warn!(
					error = %err,
					token_id = %enhanced.id,
					"Report generation failed. Using basic report."
				);

				Report::fallback(&enhanced, self.clock.now())
			},
		}
	}
}
