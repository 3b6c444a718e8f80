pub mod cache;
pub mod controller;
pub mod debounce;
pub mod preferences;
pub mod report;
pub mod search;

mod error;

pub use cache::{Clock, ManualClock, ResultCache, SystemClock};
pub use controller::{SearchController, SearchSnapshot};
pub use debounce::Debouncer;
pub use error::{Error, Result};
pub use preferences::{FavoriteToken, Preferences, ReportFolder, SavedReport};
pub use report::ReportService;
pub use search::{
	Degradation, ResultSource, RunToken, SearchMetrics, SearchMode, SearchOutcome, SearchPipeline,
	SearchRequest, Stage,
};

use std::{future::Future, pin::Pin, sync::Arc};

use scout_client::RequestClient;
use scout_config::AiProviderConfig;
use scout_domain::{Candidate, CandidateSummary, Report, SearchFilters};
use scout_providers::{keywords, ranking};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait KeywordProvider
where
	Self: Send + Sync,
{
	fn extract<'a>(
		&'a self,
		cfg: &'a AiProviderConfig,
		query: &'a str,
	) -> BoxFuture<'a, scout_providers::Result<Vec<String>>>;
}

pub trait RetrievalProvider
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		query: &'a str,
		original_query: &'a str,
		top_k: u32,
		filters: &'a SearchFilters,
	) -> BoxFuture<'a, scout_client::Result<Vec<Candidate>>>;

	fn token_details<'a>(&'a self, id: &'a str) -> BoxFuture<'a, scout_client::Result<Candidate>>;
}

pub trait RankingProvider
where
	Self: Send + Sync,
{
	fn rank<'a>(
		&'a self,
		cfg: &'a AiProviderConfig,
		query: &'a str,
		summaries: &'a [CandidateSummary],
	) -> BoxFuture<'a, scout_providers::Result<Vec<String>>>;
}

pub trait ReportProvider
where
	Self: Send + Sync,
{
	fn generate<'a>(
		&'a self,
		cfg: &'a AiProviderConfig,
		token: &'a Candidate,
		context: Option<&'a str>,
	) -> BoxFuture<'a, scout_providers::Result<Report>>;
}

#[derive(Clone)]
pub struct Providers {
	pub keywords: Arc<dyn KeywordProvider>,
	pub retrieval: Arc<dyn RetrievalProvider>,
	pub ranking: Arc<dyn RankingProvider>,
	pub report: Arc<dyn ReportProvider>,
}
impl Providers {
	pub fn new(
		keywords: Arc<dyn KeywordProvider>,
		retrieval: Arc<dyn RetrievalProvider>,
		ranking: Arc<dyn RankingProvider>,
		report: Arc<dyn ReportProvider>,
	) -> Self {
		Self { keywords, retrieval, ranking, report }
	}

	/// AI calls go to the configured generation endpoint; retrieval goes through `client`.
	pub fn backed_by(client: RequestClient) -> Self {
		let ai = Arc::new(DefaultProviders);

		Self {
			keywords: ai.clone(),
			retrieval: Arc::new(BackendRetrieval { client }),
			ranking: ai.clone(),
			report: ai,
		}
	}
}

struct DefaultProviders;
impl KeywordProvider for DefaultProviders {
	fn extract<'a>(
		&'a self,
		cfg: &'a AiProviderConfig,
		query: &'a str,
	) -> BoxFuture<'a, scout_providers::Result<Vec<String>>> {
		Box::pin(keywords::extract_keywords(cfg, query))
	}
}
impl RankingProvider for DefaultProviders {
	fn rank<'a>(
		&'a self,
		cfg: &'a AiProviderConfig,
		query: &'a str,
		summaries: &'a [CandidateSummary],
	) -> BoxFuture<'a, scout_providers::Result<Vec<String>>> {
		Box::pin(ranking::rank(cfg, query, summaries))
	}
}
impl ReportProvider for DefaultProviders {
	fn generate<'a>(
		&'a self,
		cfg: &'a AiProviderConfig,
		token: &'a Candidate,
		context: Option<&'a str>,
	) -> BoxFuture<'a, scout_providers::Result<Report>> {
		Box::pin(scout_providers::report::generate_report(cfg, token, context))
	}
}

struct BackendRetrieval {
	client: RequestClient,
}
impl RetrievalProvider for BackendRetrieval {
	fn search<'a>(
		&'a self,
		query: &'a str,
		original_query: &'a str,
		top_k: u32,
		filters: &'a SearchFilters,
	) -> BoxFuture<'a, scout_client::Result<Vec<Candidate>>> {
		Box::pin(async move {
			let req =
				scout_client::backend::SearchRequest { query, original_query, top_k, filters };

			self.client.search(&req).await
		})
	}

	fn token_details<'a>(&'a self, id: &'a str) -> BoxFuture<'a, scout_client::Result<Candidate>> {
		Box::pin(self.client.token_details(id))
	}
}
