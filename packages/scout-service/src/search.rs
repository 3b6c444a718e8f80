use std::{
	convert::Infallible,
	future::Future,
	sync::Arc,
	time::{Duration, Instant},
};

use tokio::sync::watch;

use crate::{
	BoxFuture, Error, Providers, ResultCache,
	cache::{self, cache_key_prefix},
};
use scout_config::{AiProviderConfig, Config};
use scout_domain::{
	Candidate, SearchFilters, candidate, fallback, keywords, normalize_query, ranking,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchMode {
	/// Debounced search. Consults the cache first.
	#[default]
	Auto,
	/// Explicit user action. Always runs the full pipeline.
	Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSource {
	/// Blank query; nothing was run.
	Empty,
	Cache,
	Pipeline,
	/// The pipeline failed and the fixed fallback set (or nothing) was served.
	Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
	CacheLookup,
	ExtractKeywords,
	Retrieve,
	Rerank,
	Truncate,
	CacheStore,
}
impl Stage {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::CacheLookup => "cache_lookup",
			Self::ExtractKeywords => "extract_keywords",
			Self::Retrieve => "retrieve",
			Self::Rerank => "rerank",
			Self::Truncate => "truncate",
			Self::CacheStore => "cache_store",
		}
	}
}

/// A stage that failed and fell back to local behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Degradation {
	pub stage: Stage,
	pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMetrics {
	pub query: String,
	pub result_count: usize,
	pub duration: Duration,
	pub cache_hit: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
	pub query: String,
	pub filters: SearchFilters,
	/// Defaults to `search.default_top_k`.
	pub top_k: Option<u32>,
	pub mode: SearchMode,
}
impl SearchRequest {
	pub fn new(query: impl Into<String>) -> Self {
		Self { query: query.into(), ..Default::default() }
	}

	pub fn with_filters(mut self, filters: SearchFilters) -> Self {
		self.filters = filters;

		self
	}

	pub fn with_top_k(mut self, top_k: u32) -> Self {
		self.top_k = Some(top_k);

		self
	}

	pub fn manual(mut self) -> Self {
		self.mode = SearchMode::Manual;

		self
	}
}

/// Result of one run. `results` is always renderable; `error` carries the failure that forced a
/// fallback, if any. The two are independent.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
	pub query: String,
	pub results: Vec<Candidate>,
	pub source: ResultSource,
	pub error: Option<Arc<Error>>,
	pub degradations: Vec<Degradation>,
	pub metrics: SearchMetrics,
}

/// Lets a run notice that a newer run was issued after it.
#[derive(Debug, Clone)]
pub struct RunToken {
	sequence: u64,
	latest: watch::Receiver<u64>,
}
impl RunToken {
	pub fn new(sequence: u64, latest: watch::Receiver<u64>) -> Self {
		Self { sequence, latest }
	}

	pub fn sequence(&self) -> u64 {
		self.sequence
	}

	pub fn is_superseded(&self) -> bool {
		*self.latest.borrow() != self.sequence
	}

	async fn superseded(&mut self) {
		loop {
			if self.is_superseded() {
				return;
			}
			if self.latest.changed().await.is_err() {
				// Sender gone; nothing can supersede this run any more.
				std::future::pending::<()>().await;
			}
		}
	}
}

#[derive(Debug)]
struct Superseded;

/// How a run learns that it should stop early.
trait RunGuard
where
	Self: Send,
{
	type Stop: Send;

	fn check(&self) -> Result<(), Self::Stop>;

	/// Resolves once the run should stop.
	fn stopped(&mut self) -> BoxFuture<'_, Self::Stop>;
}

/// A run nothing can supersede.
struct Unguarded;
impl RunGuard for Unguarded {
	type Stop = Infallible;

	fn check(&self) -> Result<(), Infallible> {
		Ok(())
	}

	fn stopped(&mut self) -> BoxFuture<'_, Infallible> {
		Box::pin(std::future::pending())
	}
}

impl RunGuard for RunToken {
	type Stop = Superseded;

	fn check(&self) -> Result<(), Superseded> {
		if self.is_superseded() {
			tracing::info!(sequence = self.sequence, "Search superseded. Dropping run.");

			return Err(Superseded);
		}

		Ok(())
	}

	fn stopped(&mut self) -> BoxFuture<'_, Superseded> {
		Box::pin(async move {
			self.superseded().await;

			tracing::info!(sequence = self.sequence, "Search superseded. Dropping run.");

			Superseded
		})
	}
}

/// Keyword extraction, retrieval, reranking and truncation in front of a result cache.
pub struct SearchPipeline {
	cfg: scout_config::Search,
	ai: AiProviderConfig,
	providers: Providers,
	cache: Arc<ResultCache>,
}
impl SearchPipeline {
	pub fn new(
		cfg: scout_config::Search,
		ai: AiProviderConfig,
		providers: Providers,
		cache: Arc<ResultCache>,
	) -> Self {
		Self { cfg, ai, providers, cache }
	}

	pub fn from_config(cfg: &Config, providers: Providers, cache: Arc<ResultCache>) -> Self {
		Self::new(cfg.search.clone(), cfg.ai.clone(), providers, cache)
	}

	pub fn cache(&self) -> &Arc<ResultCache> {
		&self.cache
	}

	pub fn providers(&self) -> &Providers {
		&self.providers
	}

	/// Backend details for one token; `None` when the lookup fails for any reason.
	pub async fn token_details(&self, id: &str) -> Option<Candidate> {
		token_details(&self.providers, id).await
	}

	pub async fn search(&self, req: &SearchRequest) -> SearchOutcome {
		match self.run(req, &mut Unguarded).await {
			Ok(outcome) => outcome,
			Err(never) => match never {},
		}
	}

	/// Same as [`Self::search`], but stops at the next stage boundary or network call once `token`
	/// is superseded. A stopped run returns `None` and leaves the cache untouched.
	pub async fn search_as(
		&self,
		req: &SearchRequest,
		mut token: RunToken,
	) -> Option<SearchOutcome> {
		self.run(req, &mut token).await.ok()
	}

	async fn run<G>(&self, req: &SearchRequest, guard: &mut G) -> Result<SearchOutcome, G::Stop>
	where
		G: RunGuard,
	{
		let started = Instant::now();
		let query = normalize_query(&req.query);
		let top_k = req.top_k.unwrap_or(self.cfg.default_top_k).max(1);

		if query.is_empty() {
			return Ok(self.finish(Run {
				query,
				results: Vec::new(),
				source: ResultSource::Empty,
				error: None,
				degradations: Vec::new(),
				started,
			}));
		}

		let key = match cache::cache_key(&query, &req.filters, top_k) {
			Ok(key) => Some(key),
			Err(err) => {
				tracing::warn!(error = %err, "Cache key build failed.");

				None
			},
		};

		if req.mode == SearchMode::Auto
			&& let Some(key) = key.as_deref()
		{
			if let Some(results) = self.cache.get(key) {
				tracing::info!(cache_key_prefix = cache_key_prefix(key), hit = true, "Cache hit.");

				return Ok(self.finish(Run {
					query,
					results,
					source: ResultSource::Cache,
					error: None,
					degradations: Vec::new(),
					started,
				}));
			}

			tracing::info!(cache_key_prefix = cache_key_prefix(key), hit = false, "Cache miss.");
		}

		let mut degradations = Vec::new();
		let keywords = self.extract_keywords(&query, guard, &mut degradations).await?;
		let enhanced = keywords::enhanced_query(&keywords, &query);
		let retrieval_k = top_k.saturating_mul(2);
		let retrieved = guarded(
			guard,
			self.providers.retrieval.search(&enhanced, &query, retrieval_k, &req.filters),
		)
		.await?;
		let candidates = match retrieved {
			Ok(candidates) => candidates,
			Err(err) => {
				tracing::warn!(
					error = %err,
					stage = Stage::Retrieve.as_str(),
					serve_fallback = self.cfg.serve_fallback,
					"Search pipeline failed."
				);

				let results = if self.cfg.serve_fallback {
					fallback::fallback_candidates()
				} else {
					Vec::new()
				};

				return Ok(self.finish(Run {
					query,
					results,
					source: ResultSource::Fallback,
					error: Some(Arc::new(Error::from(err))),
					degradations,
					started,
				}));
			},
		};
		let mut results = self.rerank(&query, candidates, guard, &mut degradations).await?;

		results.truncate(top_k as usize);
		candidate::assign_ranks(&mut results);

		guard.check()?;

		if let Some(key) = key {
			self.cache.set(key, results.clone());
		}

		Ok(self.finish(Run {
			query,
			results,
			source: ResultSource::Pipeline,
			error: None,
			degradations,
			started,
		}))
	}

	async fn extract_keywords<G>(
		&self,
		query: &str,
		guard: &mut G,
		degradations: &mut Vec<Degradation>,
	) -> Result<Vec<String>, G::Stop>
	where
		G: RunGuard,
	{
		match guarded(guard, self.providers.keywords.extract(&self.ai, query)).await? {
			Ok(keywords) => Ok(keywords),
			Err(err) => {
				let keywords =
					keywords::fallback_keywords(query, self.cfg.fallback_keyword_limit as usize);

				tracing::warn!(
					error = %err,
					stage = Stage::ExtractKeywords.as_str(),
					fallback_count = keywords.len(),
					"Keyword extraction failed. Using vocabulary match."
				);

				degradations
					.push(Degradation { stage: Stage::ExtractKeywords, reason: err.to_string() });

				Ok(keywords)
			},
		}
	}

	async fn rerank<G>(
		&self,
		query: &str,
		candidates: Vec<Candidate>,
		guard: &mut G,
		degradations: &mut Vec<Degradation>,
	) -> Result<Vec<Candidate>, G::Stop>
	where
		G: RunGuard,
	{
		if candidates.len() < 2 {
			return Ok(candidates);
		}

		let summaries: Vec<_> = candidates
			.iter()
			.map(|candidate| candidate.summary(self.cfg.summary_description_chars as usize))
			.collect();

		match guarded(guard, self.providers.ranking.rank(&self.ai, query, &summaries)).await? {
			Ok(ids) => Ok(ranking::apply_ranking(candidates, &ids)),
			Err(err) => {
				tracing::warn!(
					error = %err,
					stage = Stage::Rerank.as_str(),
					"Reranking failed. Keeping retrieval order."
				);

				degradations.push(Degradation { stage: Stage::Rerank, reason: err.to_string() });

				Ok(candidates)
			},
		}
	}

	fn finish(&self, run: Run) -> SearchOutcome {
		let metrics = SearchMetrics {
			query: run.query.clone(),
			result_count: run.results.len(),
			duration: run.started.elapsed(),
			cache_hit: run.source == ResultSource::Cache,
		};

		tracing::info!(
			query = %metrics.query,
			result_count = metrics.result_count,
			duration_ms = metrics.duration.as_millis() as u64,
			cache_hit = metrics.cache_hit,
			degraded = !run.degradations.is_empty(),
			failed = run.error.is_some(),
			"Search completed."
		);

		SearchOutcome {
			query: run.query,
			results: run.results,
			source: run.source,
			error: run.error,
			degradations: run.degradations,
			metrics,
		}
	}
}

struct Run {
	query: String,
	results: Vec<Candidate>,
	source: ResultSource,
	error: Option<Arc<Error>>,
	degradations: Vec<Degradation>,
	started: Instant,
}

pub(crate) async fn token_details(providers: &Providers, id: &str) -> Option<Candidate> {
	match providers.retrieval.token_details(id).await {
		Ok(token) => Some(token),
		Err(err) => {
			tracing::warn!(error = %err, token_id = id, "Token details lookup failed.");

			None
		},
	}
}

async fn guarded<G, F>(guard: &mut G, fut: F) -> Result<F::Output, G::Stop>
where
	G: RunGuard,
	F: Future,
{
	guard.check()?;

	tokio::select! {
		biased;
		stop = guard.stopped() => Err(stop),
		output = fut => Ok(output),
	}
}
