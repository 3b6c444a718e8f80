use std::{
	sync::{
		Arc, Mutex,
		atomic::{AtomicU64, Ordering},
	},
	time::Duration,
};

use tokio::{sync::watch, task::JoinHandle};

use crate::{Debouncer, Error, ResultCache, ResultSource, RunToken, SearchMode, SearchPipeline};
use scout_domain::{Candidate, SearchFilters};

/// What a search UI needs to render.
#[derive(Debug, Clone, Default)]
pub struct SearchSnapshot {
	pub query: String,
	pub filters: SearchFilters,
	pub results: Vec<Candidate>,
	pub is_loading: bool,
	pub has_searched: bool,
	pub error: Option<Arc<Error>>,
	pub source: Option<ResultSource>,
	/// Sequence number of the run that produced `results`.
	pub sequence: u64,
}

/// Stateful front of a [`SearchPipeline`]. Only the most recently issued run may commit.
///
/// A manual search, a refresh or a clear discards any query still waiting in the debouncer.
pub struct SearchController {
	inner: Arc<Inner>,
	debouncer: Debouncer<(u64, String)>,
	pump: JoinHandle<()>,
}
impl SearchController {
	/// Must be called inside a tokio runtime.
	pub fn new(pipeline: Arc<SearchPipeline>, debounce: Duration) -> Self {
		let (latest, _) = watch::channel(0);
		let (state, _) = watch::channel(SearchSnapshot::default());
		let inner = Arc::new(Inner {
			pipeline,
			sequence: AtomicU64::new(0),
			latest,
			state,
			generation: Mutex::new(0),
		});
		let (debouncer, mut emissions) = Debouncer::new(debounce);
		let pump_inner = inner.clone();
		let pump = tokio::spawn(async move {
			while let Some((generation, query)) = emissions.recv().await {
				let filters = pump_inner.state.borrow().filters.clone();
				let Some(token) = pump_inner.issue_debounced(generation) else {
					continue;
				};

				tokio::spawn(pump_inner.clone().run(query, filters, SearchMode::Auto, token));
			}
		});

		Self { inner, debouncer, pump }
	}

	/// Records the query and schedules a debounced, cache-consulting search.
	pub fn set_query(&self, text: impl Into<String>) {
		let text = text.into();

		self.inner.state.send_modify(|state| state.query = text.clone());

		let generation = self.inner.next_generation();

		if !self.debouncer.push((generation, text)) {
			tracing::warn!("Search debouncer stopped. Query not scheduled.");
		}
	}

	/// Filters used by later debounced searches.
	pub fn set_filters(&self, filters: SearchFilters) {
		self.inner.state.send_modify(|state| state.filters = filters);
	}

	/// Runs a fresh search immediately, bypassing the cache.
	pub async fn search(&self, text: impl Into<String>, filters: SearchFilters) -> SearchSnapshot {
		let text = text.into();

		self.inner.state.send_modify(|state| {
			state.query = text.clone();
			state.filters = filters.clone();
		});

		let token = self.issue_manual();

		self.inner.clone().run(text, filters, SearchMode::Manual, token).await
	}

	/// Re-runs the current query and filters, bypassing the cache.
	pub async fn refresh(&self) -> SearchSnapshot {
		let (query, filters) = {
			let state = self.inner.state.borrow();

			(state.query.clone(), state.filters.clone())
		};
		let token = self.issue_manual();

		self.inner.clone().run(query, filters, SearchMode::Manual, token).await
	}

	/// Resets query, filters, results and error. Pending and in-flight runs are dropped.
	pub fn clear_search(&self) {
		let token = self.issue_manual();

		self.inner.state.send_modify(|state| {
			*state = SearchSnapshot { sequence: token.sequence(), ..Default::default() };
		});
	}

	pub fn clear_cache(&self) {
		self.cache().clear();
	}

	pub fn cache(&self) -> &Arc<ResultCache> {
		self.inner.pipeline.cache()
	}

	pub fn snapshot(&self) -> SearchSnapshot {
		self.inner.state.borrow().clone()
	}

	/// Notified on every state change.
	pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
		self.inner.state.subscribe()
	}

	/// Sequence number of the most recently issued run.
	pub fn latest_sequence(&self) -> u64 {
		*self.inner.latest.borrow()
	}

	fn issue_manual(&self) -> RunToken {
		if !self.debouncer.cancel() {
			tracing::warn!("Search debouncer stopped. Nothing to cancel.");
		}

		self.inner.next_generation();

		self.inner.issue()
	}
}
impl Drop for SearchController {
	fn drop(&mut self) {
		self.pump.abort();
		self.inner.issue();
	}
}

struct Inner {
	pipeline: Arc<SearchPipeline>,
	sequence: AtomicU64,
	latest: watch::Sender<u64>,
	state: watch::Sender<SearchSnapshot>,
	/// Bumped by every typed query and every manual action. A debounced emission only runs while
	/// its generation is still current.
	generation: Mutex<u64>,
}
impl Inner {
	fn next_generation(&self) -> u64 {
		let mut generation = self.generation.lock().unwrap_or_else(|err| err.into_inner());

		*generation += 1;

		*generation
	}

	fn issue_debounced(&self, generation: u64) -> Option<RunToken> {
		let current = self.generation.lock().unwrap_or_else(|err| err.into_inner());

		if *current != generation {
			tracing::debug!(generation, current = *current, "Debounced query is stale. Skipping.");

			return None;
		}

		Some(self.issue())
	}

	fn issue(&self) -> RunToken {
		let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;

		// Concurrent issuers may publish out of order; the highest number wins.
		self.latest.send_modify(|latest| *latest = (*latest).max(sequence));

		RunToken::new(sequence, self.latest.subscribe())
	}

	async fn run(
		self: Arc<Self>,
		query: String,
		filters: SearchFilters,
		mode: SearchMode,
		token: RunToken,
	) -> SearchSnapshot {
		let sequence = token.sequence();
		let req = crate::SearchRequest { query, filters, top_k: None, mode };

		self.state.send_if_modified(|state| {
			let current = *self.latest.borrow() == sequence;

			if current {
				state.is_loading = true;
			}

			current
		});

		let Some(outcome) = self.pipeline.search_as(&req, token).await else {
			return self.state.borrow().clone();
		};

		self.state.send_if_modified(|state| {
			if *self.latest.borrow() != sequence {
				tracing::info!(sequence, "Search finished after being superseded. Not committing.");

				return false;
			}

			state.results = outcome.results;
			state.error = outcome.error;
			state.source = Some(outcome.source);
			state.has_searched = outcome.source != ResultSource::Empty;
			state.is_loading = false;
			state.sequence = sequence;

			true
		});

		self.state.borrow().clone()
	}
}
