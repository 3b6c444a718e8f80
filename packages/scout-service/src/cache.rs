//! In-process result cache with read-time expiry.

use std::{
	collections::HashMap,
	sync::{Arc, Mutex},
	time::Duration,
};

use time::OffsetDateTime;

use crate::{Error, Result};
use scout_domain::{Candidate, SearchFilters};

const SEARCH_CACHE_SCHEMA_VERSION: i32 = 1;

pub trait Clock
where
	Self: Send + Sync,
{
	fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
	now: Mutex<OffsetDateTime>,
}
impl ManualClock {
	pub fn new(start: OffsetDateTime) -> Self {
		Self { now: Mutex::new(start) }
	}

	pub fn advance(&self, by: Duration) {
		let mut now = self.now.lock().unwrap_or_else(|err| err.into_inner());

		*now += by;
	}
}
impl Clock for ManualClock {
	fn now(&self) -> OffsetDateTime {
		*self.now.lock().unwrap_or_else(|err| err.into_inner())
	}
}

#[derive(Debug, Clone)]
struct CacheEntry {
	results: Vec<Candidate>,
	created_at: OffsetDateTime,
	ttl: Duration,
}
impl CacheEntry {
	fn is_fresh(&self, now: OffsetDateTime) -> bool {
		now - self.created_at < self.ttl
	}
}

/// Search results keyed by [`cache_key`]. Expired entries are dropped when read.
pub struct ResultCache {
	clock: Arc<dyn Clock>,
	default_ttl: Duration,
	entries: Mutex<HashMap<String, CacheEntry>>,
}
impl ResultCache {
	pub fn new(default_ttl: Duration) -> Self {
		Self::with_clock(default_ttl, Arc::new(SystemClock))
	}

	pub fn with_clock(default_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
		Self { clock, default_ttl, entries: Mutex::new(HashMap::new()) }
	}

	pub fn get(&self, key: &str) -> Option<Vec<Candidate>> {
		let now = self.clock.now();
		let mut entries = self.lock();
		let fresh = entries.get(key).map(|entry| entry.is_fresh(now))?;

		if !fresh {
			entries.remove(key);

			return None;
		}

		entries.get(key).map(|entry| entry.results.clone())
	}

	pub fn set(&self, key: impl Into<String>, results: Vec<Candidate>) {
		self.set_with_ttl(key, results, self.default_ttl);
	}

	pub fn set_with_ttl(&self, key: impl Into<String>, results: Vec<Candidate>, ttl: Duration) {
		let entry = CacheEntry { results, created_at: self.clock.now(), ttl };

		self.lock().insert(key.into(), entry);
	}

	pub fn clear(&self) {
		self.lock().clear();
	}

	/// Stored entries, including expired ones that have not been read since expiring.
	pub fn len(&self) -> usize {
		self.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
		self.entries.lock().unwrap_or_else(|err| err.into_inner())
	}
}

/// Derives the cache key for a search. Equivalent queries and filters map to the same key.
pub fn cache_key(query: &str, filters: &SearchFilters, top_k: u32) -> Result<String> {
	let payload = serde_json::json!({
		"kind": "search",
		"schema_version": SEARCH_CACHE_SCHEMA_VERSION,
		"query": scout_domain::normalize_query(query),
		"filters": filters.normalized(),
		"top_k": top_k,
	});
	let raw = serde_json::to_vec(&payload).map_err(|err| Error::InvalidRequest {
		message: format!("Failed to encode cache key payload: {err}"),
	})?;

	Ok(blake3::hash(&raw).to_hex().to_string())
}

pub fn cache_key_prefix(key: &str) -> &str {
	let len = key.len().min(12);

	&key[..len]
}
