use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub api: Api,
	#[serde(default)]
	pub retry: Retry,
	pub ai: AiProviderConfig,
	#[serde(default)]
	pub search: Search,
	pub storage: Storage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub log_level: String,
	/// Either "development" or "production". Development builds may fabricate a local session
	/// when the auth backend is unreachable.
	#[serde(default = "default_environment")]
	pub environment: String,
}
impl Service {
	pub fn is_production(&self) -> bool {
		self.environment == "production"
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Api {
	pub base_url: String,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Retry {
	/// Total attempts, including the first one.
	pub attempts: u32,
	pub base_delay_ms: u64,
}
impl Default for Retry {
	fn default() -> Self {
		Self { attempts: 3, base_delay_ms: 1_000 }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub path: String,
	/// Optional. Blank keys are normalized to `None`; every AI call then fails locally and the
	/// search pipeline degrades to its heuristics.
	#[serde(default)]
	pub api_key: Option<String>,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Search {
	pub debounce_ms: u64,
	pub cache_ttl_ms: u64,
	pub default_top_k: u32,
	pub summary_description_chars: u32,
	pub fallback_keyword_limit: u32,
	/// Serve the fixed fallback candidates when the whole pipeline fails. The originating error is
	/// reported either way.
	pub serve_fallback: bool,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			debounce_ms: 300,
			cache_ttl_ms: 300_000,
			default_top_k: 10,
			summary_description_chars: 200,
			fallback_keyword_limit: 5,
			serve_fallback: true,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub path: std::path::PathBuf,
}

fn default_environment() -> String {
	"development".to_string()
}

fn default_timeout_ms() -> u64 {
	30_000
}
