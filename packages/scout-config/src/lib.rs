mod error;
mod types;

pub use error::{Error, Result};
pub use types::{AiProviderConfig, Api, Config, Retry, Search, Service, Storage};

use std::{env, fs, path::Path};

pub const ENV_API_BASE_URL: &str = "SCOUT_API_BASE_URL";
pub const ENV_AI_API_KEY: &str = "SCOUT_AI_API_KEY";

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	apply_env_overrides(&mut cfg)?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if !matches!(cfg.service.environment.as_str(), "development" | "production") {
		return Err(Error::Validation {
			message: "service.environment must be one of development or production.".to_string(),
		});
	}
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}

	for (label, url) in [("api.base_url", &cfg.api.base_url), ("ai.api_base", &cfg.ai.api_base)] {
		if !(url.starts_with("http://") || url.starts_with("https://")) {
			return Err(Error::Validation {
				message: format!("{label} must be an http or https URL."),
			});
		}
	}

	if !cfg.ai.path.starts_with('/') {
		return Err(Error::Validation { message: "ai.path must start with '/'.".to_string() });
	}
	if cfg.api.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "api.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.ai.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "ai.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.retry.attempts == 0 {
		return Err(Error::Validation {
			message: "retry.attempts must be greater than zero.".to_string(),
		});
	}
	if cfg.retry.attempts > 10 {
		return Err(Error::Validation {
			message: "retry.attempts must be 10 or less.".to_string(),
		});
	}
	if cfg.search.debounce_ms == 0 {
		return Err(Error::Validation {
			message: "search.debounce_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.search.cache_ttl_ms == 0 {
		return Err(Error::Validation {
			message: "search.cache_ttl_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.search.default_top_k == 0 {
		return Err(Error::Validation {
			message: "search.default_top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.search.summary_description_chars == 0 {
		return Err(Error::Validation {
			message: "search.summary_description_chars must be greater than zero.".to_string(),
		});
	}

	for (key, value) in &cfg.ai.default_headers {
		if !value.is_string() {
			return Err(Error::Validation {
				message: format!("ai.default_headers.{key} must be a string."),
			});
		}
	}

	if cfg.storage.path.as_os_str().is_empty() {
		return Err(Error::Validation { message: "storage.path must be non-empty.".to_string() });
	}

	Ok(())
}

fn apply_env_overrides(cfg: &mut Config) -> Result<()> {
	if let Some(url) = read_env(ENV_API_BASE_URL)? {
		cfg.api.base_url = url;
	}
	if let Some(key) = read_env(ENV_AI_API_KEY)? {
		cfg.ai.api_key = Some(key);
	}

	Ok(())
}

fn read_env(name: &str) -> Result<Option<String>> {
	match env::var(name) {
		Ok(value) => Ok(Some(value)),
		Err(env::VarError::NotPresent) => Ok(None),
		Err(env::VarError::NotUnicode(_)) => Err(Error::InvalidEnv { name: name.to_string() }),
	}
}

fn normalize(cfg: &mut Config) {
	cfg.service.environment = cfg.service.environment.trim().to_ascii_lowercase();

	while cfg.api.base_url.ends_with('/') {
		cfg.api.base_url.pop();
	}
	while cfg.ai.api_base.ends_with('/') {
		cfg.ai.api_base.pop();
	}

	if cfg.ai.api_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false) {
		cfg.ai.api_key = None;
	}
}
