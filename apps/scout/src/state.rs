use std::{sync::Arc, time::Duration};

use scout_client::{RequestClient, SessionManager};
use scout_config::Config;
use scout_service::{Preferences, Providers, ReportService, ResultCache, SearchPipeline};
use scout_storage::{FileStore, KvStore};

pub struct AppState {
	pub config: Config,
	pub session: SessionManager,
	pub pipeline: Arc<SearchPipeline>,
	pub reports: ReportService,
	pub preferences: Preferences,
}
impl AppState {
	pub fn new(config: Config) -> color_eyre::Result<Self> {
		let store: Arc<dyn KvStore> = Arc::new(FileStore::open(config.storage.path.clone())?);
		let client = RequestClient::new(&config.api, &config.retry)?;
		let session =
			SessionManager::new(store.clone(), client.clone(), config.service.is_production());
		let providers = Providers::backed_by(client);
		let cache = Arc::new(ResultCache::new(Duration::from_millis(config.search.cache_ttl_ms)));
		let pipeline = Arc::new(SearchPipeline::from_config(&config, providers.clone(), cache));
		let reports = ReportService::new(config.ai.clone(), providers);
		let preferences = Preferences::new(store);

		Ok(Self { config, session, pipeline, reports, preferences })
	}
}
