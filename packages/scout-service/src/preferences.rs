//! Search history, favorites and saved reports kept in the local key-value store.

use std::sync::Arc;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Clock, Error, Result, SystemClock};
use scout_domain::{Candidate, Report};
use scout_storage::{KvStore, keys};

pub const MAX_HISTORY: usize = 10;
pub const DEFAULT_FOLDER_ID: &str = "default";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteToken {
	pub id: String,
	pub symbol: String,
	pub name: String,
	#[serde(default)]
	pub logo: String,
	#[serde(with = "time::serde::rfc3339")]
	pub added_at: OffsetDateTime,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFolder {
	pub id: String,
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	/// Newest first.
	#[serde(default)]
	pub reports: Vec<SavedReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedReport {
	pub id: String,
	pub token_id: String,
	pub token_symbol: String,
	pub token_name: String,
	pub report_data: Report,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	pub folder_id: String,
	pub title: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub notes: Option<String>,
}

pub struct Preferences {
	store: Arc<dyn KvStore>,
	clock: Arc<dyn Clock>,
}
impl Preferences {
	pub fn new(store: Arc<dyn KvStore>) -> Self {
		Self::with_clock(store, Arc::new(SystemClock))
	}

	pub fn with_clock(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>) -> Self {
		Self { store, clock }
	}

	/// Most recent first.
	pub fn history(&self) -> Result<Vec<String>> {
		self.read_list(keys::SEARCH_HISTORY)
	}

	/// Moves `query` to the front, dropping older copies of the exact same string and anything past
	/// the tenth entry. Blank queries are ignored.
	pub fn add_history(&self, query: &str) -> Result<Vec<String>> {
		let mut history = self.history()?;

		if query.trim().is_empty() {
			return Ok(history);
		}

		history.retain(|item| item != query);
		history.insert(0, query.to_string());
		history.truncate(MAX_HISTORY);

		self.write(keys::SEARCH_HISTORY, &history)?;

		Ok(history)
	}

	pub fn remove_history(&self, query: &str) -> Result<Vec<String>> {
		let mut history = self.history()?;

		history.retain(|item| item != query);

		self.write(keys::SEARCH_HISTORY, &history)?;

		Ok(history)
	}

	pub fn clear_history(&self) -> Result<()> {
		Ok(self.store.remove(keys::SEARCH_HISTORY)?)
	}

	/// Newest first.
	pub fn favorites(&self) -> Result<Vec<FavoriteToken>> {
		self.read_list(keys::FAVORITES)
	}

	pub fn add_favorite(&self, token: &Candidate, notes: Option<String>) -> Result<FavoriteToken> {
		let favorite = FavoriteToken {
			id: token.id.clone(),
			symbol: token.symbol.clone(),
			name: token.name.clone(),
			logo: token.logo.clone(),
			added_at: self.clock.now(),
			notes,
		};
		let mut favorites = self.favorites()?;

		favorites.retain(|existing| existing.id != favorite.id);
		favorites.insert(0, favorite.clone());

		self.write(keys::FAVORITES, &favorites)?;

		Ok(favorite)
	}

	/// Returns whether an entry was removed.
	pub fn remove_favorite(&self, token_id: &str) -> Result<bool> {
		let mut favorites = self.favorites()?;
		let before = favorites.len();

		favorites.retain(|existing| existing.id != token_id);

		if favorites.len() == before {
			return Ok(false);
		}

		self.write(keys::FAVORITES, &favorites)?;

		Ok(true)
	}

	pub fn is_favorite(&self, token_id: &str) -> Result<bool> {
		Ok(self.favorites()?.iter().any(|favorite| favorite.id == token_id))
	}

	/// Stored folders, or just the default folder when nothing has been saved yet.
	pub fn report_folders(&self) -> Result<Vec<ReportFolder>> {
		let stored: Option<Vec<ReportFolder>> =
			scout_storage::read_json(self.store.as_ref(), keys::REPORT_FOLDERS)?;

		Ok(stored.unwrap_or_else(|| vec![self.default_folder()]))
	}

	pub fn create_folder(&self, name: &str, description: Option<String>) -> Result<ReportFolder> {
		let name = name.trim();

		if name.is_empty() {
			return Err(Error::InvalidRequest {
				message: "Folder name must be non-empty.".to_string(),
			});
		}

		let folder = ReportFolder {
			id: Uuid::new_v4().to_string(),
			name: name.to_string(),
			description,
			created_at: self.clock.now(),
			reports: Vec::new(),
		};
		let mut folders = self.report_folders()?;

		folders.push(folder.clone());

		self.write(keys::REPORT_FOLDERS, &folders)?;

		Ok(folder)
	}

	pub fn delete_folder(&self, folder_id: &str) -> Result<()> {
		if folder_id == DEFAULT_FOLDER_ID {
			return Err(Error::InvalidRequest {
				message: "The default folder cannot be deleted.".to_string(),
			});
		}

		let mut folders = self.report_folders()?;
		let before = folders.len();

		folders.retain(|folder| folder.id != folder_id);

		if folders.len() == before {
			return Err(Error::NotFound { message: format!("Report folder {folder_id}.") });
		}

		self.write(keys::REPORT_FOLDERS, &folders)
	}

	/// Saves `report` at the front of a folder (the default folder when `folder_id` is `None`).
	pub fn save_report(
		&self,
		report: &Report,
		folder_id: Option<&str>,
		title: Option<&str>,
		notes: Option<String>,
	) -> Result<SavedReport> {
		let folder_id = folder_id.unwrap_or(DEFAULT_FOLDER_ID);
		let mut folders = self.report_folders()?;
		let Some(folder) = folders.iter_mut().find(|folder| folder.id == folder_id) else {
			return Err(Error::NotFound { message: format!("Report folder {folder_id}.") });
		};
		let title = match title.map(str::trim) {
			Some(title) if !title.is_empty() => title.to_string(),
			_ => format!("{} research report", report.token_symbol),
		};
		let saved = SavedReport {
			id: Uuid::new_v4().to_string(),
			token_id: report.token_id.clone(),
			token_symbol: report.token_symbol.clone(),
			token_name: report.token_name.clone(),
			report_data: report.clone(),
			created_at: self.clock.now(),
			folder_id: folder_id.to_string(),
			title,
			notes,
		};

		folder.reports.insert(0, saved.clone());

		self.write(keys::REPORT_FOLDERS, &folders)?;

		Ok(saved)
	}

	/// Removes the report from whichever folder holds it. Returns whether anything was removed.
	pub fn delete_report(&self, report_id: &str) -> Result<bool> {
		let mut folders = self.report_folders()?;
		let mut removed = false;

		for folder in &mut folders {
			let before = folder.reports.len();

			folder.reports.retain(|report| report.id != report_id);

			removed |= folder.reports.len() != before;
		}

		if removed {
			self.write(keys::REPORT_FOLDERS, &folders)?;
		}

		Ok(removed)
	}

	/// Reports in one folder, or in every folder (folder order, then newest first).
	pub fn saved_reports(&self, folder_id: Option<&str>) -> Result<Vec<SavedReport>> {
		let folders = self.report_folders()?;
		let reports = match folder_id {
			Some(folder_id) => folders
				.into_iter()
				.find(|folder| folder.id == folder_id)
				.map(|folder| folder.reports)
				.unwrap_or_default(),
			None => folders.into_iter().flat_map(|folder| folder.reports).collect(),
		};

		Ok(reports)
	}

	fn default_folder(&self) -> ReportFolder {
		ReportFolder {
			id: DEFAULT_FOLDER_ID.to_string(),
			name: "Default".to_string(),
			description: Some("Default save location".to_string()),
			created_at: self.clock.now(),
			reports: Vec::new(),
		}
	}

	fn read_list<T>(&self, key: &str) -> Result<Vec<T>>
	where
		T: DeserializeOwned,
	{
		Ok(scout_storage::read_json(self.store.as_ref(), key)?.unwrap_or_default())
	}

	fn write<T>(&self, key: &str, value: &T) -> Result<()>
	where
		T: Serialize + ?Sized,
	{
		Ok(scout_storage::write_json(self.store.as_ref(), key, value)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ManualClock;
	use scout_storage::MemoryStore;

	fn preferences() -> Preferences {
		Preferences::with_clock(
			Arc::new(MemoryStore::new()),
			Arc::new(ManualClock::new(OffsetDateTime::UNIX_EPOCH)),
		)
	}

	#[test]
	fn history_keeps_ten_newest_without_duplicates() {
		let prefs = preferences();

		for index in 0..12 {
			prefs.add_history(&format!("query {index}")).expect("add failed");
		}

		prefs.add_history("query 5").expect("add failed");
		prefs.add_history("   ").expect("add failed");

		let history = prefs.history().expect("history failed");

		assert_eq!(history.len(), MAX_HISTORY);
		assert_eq!(history[0], "query 5");
		assert_eq!(history[1], "query 11");
		assert_eq!(history.iter().filter(|item| *item == "query 5").count(), 1);
		assert!(!history.contains(&"query 0".to_string()));
	}

	#[test]
	fn history_deduplicates_by_exact_string() {
		let prefs = preferences();

		prefs.add_history("defi").expect("add failed");
		prefs.add_history(" defi").expect("add failed");

		assert_eq!(
			prefs.history().expect("history failed"),
			vec![" defi".to_string(), "defi".to_string()]
		);
	}

	#[test]
	fn favorites_replace_existing_entry() {
		let prefs = preferences();
		let token = Candidate::new("2", "LINK", "Chainlink");

		prefs.add_favorite(&token, None).expect("add failed");
		prefs.add_favorite(&Candidate::new("1", "MATIC", "Polygon"), None).expect("add failed");
		prefs.add_favorite(&token, Some("oracle".to_string())).expect("add failed");

		let favorites = prefs.favorites().expect("favorites failed");

		assert_eq!(favorites.len(), 2);
		assert_eq!(favorites[0].id, "2");
		assert_eq!(favorites[0].notes.as_deref(), Some("oracle"));
		assert!(prefs.is_favorite("1").expect("lookup failed"));
		assert!(prefs.remove_favorite("1").expect("remove failed"));
		assert!(!prefs.remove_favorite("1").expect("remove failed"));
	}

	#[test]
	fn default_folder_is_seeded_and_protected() {
		let prefs = preferences();
		let folders = prefs.report_folders().expect("folders failed");

		assert_eq!(folders.len(), 1);
		assert_eq!(folders[0].id, DEFAULT_FOLDER_ID);

		let err = prefs.delete_folder(DEFAULT_FOLDER_ID).expect_err("Expected refusal.");

		assert!(matches!(err, Error::InvalidRequest { .. }));
	}

	#[test]
	fn reports_are_saved_newest_first_and_deleted_across_folders() {
		let prefs = preferences();
		let token = Candidate::new("2", "LINK", "Chainlink");
		let report = Report::fallback(&token, OffsetDateTime::UNIX_EPOCH);
		let folder = prefs.create_folder("Oracles", None).expect("create failed");
		let first = prefs.save_report(&report, None, None, None).expect("save failed");
		let second = prefs
			.save_report(&report, Some(&folder.id), Some("Deep dive"), None)
			.expect("save failed");
		let third = prefs.save_report(&report, None, Some("  "), None).expect("save failed");

		assert_eq!(first.title, "LINK research report");
		assert_eq!(second.title, "Deep dive");

		let defaults = prefs.saved_reports(Some(DEFAULT_FOLDER_ID)).expect("list failed");

		assert_eq!(
			defaults.iter().map(|report| report.id.as_str()).collect::<Vec<_>>(),
			vec![third.id.as_str(), first.id.as_str()]
		);
		assert_eq!(prefs.saved_reports(None).expect("list failed").len(), 3);
		assert!(prefs.delete_report(&second.id).expect("delete failed"));
		assert!(prefs.saved_reports(Some(&folder.id)).expect("list failed").is_empty());

		let err =
			prefs.save_report(&report, Some("missing"), None, None).expect_err("Expected error.");

		assert!(matches!(err, Error::NotFound { .. }));
	}
}
