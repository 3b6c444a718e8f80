use std::{
	collections::BTreeMap,
	fs, io,
	path::{Path, PathBuf},
	sync::Mutex,
};

use crate::{Change, Error, KvStore, Result};

/// Key-value store persisted as one JSON object. Every mutation rewrites the file through a
/// temporary sibling and a rename, so readers never observe a partial write.
#[derive(Debug)]
pub struct FileStore {
	path: PathBuf,
	entries: Mutex<BTreeMap<String, String>>,
}
impl FileStore {
	pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
		let path = path.into();
		let entries = match fs::read_to_string(&path) {
			Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
			Ok(raw) => serde_json::from_str(&raw)?,
			Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
			Err(err) => return Err(Error::Io { path, source: err }),
		};

		tracing::debug!(path = %path.display(), entries = entries.len(), "Opened file store.");

		Ok(Self { path, entries: Mutex::new(entries) })
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
		let data = serde_json::to_string_pretty(entries)?;
		let tmp_path = self.path.with_extension("json.tmp");

		if let Some(parent) = self.path.parent()
			&& !parent.as_os_str().is_empty()
		{
			fs::create_dir_all(parent)
				.map_err(|err| Error::Io { path: parent.to_path_buf(), source: err })?;
		}

		fs::write(&tmp_path, data).map_err(|err| Error::Io { path: tmp_path.clone(), source: err })?;
		fs::rename(&tmp_path, &self.path)
			.map_err(|err| Error::Io { path: self.path.clone(), source: err })?;

		Ok(())
	}
}
impl KvStore for FileStore {
	fn get(&self, key: &str) -> Result<Option<String>> {
		Ok(self.entries.lock().unwrap_or_else(|err| err.into_inner()).get(key).cloned())
	}

	fn set(&self, key: &str, value: &str) -> Result<()> {
		self.apply(&[Change::set(key, value)])
	}

	fn remove(&self, key: &str) -> Result<()> {
		self.apply(&[Change::remove(key)])
	}

	fn apply(&self, changes: &[Change]) -> Result<()> {
		let mut entries = self.entries.lock().unwrap_or_else(|err| err.into_inner());
		let mut next = entries.clone();

		for change in changes {
			match change {
				Change::Set { key, value } => {
					next.insert(key.clone(), value.clone());
				},
				Change::Remove { key } => {
					next.remove(key);
				},
			}
		}

		self.persist(&next)?;

		*entries = next;

		Ok(())
	}
}
