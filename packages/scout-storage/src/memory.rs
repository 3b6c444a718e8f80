use std::{collections::HashMap, sync::Mutex};

use crate::{Change, KvStore, Result};

#[derive(Debug, Default)]
pub struct MemoryStore {
	entries: Mutex<HashMap<String, String>>,
}
impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.entries.lock().unwrap_or_else(|err| err.into_inner()).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
impl KvStore for MemoryStore {
	fn get(&self, key: &str) -> Result<Option<String>> {
		Ok(self.entries.lock().unwrap_or_else(|err| err.into_inner()).get(key).cloned())
	}

	fn set(&self, key: &str, value: &str) -> Result<()> {
		self.entries
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.insert(key.to_string(), value.to_string());

		Ok(())
	}

	fn remove(&self, key: &str) -> Result<()> {
		self.entries.lock().unwrap_or_else(|err| err.into_inner()).remove(key);

		Ok(())
	}

	fn apply(&self, changes: &[Change]) -> Result<()> {
		let mut entries = self.entries.lock().unwrap_or_else(|err| err.into_inner());

		for change in changes {
			match change {
				Change::Set { key, value } => {
					entries.insert(key.clone(), value.clone());
				},
				Change::Remove { key } => {
					entries.remove(key);
				},
			}
		}

		Ok(())
	}
}
