pub mod file;
pub mod keys;
pub mod memory;

mod error;

pub use error::Error;
pub use file::FileStore;
pub use memory::MemoryStore;

pub type Result<T, E = Error> = std::result::Result<T, E>;

use serde::{Serialize, de::DeserializeOwned};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
	Set { key: String, value: String },
	Remove { key: String },
}
impl Change {
	pub fn set(key: impl Into<String>, value: impl Into<String>) -> Self {
		Self::Set { key: key.into(), value: value.into() }
	}

	pub fn remove(key: impl Into<String>) -> Self {
		Self::Remove { key: key.into() }
	}
}

/// String key-value persistence for client-side state.
pub trait KvStore
where
	Self: Send + Sync,
{
	fn get(&self, key: &str) -> Result<Option<String>>;

	fn set(&self, key: &str, value: &str) -> Result<()>;

	fn remove(&self, key: &str) -> Result<()>;

	/// Applies all changes as one unit. Backends that can persist a batch in a single write
	/// should override this.
	fn apply(&self, changes: &[Change]) -> Result<()> {
		for change in changes {
			match change {
				Change::Set { key, value } => self.set(key, value)?,
				Change::Remove { key } => self.remove(key)?,
			}
		}

		Ok(())
	}
}

pub fn read_json<T>(store: &dyn KvStore, key: &str) -> Result<Option<T>>
where
	T: DeserializeOwned,
{
	let Some(raw) = store.get(key)? else {
		return Ok(None);
	};

	serde_json::from_str(&raw)
		.map(Some)
		.map_err(|err| Error::InvalidValue { key: key.to_string(), message: err.to_string() })
}

pub fn write_json<T>(store: &dyn KvStore, key: &str, value: &T) -> Result<()>
where
	T: Serialize + ?Sized,
{
	let raw = serde_json::to_string(value)?;

	store.set(key, &raw)
}
