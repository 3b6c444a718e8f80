#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Store file {path:?} could not be accessed.")]
	Io { path: std::path::PathBuf, source: std::io::Error },
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error("Invalid {key} value: {message}")]
	InvalidValue { key: String, message: String },
}
