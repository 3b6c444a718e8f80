pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Network request failed: {0}")]
	Network(#[from] reqwest::Error),
	#[error("Request failed with HTTP {status}: {message}")]
	HttpStatus { status: u16, code: String, message: String },
	#[error("Authentication expired. Sign in again.")]
	AuthExpired,
	#[error("Failed to decode response from {endpoint}: {source}")]
	Decode { endpoint: String, source: serde_json::Error },
	#[error("{message}")]
	InvalidInput { message: String },
	#[error(transparent)]
	Storage(#[from] scout_storage::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
}
impl Error {
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::HttpStatus { status, .. } => Some(*status),
			Self::Network(err) => err.status().map(|status| status.as_u16()),
			_ => None,
		}
	}

	pub fn is_unauthorized(&self) -> bool {
		self.status() == Some(401)
	}

	/// Transport failures, request timeouts, rate limiting and server errors.
	pub fn is_retryable(&self) -> bool {
		match self {
			Self::Network(_) => true,
			Self::HttpStatus { status, .. } => matches!(status, 408 | 429 | 500..=599),
			_ => false,
		}
	}
}
