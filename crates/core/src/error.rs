//! Error types for the yongent client.

use thiserror::Error;

/// Fallback shown when the backend rejects a request without a `detail`.
pub const GENERIC_SERVER_ERROR: &str = "server error";

/// Errors produced while talking to the backend or loading configuration.
#[derive(Debug, Error)]
pub enum Error {
	#[error("transport error: {0}")]
	Transport(#[from] reqwest::Error),

	#[error("backend rejected request ({status}): {}", detail.as_deref().unwrap_or(GENERIC_SERVER_ERROR))]
	Rejected { status: u16, detail: Option<String> },

	#[error("unexpected response payload: {0}")]
	Decode(String),

	#[error("invalid backend url: {0}")]
	InvalidUrl(#[from] url::ParseError),

	#[error("a credential upload is already in progress")]
	UploadInProgress,

	#[error("configuration error: {0}")]
	Config(String),

	#[error("io error: {0}")]
	Io(#[from] std::io::Error),

	#[error("json error: {0}")]
	Json(#[from] serde_json::Error),
}

impl Error {
	/// Message suitable for showing next to the control that failed.
	///
	/// Backend rejections surface their `detail` verbatim, falling back to
	/// [`GENERIC_SERVER_ERROR`]. Everything else uses its display text.
	pub fn user_message(&self) -> String {
		match self {
			Error::Rejected { detail: Some(detail), .. } => detail.clone(),
			Error::Rejected { detail: None, .. } => GENERIC_SERVER_ERROR.to_string(),
			other => other.to_string(),
		}
	}

}

pub type Result<T> = std::result::Result<T, Error>;
