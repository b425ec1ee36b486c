//! Wire types for the yongent music-downloader HTTP API.
//!
//! Request and response bodies for the job, cookie, folder-picker and health
//! endpoints, with the backend's snake_case field names. Every response field
//! the backend may leave out is an `Option`, and error bodies decode even
//! when `detail` is missing or is a validation list.

pub mod cookies;
pub mod health;
pub mod job;
pub mod picker;

pub use cookies::*;
pub use health::*;
pub use job::*;
pub use picker::*;

/// Error body returned by the backend on non-2xx responses.
///
/// `detail` is usually a string, but request-validation failures carry a
/// list of `{loc, msg, type}` objects instead.
///
/// ```json
/// { "detail": "query 또는 url 중 하나는 필수" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ErrorBody {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
	/// Parses an error body, tolerating empty or non-JSON payloads.
	pub fn from_slice(bytes: &[u8]) -> Self {
		serde_json::from_slice(bytes).unwrap_or_default()
	}

	/// Returns the human-readable message carried by `detail`, if any.
	pub fn message(&self) -> Option<String> {
		match self.detail.as_ref()? {
			serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
			serde_json::Value::Array(items) => items
				.iter()
				.find_map(|item| item.get("msg").and_then(|m| m.as_str()))
				.map(str::to_string),
			_ => None,
		}
	}
}
