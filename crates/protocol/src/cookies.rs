//! Session-credential (cookie jar) bodies.

use serde::{Deserialize, Serialize};

/// Multipart field name the backend reads the uploaded cookie file from.
pub const COOKIE_UPLOAD_FIELD: &str = "file";

/// Body returned by `GET /cookies/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieStatusResponse {
	pub active: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub path: Option<String>,
}

/// Body returned by `POST /cookies` on success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieUploadResponse {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub path: Option<String>,
}
