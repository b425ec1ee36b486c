//! Folder picker body.

use serde::{Deserialize, Serialize};

/// Body returned by `GET /pick-folder`.
///
/// `path` is absent (or `null`) when the user dismissed the dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickFolderResponse {
	#[serde(default)]
	pub path: Option<String>,
}
