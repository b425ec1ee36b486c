//! Destination directory chosen through the backend's folder picker.

use std::sync::Arc;

use tracing::{debug, info};

use crate::backend::Backend;

/// Holds the destination directory sent with new jobs.
///
/// `None` means the backend's default download directory. Paths are not
/// validated here; the backend decides what it can write to.
pub struct OutputLocationResolver {
	backend: Arc<dyn Backend>,
	current: Option<String>,
}

impl OutputLocationResolver {
	pub fn new(backend: Arc<dyn Backend>) -> Self {
		Self { backend, current: None }
	}

	pub fn current(&self) -> Option<&str> {
		self.current.as_deref()
	}

	/// Sets the destination directly. A blank path restores the default.
	pub fn set(&mut self, path: impl Into<String>) {
		let path = path.into();
		self.current = if path.trim().is_empty() { None } else { Some(path) };
	}

	pub fn clear(&mut self) {
		self.current = None;
	}

	/// Opens the backend's folder dialog and keeps the chosen path.
	///
	/// A dismissed dialog or a failed request leaves the previous value in
	/// place; neither is reported as an error.
	pub async fn pick_location(&mut self) -> Option<&str> {
		match self.backend.pick_folder().await {
			Ok(response) => match response.path.filter(|path| !path.trim().is_empty()) {
				Some(path) => {
					info!(target: "yongent.picker", %path, "output directory selected");
					self.current = Some(path);
				}
				None => debug!(target: "yongent.picker", "folder dialog dismissed"),
			},
			Err(err) => debug!(target: "yongent.picker", error = %err, "folder picker unavailable"),
		}
		self.current()
	}
}
