//! Lifecycle of the backend's stored session-credential (cookie) file.
//!
//! The backend is the only source of truth for whether a cookie file is
//! active; [`CredentialManager`] mirrors what the backend last reported and
//! publishes it through a [`watch`] channel for the presentation layer.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::error::{Error, Result};

/// A single credential file to hand to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialFile {
	pub file_name: String,
	pub contents: Vec<u8>,
}

impl CredentialFile {
	pub fn new(file_name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
		Self {
			file_name: file_name.into(),
			contents: contents.into(),
		}
	}

	/// Reads `path`; the uploaded name is the path's final component.
	pub async fn from_path(path: &Path) -> Result<Self> {
		let contents = tokio::fs::read(path).await?;
		let file_name = path
			.file_name()
			.map(|name| name.to_string_lossy().into_owned())
			.unwrap_or_else(|| "cookies.txt".to_string());
		Ok(Self { file_name, contents })
	}
}

/// Observable credential state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CredentialView {
	/// `None` until the first probe completes.
	pub active: Option<bool>,
	/// Where the backend stored the file. Informational only.
	pub path: Option<String>,
	pub uploading: bool,
	/// Last upload failure, shown next to the upload control.
	pub error: Option<String>,
	/// Whether setup instructions are currently shown.
	pub guide_open: bool,
}

/// Probes, uploads and revokes the backend's cookie file.
pub struct CredentialManager {
	backend: Arc<dyn Backend>,
	state: watch::Sender<CredentialView>,
}

impl CredentialManager {
	pub fn new(backend: Arc<dyn Backend>) -> Self {
		Self {
			backend,
			state: watch::Sender::new(CredentialView::default()),
		}
	}

	pub fn view(&self) -> CredentialView {
		self.state.borrow().clone()
	}

	pub fn subscribe(&self) -> watch::Receiver<CredentialView> {
		self.state.subscribe()
	}

	/// Asks the backend whether a cookie file is active.
	///
	/// Any failure resolves to `active = false`: a missing credential is the
	/// safe assumption.
	pub async fn probe(&self) -> bool {
		let (active, path) = match self.backend.cookie_status().await {
			Ok(status) => (status.active, status.path),
			Err(err) => {
				warn!(target: "yongent.credentials", error = %err, "cookie status probe failed; assuming inactive");
				(false, None)
			}
		};
		debug!(target: "yongent.credentials", active, path = ?path, "cookie status");
		self.state.send_modify(|view| {
			view.active = Some(active);
			view.path = path;
		});
		active
	}

	/// Uploads `file` as the backend's cookie file.
	///
	/// Returns [`Error::UploadInProgress`] without side effects while another
	/// upload is outstanding. Backend failures leave `active` untouched and are
	/// recorded in [`CredentialView::error`]. `uploading` is always cleared
	/// when this returns.
	pub async fn upload(&self, file: CredentialFile) -> Result<()> {
		let Some(_guard) = UploadGuard::acquire(&self.state) else {
			debug!(target: "yongent.credentials", "upload ignored; another upload is in flight");
			return Err(Error::UploadInProgress);
		};

		info!(target: "yongent.credentials", file = %file.file_name, bytes = file.contents.len(), "uploading cookie file");
		match self.backend.upload_cookies(&file).await {
			Ok(response) => {
				info!(target: "yongent.credentials", path = ?response.path, "cookie file stored");
				self.state.send_modify(|view| {
					view.active = Some(true);
					if response.path.is_some() {
						view.path = response.path;
					}
					view.error = None;
					view.guide_open = false;
				});
				Ok(())
			}
			Err(err) => {
				let message = err.user_message();
				warn!(target: "yongent.credentials", error = %err, "cookie upload failed");
				self.state.send_modify(|view| view.error = Some(message));
				Err(err)
			}
		}
	}

	/// Deletes the backend's cookie file.
	///
	/// The local state becomes inactive whatever the backend answers; a failed
	/// delete is only logged.
	pub async fn revoke(&self) {
		if let Err(err) = self.backend.delete_cookies().await {
			warn!(target: "yongent.credentials", error = %err, "cookie delete failed; marking inactive anyway");
		} else {
			info!(target: "yongent.credentials", "cookie file deleted");
		}
		self.state.send_modify(|view| {
			view.active = Some(false);
			view.path = None;
		});
	}

	pub fn open_guide(&self) {
		self.state.send_if_modified(|view| !std::mem::replace(&mut view.guide_open, true));
	}

	pub fn close_guide(&self) {
		self.state.send_if_modified(|view| std::mem::replace(&mut view.guide_open, false));
	}
}

/// Holds the `uploading` flag for the duration of one upload.
struct UploadGuard<'a> {
	state: &'a watch::Sender<CredentialView>,
}

impl<'a> UploadGuard<'a> {
	fn acquire(state: &'a watch::Sender<CredentialView>) -> Option<Self> {
		let acquired = state.send_if_modified(|view| {
			if view.uploading {
				return false;
			}
			view.uploading = true;
			view.error = None;
			true
		});
		acquired.then_some(Self { state })
	}
}

impl Drop for UploadGuard<'_> {
	fn drop(&mut self) {
		self.state.send_modify(|view| view.uploading = false);
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use tokio::sync::Notify;
	use yongent_protocol::{CookieStatusResponse, CookieUploadResponse};

	use super::*;
	use crate::backend::fake::{Call, FakeBackend, Reply};

	fn manager() -> (Arc<FakeBackend>, CredentialManager) {
		let backend = Arc::new(FakeBackend::new());
		let manager = CredentialManager::new(backend.clone());
		(backend, manager)
	}

	fn cookie_file() -> CredentialFile {
		CredentialFile::new("cookies.txt", "# Netscape HTTP Cookie File\n")
	}

	#[tokio::test]
	async fn unprobed_state_is_unknown() {
		let (_backend, manager) = manager();
		assert_eq!(manager.view().active, None);
	}

	#[tokio::test]
	async fn probe_reports_backend_state() {
		let (backend, manager) = manager();
		backend.push_cookie_status(Reply::Ok(CookieStatusResponse {
			active: true,
			path: Some("/srv/cookies.txt".into()),
		}));

		assert!(manager.probe().await);
		let view = manager.view();
		assert_eq!(view.active, Some(true));
		assert_eq!(view.path.as_deref(), Some("/srv/cookies.txt"));
	}

	#[tokio::test]
	async fn probe_transport_failure_resolves_inactive() {
		let (backend, manager) = manager();
		backend.push_cookie_status(Reply::Unreachable);

		assert!(!manager.probe().await);
		assert_eq!(manager.view().active, Some(false));
	}

	#[tokio::test]
	async fn probe_rejection_resolves_inactive() {
		let (backend, manager) = manager();
		backend.push_cookie_status(Reply::Reject { status: 404, detail: None });

		manager.probe().await;
		assert_eq!(manager.view().active, Some(false));
	}

	#[tokio::test]
	async fn upload_success_activates_and_closes_guide() {
		let (backend, manager) = manager();
		backend.push_upload(Reply::Reject {
			status: 400,
			detail: Some("invalid cookie file".into()),
		});
		backend.push_upload(Reply::Ok(CookieUploadResponse {
			path: Some("/srv/cookies.txt".into()),
		}));
		manager.open_guide();

		assert!(manager.upload(cookie_file()).await.is_err());
		assert_eq!(manager.view().error.as_deref(), Some("invalid cookie file"));

		manager.upload(cookie_file()).await.unwrap();
		let view = manager.view();
		assert_eq!(view.active, Some(true));
		assert_eq!(view.path.as_deref(), Some("/srv/cookies.txt"));
		assert_eq!(view.error, None);
		assert!(!view.guide_open);
		assert!(!view.uploading);
	}

	#[tokio::test]
	async fn upload_failure_keeps_active_and_clears_flag() {
		let (backend, manager) = manager();
		backend.push_cookie_status(Reply::Ok(CookieStatusResponse { active: false, path: None }));
		backend.push_upload(Reply::Unreachable);
		manager.probe().await;

		let err = manager.upload(cookie_file()).await.unwrap_err();
		assert!(!matches!(err, Error::UploadInProgress));
		let view = manager.view();
		assert_eq!(view.active, Some(false));
		assert!(view.error.is_some());
		assert!(!view.uploading);
	}

	#[tokio::test]
	async fn concurrent_upload_is_rejected() {
		let (backend, manager) = manager();
		let gate = Arc::new(Notify::new());
		backend.push_upload(Reply::Wait(gate.clone(), Box::new(Reply::Ok(CookieUploadResponse::default()))));

		let first = manager.upload(cookie_file());
		let second = async {
			tokio::task::yield_now().await;
			assert!(manager.view().uploading);
			let rejected = manager.upload(cookie_file()).await;
			gate.notify_one();
			rejected
		};
		let (first, second) = tokio::join!(first, second);

		first.unwrap();
		assert!(matches!(second, Err(Error::UploadInProgress)));
		assert!(!manager.view().uploading);
		let uploads = backend.calls().into_iter().filter(|call| matches!(call, Call::UploadCookies(_))).count();
		assert_eq!(uploads, 1);
	}

	#[tokio::test]
	async fn revoke_is_optimistic() {
		let (backend, manager) = manager();
		backend.push_cookie_status(Reply::Ok(CookieStatusResponse {
			active: true,
			path: Some("/srv/cookies.txt".into()),
		}));
		backend.push_delete(Reply::Reject { status: 500, detail: None });
		manager.probe().await;

		manager.revoke().await;
		assert_eq!(manager.view().active, Some(false));
		assert_eq!(backend.calls().last(), Some(&Call::DeleteCookies));
	}

	#[tokio::test]
	async fn guide_toggles_notify_only_on_change() {
		let (_backend, manager) = manager();
		let mut rx = manager.subscribe();
		rx.mark_unchanged();

		manager.close_guide();
		assert!(!rx.has_changed().unwrap());

		manager.open_guide();
		assert!(rx.has_changed().unwrap());
		assert!(rx.borrow_and_update().guide_open);
	}

	#[tokio::test]
	async fn credential_file_reads_name_from_path() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("youtube_cookies.txt");
		std::fs::write(&path, "# Netscape HTTP Cookie File\n").unwrap();

		let file = CredentialFile::from_path(&path).await.unwrap();
		assert_eq!(file.file_name, "youtube_cookies.txt");
		assert!(file.contents.starts_with(b"# Netscape"));
	}
}
