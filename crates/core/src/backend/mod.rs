//! Backend seam: the HTTP operations the control surface depends on.
//!
//! [`HttpBackend`] talks to the real service; [`FakeBackend`] replays
//! scripted replies for tests.

use async_trait::async_trait;
use yongent_protocol::{CookieStatusResponse, CookieUploadResponse, CreateJobRequest, CreateJobResponse, HealthStatus, JobStatusResponse, PickFolderResponse};

use crate::credentials::CredentialFile;
use crate::error::Result;

pub mod fake;
pub mod http;

pub use fake::{FakeBackend, Reply};
pub use http::HttpBackend;

/// Operations exposed by the music-downloader backend.
///
/// Non-2xx responses are reported as [`Error::Rejected`](crate::Error::Rejected)
/// carrying the backend's `detail`, when it sent one.
#[async_trait]
pub trait Backend: Send + Sync {
	/// `POST /download`
	async fn create_job(&self, request: &CreateJobRequest) -> Result<CreateJobResponse>;

	/// `GET /status/{job_id}`
	async fn job_status(&self, job_id: &str) -> Result<JobStatusResponse>;

	/// `GET /pick-folder`; resolves once the user closes the dialog.
	async fn pick_folder(&self) -> Result<PickFolderResponse>;

	/// `GET /cookies/status`
	async fn cookie_status(&self) -> Result<CookieStatusResponse>;

	/// `POST /cookies` as multipart field `file`.
	async fn upload_cookies(&self, file: &CredentialFile) -> Result<CookieUploadResponse>;

	/// `DELETE /cookies`
	async fn delete_cookies(&self) -> Result<()>;

	/// `GET /health` at the backend root.
	async fn health(&self) -> Result<HealthStatus>;
}
