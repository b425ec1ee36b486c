//! reqwest-backed [`Backend`] implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;
use yongent_protocol::{
	COOKIE_UPLOAD_FIELD, CookieStatusResponse, CookieUploadResponse, CreateJobRequest, CreateJobResponse, ErrorBody, HealthStatus, JobStatusResponse,
	PickFolderResponse,
};

use super::Backend;
use crate::config::ClientConfig;
use crate::credentials::CredentialFile;
use crate::error::{Error, Result};

/// The folder dialog blocks until the user answers, so it gets far more room than regular calls.
const PICK_FOLDER_TIMEOUT: Duration = Duration::from_secs(600);

/// HTTP client for the backend described by a [`ClientConfig`].
#[derive(Debug, Clone)]
pub struct HttpBackend {
	client: Client,
	config: ClientConfig,
}

impl HttpBackend {
	pub fn new(config: ClientConfig) -> Result<Self> {
		let client = Client::builder().timeout(config.request_timeout).build()?;
		Ok(Self { client, config })
	}

	async fn send(&self, request: RequestBuilder) -> Result<RawResponse> {
		let response = request.send().await?;
		let status = response.status();
		let url = response.url().clone();
		let body = response.bytes().await?.to_vec();
		trace!(target: "yongent.http", %url, status = status.as_u16(), bytes = body.len(), "response");

		if !status.is_success() {
			let detail = ErrorBody::from_slice(&body).message();
			debug!(target: "yongent.http", %url, status = status.as_u16(), detail = ?detail, "request rejected");
			return Err(Error::Rejected {
				status: status.as_u16(),
				detail,
			});
		}
		Ok(RawResponse { url, body })
	}

	async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
		let response = self.send(request).await?;
		serde_json::from_slice(&response.body).map_err(|e| Error::Decode(format!("{}: {e}", response.url)))
	}
}

struct RawResponse {
	url: Url,
	body: Vec<u8>,
}

#[async_trait]
impl Backend for HttpBackend {
	async fn create_job(&self, request: &CreateJobRequest) -> Result<CreateJobResponse> {
		let url = self.config.endpoint(&["download"])?;
		self.send_json(self.client.post(url).json(request)).await
	}

	async fn job_status(&self, job_id: &str) -> Result<JobStatusResponse> {
		let url = self.config.endpoint(&["status", job_id])?;
		self.send_json(self.client.get(url)).await
	}

	async fn pick_folder(&self) -> Result<PickFolderResponse> {
		let url = self.config.endpoint(&["pick-folder"])?;
		self.send_json(self.client.get(url).timeout(PICK_FOLDER_TIMEOUT)).await
	}

	async fn cookie_status(&self) -> Result<CookieStatusResponse> {
		let url = self.config.endpoint(&["cookies", "status"])?;
		self.send_json(self.client.get(url)).await
	}

	async fn upload_cookies(&self, file: &CredentialFile) -> Result<CookieUploadResponse> {
		let url = self.config.endpoint(&["cookies"])?;
		let part = Part::bytes(file.contents.clone()).file_name(file.file_name.clone()).mime_str("text/plain")?;
		let form = Form::new().part(COOKIE_UPLOAD_FIELD, part);
		let response = self.send(self.client.post(url).multipart(form)).await?;
		if response.body.is_empty() {
			return Ok(CookieUploadResponse::default());
		}
		serde_json::from_slice(&response.body).map_err(|e| Error::Decode(format!("{}: {e}", response.url)))
	}

	async fn delete_cookies(&self) -> Result<()> {
		let url = self.config.endpoint(&["cookies"])?;
		self.send(self.client.delete(url)).await.map(|_| ())
	}

	async fn health(&self) -> Result<HealthStatus> {
		let url = self.config.root_endpoint(&["health"])?;
		self.send_json(self.client.get(url)).await
	}
}
