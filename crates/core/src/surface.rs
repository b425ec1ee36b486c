//! One mounted control surface: job controller, credential manager and output location.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use yongent_protocol::HealthStatus;

use crate::backend::{Backend, HttpBackend};
use crate::config::ClientConfig;
use crate::credentials::CredentialManager;
use crate::error::Result;
use crate::job::{JobController, SubmitOutcome};
use crate::output_location::OutputLocationResolver;

/// Wires the components to one backend.
///
/// Mounting probes the credential state once; unmounting (or dropping)
/// stops job polling.
pub struct ControlSurface {
	backend: Arc<dyn Backend>,
	jobs: JobController,
	credentials: CredentialManager,
	output: OutputLocationResolver,
}

impl ControlSurface {
	/// Mounts against the HTTP backend described by `config`.
	pub async fn mount(config: ClientConfig) -> Result<Self> {
		let poll_interval = config.poll_interval;
		let backend = Arc::new(HttpBackend::new(config)?);
		Ok(Self::mount_with(backend, poll_interval).await)
	}

	/// Mounts against an arbitrary backend.
	pub async fn mount_with(backend: Arc<dyn Backend>, poll_interval: Duration) -> Self {
		let surface = Self {
			jobs: JobController::new(Arc::clone(&backend), poll_interval),
			credentials: CredentialManager::new(Arc::clone(&backend)),
			output: OutputLocationResolver::new(Arc::clone(&backend)),
			backend,
		};
		surface.credentials.probe().await;
		debug!(target: "yongent.surface", cookies = ?surface.credentials.view().active, "control surface mounted");
		surface
	}

	pub fn jobs(&self) -> &JobController {
		&self.jobs
	}

	pub fn credentials(&self) -> &CredentialManager {
		&self.credentials
	}

	pub fn output_mut(&mut self) -> &mut OutputLocationResolver {
		&mut self.output
	}

	/// Submits `input` with the currently selected output directory.
	pub async fn submit(&self, input: &str) -> SubmitOutcome {
		self.jobs.submit(input, self.output.current()).await
	}

	pub async fn health(&self) -> Result<HealthStatus> {
		self.backend.health().await
	}

	/// Stops polling and releases the surface.
	pub fn unmount(self) {
		self.jobs.cancel();
		debug!(target: "yongent.surface", "control surface unmounted");
	}
}

#[cfg(test)]
mod tests {
	use yongent_protocol::{CookieStatusResponse, CreateJobResponse, PickFolderResponse};

	use super::*;
	use crate::backend::fake::{Call, FakeBackend, Reply};

	#[tokio::test]
	async fn mount_probes_credentials_once() {
		let backend = Arc::new(FakeBackend::new());
		backend.push_cookie_status(Reply::Ok(CookieStatusResponse { active: true, path: None }));

		let surface = ControlSurface::mount_with(backend.clone(), Duration::from_millis(5)).await;
		assert_eq!(surface.credentials().view().active, Some(true));
		assert_eq!(backend.calls(), vec![Call::CookieStatus]);
	}

	#[tokio::test]
	async fn submit_carries_picked_output_dir() {
		let backend = Arc::new(FakeBackend::new());
		backend.push_pick(Reply::Ok(PickFolderResponse {
			path: Some("/Users/me/Music".into()),
		}));
		backend.push_create(Reply::Ok(CreateJobResponse {
			job_id: "p1".into(),
			status: None,
		}));

		let mut surface = ControlSurface::mount_with(backend.clone(), Duration::from_millis(5)).await;
		surface.output_mut().pick_location().await;
		surface.submit("아이유 - 좋은날").await;

		let create = backend.calls().into_iter().find_map(|call| match call {
			Call::CreateJob(request) => Some(request),
			_ => None,
		});
		assert_eq!(create.and_then(|r| r.output_dir).as_deref(), Some("/Users/me/Music"));

		surface.unmount();
	}

	#[tokio::test]
	async fn health_goes_to_the_backend() {
		let backend = Arc::new(FakeBackend::new());
		backend.push_health(Reply::Ok(HealthStatus { status: "ok".into() }));

		let surface = ControlSurface::mount_with(backend.clone(), Duration::from_millis(5)).await;
		assert!(surface.health().await.unwrap().is_ok());
		assert!(surface.health().await.is_err());
		assert_eq!(backend.calls(), vec![Call::CookieStatus, Call::Health, Call::Health]);
	}
}
