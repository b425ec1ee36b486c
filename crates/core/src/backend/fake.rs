//! In-memory [`Backend`] for exercising controllers without a server.
//!
//! Replies are scripted per operation and consumed in order. An operation
//! with nothing scripted behaves like an unreachable server.
//!
//! # Example
//!
//! ```ignore
//! let backend = Arc::new(FakeBackend::new());
//! backend.push_create(Reply::Ok(CreateJobResponse { job_id: "abc123".into(), status: None }));
//! backend.push_status("abc123", Reply::Ok(done_response()));
//!
//! let controller = JobController::new(backend.clone(), Duration::from_millis(5));
//! controller.submit("아이유 - 좋은날", None).await;
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;
use yongent_protocol::{CookieStatusResponse, CookieUploadResponse, CreateJobRequest, CreateJobResponse, HealthStatus, JobStatusResponse, PickFolderResponse};

use super::Backend;
use crate::credentials::CredentialFile;
use crate::error::{Error, Result};

/// A scripted outcome for one backend call.
#[derive(Debug)]
pub enum Reply<T> {
	Ok(T),
	/// Non-2xx response with an optional `detail`.
	Reject { status: u16, detail: Option<String> },
	/// Connection-level failure, reported as [`Error::Io`] with
	/// `ConnectionRefused`. [`HttpBackend`](super::HttpBackend) reports the
	/// same situation as [`Error::Transport`], which callers may classify
	/// differently; tests of that path need a real HTTP client.
	Unreachable,
	/// Holds the call open until `gate` is notified, then resolves to the inner reply.
	Wait(Arc<Notify>, Box<Reply<T>>),
}

impl<T> Reply<T> {
	fn resolve(self) -> Result<T> {
		match self {
			Reply::Ok(value) => Ok(value),
			Reply::Reject { status, detail } => Err(Error::Rejected { status, detail }),
			Reply::Unreachable | Reply::Wait(..) => Err(unreachable_error()),
		}
	}
}

fn unreachable_error() -> Error {
	Error::Io(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "fake backend unreachable"))
}

async fn play<T>(reply: Option<Reply<T>>) -> Result<T> {
	let mut reply = reply.unwrap_or(Reply::Unreachable);
	while let Reply::Wait(gate, inner) = reply {
		gate.notified().await;
		reply = *inner;
	}
	reply.resolve()
}

/// A call received by the fake, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
	CreateJob(CreateJobRequest),
	JobStatus(String),
	PickFolder,
	CookieStatus,
	UploadCookies(String),
	DeleteCookies,
	Health,
}

#[derive(Default)]
struct Script {
	create: VecDeque<Reply<CreateJobResponse>>,
	status: HashMap<String, VecDeque<Reply<JobStatusResponse>>>,
	pick: VecDeque<Reply<PickFolderResponse>>,
	cookie_status: VecDeque<Reply<CookieStatusResponse>>,
	upload: VecDeque<Reply<CookieUploadResponse>>,
	delete: VecDeque<Reply<()>>,
	health: VecDeque<Reply<HealthStatus>>,
}

/// Scripted backend that records every call it receives.
#[derive(Default)]
pub struct FakeBackend {
	script: Mutex<Script>,
	calls: Mutex<Vec<Call>>,
	status_in_flight: AtomicUsize,
	status_peak: AtomicUsize,
}

impl FakeBackend {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push_create(&self, reply: Reply<CreateJobResponse>) {
		self.script.lock().create.push_back(reply);
	}

	pub fn push_status(&self, job_id: &str, reply: Reply<JobStatusResponse>) {
		self.script.lock().status.entry(job_id.to_string()).or_default().push_back(reply);
	}

	pub fn push_pick(&self, reply: Reply<PickFolderResponse>) {
		self.script.lock().pick.push_back(reply);
	}

	pub fn push_cookie_status(&self, reply: Reply<CookieStatusResponse>) {
		self.script.lock().cookie_status.push_back(reply);
	}

	pub fn push_upload(&self, reply: Reply<CookieUploadResponse>) {
		self.script.lock().upload.push_back(reply);
	}

	pub fn push_delete(&self, reply: Reply<()>) {
		self.script.lock().delete.push_back(reply);
	}

	pub fn push_health(&self, reply: Reply<HealthStatus>) {
		self.script.lock().health.push_back(reply);
	}

	/// All calls received so far.
	pub fn calls(&self) -> Vec<Call> {
		self.calls.lock().clone()
	}

	/// Number of status polls received for `job_id`.
	pub fn status_calls(&self, job_id: &str) -> usize {
		self.calls.lock().iter().filter(|call| matches!(call, Call::JobStatus(id) if id == job_id)).count()
	}

	/// Highest number of status requests that were ever outstanding at once.
	pub fn peak_concurrent_status(&self) -> usize {
		self.status_peak.load(Ordering::SeqCst)
	}

	fn record(&self, call: Call) {
		self.calls.lock().push(call);
	}
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
	fn drop(&mut self) {
		self.0.fetch_sub(1, Ordering::SeqCst);
	}
}

#[async_trait]
impl Backend for FakeBackend {
	async fn create_job(&self, request: &CreateJobRequest) -> Result<CreateJobResponse> {
		self.record(Call::CreateJob(request.clone()));
		let reply = self.script.lock().create.pop_front();
		play(reply).await
	}

	async fn job_status(&self, job_id: &str) -> Result<JobStatusResponse> {
		self.record(Call::JobStatus(job_id.to_string()));
		let now = self.status_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
		self.status_peak.fetch_max(now, Ordering::SeqCst);
		let _in_flight = InFlight(&self.status_in_flight);

		let reply = self.script.lock().status.get_mut(job_id).and_then(VecDeque::pop_front);
		play(reply).await
	}

	async fn pick_folder(&self) -> Result<PickFolderResponse> {
		self.record(Call::PickFolder);
		let reply = self.script.lock().pick.pop_front();
		play(reply).await
	}

	async fn cookie_status(&self) -> Result<CookieStatusResponse> {
		self.record(Call::CookieStatus);
		let reply = self.script.lock().cookie_status.pop_front();
		play(reply).await
	}

	async fn upload_cookies(&self, file: &CredentialFile) -> Result<CookieUploadResponse> {
		self.record(Call::UploadCookies(file.file_name.clone()));
		let reply = self.script.lock().upload.pop_front();
		play(reply).await
	}

	async fn delete_cookies(&self) -> Result<()> {
		self.record(Call::DeleteCookies);
		let reply = self.script.lock().delete.pop_front();
		play(reply).await
	}

	async fn health(&self) -> Result<HealthStatus> {
		self.record(Call::Health);
		let reply = self.script.lock().health.pop_front();
		play(reply).await
	}
}
