//! Submission and status polling for a single tracked job.
//!
//! # Polling model
//!
//! Each successful submission spawns one polling task. The task sleeps for
//! the poll interval, fetches the status, applies it, and repeats until the
//! backend reports a terminal status. A tick is never issued while the
//! previous one is outstanding.
//!
//! Every submission (and every [`JobController::cancel`]) bumps a generation
//! counter and aborts the running task. A tick applies its response only if
//! its generation and job id still match the controller's, so a response
//! that races a newer submission is dropped instead of overwriting it.
//!
//! Failed status fetches are retried at the same cadence with no limit and no
//! backoff; only a backend-reported `error` status ends a job in error.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use yongent_protocol::CreateJobRequest;

use super::{JobId, JobSnapshot, JobState};
use crate::backend::Backend;
use crate::input::Input;

/// Progress label shown between submission and the first status poll.
pub const QUEUED_STEP: &str = "waiting in queue";

/// Result of [`JobController::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
	/// Input was blank; nothing changed.
	Ignored,
	/// The backend accepted the job and polling has started.
	Started(JobId),
	/// The creation request failed; the controller is in the error state.
	Failed(String),
	/// A newer submission or a cancel happened while this one was in flight.
	Superseded,
}

/// Tracks at most one backend job from submission to a terminal state.
///
/// State is published through a [`watch`] channel; see [`JobController::subscribe`].
/// Dropping the controller stops polling.
pub struct JobController {
	shared: Arc<Shared>,
}

struct Shared {
	backend: Arc<dyn Backend>,
	poll_interval: Duration,
	state: watch::Sender<JobSnapshot>,
	tracking: Mutex<Tracking>,
}

#[derive(Default)]
struct Tracking {
	generation: u64,
	poller: Option<JoinHandle<()>>,
}

impl Tracking {
	fn stop_poller(&mut self) -> bool {
		match self.poller.take() {
			Some(task) => {
				task.abort();
				true
			}
			None => false,
		}
	}
}

impl JobController {
	pub fn new(backend: Arc<dyn Backend>, poll_interval: Duration) -> Self {
		Self {
			shared: Arc::new(Shared {
				backend,
				poll_interval,
				state: watch::Sender::new(JobSnapshot::default()),
				tracking: Mutex::new(Tracking::default()),
			}),
		}
	}

	pub fn snapshot(&self) -> JobSnapshot {
		self.shared.state.borrow().clone()
	}

	pub fn subscribe(&self) -> watch::Receiver<JobSnapshot> {
		self.shared.state.subscribe()
	}

	/// Whether a polling task is currently scheduled.
	pub fn is_polling(&self) -> bool {
		self.shared.tracking.lock().poller.as_ref().is_some_and(|task| !task.is_finished())
	}

	/// Submits `input` as a new job, replacing whatever was tracked before.
	///
	/// Blank input is a no-op. Otherwise polling for the previous job is
	/// cancelled and the state reset to queued *before* the creation request
	/// is sent. A failed creation request leaves the controller in
	/// [`JobState::Error`] with the backend's `detail` (or a generic message)
	/// and does not poll.
	pub async fn submit(&self, input: &str, output_dir: Option<&str>) -> SubmitOutcome {
		let Some(input) = Input::parse(input) else {
			debug!(target: "yongent.job", "ignoring blank submission");
			return SubmitOutcome::Ignored;
		};

		let request = match &input {
			Input::Locator(url) => CreateJobRequest::locator(url.as_str()),
			Input::Query(query) => CreateJobRequest::search(query.as_str()),
		}
		.with_output_dir(output_dir);

		let generation = self.shared.begin_submission();
		info!(
			target: "yongent.job",
			generation,
			locator = input.is_locator(),
			input = %input.as_str(),
			output_dir = ?request.output_dir,
			"submitting job"
		);

		match self.shared.backend.create_job(&request).await {
			Ok(created) => {
				let job_id = JobId::new(created.job_id);
				if self.shared.start_polling(generation, job_id.clone()) {
					info!(target: "yongent.job", %job_id, generation, "job accepted; polling");
					SubmitOutcome::Started(job_id)
				} else {
					debug!(target: "yongent.job", %job_id, generation, "submission superseded before acceptance");
					SubmitOutcome::Superseded
				}
			}
			Err(err) => {
				let message = err.user_message();
				warn!(target: "yongent.job", generation, error = %err, "job submission failed");
				if self.shared.fail_submission(generation, message.clone()) {
					SubmitOutcome::Failed(message)
				} else {
					SubmitOutcome::Superseded
				}
			}
		}
	}

	/// Stops polling, keeping the last observed state. Safe to call repeatedly.
	pub fn cancel(&self) {
		self.shared.cancel();
	}

	/// Waits until the tracked job reaches `done` or `error`.
	///
	/// Never resolves if nothing is being tracked or polling was cancelled
	/// first; callers pair it with their own cancellation.
	pub async fn settled(&self) -> JobSnapshot {
		let mut rx = self.subscribe();
		match rx.wait_for(|snapshot| snapshot.state.is_terminal()).await {
			Ok(snapshot) => snapshot.clone(),
			Err(_) => self.snapshot(),
		}
	}
}

impl Drop for JobController {
	fn drop(&mut self) {
		self.shared.cancel();
	}
}

impl Shared {
	/// Cancels prior polling and resets to queued; returns the new generation.
	fn begin_submission(&self) -> u64 {
		let mut tracking = self.tracking.lock();
		if tracking.stop_poller() {
			debug!(target: "yongent.poll", generation = tracking.generation, "cancelled polling for previous job");
		}
		tracking.generation += 1;
		self.state.send_replace(JobSnapshot {
			job_id: None,
			state: JobState::Queued {
				step: Some(QUEUED_STEP.to_string()),
			},
		});
		tracking.generation
	}

	fn start_polling(self: &Arc<Self>, generation: u64, job_id: JobId) -> bool {
		let mut tracking = self.tracking.lock();
		if tracking.generation != generation {
			return false;
		}
		self.state.send_modify(|snapshot| snapshot.job_id = Some(job_id.clone()));
		tracking.poller = Some(tokio::spawn(poll_loop(Arc::clone(self), generation, job_id)));
		true
	}

	fn fail_submission(&self, generation: u64, message: String) -> bool {
		let tracking = self.tracking.lock();
		if tracking.generation != generation {
			return false;
		}
		self.state.send_replace(JobSnapshot {
			job_id: None,
			state: JobState::Error { message },
		});
		true
	}

	/// Replaces the job state with a tick's result if the tick is still current.
	fn apply_tick(&self, generation: u64, job_id: &JobId, state: JobState) -> bool {
		let tracking = self.tracking.lock();
		if tracking.generation != generation {
			return false;
		}
		let mut current = false;
		self.state.send_if_modified(|snapshot| {
			if snapshot.job_id.as_ref() != Some(job_id) {
				return false;
			}
			current = true;
			if snapshot.state == state {
				return false;
			}
			snapshot.state = state;
			true
		});
		current
	}

	fn finish_polling(&self, generation: u64) {
		let mut tracking = self.tracking.lock();
		if tracking.generation == generation {
			tracking.poller = None;
		}
	}

	fn cancel(&self) {
		let mut tracking = self.tracking.lock();
		if tracking.stop_poller() {
			debug!(target: "yongent.poll", generation = tracking.generation, "polling cancelled");
		}
		tracking.generation += 1;
	}
}

async fn poll_loop(shared: Arc<Shared>, generation: u64, job_id: JobId) {
	let mut tick: u64 = 0;
	loop {
		tokio::time::sleep(shared.poll_interval).await;
		tick += 1;

		let response = match shared.backend.job_status(job_id.as_str()).await {
			Ok(response) => response,
			Err(err) => {
				debug!(target: "yongent.poll", %job_id, tick, error = %err, "status fetch failed; retrying next tick");
				continue;
			}
		};

		let terminal = response.status.is_terminal();
		let status = response.status;
		if !shared.apply_tick(generation, &job_id, JobState::from(response)) {
			debug!(target: "yongent.poll", %job_id, generation, "discarding status from superseded job");
			return;
		}
		debug!(target: "yongent.poll", %job_id, tick, %status, "status applied");

		if terminal {
			info!(target: "yongent.job", %job_id, %status, ticks = tick, "job finished");
			shared.finish_polling(generation);
			return;
		}
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use tokio::sync::Notify;
	use yongent_protocol::{CreateJobResponse, JobFiles, JobResult, JobStatus, JobStatusResponse};

	use super::*;
	use crate::backend::fake::{Call, FakeBackend, Reply};

	const TICK: Duration = Duration::from_millis(5);

	fn controller() -> (Arc<FakeBackend>, JobController) {
		let backend = Arc::new(FakeBackend::new());
		let controller = JobController::new(backend.clone(), TICK);
		(backend, controller)
	}

	fn created(job_id: &str) -> Reply<CreateJobResponse> {
		Reply::Ok(CreateJobResponse {
			job_id: job_id.to_string(),
			status: Some(JobStatus::Queued),
		})
	}

	fn status(status: JobStatus, step: Option<&str>) -> Reply<JobStatusResponse> {
		Reply::Ok(JobStatusResponse {
			job_id: None,
			status,
			step: step.map(str::to_string),
			result: None,
			error: None,
		})
	}

	fn done(result: JobResult) -> Reply<JobStatusResponse> {
		Reply::Ok(JobStatusResponse {
			job_id: None,
			status: JobStatus::Done,
			step: Some("완료".into()),
			result: Some(result),
			error: None,
		})
	}

	async fn eventually(mut condition: impl FnMut() -> bool) {
		tokio::time::timeout(Duration::from_secs(2), async {
			while !condition() {
				tokio::time::sleep(Duration::from_millis(1)).await;
			}
		})
		.await
		.expect("condition not reached in time");
	}

	#[tokio::test]
	async fn query_job_runs_to_done() {
		let (backend, controller) = controller();
		let result = JobResult {
			title: Some("좋은날".into()),
			artist: Some("아이유".into()),
			files: Some(JobFiles {
				audio: Some("a.mp3".into()),
				clip: Some("a.mp4".into()),
				meta: Some("a.json".into()),
			}),
			..Default::default()
		};
		backend.push_create(created("abc123"));
		backend.push_status("abc123", status(JobStatus::Running, Some("메타데이터 수집 중")));
		backend.push_status("abc123", done(result.clone()));

		let outcome = controller.submit("아이유 - 좋은날", None).await;
		assert_eq!(outcome, SubmitOutcome::Started(JobId::new("abc123")));
		assert_eq!(
			backend.calls()[0],
			Call::CreateJob(CreateJobRequest::search("아이유 - 좋은날"))
		);

		let settled = tokio::time::timeout(Duration::from_secs(2), controller.settled()).await.unwrap();
		assert_eq!(settled.job_id, Some(JobId::new("abc123")));
		assert_eq!(settled.state, JobState::Done { result: Some(result) });

		eventually(|| !controller.is_polling()).await;
		tokio::time::sleep(TICK * 6).await;
		assert_eq!(backend.status_calls("abc123"), 2);
	}

	#[tokio::test]
	async fn locator_input_is_sent_as_url() {
		let (backend, controller) = controller();
		backend.push_create(created("u1"));

		controller.submit("  https://youtu.be/xyz ", Some("/music")).await;

		let Call::CreateJob(request) = &backend.calls()[0] else {
			panic!("expected create call");
		};
		assert_eq!(request.url.as_deref(), Some("https://youtu.be/xyz"));
		assert_eq!(request.query, None);
		assert_eq!(request.output_dir.as_deref(), Some("/music"));
	}

	#[tokio::test]
	async fn blank_input_is_ignored() {
		let (backend, controller) = controller();

		assert_eq!(controller.submit("   ", None).await, SubmitOutcome::Ignored);
		assert!(backend.calls().is_empty());
		assert_eq!(controller.snapshot(), JobSnapshot::default());
	}

	#[tokio::test]
	async fn queued_state_is_published_before_creation_completes() {
		let (backend, controller) = controller();
		let gate = Arc::new(Notify::new());
		backend.push_create(Reply::Wait(gate.clone(), Box::new(created("q1"))));

		let submit = controller.submit("좋은날", None);
		let observe = async {
			tokio::task::yield_now().await;
			let snapshot = controller.snapshot();
			gate.notify_one();
			snapshot
		};
		let (_, during) = tokio::join!(submit, observe);

		assert_eq!(during.job_id, None);
		assert_eq!(during.state.step(), Some(QUEUED_STEP));
		assert_eq!(controller.snapshot().job_id, Some(JobId::new("q1")));
	}

	#[tokio::test]
	async fn rejected_submission_surfaces_detail_and_never_polls() {
		let (backend, controller) = controller();
		backend.push_create(Reply::Reject {
			status: 422,
			detail: Some("query 또는 url 중 하나는 필수".into()),
		});

		let outcome = controller.submit("좋은날", None).await;
		assert_eq!(outcome, SubmitOutcome::Failed("query 또는 url 중 하나는 필수".into()));
		assert_eq!(controller.snapshot().state.error(), Some("query 또는 url 중 하나는 필수"));
		assert!(!controller.is_polling());

		tokio::time::sleep(TICK * 4).await;
		assert!(backend.calls().iter().all(|call| matches!(call, Call::CreateJob(_))));
	}

	#[tokio::test]
	async fn rejected_submission_without_detail_uses_fallback() {
		let (backend, controller) = controller();
		backend.push_create(Reply::Reject { status: 500, detail: None });

		controller.submit("좋은날", None).await;
		assert_eq!(controller.snapshot().state.error(), Some(crate::error::GENERIC_SERVER_ERROR));
	}

	#[tokio::test]
	async fn unreachable_backend_fails_submission() {
		let (_backend, controller) = controller();

		let outcome = controller.submit("좋은날", None).await;
		assert!(matches!(outcome, SubmitOutcome::Failed(_)));
		assert!(controller.snapshot().state.is_terminal());
		assert_eq!(controller.snapshot().job_id, None);
	}

	#[tokio::test]
	async fn transient_poll_failure_keeps_state_and_retries() {
		let (backend, controller) = controller();
		let gate = Arc::new(Notify::new());
		backend.push_create(created("t1"));
		backend.push_status("t1", status(JobStatus::Running, Some("음원 다운로드 중")));
		backend.push_status("t1", Reply::Unreachable);
		backend.push_status("t1", Reply::Wait(gate.clone(), Box::new(done(JobResult::default()))));

		controller.submit("좋은날", None).await;
		eventually(|| backend.status_calls("t1") == 3).await;

		assert_eq!(
			controller.snapshot().state,
			JobState::Running {
				step: Some("음원 다운로드 중".into())
			}
		);
		assert!(controller.is_polling());

		gate.notify_one();
		let settled = tokio::time::timeout(Duration::from_secs(2), controller.settled()).await.unwrap();
		assert_eq!(settled.state, JobState::Done { result: Some(JobResult::default()) });
	}

	#[tokio::test]
	async fn backend_error_status_is_terminal() {
		let (backend, controller) = controller();
		backend.push_create(created("e1"));
		backend.push_status(
			"e1",
			Reply::Ok(JobStatusResponse {
				job_id: Some("e1".into()),
				status: JobStatus::Error,
				step: Some("오류".into()),
				result: None,
				error: Some("유튜브 검색 결과 없음".into()),
			}),
		);

		controller.submit("없는 노래", None).await;
		let settled = tokio::time::timeout(Duration::from_secs(2), controller.settled()).await.unwrap();
		assert_eq!(settled.state.error(), Some("유튜브 검색 결과 없음"));

		eventually(|| !controller.is_polling()).await;
		tokio::time::sleep(TICK * 6).await;
		assert_eq!(backend.status_calls("e1"), 1);
	}

	#[tokio::test]
	async fn ticks_never_overlap() {
		let (backend, controller) = controller();
		let gate = Arc::new(Notify::new());
		backend.push_create(created("s1"));
		backend.push_status("s1", Reply::Wait(gate.clone(), Box::new(status(JobStatus::Running, None))));
		backend.push_status("s1", done(JobResult::default()));

		controller.submit("좋은날", None).await;
		eventually(|| backend.status_calls("s1") == 1).await;
		tokio::time::sleep(TICK * 6).await;
		assert_eq!(backend.status_calls("s1"), 1);

		gate.notify_one();
		tokio::time::timeout(Duration::from_secs(2), controller.settled()).await.unwrap();
		assert_eq!(backend.peak_concurrent_status(), 1);
	}

	#[tokio::test]
	async fn resubmission_cancels_previous_polling_first() {
		let (backend, controller) = controller();
		let stale_gate = Arc::new(Notify::new());
		let create_gate = Arc::new(Notify::new());
		backend.push_create(created("old"));
		backend.push_status("old", Reply::Wait(stale_gate.clone(), Box::new(status(JobStatus::Running, Some("stale")))));
		backend.push_create(Reply::Wait(create_gate.clone(), Box::new(created("new"))));
		backend.push_status("new", done(JobResult::default()));

		controller.submit("first", None).await;
		eventually(|| backend.status_calls("old") == 1).await;

		let resubmit = controller.submit("second", None);
		let observe = async {
			tokio::task::yield_now().await;
			assert!(!controller.is_polling(), "old poller must be gone before the new create resolves");
			stale_gate.notify_one();
			tokio::time::sleep(TICK * 4).await;
			let during = controller.snapshot();
			create_gate.notify_one();
			during
		};
		let (outcome, during) = tokio::join!(resubmit, observe);

		assert_eq!(outcome, SubmitOutcome::Started(JobId::new("new")));
		assert_eq!(during.job_id, None);
		assert_eq!(during.state.step(), Some(QUEUED_STEP));

		let settled = tokio::time::timeout(Duration::from_secs(2), controller.settled()).await.unwrap();
		assert_eq!(settled.job_id, Some(JobId::new("new")));
		assert_eq!(backend.status_calls("old"), 1);
		assert_eq!(backend.peak_concurrent_status(), 1);
	}

	#[tokio::test]
	async fn stale_tick_is_discarded() {
		let (_backend, controller) = controller();
		let shared = &controller.shared;
		let generation = shared.begin_submission();
		shared.start_polling(generation, JobId::new("current"));
		controller.cancel();

		let stale = shared.apply_tick(generation, &JobId::new("current"), JobState::Done { result: None });
		assert!(!stale);
		assert_eq!(controller.snapshot().state.status(), "queued");

		let generation = shared.begin_submission();
		shared.start_polling(generation, JobId::new("current"));
		let wrong_job = shared.apply_tick(generation, &JobId::new("other"), JobState::Done { result: None });
		assert!(!wrong_job);
		assert!(controller.snapshot().state.is_active());
	}

	#[tokio::test]
	async fn cancel_is_idempotent_and_keeps_state() {
		let (backend, controller) = controller();
		backend.push_create(created("c1"));
		backend.push_status("c1", status(JobStatus::Running, Some("60초 클립 생성 중")));

		controller.cancel();
		controller.submit("좋은날", None).await;
		eventually(|| controller.snapshot().state.status() == "running").await;

		controller.cancel();
		controller.cancel();
		assert!(!controller.is_polling());

		let calls = backend.status_calls("c1");
		tokio::time::sleep(TICK * 6).await;
		assert_eq!(backend.status_calls("c1"), calls);
		assert_eq!(controller.snapshot().state.step(), Some("60초 클립 생성 중"));
	}

	#[tokio::test]
	async fn dropping_controller_stops_polling() {
		let (backend, controller) = controller();
		backend.push_create(created("d1"));

		controller.submit("좋은날", None).await;
		eventually(|| backend.status_calls("d1") >= 1).await;
		drop(controller);

		let calls = backend.status_calls("d1");
		tokio::time::sleep(TICK * 6).await;
		assert!(backend.status_calls("d1") <= calls + 1);
	}
}
