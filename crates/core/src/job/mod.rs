//! Job state model and the controller that drives it.

mod controller;

pub use controller::{JobController, QUEUED_STEP, SubmitOutcome};
use serde::Serialize;
use yongent_protocol::{JobResult, JobStatus, JobStatusResponse};

/// Message used when the backend reports `error` without saying why.
pub const UNKNOWN_JOB_ERROR: &str = "unknown error";

/// Opaque job identifier issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl std::fmt::Display for JobId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

/// Lifecycle of the tracked job.
///
/// Only [`JobState::Done`] carries a result and only [`JobState::Error`]
/// carries a message, so states such as "queued with a result" cannot be
/// represented.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobState {
	#[default]
	Idle,
	Queued {
		#[serde(skip_serializing_if = "Option::is_none")]
		step: Option<String>,
	},
	Running {
		#[serde(skip_serializing_if = "Option::is_none")]
		step: Option<String>,
	},
	Done {
		#[serde(skip_serializing_if = "Option::is_none")]
		result: Option<JobResult>,
	},
	Error {
		message: String,
	},
}

impl JobState {
	pub fn status(&self) -> &'static str {
		match self {
			JobState::Idle => "idle",
			JobState::Queued { .. } => "queued",
			JobState::Running { .. } => "running",
			JobState::Done { .. } => "done",
			JobState::Error { .. } => "error",
		}
	}

	/// Queued or running: the job is still being polled.
	pub fn is_active(&self) -> bool {
		matches!(self, JobState::Queued { .. } | JobState::Running { .. })
	}

	pub fn is_terminal(&self) -> bool {
		matches!(self, JobState::Done { .. } | JobState::Error { .. })
	}

	pub fn step(&self) -> Option<&str> {
		match self {
			JobState::Queued { step } | JobState::Running { step } => step.as_deref(),
			_ => None,
		}
	}

	pub fn result(&self) -> Option<&JobResult> {
		match self {
			JobState::Done { result } => result.as_ref(),
			_ => None,
		}
	}

	pub fn error(&self) -> Option<&str> {
		match self {
			JobState::Error { message } => Some(message),
			_ => None,
		}
	}
}

impl From<JobStatusResponse> for JobState {
	/// Builds the whole state from one status response; fields that do not
	/// belong to the reported status are dropped.
	fn from(response: JobStatusResponse) -> Self {
		match response.status {
			JobStatus::Queued => JobState::Queued { step: response.step },
			JobStatus::Running => JobState::Running { step: response.step },
			JobStatus::Done => JobState::Done { result: response.result },
			JobStatus::Error => JobState::Error {
				message: response.error.filter(|m| !m.trim().is_empty()).unwrap_or_else(|| UNKNOWN_JOB_ERROR.to_string()),
			},
		}
	}
}

/// What the controller currently tracks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobSnapshot {
	pub job_id: Option<JobId>,
	#[serde(flatten)]
	pub state: JobState,
}
