//! Job creation and status polling bodies.

use serde::{Deserialize, Serialize};

/// Body of `POST /download`.
///
/// Exactly one of `url` or `query` is set; use [`CreateJobRequest::locator`]
/// or [`CreateJobRequest::search`] to build one.
///
/// ```json
/// { "query": "아이유 - 좋은날", "output_dir": "/music" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateJobRequest {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub url: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub query: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub output_dir: Option<String>,
}

impl CreateJobRequest {
	/// Request that downloads a direct resource locator.
	pub fn locator(url: impl Into<String>) -> Self {
		Self {
			url: Some(url.into()),
			query: None,
			output_dir: None,
		}
	}

	/// Request that searches the source site for `query` first.
	pub fn search(query: impl Into<String>) -> Self {
		Self {
			url: None,
			query: Some(query.into()),
			output_dir: None,
		}
	}

	/// Sets the destination directory. Blank values are dropped so the backend default applies.
	pub fn with_output_dir(mut self, output_dir: Option<&str>) -> Self {
		self.output_dir = output_dir.map(str::trim).filter(|dir| !dir.is_empty()).map(str::to_string);
		self
	}
}

/// Body returned by `POST /download` on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateJobResponse {
	pub job_id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status: Option<JobStatus>,
}

/// Job status as reported by the backend.
///
/// The client-side `idle` state never appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
	Queued,
	Running,
	Done,
	Error,
}

impl JobStatus {
	/// `done` and `error` end the job; nothing is polled after them.
	pub fn is_terminal(self) -> bool {
		matches!(self, JobStatus::Done | JobStatus::Error)
	}

	pub fn as_str(self) -> &'static str {
		match self {
			JobStatus::Queued => "queued",
			JobStatus::Running => "running",
			JobStatus::Done => "done",
			JobStatus::Error => "error",
		}
	}
}

impl std::fmt::Display for JobStatus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Body returned by `GET /status/{job_id}`.
///
/// ```json
/// {
///   "job_id": "abc123",
///   "status": "running",
///   "step": "메타데이터 수집 중 (멜론, MusicBrainz)"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatusResponse {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub job_id: Option<String>,
	pub status: JobStatus,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub step: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub result: Option<JobResult>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

/// Metadata and file layout of a finished download.
///
/// Every field is optional; the backend fills what its metadata sources found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobResult {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub artist: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub album: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub year: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub composer: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub lyricist: Option<String>,
	/// Source locator the audio was fetched from.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub youtube_url: Option<String>,
	/// Directory the files were written to.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub song_dir: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub files: Option<JobFiles>,
}

/// Filenames written into [`JobResult::song_dir`], keyed by role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFiles {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub audio: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub clip: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub meta: Option<String>,
}

impl JobFiles {
	/// Present files as `(role, filename)` pairs in audio, clip, meta order.
	pub fn entries(&self) -> impl Iterator<Item = (&'static str, &str)> {
		[("audio", &self.audio), ("clip", &self.clip), ("meta", &self.meta)]
			.into_iter()
			.filter_map(|(role, name)| name.as_deref().map(|name| (role, name)))
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn locator_request_never_carries_query() {
		let body = serde_json::to_value(CreateJobRequest::locator("https://youtu.be/xyz")).unwrap();
		assert_eq!(body, json!({ "url": "https://youtu.be/xyz" }));
	}

	#[test]
	fn blank_output_dir_is_omitted() {
		let body = serde_json::to_value(CreateJobRequest::search("좋은날").with_output_dir(Some("   "))).unwrap();
		assert_eq!(body, json!({ "query": "좋은날" }));

		let body = serde_json::to_value(CreateJobRequest::search("좋은날").with_output_dir(Some("/music"))).unwrap();
		assert_eq!(body, json!({ "query": "좋은날", "output_dir": "/music" }));
	}

	#[test]
	fn status_response_accepts_sparse_result() {
		let parsed: JobStatusResponse = serde_json::from_value(json!({
			"job_id": "abc123",
			"status": "done",
			"step": "완료",
			"result": { "title": "좋은날", "files": { "audio": "a.mp3" } }
		}))
		.unwrap();

		assert!(parsed.status.is_terminal());
		let result = parsed.result.unwrap();
		assert_eq!(result.title.as_deref(), Some("좋은날"));
		assert_eq!(result.artist, None);
		let files: Vec<_> = result.files.unwrap().entries().collect();
		assert_eq!(files, vec![("audio", "a.mp3")]);
	}

	#[test]
	fn unknown_status_is_rejected() {
		let parsed = serde_json::from_value::<JobStatusResponse>(json!({ "status": "paused" }));
		assert!(parsed.is_err());
	}
}
