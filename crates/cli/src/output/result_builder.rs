use std::io::{self, Write};
use std::time::Instant;

use serde::Serialize;
use yongent::JobSnapshot;

use super::render::TextRender;
use crate::output::format::OutputFormat;
use crate::output::model::{CommandError, CommandResult, ErrorCode, SCHEMA_VERSION};

/// Builder for constructing command results.
pub struct ResultBuilder<T: Serialize> {
	command: String,
	data: Option<T>,
	error: Option<CommandError>,
	start_time: Instant,
}

impl<T: Serialize> ResultBuilder<T> {
	pub fn new(command: impl Into<String>) -> Self {
		Self {
			command: command.into(),
			data: None,
			error: None,
			start_time: Instant::now(),
		}
	}

	pub fn data(mut self, data: T) -> Self {
		self.data = Some(data);
		self
	}

	pub fn error(mut self, code: ErrorCode, message: impl Into<String>) -> Self {
		self.error = Some(CommandError {
			code,
			message: message.into(),
		});
		self
	}

	pub fn build(self) -> CommandResult<T> {
		let ok = self.error.is_none() && self.data.is_some();

		CommandResult {
			schema_version: Some(SCHEMA_VERSION),
			ok,
			command: self.command,
			data: self.data,
			error: self.error,
			duration_ms: Some(self.start_time.elapsed().as_millis() as u64),
		}
	}
}

/// Print a command result in the specified format.
///
/// Text output goes to stdout; a text-mode error line goes to stderr.
pub fn print_result<T: Serialize + TextRender>(result: &CommandResult<T>, format: OutputFormat) {
	match format {
		OutputFormat::Json => {
			if let Ok(json) = serde_json::to_string_pretty(result) {
				println!("{json}");
			}
		}
		OutputFormat::Ndjson => {
			if let Ok(json) = serde_json::to_string(result) {
				println!("{json}");
			}
		}
		OutputFormat::Text => print_result_text(result),
	}
}

fn print_result_text<T: Serialize + TextRender>(result: &CommandResult<T>) {
	if let Some(ref data) = result.data {
		let mut stdout = io::stdout().lock();
		let _ = data.render_text(&mut stdout);
	}
	if let Some(ref error) = result.error {
		eprintln!("Error [{}]: {}", error.code, error.message);
	}
}

/// Streams one progress snapshot while a job is followed.
pub fn print_snapshot_line(snapshot: &JobSnapshot, format: OutputFormat) {
	match format {
		OutputFormat::Json => {}
		OutputFormat::Ndjson => {
			if let Ok(json) = serde_json::to_string(&serde_json::json!({ "event": "progress", "job": snapshot })) {
				println!("{json}");
			}
		}
		OutputFormat::Text => {
			let mut stdout = io::stdout().lock();
			let _ = super::render::render_progress(&mut stdout, snapshot);
			let _ = stdout.flush();
		}
	}
}
