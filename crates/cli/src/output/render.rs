//! Human-readable rendering of command payloads.

use std::io::{self, Write};

use colored::Colorize;
use yongent::protocol::{HealthStatus, JobResult};
use yongent::{CredentialView, JobSnapshot, JobState};

const PLACEHOLDER: &str = "-";

/// Text rendering used by [`OutputFormat::Text`](super::OutputFormat::Text).
pub trait TextRender {
	fn render_text(&self, out: &mut dyn Write) -> io::Result<()>;
}

impl TextRender for JobSnapshot {
	fn render_text(&self, out: &mut dyn Write) -> io::Result<()> {
		let id = self.job_id.as_ref().map(|id| id.as_str()).unwrap_or(PLACEHOLDER);
		match &self.state {
			JobState::Idle => Ok(()),
			JobState::Queued { .. } | JobState::Running { .. } => {
				writeln!(out, "Job {} submitted ({})", id.bold(), self.state.status())
			}
			JobState::Done { result } => {
				writeln!(out, "{}", "Download complete".green().bold())?;
				match result {
					Some(result) => render_result(out, result),
					None => writeln!(out, "  (backend returned no metadata)"),
				}
			}
			JobState::Error { .. } => writeln!(out, "Job {} {}", id, "failed".red().bold()),
		}
	}
}

fn render_result(out: &mut dyn Write, result: &JobResult) -> io::Result<()> {
	let rows = [
		("Title", &result.title),
		("Artist", &result.artist),
		("Album", &result.album),
		("Year", &result.year),
		("Composer", &result.composer),
		("Lyricist", &result.lyricist),
		("Source", &result.youtube_url),
	];
	for (label, value) in rows {
		writeln!(out, "  {:<10} {}", label, display_or_placeholder(value))?;
	}

	if let Some(files) = &result.files {
		writeln!(out)?;
		let dir = result.song_dir.as_deref().filter(|d| !d.trim().is_empty()).unwrap_or("(backend download directory)");
		writeln!(out, "Files in {dir}/")?;
		for (role, name) in files.entries() {
			writeln!(out, "  └ {name} ({role})")?;
		}
	}
	Ok(())
}

fn display_or_placeholder(value: &Option<String>) -> &str {
	value.as_deref().map(str::trim).filter(|v| !v.is_empty()).unwrap_or(PLACEHOLDER)
}

/// One progress line, printed whenever the tracked state changes.
pub(super) fn render_progress(out: &mut dyn Write, snapshot: &JobSnapshot) -> io::Result<()> {
	if !snapshot.state.is_active() {
		return Ok(());
	}
	let step = snapshot.state.step().unwrap_or("processing");
	writeln!(out, "{} {}", format!("[{}]", snapshot.state.status()).dimmed(), step)
}

impl TextRender for CredentialView {
	fn render_text(&self, out: &mut dyn Write) -> io::Result<()> {
		match self.active {
			Some(true) => {
				write!(out, "Cookie file: {}", "active".green())?;
				match &self.path {
					Some(path) => writeln!(out, " ({path})"),
					None => writeln!(out),
				}
			}
			Some(false) => writeln!(out, "Cookie file: {}", "not configured".yellow()),
			None => writeln!(out, "Cookie file: unknown"),
		}?;
		if self.guide_open {
			writeln!(out)?;
			writeln!(out, "Export cookies for the source site in Netscape format (cookies.txt)")?;
			writeln!(out, "from a signed-in browser session, then run:")?;
			writeln!(out, "  yongent cookies upload <FILE>")?;
		}
		Ok(())
	}
}

impl TextRender for HealthStatus {
	fn render_text(&self, out: &mut dyn Write) -> io::Result<()> {
		if self.is_ok() {
			writeln!(out, "backend: {}", "ok".green())
		} else {
			writeln!(out, "backend: {}", self.status.yellow())
		}
	}
}
