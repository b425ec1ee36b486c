use tokio::sync::watch;
use tracing::{info, warn};
use yongent::{ClientConfig, ControlSurface, Input, JobSnapshot, JobState, SubmitOutcome};

use super::report;
use crate::cli::DownloadArgs;
use crate::error::{CliError, Result};
use crate::output::{OutputFormat, ResultBuilder, print_result, print_snapshot_line};

const COMMAND: &str = "download";

pub async fn run(config: ClientConfig, args: DownloadArgs, format: OutputFormat) -> Result<()> {
	match execute(config, args, format).await {
		Ok(snapshot) => match &snapshot.state {
			JobState::Error { message } => {
				let err = CliError::JobFailed(message.clone());
				print_result(&ResultBuilder::new(COMMAND).data(snapshot.clone()).error(err.code(), err.message()).build(), format);
				Err(err)
			}
			_ => report(COMMAND, format, Ok(snapshot)),
		},
		Err(err) => report::<JobSnapshot>(COMMAND, format, Err(err)),
	}
}

async fn execute(config: ClientConfig, args: DownloadArgs, format: OutputFormat) -> Result<JobSnapshot> {
	let raw = args.input.join(" ");
	let input = Input::parse(&raw).ok_or(CliError::EmptyInput)?;

	let mut surface = ControlSurface::mount(config).await?;

	if let Some(dir) = args.output_dir {
		surface.output_mut().set(dir);
	} else if args.pick_folder {
		match surface.output_mut().pick_location().await {
			Some(dir) => info!(target: "yongent.cli", dir, "output directory chosen"),
			None => info!(target: "yongent.cli", "no folder chosen; using the backend default"),
		}
	}

	if surface.credentials().view().active != Some(true) {
		warn!(target: "yongent.cli", "backend has no cookie file; age-restricted or members-only sources may fail");
	}
	if let Input::Query(query) = &input {
		let (artist, title) = query.artist_title();
		info!(target: "yongent.cli", artist, title, "searching");
	}

	let mut rx = surface.jobs().subscribe();
	match surface.submit(input.as_str()).await {
		SubmitOutcome::Started(_) => {}
		SubmitOutcome::Ignored => return Err(CliError::EmptyInput),
		SubmitOutcome::Failed(message) => return Err(CliError::SubmissionFailed(message)),
		SubmitOutcome::Superseded => return Err(CliError::Interrupted),
	}

	if args.no_wait {
		let snapshot = surface.jobs().snapshot();
		surface.unmount();
		return Ok(snapshot);
	}

	let snapshot = follow(&mut rx, format).await;
	surface.unmount();
	snapshot
}

/// Streams progress until the job settles or the user hits Ctrl+C.
async fn follow(rx: &mut watch::Receiver<JobSnapshot>, format: OutputFormat) -> Result<JobSnapshot> {
	let interrupt = tokio::signal::ctrl_c();
	tokio::pin!(interrupt);

	let mut last = rx.borrow_and_update().clone();
	print_snapshot_line(&last, format);

	while !last.state.is_terminal() {
		tokio::select! {
			changed = rx.changed() => {
				if changed.is_err() {
					break;
				}
				let current = rx.borrow_and_update().clone();
				if current != last {
					print_snapshot_line(&current, format);
					last = current;
				}
			}
			_ = &mut interrupt => {
				warn!(target: "yongent.cli", job_id = ?last.job_id, "interrupted; polling stopped");
				return Err(CliError::Interrupted);
			}
		}
	}
	Ok(last)
}
