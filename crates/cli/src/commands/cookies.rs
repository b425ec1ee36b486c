use tracing::info;
use yongent::{ClientConfig, ControlSurface, CredentialFile, CredentialView};

use super::report;
use crate::cli::CookiesAction;
use crate::error::Result;
use crate::output::OutputFormat;

pub async fn run(config: ClientConfig, action: CookiesAction, format: OutputFormat) -> Result<()> {
	let command = match &action {
		CookiesAction::Status => "cookies.status",
		CookiesAction::Upload { .. } => "cookies.upload",
		CookiesAction::Revoke => "cookies.revoke",
	};
	let outcome = execute(config, action).await;
	report(command, format, outcome)
}

async fn execute(config: ClientConfig, action: CookiesAction) -> Result<CredentialView> {
	let surface = ControlSurface::mount(config).await?;
	let credentials = surface.credentials();

	match action {
		CookiesAction::Status => {
			if credentials.view().active != Some(true) {
				credentials.open_guide();
			}
		}
		CookiesAction::Upload { file } => {
			let file = CredentialFile::from_path(&file).await?;
			info!(target: "yongent.cli", file = %file.file_name, "uploading cookie file");
			credentials.upload(file).await?;
		}
		CookiesAction::Revoke => credentials.revoke().await,
	}

	let view = credentials.view();
	surface.unmount();
	Ok(view)
}
