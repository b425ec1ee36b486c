use yongent::{Backend, ClientConfig, HttpBackend};

use super::report;
use crate::error::{CliError, Result};
use crate::output::OutputFormat;

pub async fn run(config: ClientConfig, format: OutputFormat) -> Result<()> {
	let outcome = async {
		let backend = HttpBackend::new(config)?;
		Ok::<_, CliError>(backend.health().await?)
	}
	.await;
	report("health", format, outcome)
}
