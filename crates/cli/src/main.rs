use clap::Parser;
use tracing::debug;
use yongent_cli::cli::Cli;
use yongent_cli::{commands, logging};

#[tokio::main(flavor = "current_thread")]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	if let Err(err) = commands::dispatch(cli).await {
		debug!(target: "yongent", error = %err, "command failed");
		std::process::exit(err.exit_code());
	}
}
