mod cookies;
mod download;
mod folder;
mod health;

use std::time::Duration;

use serde::Serialize;
use yongent::ClientConfig;

use crate::cli::{Cli, Commands};
use crate::error::Result;
use crate::output::{OutputFormat, ResultBuilder, TextRender, print_result};

pub async fn dispatch(cli: Cli) -> Result<()> {
	let format = cli.format;
	let config = match resolve_config(&cli) {
		Ok(config) => config,
		Err(err) => return report::<()>("config", format, Err(err)),
	};

	match cli.command {
		Commands::Download(args) => download::run(config, args, format).await,
		Commands::Cookies { action } => cookies::run(config, action, format).await,
		Commands::PickFolder => folder::run(config, format).await,
		Commands::Health => health::run(config, format).await,
	}
}

/// Config file and environment first, then command-line flags.
fn resolve_config(cli: &Cli) -> Result<ClientConfig> {
	let mut config = ClientConfig::load(cli.config.as_deref())?;
	if let Some(api) = &cli.api {
		config = config.with_base_url(api)?;
	}
	if let Some(prefix) = &cli.prefix {
		config = config.with_route_prefix(prefix);
	}
	if let Some(ms) = cli.poll_interval_ms {
		if ms == 0 {
			return Err(yongent::Error::Config("poll interval must be greater than zero".into()).into());
		}
		config = config.with_poll_interval(Duration::from_millis(ms));
	}
	Ok(config)
}

/// Prints `outcome` as the command's result and passes the error through.
fn report<T: Serialize + TextRender>(command: &str, format: OutputFormat, outcome: Result<T>) -> Result<()> {
	match outcome {
		Ok(data) => {
			print_result(&ResultBuilder::new(command).data(data).build(), format);
			Ok(())
		}
		Err(err) => {
			print_result(&ResultBuilder::<T>::new(command).error(err.code(), err.message()).build(), format);
			Err(err)
		}
	}
}

impl TextRender for () {
	fn render_text(&self, _out: &mut dyn std::io::Write) -> std::io::Result<()> {
		Ok(())
	}
}
