//! tracing-subscriber setup for the CLI.

use tracing_subscriber::EnvFilter;

/// Installs a stderr fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbose` picks the level
/// (0 warn, 1 info, 2 debug, 3+ trace). HTTP internals stay at warn below trace.
pub fn init_logging(verbose: u8) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(verbose >= 2)
		.try_init();
}

fn default_directives(verbose: u8) -> String {
	match verbose {
		0 => "warn".to_string(),
		1 => "info,hyper=warn,reqwest=warn".to_string(),
		2 => "debug,hyper=warn,reqwest=warn,h2=warn".to_string(),
		_ => "trace".to_string(),
	}
}
