use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "yongent")]
#[command(about = "Submit and follow music-downloader jobs, manage the backend's cookie file")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug, -vvv trace)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format
	#[arg(short = 'f', long, global = true, value_enum, default_value_t = OutputFormat::Text)]
	pub format: OutputFormat,

	/// Backend base URL (overrides config and YONGENT_API_URL)
	#[arg(long, global = true, value_name = "URL")]
	pub api: Option<String>,

	/// Route prefix the downloader agent is mounted at
	#[arg(long, global = true, value_name = "PATH")]
	pub prefix: Option<String>,

	/// Status poll interval in milliseconds
	#[arg(long, global = true, value_name = "MS")]
	pub poll_interval_ms: Option<u64>,

	/// Config file to load instead of the default location
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Download a song by URL or "artist - title" search and follow the job
	#[command(alias = "dl")]
	Download(DownloadArgs),

	/// Manage the cookie file the backend signs in with
	Cookies {
		#[command(subcommand)]
		action: CookiesAction,
	},

	/// Open the backend's folder dialog and print the chosen path
	PickFolder,

	/// Check that the backend is up
	Health,
}

#[derive(Args, Debug)]
pub struct DownloadArgs {
	/// URL, or search words such as `아이유 - 좋은날`
	#[arg(required = true, num_args = 1..)]
	pub input: Vec<String>,

	/// Directory the backend should write into (defaults to its download dir)
	#[arg(short, long, value_name = "DIR")]
	pub output_dir: Option<String>,

	/// Choose the output directory with the backend's folder dialog
	#[arg(long, conflicts_with = "output_dir")]
	pub pick_folder: bool,

	/// Print the job id and exit without following the job
	#[arg(long)]
	pub no_wait: bool,
}

#[derive(Subcommand, Debug)]
pub enum CookiesAction {
	/// Show whether the backend holds a cookie file
	Status,

	/// Upload a Netscape-format cookie file
	Upload {
		/// Path to cookies.txt
		file: PathBuf,
	},

	/// Delete the backend's cookie file
	Revoke,
}
