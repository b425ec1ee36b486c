use std::io::{self, Write};
use std::sync::Arc;

use serde::Serialize;
use yongent::{ClientConfig, HttpBackend, OutputLocationResolver};

use super::report;
use crate::error::{CliError, Result};
use crate::output::{OutputFormat, TextRender};

/// Result of `pick-folder`; `path` is `None` when the dialog was dismissed.
#[derive(Debug, Serialize)]
pub struct PickedFolder {
	pub path: Option<String>,
}

impl TextRender for PickedFolder {
	fn render_text(&self, out: &mut dyn Write) -> io::Result<()> {
		match &self.path {
			Some(path) => writeln!(out, "{path}"),
			None => writeln!(out, "No folder chosen; the backend default will be used"),
		}
	}
}

pub async fn run(config: ClientConfig, format: OutputFormat) -> Result<()> {
	let outcome = async {
		let mut resolver = OutputLocationResolver::new(Arc::new(HttpBackend::new(config)?));
		let path = resolver.pick_location().await.map(str::to_string);
		Ok::<_, CliError>(PickedFolder { path })
	}
	.await;
	report("pick-folder", format, outcome)
}
