//! Client configuration: backend location and polling cadence.
//!
//! Values are layered: built-in defaults, then the JSON config file, then
//! `YONGENT_*` environment variables. Command-line overrides are applied by
//! the caller through the `with_*` builders.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_ROUTE_PREFIX: &str = "/music-downloader";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1500);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const ENV_API_URL: &str = "YONGENT_API_URL";
pub const ENV_ROUTE_PREFIX: &str = "YONGENT_ROUTE_PREFIX";
pub const ENV_POLL_INTERVAL_MS: &str = "YONGENT_POLL_INTERVAL_MS";

/// On-disk format of `config.json`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigFile {
	#[serde(default)]
	pub base_url: Option<String>,
	#[serde(default)]
	pub route_prefix: Option<String>,
	#[serde(default)]
	pub poll_interval_ms: Option<u64>,
	#[serde(default)]
	pub request_timeout_secs: Option<u64>,
}

/// Resolved settings used by the HTTP backend and the job controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
	pub base_url: Url,
	/// Router mount point of the downloader agent, e.g. `/music-downloader`.
	pub route_prefix: String,
	pub poll_interval: Duration,
	pub request_timeout: Duration,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
			route_prefix: DEFAULT_ROUTE_PREFIX.to_string(),
			poll_interval: DEFAULT_POLL_INTERVAL,
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
		}
	}
}

impl ClientConfig {
	/// Loads defaults, the config file and the process environment.
	///
	/// An explicit `path` must exist; the default location is optional.
	pub fn load(path: Option<&Path>) -> Result<Self> {
		let mut config = Self::default();
		match path {
			Some(path) => config.apply_file(&read_config_file(path)?)?,
			None => {
				if let Some(path) = default_config_path().filter(|p| p.is_file()) {
					config.apply_file(&read_config_file(&path)?)?;
				}
			}
		}
		config.apply_env_from(|key| std::env::var(key).ok())?;
		Ok(config)
	}

	/// Applies values present in `file`.
	pub fn apply_file(&mut self, file: &ConfigFile) -> Result<()> {
		if let Some(base_url) = &file.base_url {
			self.base_url = parse_base_url(base_url)?;
		}
		if let Some(prefix) = &file.route_prefix {
			self.route_prefix = normalize_prefix(prefix);
		}
		if let Some(ms) = file.poll_interval_ms {
			self.poll_interval = poll_interval_from_ms(ms)?;
		}
		if let Some(secs) = file.request_timeout_secs {
			self.request_timeout = Duration::from_secs(secs);
		}
		Ok(())
	}

	/// Applies `YONGENT_*` overrides read through `lookup`.
	pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
		if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
			self.base_url = parse_base_url(&url)?;
		}
		if let Some(prefix) = lookup(ENV_ROUTE_PREFIX) {
			self.route_prefix = normalize_prefix(&prefix);
		}
		if let Some(raw) = lookup(ENV_POLL_INTERVAL_MS).filter(|v| !v.trim().is_empty()) {
			let ms = raw
				.trim()
				.parse::<u64>()
				.map_err(|e| Error::Config(format!("{ENV_POLL_INTERVAL_MS}={raw:?} is not a number: {e}")))?;
			self.poll_interval = poll_interval_from_ms(ms)?;
		}
		Ok(())
	}

	pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
		self.base_url = parse_base_url(base_url)?;
		Ok(self)
	}

	pub fn with_route_prefix(mut self, prefix: &str) -> Self {
		self.route_prefix = normalize_prefix(prefix);
		self
	}

	pub fn with_poll_interval(mut self, interval: Duration) -> Self {
		self.poll_interval = interval;
		self
	}

	pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;
		self
	}

	/// URL of an agent route: `{base_url}{route_prefix}/{segments...}`.
	///
	/// Segments are percent-encoded, so job ids are safe to pass verbatim.
	pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
		let prefix: Vec<&str> = self.route_prefix.split('/').filter(|s| !s.is_empty()).collect();
		self.join(&prefix, segments)
	}

	/// URL of a route mounted at the backend root, outside the agent prefix.
	pub fn root_endpoint(&self, segments: &[&str]) -> Result<Url> {
		self.join(&[], segments)
	}

	fn join(&self, prefix: &[&str], segments: &[&str]) -> Result<Url> {
		let mut url = self.base_url.clone();
		{
			let mut path = url
				.path_segments_mut()
				.map_err(|_| Error::Config(format!("base url cannot carry a path: {}", self.base_url)))?;
			path.pop_if_empty();
			path.extend(prefix);
			path.extend(segments);
		}
		Ok(url)
	}
}

/// `$XDG_CONFIG_HOME/yongent/config.json` (or the platform equivalent).
pub fn default_config_path() -> Option<PathBuf> {
	dirs::config_dir().map(|dir| dir.join("yongent").join("config.json"))
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
	let content = std::fs::read_to_string(path).map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
	let file = serde_json::from_str(&content).map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?;
	debug!(target: "yongent.config", path = %path.display(), "loaded config file");
	Ok(file)
}

fn parse_base_url(raw: &str) -> Result<Url> {
	let url = Url::parse(raw.trim())?;
	if !matches!(url.scheme(), "http" | "https") {
		return Err(Error::Config(format!("backend url must be http or https: {raw}")));
	}
	Ok(url)
}

fn normalize_prefix(raw: &str) -> String {
	let trimmed = raw.trim().trim_matches('/');
	if trimmed.is_empty() { String::new() } else { format!("/{trimmed}") }
}

fn poll_interval_from_ms(ms: u64) -> Result<Duration> {
	if ms == 0 {
		return Err(Error::Config("poll interval must be greater than zero".into()));
	}
	Ok(Duration::from_millis(ms))
}
