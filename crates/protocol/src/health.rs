//! Liveness probe body.

use serde::{Deserialize, Serialize};

/// Body returned by `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
	pub status: String,
}

impl HealthStatus {
	pub fn is_ok(&self) -> bool {
		self.status.eq_ignore_ascii_case("ok")
	}
}
