use thiserror::Error;

use crate::output::ErrorCode;

#[derive(Debug, Error)]
pub enum CliError {
	#[error(transparent)]
	Client(#[from] yongent::Error),

	#[error("nothing to download: input is blank")]
	EmptyInput,

	#[error("{0}")]
	SubmissionFailed(String),

	#[error("{0}")]
	JobFailed(String),

	#[error("interrupted")]
	Interrupted,

	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
}

impl CliError {
	pub fn code(&self) -> ErrorCode {
		match self {
			CliError::Client(yongent::Error::Config(_) | yongent::Error::InvalidUrl(_)) => ErrorCode::ConfigError,
			CliError::Client(yongent::Error::Transport(_)) => ErrorCode::BackendUnreachable,
			CliError::Client(yongent::Error::Rejected { .. }) => ErrorCode::BackendRejected,
			CliError::Client(yongent::Error::UploadInProgress) => ErrorCode::CredentialError,
			CliError::Client(yongent::Error::Io(_)) => ErrorCode::IoError,
			CliError::Client(_) => ErrorCode::InternalError,
			CliError::EmptyInput => ErrorCode::InvalidInput,
			CliError::SubmissionFailed(_) => ErrorCode::SubmissionFailed,
			CliError::JobFailed(_) => ErrorCode::JobFailed,
			CliError::Interrupted => ErrorCode::Interrupted,
			CliError::Io(_) => ErrorCode::IoError,
		}
	}

	/// Text shown to the user; backend rejections show their `detail`.
	pub fn message(&self) -> String {
		match self {
			CliError::Client(err) => err.user_message(),
			other => other.to_string(),
		}
	}

	pub fn exit_code(&self) -> i32 {
		match self {
			CliError::Interrupted => 130,
			_ => 1,
		}
	}
}

pub type Result<T> = std::result::Result<T, CliError>;
