//! Error types for dataset loading.

use thiserror::Error;

/// Errors produced while fetching or decoding a published dataset.
///
/// Variants carry rendered messages rather than source errors so one load
/// result can be cloned out to every caller waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
	/// The manifest or dataset endpoint was unreachable or answered with a
	/// non-success status.
	#[error("transport error: {0}")]
	Transport(String),

	/// The manifest or dataset payload did not have the expected shape.
	#[error("format error: {0}")]
	Format(String),

	/// Local failure unrelated to the payload (temp file I/O, task panic).
	#[error("internal error: {0}")]
	Internal(String),
}

impl IndexError {
	/// Returns true for failures of the remote side.
	pub fn is_transport(&self) -> bool {
		matches!(self, Self::Transport(_))
	}
}

impl From<rusqlite::Error> for IndexError {
	fn from(error: rusqlite::Error) -> Self {
		Self::Format(error.to_string())
	}
}

/// Result type for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;
