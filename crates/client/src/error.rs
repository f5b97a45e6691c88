//! Error types for the suggestion client.

use thiserror::Error;

/// Errors produced by a suggestion round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
	/// The endpoint could not be reached.
	#[error("transport error: {0}")]
	Transport(String),

	/// The endpoint answered with a non-success status.
	#[error("status {status}: {message}")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Response body, usually the server's validation message.
		message: String,
	},

	/// The response body was not a `{ values }` object.
	#[error("format error: {0}")]
	Format(String),

	/// A newer call superseded this one.
	#[error("request cancelled")]
	Cancelled,
}

impl ClientError {
	/// Returns true if the call was superseded rather than failed.
	pub fn is_cancelled(&self) -> bool {
		matches!(self, Self::Cancelled)
	}
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
