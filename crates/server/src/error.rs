//! Error types for the HTTP front end.

use std::path::PathBuf;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use protestmap_index::IndexError;
use serde::Serialize;
use thiserror::Error;

/// Rejections of a malformed `POST /api/getValues` body.
///
/// The display strings are the messages sent back to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
	#[error("Body must be valid JSON")]
	InvalidJson,
	#[error("query is required")]
	MissingQuery,
	#[error("valueType must be 'location' or 'eventName'")]
	InvalidValueType,
}

/// Failure of a request handler.
#[derive(Debug, Error)]
pub enum ServerError {
	#[error(transparent)]
	Validation(#[from] ValidationError),
	#[error(transparent)]
	Index(#[from] IndexError),
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub(crate) struct ErrorBody {
	pub message: String,
}

/// Detail of an internal failure, attached to the 500 response for the
/// logging middleware and never serialized.
#[derive(Debug, Clone)]
pub(crate) struct InternalDetail(pub String);

pub(crate) const INTERNAL_MESSAGE: &str = "Internal error";

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		match self {
			Self::Validation(error) => (
				StatusCode::BAD_REQUEST,
				Json(ErrorBody {
					message: error.to_string(),
				}),
			)
				.into_response(),
			Self::Index(error) => {
				let mut response = (
					StatusCode::INTERNAL_SERVER_ERROR,
					Json(ErrorBody {
						message: INTERNAL_MESSAGE.to_owned(),
					}),
				)
					.into_response();
				response.extensions_mut().insert(InternalDetail(error.to_string()));
				response
			}
		}
	}
}

/// Errors loading the server configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("invalid data root {0:?}: {1}")]
	InvalidDataRoot(String, url::ParseError),

	#[error("poll interval must be at least one second")]
	ZeroPollInterval,
}
