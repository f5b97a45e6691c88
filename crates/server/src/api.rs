//! Request validation for the query endpoint.

use protestmap_primitives::{QueryRequest, ValueType};
use serde_json::Value;

use crate::error::ValidationError;

/// Validates a raw `POST /api/getValues` body.
///
/// Checks run in order: the body parses as JSON, `query` is a string with
/// non-whitespace content, `valueType` is one of the two literals. The query
/// is passed on untrimmed.
pub fn parse_query_request(body: &[u8]) -> Result<QueryRequest, ValidationError> {
	let body: Value = serde_json::from_slice(body).map_err(|_| ValidationError::InvalidJson)?;

	let query = body
		.get("query")
		.and_then(Value::as_str)
		.filter(|query| !query.trim().is_empty())
		.ok_or(ValidationError::MissingQuery)?;

	let value_type = body
		.get("valueType")
		.and_then(Value::as_str)
		.and_then(|literal| literal.parse::<ValueType>().ok())
		.ok_or(ValidationError::InvalidValueType)?;

	Ok(QueryRequest {
		query: query.to_owned(),
		value_type,
	})
}
