use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ValueType;

/// Body of `POST /api/getValues`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
	pub query: String,
	pub value_type: ValueType,
}

/// Successful response of `POST /api/getValues`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
	pub values: Vec<String>,
}

/// Response of `GET /api/dataset`: which dataset version is being served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetInfo {
	pub dataset_id: String,
	/// Publisher's stamp from the manifest, verbatim.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub last_updated: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub content_hash: Option<String>,
	/// Creation time read from the dataset, if it carried a readable one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub created_at: Option<DateTime<Utc>>,
}
