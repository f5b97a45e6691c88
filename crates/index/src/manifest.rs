//! Descriptor of the currently published dataset.

use serde::{Deserialize, Serialize};

use crate::error::{IndexError, Result};

/// Published dataset descriptor (`latest.json`).
///
/// Identity for freshness checks is `(dataset_id, content_hash)`. The
/// publisher's `last_updated` stamp is kept verbatim and never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
	/// File name of the dataset image, relative to the data root.
	#[serde(rename = "dbFilename")]
	pub dataset_id: String,
	#[serde(rename = "lastUpdated", default, skip_serializing_if = "Option::is_none")]
	pub last_updated: Option<String>,
	#[serde(rename = "sha", default, skip_serializing_if = "Option::is_none")]
	pub content_hash: Option<String>,
}

impl Manifest {
	/// Parses a manifest payload.
	pub fn from_json(payload: &[u8]) -> Result<Self> {
		let manifest: Self = serde_json::from_slice(payload)
			.map_err(|e| IndexError::Format(format!("invalid manifest: {e}")))?;
		if manifest.dataset_id.trim().is_empty() {
			return Err(IndexError::Format("manifest has an empty dbFilename".into()));
		}
		Ok(manifest)
	}

	/// Returns true when both manifests describe the same dataset version.
	pub fn is_equivalent(&self, other: &Self) -> bool {
		self.dataset_id == other.dataset_id && self.content_hash == other.content_hash
	}
}
