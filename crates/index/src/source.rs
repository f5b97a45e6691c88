//! Retrieval of the published manifest and dataset image.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CACHE_CONTROL;
use tracing::debug;
use url::Url;

use crate::error::{IndexError, Result};
use crate::manifest::Manifest;

/// Name of the manifest document under the data root.
pub const MANIFEST_FILE: &str = "latest.json";

/// Where published datasets come from.
///
/// Implementations do not retry; the manager's polling cadence is the retry
/// policy.
#[async_trait]
pub trait IndexSource: Send + Sync {
	/// Fetches the descriptor of the currently published dataset.
	async fn fetch_manifest(&self) -> Result<Manifest>;

	/// Fetches the dataset image the manifest points at.
	async fn fetch_dataset(&self, manifest: &Manifest) -> Result<Bytes>;
}

/// [`IndexSource`] that reads `latest.json` and dataset files over HTTP from
/// one data root.
#[derive(Debug, Clone)]
pub struct HttpIndexSource {
	client: reqwest::Client,
	root: Url,
}

impl HttpIndexSource {
	/// Creates a source rooted at `root` (e.g. `https://protestmap.info/data`).
	pub fn new(root: Url) -> Result<Self> {
		let client = reqwest::Client::builder()
			.user_agent(concat!("protestmap-index/", env!("CARGO_PKG_VERSION")))
			.connect_timeout(Duration::from_secs(10))
			.build()
			.map_err(|e| IndexError::Internal(format!("cannot build HTTP client: {e}")))?;
		Ok(Self::with_client(client, root))
	}

	/// Creates a source with a caller-provided HTTP client.
	pub fn with_client(client: reqwest::Client, mut root: Url) -> Self {
		if !root.path().ends_with('/') {
			let path = format!("{}/", root.path());
			root.set_path(&path);
		}
		Self { client, root }
	}

	/// Resolves a file name against the data root.
	pub fn file_url(&self, name: &str) -> Result<Url> {
		self.root
			.join(name)
			.map_err(|e| IndexError::Format(format!("bad dataset file name {name:?}: {e}")))
	}

	async fn get(&self, url: Url, no_cache: bool) -> Result<Bytes> {
		let mut request = self.client.get(url.clone());
		if no_cache {
			request = request.header(CACHE_CONTROL, "no-cache");
		}

		let response = request
			.send()
			.await
			.map_err(|e| IndexError::Transport(format!("GET {url}: {e}")))?;

		let status = response.status();
		if !status.is_success() {
			return Err(IndexError::Transport(format!("GET {url}: status {status}")));
		}

		let body = response
			.bytes()
			.await
			.map_err(|e| IndexError::Transport(format!("GET {url}: reading body: {e}")))?;
		debug!(%url, bytes = body.len(), "index_source.fetched");
		Ok(body)
	}
}

#[async_trait]
impl IndexSource for HttpIndexSource {
	async fn fetch_manifest(&self) -> Result<Manifest> {
		let url = self.file_url(MANIFEST_FILE)?;
		let body = self.get(url, true).await?;
		Manifest::from_json(&body)
	}

	async fn fetch_dataset(&self, manifest: &Manifest) -> Result<Bytes> {
		let url = self.file_url(&manifest.dataset_id)?;
		self.get(url, false).await
	}
}
