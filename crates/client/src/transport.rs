//! Transport seam between the suggestion client and the query endpoint.

use async_trait::async_trait;
use protestmap_primitives::{QueryRequest, QueryResponse};
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::{ClientError, Result};

/// Sends one query and returns the endpoint's value list.
///
/// Implementations must resolve to [`ClientError::Cancelled`] promptly once
/// `cancel` fires.
#[async_trait]
pub trait ValuesTransport: Send + Sync {
	async fn fetch_values(&self, request: &QueryRequest, cancel: &CancellationToken) -> Result<Vec<String>>;
}

/// `POST {endpoint}` with a JSON body.
#[derive(Debug, Clone)]
pub struct HttpValuesTransport {
	client: Client,
	endpoint: Url,
}

impl HttpValuesTransport {
	pub fn new(endpoint: &str) -> Result<Self> {
		let endpoint = Url::parse(endpoint)
			.map_err(|e| ClientError::Transport(format!("invalid endpoint {endpoint}: {e}")))?;
		let client = Client::builder()
			.user_agent(concat!("protestmap-client/", env!("CARGO_PKG_VERSION")))
			.build()
			.map_err(|e| ClientError::Transport(e.to_string()))?;
		Ok(Self::with_client(client, endpoint))
	}

	pub fn with_client(client: Client, endpoint: Url) -> Self {
		Self { client, endpoint }
	}

	pub fn endpoint(&self) -> &Url {
		&self.endpoint
	}

	async fn post(&self, request: &QueryRequest) -> Result<Vec<String>> {
		let response = self
			.client
			.post(self.endpoint.clone())
			.json(request)
			.send()
			.await
			.map_err(|e| ClientError::Transport(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			let message = response.text().await.unwrap_or_default();
			return Err(ClientError::Status {
				status: status.as_u16(),
				message,
			});
		}

		let body: QueryResponse = response.json().await.map_err(|e| {
			if e.is_decode() {
				ClientError::Format(e.to_string())
			} else {
				ClientError::Transport(e.to_string())
			}
		})?;
		Ok(body.values)
	}
}

#[async_trait]
impl ValuesTransport for HttpValuesTransport {
	async fn fetch_values(&self, request: &QueryRequest, cancel: &CancellationToken) -> Result<Vec<String>> {
		tokio::select! {
			biased;
			() = cancel.cancelled() => Err(ClientError::Cancelled),
			result = self.post(request) => result,
		}
	}
}
