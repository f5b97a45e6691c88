//! Suggestion lookups: cache in front of the transport, throttled per field.

use std::sync::Arc;
use std::time::Duration;

use protestmap_primitives::{QueryRequest, ValueType};
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

use crate::cache::QueryCache;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::throttle::RequestThrottle;
use crate::transport::{HttpValuesTransport, ValuesTransport};

/// Cached access to the query endpoint.
pub struct SuggestClient {
	transport: Arc<dyn ValuesTransport>,
	cache: QueryCache,
}

impl std::fmt::Debug for SuggestClient {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SuggestClient").field("cache", &self.cache).finish_non_exhaustive()
	}
}

impl SuggestClient {
	pub fn new(transport: Arc<dyn ValuesTransport>, cache: QueryCache) -> Self {
		Self { transport, cache }
	}

	/// Client talking HTTP to `config.endpoint`.
	pub fn http(config: &ClientConfig) -> Result<Self> {
		let transport = HttpValuesTransport::new(&config.endpoint)?;
		Ok(Self::new(Arc::new(transport), QueryCache::new(config.cache_ttl)))
	}

	pub fn cache(&self) -> &QueryCache {
		&self.cache
	}

	/// Returns up to 20 values matching `query`.
	///
	/// Blank queries answer an empty list without a round-trip. Successful
	/// responses are cached; failures are not.
	pub async fn get_values(
		&self,
		value_type: ValueType,
		query: &str,
		cancel: &CancellationToken,
	) -> Result<Vec<String>> {
		if query.trim().is_empty() {
			return Ok(Vec::new());
		}
		if let Some(values) = self.cache.get(value_type, query) {
			trace!(%value_type, query, "suggest.cache_hit");
			return Ok(values);
		}

		let request = QueryRequest {
			query: query.to_owned(),
			value_type,
		};
		let values = self.transport.fetch_values(&request, cancel).await?;
		self.cache.put(value_type, query, values.clone());
		Ok(values)
	}

	/// Like [`get_values`](Self::get_values), but any failure yields an empty
	/// list. Cancellation is silent; other errors are logged.
	pub async fn suggest(&self, value_type: ValueType, query: &str, cancel: &CancellationToken) -> Vec<String> {
		match self.get_values(value_type, query, cancel).await {
			Ok(values) => values,
			Err(ClientError::Cancelled) => Vec::new(),
			Err(error) => {
				warn!(%value_type, query, %error, "suggest.failed");
				Vec::new()
			}
		}
	}
}

/// Search-as-you-type front end: one throttle per value type over a shared
/// [`SuggestClient`].
///
/// Each `matching_*` call resolves to `None` when a newer keystroke for the
/// same field superseded it.
#[derive(Debug)]
pub struct Suggester {
	locations: RequestThrottle<String, Vec<String>>,
	event_names: RequestThrottle<String, Vec<String>>,
}

impl Suggester {
	pub fn new(client: Arc<SuggestClient>, quiet_period: Duration) -> Self {
		Self {
			locations: bind(Arc::clone(&client), ValueType::Location, quiet_period),
			event_names: bind(client, ValueType::EventName, quiet_period),
		}
	}

	pub fn http(config: &ClientConfig) -> Result<Self> {
		let client = SuggestClient::http(config)?;
		Ok(Self::new(Arc::new(client), config.quiet_period))
	}

	pub async fn matching(&self, value_type: ValueType, query: impl Into<String>) -> Option<Vec<String>> {
		match value_type {
			ValueType::Location => self.locations.call(query.into()).await,
			ValueType::EventName => self.event_names.call(query.into()).await,
		}
	}

	pub async fn matching_locations(&self, query: impl Into<String>) -> Option<Vec<String>> {
		self.matching(ValueType::Location, query).await
	}

	pub async fn matching_event_names(&self, query: impl Into<String>) -> Option<Vec<String>> {
		self.matching(ValueType::EventName, query).await
	}
}

fn bind(
	client: Arc<SuggestClient>,
	value_type: ValueType,
	quiet_period: Duration,
) -> RequestThrottle<String, Vec<String>> {
	RequestThrottle::new(quiet_period, move |query: String, cancel: CancellationToken| {
		let client = Arc::clone(&client);
		async move { client.suggest(value_type, &query, &cancel).await }
	})
}
