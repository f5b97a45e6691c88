use std::time::Duration;

/// Quiet period before a burst of keystrokes turns into one request.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(250);

/// How long a cached suggestion list stays fresh.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

/// Default query endpoint of a locally running server.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3000/api/getValues";

/// Client tuning knobs.
#[derive(Debug, Clone)]
pub struct ClientConfig {
	/// Full URL of `POST /api/getValues`.
	pub endpoint: String,
	pub quiet_period: Duration,
	pub cache_ttl: Duration,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			endpoint: DEFAULT_ENDPOINT.to_owned(),
			quiet_period: DEFAULT_QUIET_PERIOD,
			cache_ttl: DEFAULT_CACHE_TTL,
		}
	}
}
