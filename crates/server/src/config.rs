//! Server configuration: TOML file with built-in defaults.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

/// Default public dataset location.
pub const DEFAULT_DATA_ROOT: &str = "https://protestmap.info/data";

/// Result type for configuration loading.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Settings for one server process.
///
/// Every field is optional in the file; missing ones take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
	/// Listen address.
	pub bind: SocketAddr,
	/// Directory URL holding `latest.json` and the dataset images.
	pub data_root: String,
	/// Minimum seconds between manifest checks.
	pub poll_interval_secs: u64,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
			data_root: DEFAULT_DATA_ROOT.to_owned(),
			poll_interval_secs: 300,
		}
	}
}

impl ServerConfig {
	pub fn from_toml(text: &str) -> Result<Self> {
		let config: Self = toml::from_str(text)?;
		config.validate()?;
		Ok(config)
	}

	/// Reads `path`, or returns the defaults when no path is given.
	pub fn load(path: Option<&Path>) -> Result<Self> {
		let Some(path) = path else {
			return Ok(Self::default());
		};
		let text = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_owned(),
			error,
		})?;
		Self::from_toml(&text)
	}

	/// Checks fields that deserialize but cannot be used.
	pub fn validate(&self) -> Result<()> {
		self.data_root_url()?;
		if self.poll_interval_secs == 0 {
			return Err(ConfigError::ZeroPollInterval);
		}
		Ok(())
	}

	pub fn data_root_url(&self) -> Result<Url> {
		Url::parse(&self.data_root).map_err(|e| ConfigError::InvalidDataRoot(self.data_root.clone(), e))
	}

	pub fn poll_interval(&self) -> Duration {
		Duration::from_secs(self.poll_interval_secs)
	}
}
