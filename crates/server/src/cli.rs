use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::config::{Result, ServerConfig};

/// Server command line arguments.
#[derive(Parser, Debug)]
#[command(name = "protestmap-server")]
#[command(about = "Search-as-you-type suggestions over the published protest dataset")]
pub struct Args {
	/// TOML configuration file
	#[arg(short, long, value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// Listen address, overriding the config file
	#[arg(short, long, value_name = "ADDR")]
	pub bind: Option<SocketAddr>,

	/// Dataset directory URL, overriding the config file
	#[arg(long, value_name = "URL")]
	pub data_root: Option<String>,

	/// Seconds between manifest checks, overriding the config file
	#[arg(long, value_name = "SECS")]
	pub poll_interval: Option<u64>,

	/// Verbose logging
	#[arg(short, long)]
	pub verbose: bool,
}

impl Args {
	/// Loads the config file, if any, and applies flag overrides.
	pub fn resolve(&self) -> Result<ServerConfig> {
		let mut config = ServerConfig::load(self.config.as_deref())?;
		if let Some(bind) = self.bind {
			config.bind = bind;
		}
		if let Some(data_root) = &self.data_root {
			config.data_root.clone_from(data_root);
		}
		if let Some(secs) = self.poll_interval {
			config.poll_interval_secs = secs;
		}
		config.validate()?;
		Ok(config)
	}
}

/// Installs the global fmt subscriber.
pub fn init_tracing(verbose: bool) -> std::result::Result<(), tracing::subscriber::SetGlobalDefaultError> {
	let subscriber = tracing_subscriber::fmt()
		.with_max_level(if verbose {
			tracing::Level::DEBUG
		} else {
			tracing::Level::INFO
		})
		.finish();
	tracing::subscriber::set_global_default(subscriber)
}
