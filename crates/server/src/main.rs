//! Protestmap suggestion server binary.

use clap::Parser;
use protestmap_server::Args;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();
	protestmap_server::init_tracing(args.verbose)?;

	let config = args.resolve()?;
	info!(poll_interval_secs = config.poll_interval_secs, "Starting protestmap-server");

	protestmap_server::run(config).await
}
