use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio_util::sync::CancellationToken;

/// Monotonic call counter for one throttle binding.
#[derive(Debug, Default, Clone)]
pub(crate) struct CallClock {
	next: Arc<AtomicU64>,
}

impl CallClock {
	/// Returns the next call generation, starting at 1.
	pub fn next(&self) -> u64 {
		self.next.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
	}
}

/// Cancellation token tagged with the call generation that owns it.
#[derive(Debug, Clone)]
pub(crate) struct CallToken {
	generation: u64,
	cancel: CancellationToken,
}

impl CallToken {
	pub fn new(generation: u64) -> Self {
		Self {
			generation,
			cancel: CancellationToken::new(),
		}
	}

	pub const fn generation(&self) -> u64 {
		self.generation
	}

	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}

	/// Requests cancellation.
	pub fn cancel(&self) {
		self.cancel.cancel();
	}

	/// Future resolving when cancellation is requested.
	pub async fn cancelled(&self) {
		self.cancel.cancelled().await;
	}

	/// Token handed to the wrapped operation.
	pub fn for_operation(&self) -> CancellationToken {
		self.cancel.clone()
	}
}
