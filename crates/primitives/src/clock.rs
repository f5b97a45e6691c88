use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Source of monotonic time for TTL and polling decisions.
pub trait Clock: Debug + Send + Sync {
	/// Returns the current instant.
	fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> Instant {
		Instant::now()
	}
}

/// Clock that only moves when told to.
///
/// Clones share the same offset, so a test can keep one handle and pass
/// another into the component under test.
#[derive(Debug, Clone)]
pub struct ManualClock {
	origin: Instant,
	offset: Arc<Mutex<Duration>>,
}

impl Default for ManualClock {
	fn default() -> Self {
		Self::new()
	}
}

impl ManualClock {
	/// Creates a clock frozen at the current instant.
	pub fn new() -> Self {
		Self {
			origin: Instant::now(),
			offset: Arc::new(Mutex::new(Duration::ZERO)),
		}
	}

	/// Moves the clock forward.
	pub fn advance(&self, by: Duration) {
		*self.offset.lock() += by;
	}
}

impl Clock for ManualClock {
	fn now(&self) -> Instant {
		self.origin + *self.offset.lock()
	}
}
