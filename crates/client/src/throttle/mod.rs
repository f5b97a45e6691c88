//! Debounce-and-cancel wrapper for async operations.
//!
//! # Design
//!
//! A [`RequestThrottle`] binds one operation `op(args, token) -> result` and
//! moves through three observable phases:
//!
//! - `Idle`: no call outstanding.
//! - `PendingTimer`: a call is waiting out the quiet period.
//! - `InFlight`: the latest call is running `op`.
//!
//! Every [`RequestThrottle::call`] takes a new generation and cancels the
//! token of the previous call, whether that call is still waiting or already
//! running. A waiting call that gets cancelled returns without ever invoking
//! `op`. A running call keeps running until `op` notices its token; its
//! result is then dropped and the call resolves to `None`.
//!
//! Cancellation is cooperative: `op` receives a
//! [`CancellationToken`] and is expected to abort its own I/O when it fires.

mod token;

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use protestmap_primitives::BoxFutureStatic;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use self::token::{CallClock, CallToken};

type Operation<A, R> = Arc<dyn Fn(A, CancellationToken) -> BoxFutureStatic<R> + Send + Sync>;

/// Observable throttle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottlePhase {
	Idle,
	PendingTimer,
	InFlight,
}

#[derive(Debug)]
struct ThrottleState {
	phase: ThrottlePhase,
	latest: Option<CallToken>,
}

/// Coalesces bursts of calls into one invocation of the wrapped operation.
pub struct RequestThrottle<A, R> {
	op: Operation<A, R>,
	quiet_period: Duration,
	calls: CallClock,
	state: Mutex<ThrottleState>,
}

impl<A, R> fmt::Debug for RequestThrottle<A, R> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RequestThrottle")
			.field("quiet_period", &self.quiet_period)
			.field("state", &*self.state.lock())
			.finish_non_exhaustive()
	}
}

impl<A, R> RequestThrottle<A, R>
where
	A: Send + 'static,
	R: Send + 'static,
{
	/// Wraps `op`, which runs only after `quiet_period` passes without a
	/// newer call.
	pub fn new<F, Fut>(quiet_period: Duration, op: F) -> Self
	where
		F: Fn(A, CancellationToken) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = R> + Send + 'static,
	{
		let op: Operation<A, R> = Arc::new(move |args, cancel| Box::pin(op(args, cancel)));
		Self {
			op,
			quiet_period,
			calls: CallClock::default(),
			state: Mutex::new(ThrottleState {
				phase: ThrottlePhase::Idle,
				latest: None,
			}),
		}
	}

	pub fn quiet_period(&self) -> Duration {
		self.quiet_period
	}

	pub fn phase(&self) -> ThrottlePhase {
		self.state.lock().phase
	}

	/// Schedules `op(args)` and resolves to its result, or to `None` if a
	/// newer call superseded this one.
	pub async fn call(&self, args: A) -> Option<R> {
		let token = self.supersede();
		let _settle = SettleGuard {
			state: &self.state,
			generation: token.generation(),
		};

		tokio::select! {
			biased;
			() = token.cancelled() => {
				trace!(generation = token.generation(), "throttle.superseded.pending");
				return None;
			}
			() = tokio::time::sleep(self.quiet_period) => {}
		}

		if !self.start_flight(&token) {
			return None;
		}

		let result = (self.op)(args, token.for_operation()).await;
		if token.is_cancelled() {
			trace!(generation = token.generation(), "throttle.superseded.in_flight");
			return None;
		}
		Some(result)
	}

	/// Takes a new generation and cancels the previous one.
	fn supersede(&self) -> CallToken {
		let token = CallToken::new(self.calls.next());
		let mut state = self.state.lock();
		if let Some(previous) = state.latest.replace(token.clone()) {
			previous.cancel();
		}
		state.phase = ThrottlePhase::PendingTimer;
		token
	}

	fn start_flight(&self, token: &CallToken) -> bool {
		let mut state = self.state.lock();
		let is_latest = state
			.latest
			.as_ref()
			.is_some_and(|latest| latest.generation() == token.generation());
		if !is_latest || token.is_cancelled() {
			return false;
		}
		state.phase = ThrottlePhase::InFlight;
		true
	}
}

/// Returns the throttle to `Idle` when the latest call finishes or is
/// dropped.
struct SettleGuard<'a> {
	state: &'a Mutex<ThrottleState>,
	generation: u64,
}

impl Drop for SettleGuard<'_> {
	fn drop(&mut self) {
		let mut state = self.state.lock();
		let owns_latest = state
			.latest
			.as_ref()
			.is_some_and(|latest| latest.generation() == self.generation);
		if owns_latest {
			state.latest = None;
			state.phase = ThrottlePhase::Idle;
		}
	}
}

#[cfg(test)]
mod tests;
