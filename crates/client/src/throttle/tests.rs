use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;

use super::*;

const QUIET: Duration = Duration::from_millis(250);

fn recording_throttle(calls: Arc<Mutex<Vec<(String, Instant)>>>) -> RequestThrottle<String, String> {
	RequestThrottle::new(QUIET, move |query: String, _cancel: CancellationToken| {
		let calls = Arc::clone(&calls);
		async move {
			calls.lock().push((query.clone(), Instant::now()));
			query.to_uppercase()
		}
	})
}

mod coalescing {
	use pretty_assertions::assert_eq;

	use super::*;

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn burst_invokes_once_with_last_arguments() {
		let calls = Arc::new(Mutex::new(Vec::new()));
		let throttle = recording_throttle(Arc::clone(&calls));

		let (first, second, third) = tokio::join!(
			throttle.call("s".to_owned()),
			async {
				sleep(Duration::from_millis(100)).await;
				throttle.call("sp".to_owned()).await
			},
			async {
				sleep(Duration::from_millis(200)).await;
				throttle.call("spr".to_owned()).await
			},
		);

		assert_eq!(first, None);
		assert_eq!(second, None);
		assert_eq!(third, Some("SPR".to_owned()));
		let queries: Vec<String> = calls.lock().iter().map(|(query, _)| query.clone()).collect();
		assert_eq!(queries, vec!["spr".to_owned()]);
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn operation_starts_one_quiet_period_after_last_call() {
		let calls = Arc::new(Mutex::new(Vec::new()));
		let throttle = recording_throttle(Arc::clone(&calls));
		let start = Instant::now();

		let _ = tokio::join!(throttle.call("b".to_owned()), async {
			sleep(Duration::from_millis(200)).await;
			throttle.call("bo".to_owned()).await
		});

		let started_at = calls.lock()[0].1;
		assert_eq!(started_at - start, Duration::from_millis(200) + QUIET);
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn spaced_calls_each_run() {
		let calls = Arc::new(Mutex::new(Vec::new()));
		let throttle = recording_throttle(Arc::clone(&calls));

		assert_eq!(throttle.call("a".to_owned()).await, Some("A".to_owned()));
		sleep(QUIET * 2).await;
		assert_eq!(throttle.call("b".to_owned()).await, Some("B".to_owned()));

		assert_eq!(calls.lock().len(), 2);
	}
}

mod cancellation {
	use pretty_assertions::assert_eq;

	use super::*;

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn newer_call_cancels_in_flight_operation() {
		let events = Arc::new(Mutex::new(Vec::<String>::new()));
		let throttle = RequestThrottle::new(QUIET, {
			let events = Arc::clone(&events);
			move |label: &'static str, cancel: CancellationToken| {
				let events = Arc::clone(&events);
				async move {
					events.lock().push(format!("start {label}"));
					tokio::select! {
						() = cancel.cancelled() => {
							events.lock().push(format!("cancelled {label}"));
							None
						}
						() = sleep(Duration::from_secs(5)) => Some(label),
					}
				}
			}
		});

		let (first, second) = tokio::join!(throttle.call("first"), async {
			sleep(QUIET + Duration::from_millis(100)).await;
			throttle.call("second").await
		});

		assert_eq!(first, None);
		assert_eq!(second, Some(Some("second")));
		assert_eq!(
			*events.lock(),
			vec!["start first".to_owned(), "cancelled first".to_owned(), "start second".to_owned()]
		);
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn result_of_superseded_operation_is_discarded() {
		// The first operation ignores its token and completes anyway.
		let throttle = RequestThrottle::new(QUIET, |value: u32, _cancel: CancellationToken| async move {
			sleep(Duration::from_secs(1)).await;
			value
		});

		let (first, second) = tokio::join!(throttle.call(1), async {
			sleep(QUIET + Duration::from_millis(100)).await;
			throttle.call(2).await
		});

		assert_eq!(first, None);
		assert_eq!(second, Some(2));
	}
}

mod phases {
	use pretty_assertions::assert_eq;

	use super::*;

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn moves_through_pending_in_flight_and_idle() {
		let throttle = RequestThrottle::new(QUIET, |_: (), _cancel: CancellationToken| async {
			sleep(Duration::from_secs(1)).await;
		});
		assert_eq!(throttle.phase(), ThrottlePhase::Idle);

		let (result, (pending, in_flight)) = tokio::join!(throttle.call(()), async {
			let pending = throttle.phase();
			sleep(QUIET + Duration::from_millis(10)).await;
			(pending, throttle.phase())
		});

		assert_eq!(result, Some(()));
		assert_eq!(pending, ThrottlePhase::PendingTimer);
		assert_eq!(in_flight, ThrottlePhase::InFlight);
		assert_eq!(throttle.phase(), ThrottlePhase::Idle);
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn dropped_call_returns_to_idle() {
		let throttle = RequestThrottle::new(QUIET, |_: (), _cancel: CancellationToken| async {});

		let outcome = tokio::time::timeout(Duration::from_millis(100), throttle.call(())).await;

		assert!(outcome.is_err());
		assert_eq!(throttle.phase(), ThrottlePhase::Idle);
	}
}
