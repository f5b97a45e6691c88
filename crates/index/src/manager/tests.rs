use std::sync::Arc;
use std::time::Duration;

use protestmap_primitives::ManualClock;

use super::*;
use crate::testing::{StaticSource, manifest, sqlite_image};

const CREATED_AT: &str = "2026-10-18T00:00:00Z";

fn dataset_a() -> Vec<u8> {
	sqlite_image(CREATED_AT, &["Spring Rally", "Springfield March"], &["Springfield"])
}

fn dataset_b() -> Vec<u8> {
	sqlite_image(CREATED_AT, &["Summer Picnic"], &["Boston"])
}

fn setup() -> (Arc<StaticSource>, ManualClock, SearchIndexManager) {
	let source = Arc::new(StaticSource::publishing(manifest("a.sqlite", Some("aaa")), dataset_a()));
	let clock = ManualClock::new();
	let manager = SearchIndexManager::with_options(
		source.clone(),
		ManagerOptions {
			poll_interval: DEFAULT_POLL_INTERVAL,
			clock: Arc::new(clock.clone()),
		},
	);
	(source, clock, manager)
}

fn past_interval() -> Duration {
	DEFAULT_POLL_INTERVAL + Duration::from_secs(1)
}

mod first_load {
	use super::*;

	#[tokio::test]
	async fn is_lazy() {
		let (source, _clock, manager) = setup();

		assert_eq!(manager.status(), ManagerStatus::Uninitialized);
		assert_eq!(source.manifest_fetches(), 0);
		assert!(manager.current().is_none());

		let index = manager.get_index().await.unwrap();

		assert_eq!(index.manifest().dataset_id, "a.sqlite");
		assert_eq!(manager.status(), ManagerStatus::Ready);
		assert_eq!((source.manifest_fetches(), source.dataset_fetches()), (1, 1));
	}

	#[tokio::test]
	async fn concurrent_callers_share_one_load() {
		let (source, _clock, manager) = setup();

		let (a, b, c) = tokio::join!(manager.get_index(), manager.get_index(), manager.get_index());

		let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());
		assert!(Arc::ptr_eq(&a, &b));
		assert!(Arc::ptr_eq(&b, &c));
		assert_eq!((source.manifest_fetches(), source.dataset_fetches()), (1, 1));
	}

	#[tokio::test]
	async fn failure_propagates_then_retries() {
		let (source, _clock, manager) = setup();
		source.fail_dataset(true);

		let (a, b) = tokio::join!(manager.get_index(), manager.get_index());

		assert!(matches!(a, Err(IndexError::Transport(_))));
		assert_eq!(a.unwrap_err(), b.unwrap_err());
		assert_eq!(source.dataset_fetches(), 1);
		assert_eq!(manager.status(), ManagerStatus::Uninitialized);

		source.fail_dataset(false);
		let index = manager.get_index().await.unwrap();

		assert_eq!(index.manifest().dataset_id, "a.sqlite");
		assert_eq!(source.dataset_fetches(), 2);
	}

	#[tokio::test]
	async fn undecodable_dataset_is_a_format_error() {
		let source = Arc::new(StaticSource::publishing(
			manifest("broken.sqlite", None),
			b"this is not a sqlite database image".to_vec(),
		));
		let manager = SearchIndexManager::new(source);

		let err = manager.get_index().await.unwrap_err();

		assert!(matches!(err, IndexError::Format(_)), "{err:?}");
	}

	#[tokio::test]
	async fn empty_query_does_not_load() {
		let (source, _clock, manager) = setup();

		assert!(manager.query(ValueType::EventName, "").await.unwrap().is_empty());
		assert_eq!(source.manifest_fetches(), 0);
	}
}

mod polling {
	use super::*;

	#[tokio::test]
	async fn within_interval_serves_without_fetching() {
		let (source, clock, manager) = setup();
		manager.get_index().await.unwrap();

		clock.advance(DEFAULT_POLL_INTERVAL - Duration::from_secs(1));
		manager.get_index().await.unwrap();
		manager.get_index().await.unwrap();

		assert_eq!((source.manifest_fetches(), source.dataset_fetches()), (1, 1));
	}

	#[tokio::test]
	async fn unchanged_manifest_checks_once_per_interval() {
		let (source, clock, manager) = setup();
		let first = manager.get_index().await.unwrap();

		clock.advance(past_interval());
		let second = manager.get_index().await.unwrap();
		let third = manager.get_index().await.unwrap();

		assert_eq!((source.manifest_fetches(), source.dataset_fetches()), (2, 1));
		assert!(Arc::ptr_eq(&first, &second));
		assert!(Arc::ptr_eq(&first, &third));
		assert_eq!(manager.status(), ManagerStatus::Ready);
	}

	#[tokio::test]
	async fn content_hash_change_alone_triggers_reload() {
		let (source, clock, manager) = setup();
		manager.get_index().await.unwrap();

		source.publish(manifest("a.sqlite", Some("bbb")), dataset_b());
		clock.advance(past_interval());
		manager.get_index().await.unwrap();
		let swapped = manager.wait_for_pending_load().await.unwrap().unwrap();

		assert_eq!(swapped.manifest().content_hash.as_deref(), Some("bbb"));
		assert_eq!(swapped.query_locations("bos"), ["Boston"]);
	}

	#[tokio::test]
	async fn failed_check_keeps_index_and_waits_for_next_interval() {
		let (source, clock, manager) = setup();
		let first = manager.get_index().await.unwrap();

		source.fail_manifest(true);
		clock.advance(past_interval());
		let during = manager.get_index().await.unwrap();
		let after = manager.get_index().await.unwrap();

		assert!(Arc::ptr_eq(&first, &during));
		assert!(Arc::ptr_eq(&first, &after));
		assert_eq!(source.manifest_fetches(), 2);
	}
}

mod swap {
	use super::*;

	#[tokio::test]
	async fn new_manifest_swaps_in_background() {
		let (source, clock, manager) = setup();
		let old = manager.get_index().await.unwrap();

		source.publish(manifest("b.sqlite", Some("bbb")), dataset_b());
		clock.advance(past_interval());

		// The triggering caller is served the current index without waiting
		// for the reload.
		let served = manager.get_index().await.unwrap();
		assert!(Arc::ptr_eq(&old, &served));

		let new = manager.wait_for_pending_load().await.unwrap().unwrap();
		assert_eq!(new.manifest().dataset_id, "b.sqlite");

		let after = manager.get_index().await.unwrap();
		assert!(Arc::ptr_eq(&new, &after));
		assert_eq!(manager.status(), ManagerStatus::Ready);
		assert_eq!(source.dataset_fetches(), 2);
	}

	#[tokio::test]
	async fn held_index_keeps_answering_from_its_own_data() {
		let (source, clock, manager) = setup();
		let old = manager.get_index().await.unwrap();

		source.publish(manifest("b.sqlite", None), dataset_b());
		clock.advance(past_interval());
		manager.get_index().await.unwrap();
		let new = manager.wait_for_pending_load().await.unwrap().unwrap();

		assert_eq!(old.query_event_names("spring"), ["Spring Rally", "Springfield March"]);
		assert!(old.query_event_names("summer").is_empty());
		assert_eq!(new.query_event_names("summer"), ["Summer Picnic"]);
		assert!(new.query_event_names("spring").is_empty());
	}

	#[tokio::test]
	async fn failed_reload_keeps_previous_index() {
		let (source, clock, manager) = setup();
		let old = manager.get_index().await.unwrap();

		source.publish(manifest("b.sqlite", None), dataset_b());
		source.fail_dataset(true);
		clock.advance(past_interval());
		manager.get_index().await.unwrap();

		let reload = manager.wait_for_pending_load().await.unwrap();
		assert!(reload.is_err());

		let after = manager.get_index().await.unwrap();
		assert!(Arc::ptr_eq(&old, &after));
		assert_eq!(after.query_event_names("spring"), ["Spring Rally", "Springfield March"]);
		assert_eq!(manager.status(), ManagerStatus::Ready);
		// No retry until the next interval.
		assert_eq!(source.manifest_fetches(), 2);
		assert_eq!(source.dataset_fetches(), 2);
	}

	#[tokio::test]
	async fn callers_during_reload_are_served_without_new_checks() {
		let (source, clock, manager) = setup();
		let old = manager.get_index().await.unwrap();

		source.publish(manifest("b.sqlite", None), dataset_b());
		clock.advance(past_interval());
		manager.get_index().await.unwrap();
		clock.advance(past_interval());

		// Single-threaded runtime: the spawned reload has not been polled yet.
		assert_eq!(manager.status(), ManagerStatus::Reloading);
		let during = manager.get_index().await.unwrap();
		assert!(Arc::ptr_eq(&old, &during));
		assert_eq!(manager.status(), ManagerStatus::Reloading);

		manager.wait_for_pending_load().await;

		assert_eq!(source.manifest_fetches(), 2);
		assert_eq!(source.dataset_fetches(), 2);
	}
}

mod refresh {
	use super::*;

	#[tokio::test]
	async fn loads_when_nothing_is_served() {
		let (_source, _clock, manager) = setup();

		let outcome = manager.refresh().await.unwrap();

		assert_eq!(
			outcome,
			RefreshOutcome::Loaded {
				dataset_id: "a.sqlite".into()
			}
		);
	}

	#[tokio::test]
	async fn reports_unchanged_and_swapped() {
		let (source, _clock, manager) = setup();
		manager.get_index().await.unwrap();

		assert_eq!(manager.refresh().await.unwrap(), RefreshOutcome::Unchanged);

		source.publish(manifest("b.sqlite", None), dataset_b());
		assert_eq!(
			manager.refresh().await.unwrap(),
			RefreshOutcome::Swapped {
				previous: "a.sqlite".into(),
				current: "b.sqlite".into(),
			}
		);
		assert_eq!(manager.current().unwrap().manifest().dataset_id, "b.sqlite");
	}

	#[tokio::test]
	async fn reload_failure_is_returned_but_index_kept() {
		let (source, _clock, manager) = setup();
		let old = manager.get_index().await.unwrap();

		source.publish(manifest("b.sqlite", None), dataset_b());
		source.fail_dataset(true);

		assert!(manager.refresh().await.is_err());
		assert!(Arc::ptr_eq(&old, &manager.current().unwrap()));
	}

	#[tokio::test]
	async fn abandoned_refresh_still_swaps_and_polling_resumes() {
		let (source, clock, manager) = setup();
		manager.get_index().await.unwrap();
		source.publish(manifest("b.sqlite", None), dataset_b());

		{
			let mut refresh = std::pin::pin!(manager.refresh());
			while manager.status() != ManagerStatus::Reloading {
				assert!(futures::poll!(refresh.as_mut()).is_pending());
			}
		}

		tokio::time::timeout(Duration::from_secs(10), async {
			while manager.status() == ManagerStatus::Reloading {
				tokio::task::yield_now().await;
			}
		})
		.await
		.expect("reload should finish without its caller");
		assert_eq!(manager.current().unwrap().manifest().dataset_id, "b.sqlite");

		source.publish(manifest("c.sqlite", None), dataset_a());
		clock.advance(past_interval());
		manager.get_index().await.unwrap();
		let latest = manager.wait_for_pending_load().await.unwrap().unwrap();

		assert_eq!(latest.manifest().dataset_id, "c.sqlite");
		assert_eq!(source.manifest_fetches(), 3);
	}
}
