//! Owner of the live [`RankedSearchIndex`].
//!
//! # Design
//!
//! The manager is a three-phase state machine behind one short-lived lock:
//!
//! - `Uninitialized`: nothing loaded. The next [`SearchIndexManager::get_index`]
//!   starts the first load.
//! - `Loading`: the first load is in flight. Every caller awaits the same
//!   shared future, so there is never a second concurrent load.
//! - `Ready`: an index is being served. At most one background reload may be
//!   attached.
//!
//! The lock is never held across an `.await`; loads run as shared futures
//! that record their own outcome when they complete.
//!
//! # Refresh
//!
//! Once `poll_interval` has passed since the last check, the next caller
//! fetches the manifest (and only the manifest). A different manifest starts
//! a background reload and the caller is served the current index right
//! away. A finished reload replaces the served `Arc`; callers that already
//! hold the old index keep using it untouched.
//!
//! # Error Recovery
//!
//! A failed first load propagates to every waiter and resets the manager to
//! `Uninitialized`, so a later call retries. A failed check or reload is
//! logged and absorbed: the current index stays, and the check timestamp was
//! already advanced so failures are retried at the polling cadence rather
//! than on every call.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use futures::future::Shared;
use parking_lot::Mutex;
use protestmap_primitives::{BoxFutureStatic, Clock, SystemClock, ValueType};
use tracing::{debug, info, warn};

use crate::dataset::Dataset;
use crate::error::{IndexError, Result};
use crate::manifest::Manifest;
use crate::ranked::RankedSearchIndex;
use crate::source::IndexSource;
use crate::task::{self, TaskClass};

/// Default time between manifest checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5 * 60);

type SharedLoad = Shared<BoxFutureStatic<Result<Arc<RankedSearchIndex>>>>;

enum Phase {
	Uninitialized,
	Loading(SharedLoad),
	Ready {
		current: Arc<RankedSearchIndex>,
		last_checked: Instant,
		reload: Option<SharedLoad>,
	},
}

/// Observable manager phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerStatus {
	Uninitialized,
	Loading,
	Ready,
	/// Serving an index while a replacement loads.
	Reloading,
}

/// Result of an explicit [`SearchIndexManager::refresh`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
	/// Nothing was loaded yet; the first load ran instead.
	Loaded { dataset_id: String },
	/// The published manifest matches the served index.
	Unchanged,
	/// A newer dataset was loaded and is now served.
	Swapped { previous: String, current: String },
}

/// Manager tuning and injected capabilities.
#[derive(Debug, Clone)]
pub struct ManagerOptions {
	/// Minimum time between manifest checks.
	pub poll_interval: Duration,
	/// Time source for the polling decision.
	pub clock: Arc<dyn Clock>,
}

impl Default for ManagerOptions {
	fn default() -> Self {
		Self {
			poll_interval: DEFAULT_POLL_INTERVAL,
			clock: Arc::new(SystemClock),
		}
	}
}

enum Step {
	Await(SharedLoad),
	Serve(Arc<RankedSearchIndex>),
	Check(Arc<RankedSearchIndex>),
}

struct Inner {
	source: Arc<dyn IndexSource>,
	clock: Arc<dyn Clock>,
	poll_interval: Duration,
	phase: Mutex<Phase>,
}

/// Lazily loads, serves, and hot-swaps the search index.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct SearchIndexManager {
	inner: Arc<Inner>,
}

impl fmt::Debug for SearchIndexManager {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SearchIndexManager")
			.field("status", &self.status())
			.field("poll_interval", &self.inner.poll_interval)
			.finish_non_exhaustive()
	}
}

impl SearchIndexManager {
	/// Creates a manager with the system clock and default polling interval.
	/// Nothing is fetched until the first [`Self::get_index`].
	pub fn new(source: Arc<dyn IndexSource>) -> Self {
		Self::with_options(source, ManagerOptions::default())
	}

	pub fn with_options(source: Arc<dyn IndexSource>, options: ManagerOptions) -> Self {
		Self {
			inner: Arc::new(Inner {
				source,
				clock: options.clock,
				poll_interval: options.poll_interval,
				phase: Mutex::new(Phase::Uninitialized),
			}),
		}
	}

	/// Returns the index to query.
	///
	/// Errors only while no index has ever loaded. Afterwards a stale index is
	/// returned rather than an error, and a due freshness check costs the
	/// caller one manifest round-trip at most.
	pub async fn get_index(&self) -> Result<Arc<RankedSearchIndex>> {
		match self.inner.next_step() {
			Step::Await(load) => load.await,
			Step::Serve(index) => Ok(index),
			Step::Check(index) => {
				match self.inner.check_manifest(&index).await {
					Ok(None) => {
						debug!(dataset_id = %index.manifest().dataset_id, "index.check.unchanged");
					}
					Ok(Some(manifest)) => {
						self.inner.begin_reload(manifest);
					}
					Err(error) => {
						warn!(
							%error,
							dataset_id = %index.manifest().dataset_id,
							"index.check.failed, serving current index"
						);
					}
				}
				Ok(index)
			}
		}
	}

	/// Runs a ranked query against the current index.
	pub async fn query(&self, value_type: ValueType, text: &str) -> Result<Vec<String>> {
		if text.is_empty() {
			return Ok(Vec::new());
		}
		let index = self.get_index().await?;
		Ok(index.query(value_type, text))
	}

	/// Checks the manifest now, ignoring the polling interval, and waits for
	/// any resulting reload.
	///
	/// Unlike [`Self::get_index`], check and reload failures are returned to
	/// the caller. The served index is still kept on failure.
	pub async fn refresh(&self) -> Result<RefreshOutcome> {
		let Some(current) = self.inner.mark_checked() else {
			let index = self.get_index().await?;
			return Ok(RefreshOutcome::Loaded {
				dataset_id: index.manifest().dataset_id.clone(),
			});
		};

		let Some(manifest) = self.inner.check_manifest(&current).await? else {
			return Ok(RefreshOutcome::Unchanged);
		};

		let load = self
			.inner
			.begin_reload(manifest)
			.ok_or_else(|| IndexError::Internal("manager left the ready phase during refresh".into()))?;
		let index = load.await?;
		Ok(RefreshOutcome::Swapped {
			previous: current.manifest().dataset_id.clone(),
			current: index.manifest().dataset_id.clone(),
		})
	}

	/// Awaits the in-flight first load or background reload, if any.
	pub async fn wait_for_pending_load(&self) -> Option<Result<Arc<RankedSearchIndex>>> {
		let pending = self.inner.pending_load()?;
		Some(pending.await)
	}

	/// Returns the served index without loading or checking anything.
	pub fn current(&self) -> Option<Arc<RankedSearchIndex>> {
		match &*self.inner.phase.lock() {
			Phase::Ready { current, .. } => Some(Arc::clone(current)),
			Phase::Uninitialized | Phase::Loading(_) => None,
		}
	}

	pub fn status(&self) -> ManagerStatus {
		match &*self.inner.phase.lock() {
			Phase::Uninitialized => ManagerStatus::Uninitialized,
			Phase::Loading(_) => ManagerStatus::Loading,
			Phase::Ready { reload: None, .. } => ManagerStatus::Ready,
			Phase::Ready { reload: Some(_), .. } => ManagerStatus::Reloading,
		}
	}
}

impl Inner {
	fn next_step(self: &Arc<Self>) -> Step {
		let mut phase = self.phase.lock();
		match &mut *phase {
			Phase::Uninitialized => {
				debug!("index.load.start");
				let load = self.load_future(None);
				*phase = Phase::Loading(load.clone());
				Step::Await(load)
			}
			Phase::Loading(load) => Step::Await(load.clone()),
			Phase::Ready {
				current,
				last_checked,
				reload,
			} => {
				let now = self.clock.now();
				if reload.is_some() || now.saturating_duration_since(*last_checked) <= self.poll_interval {
					Step::Serve(Arc::clone(current))
				} else {
					*last_checked = now;
					Step::Check(Arc::clone(current))
				}
			}
		}
	}

	fn mark_checked(&self) -> Option<Arc<RankedSearchIndex>> {
		let mut phase = self.phase.lock();
		match &mut *phase {
			Phase::Ready {
				current, last_checked, ..
			} => {
				*last_checked = self.clock.now();
				Some(Arc::clone(current))
			}
			Phase::Uninitialized | Phase::Loading(_) => None,
		}
	}

	fn pending_load(&self) -> Option<SharedLoad> {
		match &*self.phase.lock() {
			Phase::Loading(load) => Some(load.clone()),
			Phase::Ready { reload, .. } => reload.clone(),
			Phase::Uninitialized => None,
		}
	}

	/// Returns the new manifest when it differs from the served one.
	async fn check_manifest(&self, current: &RankedSearchIndex) -> Result<Option<Manifest>> {
		let manifest = self.source.fetch_manifest().await?;
		if manifest.is_equivalent(current.manifest()) {
			return Ok(None);
		}
		info!(
			current = %current.manifest().dataset_id,
			published = %manifest.dataset_id,
			"index.check.update_available"
		);
		Ok(Some(manifest))
	}

	/// Attaches a reload to the ready phase, or joins the one already attached.
	///
	/// A new reload is driven by its own background task, so it completes and
	/// detaches even if every caller awaiting it is dropped.
	fn begin_reload(self: &Arc<Self>, manifest: Manifest) -> Option<SharedLoad> {
		let load = {
			let mut phase = self.phase.lock();
			let Phase::Ready { reload, .. } = &mut *phase else {
				return None;
			};
			if let Some(pending) = reload {
				return Some(pending.clone());
			}
			debug!(dataset_id = %manifest.dataset_id, "index.reload.start");
			let load = self.load_future(Some(manifest));
			*reload = Some(load.clone());
			load
		};
		let driver = load.clone();
		task::spawn(TaskClass::Background, async move {
			let _ = driver.await;
		});
		Some(load)
	}

	fn load_future(self: &Arc<Self>, manifest: Option<Manifest>) -> SharedLoad {
		let inner = Arc::clone(self);
		let fut: BoxFutureStatic<Result<Arc<RankedSearchIndex>>> = Box::pin(async move {
			let result = inner.load(manifest).await;
			inner.finish_load(&result);
			result
		});
		fut.shared()
	}

	async fn load(&self, manifest: Option<Manifest>) -> Result<Arc<RankedSearchIndex>> {
		let manifest = match manifest {
			Some(manifest) => manifest,
			None => self.source.fetch_manifest().await?,
		};
		let image = self.source.fetch_dataset(&manifest).await?;

		let index = task::spawn_blocking(TaskClass::CpuBlocking, move || {
			Dataset::decode(&image).map(|dataset| RankedSearchIndex::new(manifest, dataset))
		})
		.await
		.map_err(|e| IndexError::Internal(format!("dataset decode task failed: {e}")))??;

		Ok(Arc::new(index))
	}

	fn finish_load(&self, result: &Result<Arc<RankedSearchIndex>>) {
		let mut phase = self.phase.lock();

		if let Phase::Ready { current, reload, .. } = &mut *phase {
			*reload = None;
			match result {
				Ok(index) => {
					info!(
						previous = %current.manifest().dataset_id,
						current = %index.manifest().dataset_id,
						created_at = ?index.created_at(),
						"index.swapped"
					);
					*current = Arc::clone(index);
				}
				Err(error) => {
					warn!(
						%error,
						serving = %current.manifest().dataset_id,
						"index.reload.failed, keeping current index"
					);
				}
			}
			return;
		}

		match result {
			Ok(index) => {
				info!(
					dataset_id = %index.manifest().dataset_id,
					created_at = ?index.created_at(),
					event_names = index.event_name_count(),
					locations = index.location_count(),
					"index.loaded"
				);
				*phase = Phase::Ready {
					current: Arc::clone(index),
					last_checked: self.clock.now(),
					reload: None,
				};
			}
			Err(error) => {
				warn!(%error, "index.load.failed");
				*phase = Phase::Uninitialized;
			}
		}
	}
}

#[cfg(test)]
mod tests;
