//! Short-lived client-side cache of suggestion lists.
//!
//! Keys are `(value type, lowercased query)`. Entries older than the TTL are
//! treated as absent and overwritten by the next `put`; nothing sweeps them.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use protestmap_primitives::{Clock, SystemClock, ValueType};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
	value_type: ValueType,
	query: String,
}

impl CacheKey {
	fn new(value_type: ValueType, query: &str) -> Self {
		Self {
			value_type,
			query: query.to_lowercase(),
		}
	}
}

#[derive(Debug)]
struct CacheEntry {
	values: Vec<String>,
	cached_at: Instant,
}

/// TTL cache of query results, one instance per client session.
#[derive(Debug)]
pub struct QueryCache {
	ttl: Duration,
	clock: Arc<dyn Clock>,
	entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl QueryCache {
	/// Creates an empty cache on the system clock.
	pub fn new(ttl: Duration) -> Self {
		Self::with_clock(ttl, Arc::new(SystemClock))
	}

	pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
		Self {
			ttl,
			clock,
			entries: Mutex::new(HashMap::new()),
		}
	}

	/// Returns the cached list if present and younger than the TTL.
	pub fn get(&self, value_type: ValueType, query: &str) -> Option<Vec<String>> {
		let key = CacheKey::new(value_type, query);
		let now = self.clock.now();
		let entries = self.entries.lock();
		let entry = entries.get(&key)?;
		if now.saturating_duration_since(entry.cached_at) >= self.ttl {
			return None;
		}
		Some(entry.values.clone())
	}

	/// Stores a list, replacing any previous entry for the same key.
	pub fn put(&self, value_type: ValueType, query: &str, values: Vec<String>) {
		let entry = CacheEntry {
			values,
			cached_at: self.clock.now(),
		};
		self.entries.lock().insert(CacheKey::new(value_type, query), entry);
	}

	/// Number of stored entries, stale ones included.
	pub fn len(&self) -> usize {
		self.entries.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

#[cfg(test)]
mod tests {
	use protestmap_primitives::ManualClock;

	use super::*;

	const TTL: Duration = Duration::from_secs(60);

	fn cache() -> (ManualClock, QueryCache) {
		let clock = ManualClock::new();
		let cache = QueryCache::with_clock(TTL, Arc::new(clock.clone()));
		(clock, cache)
	}

	#[test]
	fn get_after_put_hits() {
		let (_clock, cache) = cache();
		cache.put(ValueType::EventName, "spring", vec!["Spring Rally".into()]);

		assert_eq!(cache.get(ValueType::EventName, "spring"), Some(vec!["Spring Rally".into()]));
	}

	#[test]
	fn key_ignores_case_but_not_value_type() {
		let (_clock, cache) = cache();
		cache.put(ValueType::Location, "Bos", vec!["Boston".into()]);

		assert!(cache.get(ValueType::Location, "bOS").is_some());
		assert!(cache.get(ValueType::EventName, "bos").is_none());
	}

	#[test]
	fn entry_expires_at_ttl_without_eviction() {
		let (clock, cache) = cache();
		cache.put(ValueType::Location, "bos", vec!["Boston".into()]);

		clock.advance(TTL - Duration::from_millis(1));
		assert!(cache.get(ValueType::Location, "bos").is_some());

		clock.advance(Duration::from_millis(1));
		assert!(cache.get(ValueType::Location, "bos").is_none());
		assert_eq!(cache.len(), 1);
	}

	#[test]
	fn put_overwrites_stale_entry() {
		let (clock, cache) = cache();
		cache.put(ValueType::Location, "bos", vec!["Boston".into()]);
		clock.advance(TTL);

		cache.put(ValueType::Location, "bos", vec!["Boston".into(), "Bossier City".into()]);

		assert_eq!(cache.get(ValueType::Location, "bos").map(|v| v.len()), Some(2));
		assert_eq!(cache.len(), 1);
	}
}
