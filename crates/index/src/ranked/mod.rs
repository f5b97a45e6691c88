//! Immutable ranked substring index over one dataset snapshot.
//!
//! # Ranking
//!
//! A candidate matches when its lowercased value contains the lowercased
//! query. Matches are bucketed into [`MatchTier`]s and sorted by tier
//! ascending. Event names then sort by occurrence count descending; cities
//! keep dataset order. Remaining ties keep first-occurrence order, and the
//! result is cut at [`RESULT_LIMIT`].
//!
//! # Deduplication
//!
//! Values are folded to lowercase when the index is built. Spellings that
//! fold to the same value collapse into one entry displayed with the first
//! spelling seen; for event names their occurrence counts are summed. This
//! keeps at most one exact-tier match per query.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use protestmap_primitives::ValueType;

use crate::dataset::Dataset;
use crate::manifest::Manifest;

/// Maximum number of suggestions returned by one query.
pub const RESULT_LIMIT: usize = 20;

/// Match quality bucket; lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchTier {
	/// Whole value equals the query.
	Exact = 0,
	/// Value starts with the query.
	Prefix = 1,
	/// Value ends with the query.
	Suffix = 2,
	/// Query appears somewhere else in the value.
	Contains = 3,
}

impl MatchTier {
	/// Classifies an already-lowercased value against a lowercased needle.
	pub fn classify(folded: &str, needle: &str) -> Option<Self> {
		if folded == needle {
			Some(Self::Exact)
		} else if folded.starts_with(needle) {
			Some(Self::Prefix)
		} else if folded.ends_with(needle) {
			Some(Self::Suffix)
		} else if folded.contains(needle) {
			Some(Self::Contains)
		} else {
			None
		}
	}
}

#[derive(Debug)]
struct Entry {
	display: String,
	folded: String,
	occurrences: usize,
}

/// Read-only search index built from one dataset and its manifest.
#[derive(Debug)]
pub struct RankedSearchIndex {
	manifest: Manifest,
	created_at: Option<DateTime<Utc>>,
	events: Vec<Entry>,
	cities: Vec<Entry>,
}

impl RankedSearchIndex {
	/// Builds the index. The dataset is consumed; nothing about the index
	/// changes afterwards.
	pub fn new(manifest: Manifest, dataset: Dataset) -> Self {
		Self {
			manifest,
			created_at: dataset.created_at,
			events: fold_entries(dataset.event_names),
			cities: fold_entries(dataset.city_names),
		}
	}

	/// Manifest this index was loaded from.
	pub fn manifest(&self) -> &Manifest {
		&self.manifest
	}

	/// Creation time recorded inside the dataset itself, when it had a
	/// readable one.
	pub fn created_at(&self) -> Option<DateTime<Utc>> {
		self.created_at
	}

	/// Number of distinct event names.
	pub fn event_name_count(&self) -> usize {
		self.events.len()
	}

	/// Number of distinct city names.
	pub fn location_count(&self) -> usize {
		self.cities.len()
	}

	/// Runs the query for the given field.
	pub fn query(&self, value_type: ValueType, text: &str) -> Vec<String> {
		match value_type {
			ValueType::Location => self.query_locations(text),
			ValueType::EventName => self.query_event_names(text),
		}
	}

	/// Up to [`RESULT_LIMIT`] event names, best tier first, then most
	/// frequent first.
	pub fn query_event_names(&self, text: &str) -> Vec<String> {
		rank(&self.events, text, true)
	}

	/// Up to [`RESULT_LIMIT`] city names, best tier first, then dataset
	/// order.
	pub fn query_locations(&self, text: &str) -> Vec<String> {
		rank(&self.cities, text, false)
	}
}

fn fold_entries(values: Vec<String>) -> Vec<Entry> {
	let mut folded: IndexMap<String, Entry> = IndexMap::with_capacity(values.len());
	for display in values {
		let key = display.to_lowercase();
		folded
			.entry(key)
			.and_modify(|entry| entry.occurrences += 1)
			.or_insert_with_key(|key| Entry {
				folded: key.clone(),
				display,
				occurrences: 1,
			});
	}
	folded.into_values().collect()
}

fn rank(entries: &[Entry], text: &str, by_occurrences: bool) -> Vec<String> {
	if text.is_empty() {
		return Vec::new();
	}
	let needle = text.to_lowercase();

	let mut hits: Vec<(MatchTier, &Entry)> = entries
		.iter()
		.filter_map(|entry| MatchTier::classify(&entry.folded, &needle).map(|tier| (tier, entry)))
		.collect();

	// Stable: equal keys keep dataset order.
	hits.sort_by(|(tier_a, a), (tier_b, b)| {
		let by_tier = tier_a.cmp(tier_b);
		if by_occurrences {
			by_tier.then_with(|| b.occurrences.cmp(&a.occurrences))
		} else {
			by_tier
		}
	});

	hits.into_iter()
		.take(RESULT_LIMIT)
		.map(|(_, entry)| entry.display.clone())
		.collect()
}
