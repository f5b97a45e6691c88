//! Fixtures for exercising the index without a network.
//!
//! Compiled for this crate's tests and, behind the `test-support` feature,
//! for downstream crates' tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::Connection;

use crate::error::{IndexError, Result};
use crate::manifest::Manifest;
use crate::source::IndexSource;

/// Builds a SQLite dataset image with the tables the decoder reads.
///
/// # Panics
///
/// Panics if the fixture database cannot be written.
pub fn sqlite_image(created_at: &str, event_names: &[&str], city_names: &[&str]) -> Vec<u8> {
	let dir = tempfile::tempdir().expect("fixture temp dir");
	let path = dir.path().join("dataset.sqlite");
	{
		let conn = Connection::open(&path).expect("open fixture database");
		conn.execute_batch(
			"CREATE TABLE meta (key TEXT PRIMARY KEY, value TEXT NOT NULL);
			 CREATE TABLE events (id INTEGER PRIMARY KEY, event_name TEXT, date TEXT);
			 CREATE TABLE city_infos (id INTEGER PRIMARY KEY, city_name TEXT, state TEXT);",
		)
		.expect("create fixture schema");
		conn.execute("INSERT INTO meta (key, value) VALUES ('created_at', ?1)", [created_at])
			.expect("insert created_at");
		for name in event_names {
			conn.execute("INSERT INTO events (event_name) VALUES (?1)", [name])
				.expect("insert event");
		}
		for name in city_names {
			conn.execute("INSERT INTO city_infos (city_name) VALUES (?1)", [name])
				.expect("insert city");
		}
	}
	std::fs::read(&path).expect("read fixture database")
}

/// Manifest for `dataset_id` stamped with the current time.
pub fn manifest(dataset_id: &str, content_hash: Option<&str>) -> Manifest {
	Manifest {
		dataset_id: dataset_id.to_owned(),
		last_updated: Some(Utc::now().to_rfc3339()),
		content_hash: content_hash.map(str::to_owned),
	}
}

#[derive(Debug, Default)]
struct Published {
	manifest: Option<Manifest>,
	images: HashMap<String, Bytes>,
	fail_manifest: bool,
	fail_dataset: bool,
}

/// In-memory [`IndexSource`] with failure injection and fetch counters.
#[derive(Debug, Default)]
pub struct StaticSource {
	published: Mutex<Published>,
	manifest_fetches: AtomicUsize,
	dataset_fetches: AtomicUsize,
}

impl StaticSource {
	/// Creates a source with nothing published.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a source already publishing one dataset.
	pub fn publishing(manifest: Manifest, image: Vec<u8>) -> Self {
		let source = Self::new();
		source.publish(manifest, image);
		source
	}

	/// Publishes a dataset and points the manifest at it.
	pub fn publish(&self, manifest: Manifest, image: Vec<u8>) {
		let mut published = self.published.lock();
		published.images.insert(manifest.dataset_id.clone(), Bytes::from(image));
		published.manifest = Some(manifest);
	}

	pub fn fail_manifest(&self, fail: bool) {
		self.published.lock().fail_manifest = fail;
	}

	pub fn fail_dataset(&self, fail: bool) {
		self.published.lock().fail_dataset = fail;
	}

	/// Number of manifest fetch attempts so far.
	pub fn manifest_fetches(&self) -> usize {
		self.manifest_fetches.load(Ordering::SeqCst)
	}

	/// Number of dataset fetch attempts so far.
	pub fn dataset_fetches(&self) -> usize {
		self.dataset_fetches.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl IndexSource for StaticSource {
	async fn fetch_manifest(&self) -> Result<Manifest> {
		self.manifest_fetches.fetch_add(1, Ordering::SeqCst);
		tokio::task::yield_now().await;

		let published = self.published.lock();
		if published.fail_manifest {
			return Err(IndexError::Transport("injected manifest failure".into()));
		}
		published
			.manifest
			.clone()
			.ok_or_else(|| IndexError::Transport("nothing published".into()))
	}

	async fn fetch_dataset(&self, manifest: &Manifest) -> Result<Bytes> {
		self.dataset_fetches.fetch_add(1, Ordering::SeqCst);
		tokio::task::yield_now().await;

		let published = self.published.lock();
		if published.fail_dataset {
			return Err(IndexError::Transport("injected dataset failure".into()));
		}
		published
			.images
			.get(&manifest.dataset_id)
			.cloned()
			.ok_or_else(|| IndexError::Transport(format!("no such dataset: {}", manifest.dataset_id)))
	}
}
