//! Server-side suggestion index for protestmap.
//!
//! A published dataset is described by a small manifest (`latest.json`) and
//! stored as a SQLite image next to it. This crate fetches both, decodes the
//! image into an immutable [`RankedSearchIndex`], and keeps it fresh through
//! [`SearchIndexManager`].
//!
//! # Layout
//!
//! - [`manifest`]: the published descriptor and its equivalence rule
//! - [`source`]: the [`IndexSource`] capability and its HTTP implementation
//! - [`dataset`]: SQLite image decoding
//! - [`ranked`]: tiered substring ranking
//! - [`manager`]: lazy load, polling, background reload, hot swap

pub mod dataset;
pub mod error;
pub mod manager;
pub mod manifest;
pub mod ranked;
pub mod source;
mod task;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use dataset::Dataset;
pub use error::{IndexError, Result};
pub use manager::{DEFAULT_POLL_INTERVAL, ManagerOptions, ManagerStatus, RefreshOutcome, SearchIndexManager};
pub use manifest::Manifest;
pub use ranked::{MatchTier, RESULT_LIMIT, RankedSearchIndex};
pub use source::{HttpIndexSource, IndexSource};
