//! Shared types for the protestmap suggestion pipeline.
//!
//! Both sides of the network boundary depend on this crate: the server-side
//! index crate for [`ValueType`] dispatch, the client crate for the cache key
//! and the wire DTOs, and both for the injectable [`Clock`].

/// Injectable time sources.
pub mod clock;
/// Async future aliases.
pub mod future;
/// Which indexed field a query targets.
pub mod value_type;
/// JSON payloads exchanged over HTTP.
pub mod wire;

pub use clock::{Clock, ManualClock, SystemClock};
pub use future::BoxFutureStatic;
pub use value_type::{UnknownValueType, ValueType};
pub use wire::{DatasetInfo, QueryRequest, QueryResponse};
