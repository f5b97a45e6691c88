//! Search-as-you-type client for the protestmap query endpoint.
//!
//! Keystrokes go through a [`RequestThrottle`] per field, so a burst of
//! typing produces one request for the final text and cancels whatever was
//! still pending or in flight. Answers are kept for a short while in a
//! [`QueryCache`] keyed by field and lowercased text.
//!
//! [`Suggester`] wires these together over an HTTP [`ValuesTransport`].

pub mod cache;
pub mod config;
pub mod error;
pub mod suggest;
pub mod throttle;
pub mod transport;

pub use cache::QueryCache;
pub use config::{ClientConfig, DEFAULT_CACHE_TTL, DEFAULT_ENDPOINT, DEFAULT_QUIET_PERIOD};
pub use error::{ClientError, Result};
pub use suggest::{SuggestClient, Suggester};
pub use throttle::{RequestThrottle, ThrottlePhase};
pub use transport::{HttpValuesTransport, ValuesTransport};
