use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The indexed field a suggestion query runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
	/// City names.
	#[serde(rename = "location")]
	Location,
	/// Event names, ranked with occurrence counts.
	#[serde(rename = "eventName")]
	EventName,
}

impl ValueType {
	/// Wire literal for this value type.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Location => "location",
			Self::EventName => "eventName",
		}
	}
}

impl fmt::Display for ValueType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Returned when a string is not one of the recognized value type literals.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown value type: {0:?}")]
pub struct UnknownValueType(pub String);

impl FromStr for ValueType {
	type Err = UnknownValueType;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"location" => Ok(Self::Location),
			"eventName" => Ok(Self::EventName),
			other => Err(UnknownValueType(other.to_owned())),
		}
	}
}
