//! Decoding of published SQLite dataset images.
//!
//! The image is written to a private temp file and opened read-only. Only the
//! three facts the index needs are read out: the `created_at` row of `meta`,
//! every `events.event_name` in storage order, and every
//! `city_infos.city_name` in storage order.
//!
//! `created_at` is metadata only. A missing or unreadable value is logged and
//! left empty; the name tables alone decide whether an image is usable.

use std::io::Write;

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use tracing::{debug, warn};

use crate::error::{IndexError, Result};

const CREATED_AT_QUERY: &str = "SELECT value FROM meta WHERE key = 'created_at'";
const EVENT_NAMES_QUERY: &str = "SELECT event_name FROM events ORDER BY rowid";
const CITY_NAMES_QUERY: &str = "SELECT city_name FROM city_infos ORDER BY rowid";

/// Raw contents of one dataset image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
	pub created_at: Option<DateTime<Utc>>,
	/// One entry per event row, duplicates included.
	pub event_names: Vec<String>,
	/// One entry per city row, duplicates included.
	pub city_names: Vec<String>,
}

impl Dataset {
	/// Decodes a SQLite database image.
	pub fn decode(image: &[u8]) -> Result<Self> {
		let mut file = tempfile::NamedTempFile::new()
			.map_err(|e| IndexError::Internal(format!("cannot create dataset temp file: {e}")))?;
		file.write_all(image)
			.and_then(|()| file.flush())
			.map_err(|e| IndexError::Internal(format!("cannot write dataset temp file: {e}")))?;

		let conn = Connection::open_with_flags(
			file.path(),
			OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
		)?;

		let created_at: Option<String> = conn
			.query_row(CREATED_AT_QUERY, [], |row| row.get(0))
			.optional()
			.unwrap_or_else(|error| {
				warn!(%error, "dataset.meta.unreadable");
				None
			});
		let created_at = match created_at.as_deref().map(parse_created_at) {
			Some(Ok(parsed)) => Some(parsed),
			Some(Err(error)) => {
				warn!(%error, "dataset.created_at.unreadable");
				None
			}
			None => {
				warn!("dataset.created_at.missing");
				None
			}
		};

		let event_names = read_column(&conn, EVENT_NAMES_QUERY)?;
		let city_names = read_column(&conn, CITY_NAMES_QUERY)?;

		debug!(
			bytes = image.len(),
			events = event_names.len(),
			cities = city_names.len(),
			created_at = ?created_at,
			"dataset.decoded"
		);

		Ok(Self {
			created_at,
			event_names,
			city_names,
		})
	}
}

fn read_column(conn: &Connection, sql: &str) -> Result<Vec<String>> {
	let mut stmt = conn.prepare(sql)?;
	let rows = stmt.query_map([], |row| row.get::<_, Option<String>>(0))?;

	let mut values = Vec::new();
	for value in rows {
		if let Some(value) = value? {
			values.push(value);
		}
	}
	Ok(values)
}

/// Accepts RFC 3339 and the plain `YYYY-MM-DD HH:MM:SS` form SQLite's
/// `datetime()` produces (taken as UTC).
fn parse_created_at(raw: &str) -> Result<DateTime<Utc>> {
	let raw = raw.trim();
	if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
		return Ok(parsed.with_timezone(&Utc));
	}
	["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
		.iter()
		.find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
		.map(|naive| naive.and_utc())
		.ok_or_else(|| IndexError::Format(format!("unparseable created_at: {raw:?}")))
}
