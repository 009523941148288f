//! Reference list sources
//!
//! A source produces an immutable snapshot of watchlist entries. Screening
//! never mutates a source; a source that cannot produce its snapshot is
//! reported unavailable and excluded from the screening call rather than
//! failing it.

use crate::types::{ListKind, ReferenceEntry};
use aml_core::{Error, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Provider of one watchlist snapshot
pub trait ReferenceSource: Send + Sync {
    /// Stable source name recorded on screening results
    fn name(&self) -> &str;

    /// Current snapshot of the list
    fn snapshot(&self) -> Result<Vec<ReferenceEntry>>;
}

/// Source over a fixed in-memory list
pub struct StaticSource {
    name: String,
    entries: Vec<ReferenceEntry>,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, entries: Vec<ReferenceEntry>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }
}

impl ReferenceSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn snapshot(&self) -> Result<Vec<ReferenceEntry>> {
        Ok(self.entries.clone())
    }
}

/// Source backed by a CSV file
///
/// Expected header: `id,kind,name,aliases,date_of_birth,nationality,listing_info`
/// with aliases separated by `;` and dates in `YYYY-MM-DD`. Any read or
/// parse failure marks the whole source unavailable for this call.
pub struct CsvSource {
    name: String,
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    id: String,
    kind: String,
    name: String,
    #[serde(default)]
    aliases: String,
    #[serde(default)]
    date_of_birth: String,
    #[serde(default)]
    nationality: String,
    #[serde(default)]
    listing_info: String,
}

impl CsvSource {
    pub fn new(name: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self {
            name: name.into(),
            path: path.as_ref().to_path_buf(),
        }
    }

    fn unavailable(&self, reason: impl std::fmt::Display) -> Error {
        warn!(source = %self.name, %reason, "reference source unavailable");
        Error::SourceUnavailable {
            source_name: self.name.clone(),
        }
    }

    fn parse_row(&self, row: CsvRow) -> Result<ReferenceEntry> {
        let kind = match row.kind.to_ascii_lowercase().as_str() {
            "sanctions" => ListKind::Sanctions,
            "pep" => ListKind::Pep,
            other => {
                return Err(self.unavailable(format!("unknown list kind {:?}", other)));
            }
        };

        let date_of_birth = if row.date_of_birth.trim().is_empty() {
            None
        } else {
            Some(
                NaiveDate::parse_from_str(row.date_of_birth.trim(), "%Y-%m-%d")
                    .map_err(|e| self.unavailable(format!("bad date of birth: {}", e)))?,
            )
        };

        let nationality = match row.nationality.trim() {
            "" => None,
            code => Some(code.to_string()),
        };

        Ok(ReferenceEntry {
            id: row.id,
            kind,
            name: row.name,
            aliases: row
                .aliases
                .split(';')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string)
                .collect(),
            date_of_birth,
            nationality,
            listing_info: row.listing_info,
        })
    }
}

impl ReferenceSource for CsvSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn snapshot(&self) -> Result<Vec<ReferenceEntry>> {
        let mut reader = csv::Reader::from_path(&self.path)
            .map_err(|e| self.unavailable(format!("cannot open {}: {}", self.path.display(), e)))?;

        let mut entries = Vec::new();
        for row in reader.deserialize::<CsvRow>() {
            let row = row.map_err(|e| self.unavailable(format!("bad row: {}", e)))?;
            entries.push(self.parse_row(row)?);
        }
        Ok(entries)
    }
}
