//! Persisted history (`history.json`).
//!
//! The history file is the only state carried between runs; the document
//! artifact is always rebuilt from it and never parsed back.
use super::entry::{Entry, EntryDate, EntrySet};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub const STATE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
struct StateFile {
    schema_version: u32,
    entries: Vec<Value>,
}

/// One history record as read back. Fields are optional so a single
/// damaged record does not discard its neighbours.
#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    date: Option<Value>,
    #[serde(default)]
    identifier: String,
    #[serde(default)]
    url: String,
}

impl RawEntry {
    fn into_entry(self) -> Entry {
        let date = match self.date {
            None | Some(Value::Null) => EntryDate::Unparsed(String::new()),
            Some(Value::String(raw)) => EntryDate::from(raw),
            Some(other) => EntryDate::Unparsed(other.to_string()),
        };
        Entry {
            date,
            identifier: self.identifier,
            url: self.url,
        }
    }
}

#[derive(Serialize)]
struct StateFileRef<'a> {
    schema_version: u32,
    entries: Vec<&'a Entry>,
}

/// Load persisted history, falling back to an empty set.
///
/// A missing file is a first run. An unreadable file, or one whose
/// envelope is malformed or unsupported, is logged and treated the same
/// way so that broken history never blocks today's publication.
pub fn load(path: &Path) -> EntrySet {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no history found; starting empty");
            return EntrySet::new();
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "history unreadable; starting empty");
            return EntrySet::new();
        }
    };
    match parse(&bytes) {
        Ok(set) => {
            if set.is_empty() {
                tracing::info!(path = %path.display(), "history has no entries");
            } else {
                tracing::debug!(path = %path.display(), entries = set.len(), "loaded history");
            }
            set
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %format!("{err:#}"), "history invalid; starting empty");
            EntrySet::new()
        }
    }
}

/// Parse history bytes; duplicates collapse to the last record.
///
/// Only the envelope (`schema_version` + `entries` array) is fatal. Each
/// record is recovered on its own: a missing, null or non-string date is
/// kept as an unparsed date, and a record that is not an object with
/// string fields is skipped with a warning.
pub fn parse(bytes: &[u8]) -> Result<EntrySet> {
    let state: StateFile = serde_json::from_slice(bytes).context("parse history JSON")?;
    if state.schema_version != STATE_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported history schema_version {}",
            state.schema_version
        ));
    }
    let mut entries = Vec::with_capacity(state.entries.len());
    for (index, record) in state.entries.into_iter().enumerate() {
        match serde_json::from_value::<RawEntry>(record) {
            Ok(raw) => {
                let entry = raw.into_entry();
                if let EntryDate::Unparsed(text) = &entry.date {
                    tracing::debug!(index, date = %text, "history record without a usable date");
                }
                entries.push(entry);
            }
            Err(err) => {
                tracing::warn!(index, error = %err, "skipping unreadable history record");
            }
        }
    }
    let (set, duplicates) = EntrySet::from_entries(entries);
    if duplicates > 0 {
        tracing::warn!(duplicates, "history contained duplicate dates; kept the last record");
    }
    Ok(set)
}

/// Serialize history in ascending date order as pretty JSON.
pub fn persist(set: &EntrySet) -> Result<Vec<u8>> {
    let state = StateFileRef {
        schema_version: STATE_SCHEMA_VERSION,
        entries: set.iter().collect(),
    };
    let mut bytes = serde_json::to_vec_pretty(&state).context("serialize history")?;
    bytes.push(b'\n');
    Ok(bytes)
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
