//! Dated resource entries and the ordered set that holds them.
use crate::config::FeedConfig;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Date key of an entry.
///
/// History written by older or hand-edited deployments may carry text that is
/// not an ISO date; such entries are kept verbatim and never expire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntryDate {
    Known(NaiveDate),
    Unparsed(String),
}

impl EntryDate {
    pub fn known(&self) -> Option<NaiveDate> {
        match self {
            EntryDate::Known(date) => Some(*date),
            EntryDate::Unparsed(_) => None,
        }
    }
}

impl From<NaiveDate> for EntryDate {
    fn from(date: NaiveDate) -> Self {
        EntryDate::Known(date)
    }
}

impl From<String> for EntryDate {
    /// Only strict `YYYY-MM-DD` text becomes a known date, so every other
    /// string is stored and written back unchanged.
    fn from(raw: String) -> Self {
        match parse_iso_date(&raw) {
            Some(date) => EntryDate::Known(date),
            None => EntryDate::Unparsed(raw),
        }
    }
}

fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let bytes = raw.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes.iter().enumerate().all(|(idx, b)| match idx {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

impl From<EntryDate> for String {
    fn from(date: EntryDate) -> Self {
        date.to_string()
    }
}

impl fmt::Display for EntryDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryDate::Known(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            EntryDate::Unparsed(raw) => f.write_str(raw),
        }
    }
}

impl Ord for EntryDate {
    /// Known dates ascending, then unparsed text in byte order.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (EntryDate::Known(a), EntryDate::Known(b)) => a.cmp(b),
            (EntryDate::Known(_), EntryDate::Unparsed(_)) => Ordering::Less,
            (EntryDate::Unparsed(_), EntryDate::Known(_)) => Ordering::Greater,
            (EntryDate::Unparsed(a), EntryDate::Unparsed(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for EntryDate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One day's published resource record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub date: EntryDate,
    pub identifier: String,
    pub url: String,
}

impl Entry {
    /// Construct the entry a run publishes for `date`.
    pub fn for_date(config: &FeedConfig, date: NaiveDate) -> Self {
        Self {
            date: EntryDate::Known(date),
            identifier: resource_identifier(config, date),
            url: config.resource_url(),
        }
    }
}

/// Resource `extIdent`: `{prefix}_{owner_id}_{YYYYMMDD}`, or
/// `{owner_id}_{YYYYMMDD}` when the prefix is empty.
pub fn resource_identifier(config: &FeedConfig, date: NaiveDate) -> String {
    let compact = date.format("%Y%m%d");
    if config.resource_id_prefix.is_empty() {
        format!("{}_{compact}", config.owner_id)
    } else {
        format!("{}_{}_{compact}", config.resource_id_prefix, config.owner_id)
    }
}

/// Entries unique by date, always in ascending date order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntrySet {
    entries: Vec<Entry>,
}

impl EntrySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from entries in any order; later entries win on duplicate
    /// dates. Returns the set and the number of duplicates dropped.
    pub fn from_entries<I>(entries: I) -> (Self, usize)
    where
        I: IntoIterator<Item = Entry>,
    {
        let mut set = Self::new();
        let mut duplicates = 0;
        for entry in entries {
            if set.insert(entry).is_some() {
                duplicates += 1;
            }
        }
        (set, duplicates)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn get(&self, date: &EntryDate) -> Option<&Entry> {
        self.position(date).ok().map(|idx| &self.entries[idx])
    }

    /// Insert in sorted position, returning the entry previously stored under
    /// the same date.
    pub fn insert(&mut self, entry: Entry) -> Option<Entry> {
        match self.position(&entry.date) {
            Ok(idx) => Some(std::mem::replace(&mut self.entries[idx], entry)),
            Err(idx) => {
                self.entries.insert(idx, entry);
                None
            }
        }
    }

    /// Remove entries for which `keep` is false, returning them in order.
    pub fn drain_unless<F>(&mut self, keep: F) -> Vec<Entry>
    where
        F: FnMut(&Entry) -> bool,
    {
        let (kept, removed): (Vec<Entry>, Vec<Entry>) =
            std::mem::take(&mut self.entries).into_iter().partition(keep);
        self.entries = kept;
        removed
    }

    fn position(&self, date: &EntryDate) -> Result<usize, usize> {
        self.entries.binary_search_by(|probe| probe.date.cmp(date))
    }
}

impl<'a> IntoIterator for &'a EntrySet {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
