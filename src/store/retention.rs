//! Merge and rolling-window policy for the entry history.
//!
//! Invariant after a run: exactly one entry for the run date, and no entry
//! with a known date older than the cutoff.
use super::entry::{Entry, EntryDate, EntrySet};
use crate::config::FeedConfig;
use chrono::{Days, NaiveDate};

/// Whether an upsert added a new date or replaced a stale record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Replaced,
}

impl UpsertOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            UpsertOutcome::Inserted => "inserted",
            UpsertOutcome::Replaced => "replaced",
        }
    }
}

/// Insert `entry`, replacing any existing entry with the same date.
pub fn upsert(set: &mut EntrySet, entry: Entry) -> UpsertOutcome {
    match set.insert(entry) {
        Some(_) => UpsertOutcome::Replaced,
        None => UpsertOutcome::Inserted,
    }
}

/// Upsert the freshly constructed entry for `today`.
pub fn upsert_today(set: &mut EntrySet, config: &FeedConfig, today: NaiveDate) -> UpsertOutcome {
    let outcome = upsert(set, Entry::for_date(config, today));
    match outcome {
        UpsertOutcome::Replaced => tracing::info!(date = %today, "replaced existing entry for today"),
        UpsertOutcome::Inserted => tracing::info!(date = %today, "added entry for today"),
    }
    outcome
}

/// `today - max_history_days`; `None` when retention is disabled or the
/// window reaches past the calendar's lower bound.
pub fn retention_cutoff(today: NaiveDate, max_history_days: Option<u32>) -> Option<NaiveDate> {
    let days = max_history_days?;
    today.checked_sub_days(Days::new(u64::from(days)))
}

/// Evict entries whose known date precedes `cutoff`.
///
/// Entries with unparsed dates are always kept. Evicted entries are returned
/// in ascending date order.
pub fn apply_retention(set: &mut EntrySet, cutoff: Option<NaiveDate>) -> Vec<Entry> {
    let Some(cutoff) = cutoff else {
        return Vec::new();
    };
    let evicted = set.drain_unless(|entry| match &entry.date {
        EntryDate::Known(date) => *date >= cutoff,
        EntryDate::Unparsed(raw) => {
            tracing::debug!(date = %raw, "retaining entry with unparsed date");
            true
        }
    });
    for entry in &evicted {
        tracing::info!(date = %entry.date, cutoff = %cutoff, "evicted expired entry");
    }
    evicted
}

#[cfg(test)]
#[path = "retention_tests.rs"]
mod tests;
