//! Entry store: the dated history of published resources.
//!
//! Owns the merge (upsert) and rolling-window retention policy plus the
//! persisted `history.json` representation.
mod entry;
mod retention;
mod state;

pub use entry::{Entry, EntryDate, EntrySet};
pub use retention::{apply_retention, retention_cutoff, upsert_today, UpsertOutcome};
pub use state::{load, persist};
