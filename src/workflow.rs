//! Command implementations.
//!
//! `generate` is strictly linear: load state, merge today, apply retention,
//! render, hash, then publish document, checksum and history together.
use crate::cli::{GenerateArgs, InitArgs, VerifyArgs};
use crate::config::{self, FeedConfig, FeedPaths};
use crate::document;
use crate::staging::Staging;
use crate::store::{self, EntryDate, UpsertOutcome};
use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use std::fs;
use std::path::Path;

/// Summary of one `generate` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateReport {
    pub upsert: UpsertOutcome,
    pub evicted: usize,
    pub entries: usize,
    pub checksum: String,
}

pub fn run_init(args: InitArgs) -> Result<()> {
    if args.config.is_file() && !args.force {
        return Err(anyhow!(
            "config already exists at {} (use --force to overwrite)",
            args.config.display()
        ));
    }
    let config = config::default_config(args.owner_name.as_deref(), args.owner_id.as_deref());
    config::write_config(&args.config, &config)?;
    println!("wrote {}", args.config.display());
    Ok(())
}

pub fn run_generate(args: GenerateArgs) -> Result<()> {
    let (config, paths) = load_validated(&args.config)?;
    let today = args.date.unwrap_or_else(|| Local::now().date_naive());
    let report = generate(&config, &paths, today)?;
    println!("wrote {}", paths.document_path().display());
    println!(
        "wrote {} ({})",
        paths.checksum_path().display(),
        report.checksum
    );
    println!("wrote {}", paths.state_path().display());
    println!(
        "{} entries ({} for {today}, {} evicted)",
        report.entries,
        report.upsert.as_str(),
        report.evicted
    );
    Ok(())
}

pub fn run_verify(args: VerifyArgs) -> Result<()> {
    let (_, paths) = load_validated(&args.config)?;
    let expected = verify(&paths)?;
    println!("ok {} {}", expected, paths.document_path().display());
    Ok(())
}

fn load_validated(config_path: &Path) -> Result<(FeedConfig, FeedPaths)> {
    let config = config::load_config(config_path)?;
    config::validate_config(&config)
        .with_context(|| format!("invalid config {}", config_path.display()))?;
    let paths = FeedPaths::resolve(config_path, &config);
    Ok((config, paths))
}

/// Run the full pipeline for `today` and publish all artifacts.
pub fn generate(
    config: &FeedConfig,
    paths: &FeedPaths,
    today: NaiveDate,
) -> Result<GenerateReport> {
    let mut entries = store::load(paths.state_path());
    let upsert = store::upsert_today(&mut entries, config, today);
    if let Some(entry) = entries.get(&EntryDate::Known(today)) {
        tracing::debug!(identifier = %entry.identifier, url = %entry.url, "entry for today");
    }
    let cutoff = store::retention_cutoff(today, config.max_history_days);
    let evicted = store::apply_retention(&mut entries, cutoff);

    let rendered = document::render(config, &entries, today);
    let checksum = document::checksum(&rendered);
    let state = store::persist(&entries)?;

    let staging_parent = paths
        .document_path()
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut staging = Staging::new_in(staging_parent)?;
    staging.stage(paths.document_path(), &rendered)?;
    staging.stage(paths.checksum_path(), checksum.as_bytes())?;
    staging.stage(paths.state_path(), &state)?;
    staging.publish().context("publish artifacts")?;

    let oldest = entries.iter().find_map(|entry| entry.date.known());
    tracing::info!(
        date = %today,
        entries = entries.len(),
        evicted = evicted.len(),
        oldest = ?oldest,
        checksum = %checksum,
        "generation complete"
    );
    Ok(GenerateReport {
        upsert,
        evicted: evicted.len(),
        entries: entries.len(),
        checksum,
    })
}

/// Re-hash the document artifact and compare it with the checksum artifact.
///
/// Surrounding whitespace in the checksum file is ignored so hand-written
/// files with a trailing newline still verify.
pub fn verify(paths: &FeedPaths) -> Result<String> {
    let bytes = fs::read(paths.document_path())
        .with_context(|| format!("read {}", paths.document_path().display()))?;
    let recorded = fs::read_to_string(paths.checksum_path())
        .with_context(|| format!("read {}", paths.checksum_path().display()))?;
    let actual = document::checksum(&bytes);
    let recorded = recorded.trim();
    if !recorded.eq_ignore_ascii_case(&actual) {
        return Err(anyhow!(
            "checksum mismatch for {}: recorded {recorded}, actual {actual}",
            paths.document_path().display()
        ));
    }
    Ok(actual)
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
