//! Sync and check command implementations
//!
//! These commands keep the generated subtree convergent with package sources.

use colored::Colorize;
use serde::Serialize;

use mirror_core::{DriftKind, DriftRecord, MirrorConfig, SyncEngine, SyncOptions};

use crate::error::{CliError, Result};

/// JSON shape of `docmirror check --json`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckOutput<'a> {
    up_to_date: bool,
    records: &'a [DriftRecord],
}

/// Run the sync command
///
/// Writes changed outputs and prunes stale generated files.
pub fn run_sync(config: MirrorConfig, dry_run: bool, json: bool) -> Result<()> {
    let engine = SyncEngine::new(config);

    if json {
        let result = engine.sync_with_options(SyncOptions { dry_run })?;
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let verb = if dry_run { "Previewing" } else { "Synchronizing" };
    println!("{} {} documentation mirror...", "=>".blue().bold(), verb);

    let result = engine.sync_with_options(SyncOptions { dry_run })?;
    let prefix = if dry_run { "[dry-run] " } else { "" };

    if result.is_noop() {
        println!(
            "{} Already synchronized. {} file(s) up to date.",
            "OK".green().bold(),
            result.unchanged_files
        );
        return Ok(());
    }

    println!(
        "{} {}Mirrored {} package(s):",
        "OK".green().bold(),
        prefix,
        result.package_names.len()
    );
    for path in &result.written_files {
        println!("   {} {}{}", "+".green(), prefix, path);
    }
    for path in &result.removed_files {
        println!("   {} {}{}", "-".red(), prefix, path.dimmed());
    }
    if result.unchanged_files > 0 {
        println!("   {} unchanged", result.unchanged_files);
    }

    Ok(())
}

/// Run the check command
///
/// Reports drift and fails when the mirror is out of date.
pub fn run_check(config: MirrorConfig, json: bool) -> Result<()> {
    let engine = SyncEngine::new(config);

    if !json {
        println!("{} Checking documentation mirror...", "=>".blue().bold());
    }
    let report = engine.check()?;

    if json {
        let output = CheckOutput {
            up_to_date: report.is_up_to_date(),
            records: &report.records,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if report.is_up_to_date() {
        println!("{} Mirror is up to date. No drift detected.", "OK".green().bold());
    } else {
        println!("{} Mirror has drifted:", "DRIFTED".red().bold());
        for record in &report.records {
            let marker = match record.kind {
                DriftKind::Changed => "!".red(),
                DriftKind::Missing => "-".yellow(),
                DriftKind::Unexpected => "+".yellow(),
            };
            println!(
                "   {} {} ({})",
                marker,
                record.path.cyan(),
                record.kind.to_string().dimmed()
            );
        }
        println!();
        println!("Run {} to repair.", "docmirror sync".cyan());
    }

    if report.is_up_to_date() {
        Ok(())
    } else {
        Err(CliError::Drift {
            count: report.records.len(),
        })
    }
}
