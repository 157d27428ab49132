//! Sync engine: write the mirror and prune stale generated files

use std::collections::BTreeSet;

use mirror_fs::NormalizedPath;
use mirror_fs::io::{
    ensure_no_symlinks, list_files, prune_empty_dirs, read_bytes_if_exists, remove_file,
    write_atomic_within,
};
use serde::{Deserialize, Serialize};

use super::check::{DriftKind, DriftRecord, DriftReport};
use super::plan::{MirrorPlan, build_plan};
use crate::Result;
use crate::config::MirrorConfig;
use crate::layout::MirrorLayout;

/// Outcome of a sync
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    /// Packages with at least one mirrored document, sorted
    pub package_names: Vec<String>,
    /// Workspace-relative generated files deleted as stale, sorted
    pub removed_files: Vec<String>,
    /// Workspace-relative outputs whose bytes were (re)written, sorted
    pub written_files: Vec<String>,
    /// Outputs already byte-identical and left untouched
    pub unchanged_files: usize,
}

impl SyncResult {
    /// Whether the sync touched the filesystem at all
    pub fn is_noop(&self) -> bool {
        self.removed_files.is_empty() && self.written_files.is_empty()
    }
}

/// Options for sync operations
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Report what would be written and removed without touching the
    /// filesystem
    pub dry_run: bool,
}

/// Engine keeping the generated subtree convergent with package sources
///
/// - **sync**: render, write changed outputs, prune stale files
/// - **check**: render and diff against disk without writing
#[derive(Debug, Clone)]
pub struct SyncEngine {
    config: MirrorConfig,
}

impl SyncEngine {
    pub fn new(config: MirrorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// Synchronize the mirror with its sources.
    ///
    /// Every source is read and rewritten before the first write, so
    /// configuration, collision, encoding and read errors leave the mirror
    /// untouched. Writes and deletions stay inside `<output_root>/packages`
    /// and never pass through a symlink.
    pub fn sync(&self) -> Result<SyncResult> {
        self.sync_with_options(SyncOptions::default())
    }

    /// Synchronize with options; see [`SyncEngine::sync`].
    pub fn sync_with_options(&self, options: SyncOptions) -> Result<SyncResult> {
        let plan = build_plan(&self.config)?;
        let layout = &plan.generated.layout;
        let workspace_root = layout.workspace_root();
        let generated_root = generated_root_on_disk(layout)?;

        let mut result = SyncResult {
            package_names: plan.generated.map.package_names(),
            ..Default::default()
        };

        let expected = expected_outputs(&plan, layout)?;
        for (file, absolute) in plan.files.iter().zip(&expected) {
            if read_bytes_if_exists(absolute)?.as_deref() == Some(file.content.as_slice()) {
                result.unchanged_files += 1;
                continue;
            }
            if !options.dry_run {
                write_atomic_within(workspace_root, absolute, &file.content)?;
            }
            tracing::debug!(path = %file.output_path, dry_run = options.dry_run, "wrote");
            result.written_files.push(file.output_path.to_string());
        }

        let keep: BTreeSet<&NormalizedPath> = expected.iter().collect();
        for stale in list_files(&generated_root)? {
            if keep.contains(&stale) {
                continue;
            }
            let relative = layout.to_relative(&stale)?;
            if !options.dry_run {
                remove_file(&stale)?;
            }
            tracing::debug!(path = %relative, dry_run = options.dry_run, "removed stale file");
            result.removed_files.push(relative.to_string());
        }
        if !options.dry_run {
            prune_empty_dirs(&generated_root)?;
        }

        result.written_files.sort();
        result.removed_files.sort();
        tracing::info!(
            packages = result.package_names.len(),
            written = result.written_files.len(),
            unchanged = result.unchanged_files,
            removed = result.removed_files.len(),
            dry_run = options.dry_run,
            "sync complete"
        );
        Ok(result)
    }

    /// Compare the on-disk mirror with the one a sync would produce.
    ///
    /// Never writes. Reported paths are workspace-relative.
    pub fn check(&self) -> Result<DriftReport> {
        let plan = build_plan(&self.config)?;
        let layout = &plan.generated.layout;
        let generated_root = generated_root_on_disk(layout)?;

        let mut records = Vec::new();
        let expected = expected_outputs(&plan, layout)?;
        for (file, absolute) in plan.files.iter().zip(&expected) {
            let path = file.output_path.to_string();
            match read_bytes_if_exists(absolute)? {
                None => records.push(DriftRecord::new(DriftKind::Missing, path)),
                Some(actual) if actual != file.content => {
                    records.push(DriftRecord::new(DriftKind::Changed, path))
                }
                Some(_) => {}
            }
        }

        let keep: BTreeSet<&NormalizedPath> = expected.iter().collect();
        for file in list_files(&generated_root)? {
            if !keep.contains(&file) {
                let relative = layout.to_relative(&file)?;
                records.push(DriftRecord::new(DriftKind::Unexpected, relative.to_string()));
            }
        }

        let report = DriftReport::new(records);
        tracing::info!(
            drift = report.records.len(),
            up_to_date = report.is_up_to_date(),
            "check complete"
        );
        Ok(report)
    }
}

/// Absolute output paths, parallel to `plan.files`.
fn expected_outputs(plan: &MirrorPlan, layout: &MirrorLayout) -> Result<Vec<NormalizedPath>> {
    plan.files
        .iter()
        .map(|file| layout.resolve_inside(&file.output_path))
        .collect()
}

/// Absolute generated subtree, refused when reached through a symlink.
fn generated_root_on_disk(layout: &MirrorLayout) -> Result<NormalizedPath> {
    let generated_root = layout.resolve_inside(&layout.generated_root())?;
    ensure_no_symlinks(layout.workspace_root(), &generated_root)?;
    Ok(generated_root)
}
