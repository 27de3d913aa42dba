/**
 * File operations: collision-safe in-place rename and the per-pass driver
 */

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::Settings;
use crate::media::MediaFile;
use crate::naming::RenamePlan;
use crate::resolver::DateResolver;
use crate::scan::{find_candidates, CandidateFilter};

/// Progress lines are printed every this many files.
const PROGRESS_EVERY: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    /// The file already carries its canonical name.
    Unchanged,
    Renamed { from: PathBuf, to: PathBuf },
}

/// Whether anything (file, directory or dangling link) sits at `path`.
fn is_occupied(path: &Path) -> Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Failed to probe '{}'", path.display())),
    }
}

/// Single rename syscall; never falls back to copy+delete.
fn perform_rename(source_path: &Path, target_path: &Path) -> Result<()> {
    debug!("Attempting rename: '{}' -> '{}'", source_path.display(), target_path.display());
    fs::rename(source_path, target_path).with_context(|| {
        format!(
            "Failed to rename '{}' to '{}'",
            source_path.display(),
            target_path.display()
        )
    })
}

/// Renames `file` in place to its canonical name for `date`.
///
/// Occupied names are probed linearly with `_copy_1`, `_copy_2`, ... until
/// a free one is found. The probe is check-then-act, so callers must not
/// run two renames against the same directory at once.
pub fn rename_to_canonical(file: &MediaFile, date: NaiveDateTime) -> Result<RenameOutcome> {
    let dir = file
        .parent()
        .with_context(|| format!("File has no parent directory: {}", file.path.display()))?;

    let base = RenamePlan::new(file, date);
    let mut plan = base.clone();
    let mut copy_index = 0;

    let target = loop {
        let candidate = dir.join(plan.file_name());
        if candidate == file.path {
            return Ok(RenameOutcome::Unchanged);
        }
        if !is_occupied(&candidate)? {
            break candidate;
        }
        copy_index += 1;
        plan = base.with_copy_index(copy_index);
    };

    perform_rename(&file.path, &target)?;
    Ok(RenameOutcome::Renamed {
        from: file.path.clone(),
        to: target,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Renamed { from: PathBuf, to: PathBuf },
    Unchanged,
    Unresolved,
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub found: usize,
    pub renamed: usize,
    pub unchanged: usize,
    pub unresolved: usize,
    pub failed: usize,
}

impl PassSummary {
    fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Renamed { .. } => self.renamed += 1,
            FileOutcome::Unchanged => self.unchanged += 1,
            FileOutcome::Unresolved => self.unresolved += 1,
            FileOutcome::Failed(_) => self.failed += 1,
        }
    }
}

pub struct FileProcessor {
    resolver: DateResolver,
    filter: CandidateFilter,
    pool: Option<ThreadPool>,
}

impl FileProcessor {
    pub fn new(settings: &Settings) -> Result<Self> {
        Self::with_resolver(settings, DateResolver::new(settings.policy))
    }

    pub fn with_resolver(settings: &Settings, resolver: DateResolver) -> Result<Self> {
        // Directory groups run in parallel only when asked for; files
        // inside one directory are always renamed sequentially.
        let pool = if settings.workers > 1 {
            info!("Configuring thread pool with {} workers", settings.workers);
            let pool = ThreadPoolBuilder::new()
                .num_threads(settings.workers)
                .thread_name(|i| format!("media-stamp-worker-{}", i))
                .build()
                .context("Failed to configure worker thread pool")?;
            Some(pool)
        } else {
            None
        };

        Ok(Self {
            resolver,
            filter: CandidateFilter::new(&settings.skip_extensions),
            pool,
        })
    }

    /// Resolves and renames one file. Never returns an error: failures are
    /// folded into the outcome so one bad file cannot stop the pass.
    pub fn process_file(&self, path: &Path) -> FileOutcome {
        let file = match MediaFile::from_path(path) {
            Ok(file) => file,
            Err(e) => return FileOutcome::Failed(format!("{:#}", e)),
        };

        let Some(resolved) = self.resolver.resolve(&file) else {
            return FileOutcome::Unresolved;
        };

        match rename_to_canonical(&file, resolved.date) {
            Ok(RenameOutcome::Unchanged) => FileOutcome::Unchanged,
            Ok(RenameOutcome::Renamed { from, to }) => FileOutcome::Renamed { from, to },
            Err(e) => FileOutcome::Failed(format!("{:#}", e)),
        }
    }

    /// One full pass over `root`.
    pub fn run_pass(&self, root: &Path) -> PassSummary {
        let groups: Vec<(PathBuf, Vec<PathBuf>)> = find_candidates(root, &self.filter).into_iter().collect();
        let found: usize = groups.iter().map(|(_, files)| files.len()).sum();
        println!("Found {} files in {}", found, root.display());

        let pb = ProgressBar::new(found as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec:.1} files/s) ETA: {eta} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        let done = AtomicUsize::new(0);

        let process_group = |(dir, files): &(PathBuf, Vec<PathBuf>)| -> Vec<FileOutcome> {
            pb.suspend(|| println!("{} | {}", files.len(), dir.display()));
            files
                .iter()
                .map(|path| {
                    let outcome = self.process_file(path);
                    self.report(&pb, path, &outcome);
                    let processed = done.fetch_add(1, Ordering::Relaxed) + 1;
                    pb.inc(1);
                    if processed % PROGRESS_EVERY == 0 {
                        pb.suspend(|| println!("{} files left", found - processed));
                    }
                    outcome
                })
                .collect()
        };

        let outcomes: Vec<Vec<FileOutcome>> = match &self.pool {
            Some(pool) => pool.install(|| groups.par_iter().map(process_group).collect()),
            None => groups.iter().map(process_group).collect(),
        };
        pb.finish_and_clear();

        let mut summary = PassSummary {
            found,
            ..PassSummary::default()
        };
        for outcome in outcomes.iter().flatten() {
            summary.record(outcome);
        }

        println!("Renamed {} files", summary.renamed);
        info!(
            "Pass complete: {} found, {} renamed, {} unchanged, {} unresolved, {} failed",
            summary.found, summary.renamed, summary.unchanged, summary.unresolved, summary.failed
        );
        summary
    }

    fn report(&self, pb: &ProgressBar, path: &Path, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Renamed { from, to } => {
                pb.suspend(|| println!("Rename {} to {}", from.display(), to.display()));
            }
            FileOutcome::Failed(error) => {
                pb.suspend(|| warn!("{}: {}", path.display(), error));
            }
            FileOutcome::Unresolved => {
                pb.suspend(|| warn!("Unknown date: {}", path.display()));
            }
            FileOutcome::Unchanged => {}
        }
    }
}
