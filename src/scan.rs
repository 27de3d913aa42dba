/**
 * Candidate discovery: walks the root and groups files by directory
 */

use log::warn;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::naming::has_canonical_prefix;

/// Extensions (uppercase, no dot) never renamed.
pub const DEFAULT_SKIP_EXTENSIONS: &[&str] = &["INI", "DB", "EXE", "DLL", "TMP", "LNK"];

#[derive(Debug, Clone)]
pub struct CandidateFilter {
    skip_extensions: Vec<String>,
}

impl Default for CandidateFilter {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl CandidateFilter {
    /// Default skip list plus `extra` extensions (with or without a dot,
    /// any case).
    pub fn new(extra: &[String]) -> Self {
        let mut skip_extensions: Vec<String> =
            DEFAULT_SKIP_EXTENSIONS.iter().map(|s| s.to_string()).collect();
        for ext in extra {
            let ext = ext.trim_start_matches('.').to_uppercase();
            if !ext.is_empty() && !skip_extensions.contains(&ext) {
                skip_extensions.push(ext);
            }
        }
        Self { skip_extensions }
    }

    pub fn accepts(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if has_canonical_prefix(name) {
            return false;
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if !ext.is_empty() => !self.skip_extensions.contains(&ext.to_uppercase()),
            _ => false,
        }
    }
}

/// Vendor-internal directories (e.g. Synology's `@eaDir`) carry an `@`.
fn is_internal_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry.file_name().to_str().is_some_and(|n| n.contains('@'))
}

/// Candidate files under `root`, grouped by parent directory in path order.
pub fn find_candidates(root: &Path, filter: &CandidateFilter) -> BTreeMap<PathBuf, Vec<PathBuf>> {
    let mut groups: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_internal_dir(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() || !filter.accepts(entry.path()) {
            continue;
        }
        let parent = entry.path().parent().unwrap_or(root).to_path_buf();
        groups.entry(parent).or_default().push(entry.into_path());
    }

    groups
}
