/// Best-effort removal of bytecode cache directories
///
/// Absent paths are not an error. Other failures are reported in the
/// returned outcomes and logged, never propagated.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::logging::steps;

/// Result of cleaning one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanOutcome {
    Removed { path: PathBuf, files: usize },
    Absent { path: PathBuf },
    Failed { path: PathBuf, error: String },
}

impl CleanOutcome {
    pub fn path(&self) -> &Path {
        match self {
            CleanOutcome::Removed { path, .. }
            | CleanOutcome::Absent { path }
            | CleanOutcome::Failed { path, .. } => path,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CleanOutcome::Failed { .. })
    }
}

/// Remove every entry under `root`, in order
///
/// Entries containing `*`, `?` or `[` are glob patterns; anything else is a
/// literal relative path.
pub fn clean_paths(root: &Path, entries: &[String]) -> Vec<CleanOutcome> {
    let outcomes: Vec<CleanOutcome> = resolve_targets(root, entries)
        .into_iter()
        .map(|target| match target {
            Ok(path) => remove_path(&path),
            Err(outcome) => outcome,
        })
        .collect();

    for outcome in &outcomes {
        log_outcome(root, outcome);
    }

    outcomes
}

/// Expand clean entries into the concrete paths that would be removed
///
/// All patterns are expanded before anything is deleted. A path whose parent
/// resolves outside `root` (through a symlinked directory) comes back as
/// `Err(Failed)`, as do invalid patterns; unmatched entries as `Err(Absent)`.
pub fn resolve_targets(root: &Path, entries: &[String]) -> Vec<Result<PathBuf, CleanOutcome>> {
    let canonical_root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    let mut targets = Vec::new();

    for entry in entries {
        let candidates = if is_pattern(entry) {
            expand_pattern(root, entry)
        } else {
            vec![Ok(root.join(entry))]
        };

        targets.extend(
            candidates
                .into_iter()
                .map(|candidate| candidate.and_then(|path| within_root(&canonical_root, path))),
        );
    }

    targets
}

fn is_pattern(entry: &str) -> bool {
    entry.contains(['*', '?', '['])
}

fn expand_pattern(root: &Path, entry: &str) -> Vec<Result<PathBuf, CleanOutcome>> {
    let full = root.join(entry);
    // The root is literal even if its name contains glob metacharacters
    let pattern = Path::new(&glob::Pattern::escape(&root.to_string_lossy()))
        .join(entry)
        .to_string_lossy()
        .into_owned();

    let paths = match glob::glob(&pattern) {
        Ok(paths) => paths,
        Err(e) => {
            return vec![Err(CleanOutcome::Failed {
                path: full,
                error: format!("invalid pattern: {}", e),
            })]
        }
    };

    let matches: Vec<_> = paths
        .map(|item| {
            item.map_err(|e| CleanOutcome::Failed {
                path: e.path().to_path_buf(),
                error: e.error().to_string(),
            })
        })
        .collect();

    if matches.is_empty() {
        return vec![Err(CleanOutcome::Absent { path: full })];
    }

    matches
}

/// Keep `path` only if its parent directory resolves under the canonical root
fn within_root(canonical_root: &Path, path: PathBuf) -> Result<PathBuf, CleanOutcome> {
    let Some(parent) = path.parent() else {
        return Err(outside_root(path));
    };

    match parent.canonicalize() {
        Ok(parent) if parent.starts_with(canonical_root) => Ok(path),
        Ok(_) => Err(outside_root(path)),
        Err(e) => Err(from_io_error(&path, e)),
    }
}

fn outside_root(path: PathBuf) -> CleanOutcome {
    CleanOutcome::Failed {
        path,
        error: "outside project root".to_string(),
    }
}

/// Remove a directory tree, file or symlink without following links
pub fn remove_path(path: &Path) -> CleanOutcome {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) => return from_io_error(path, e),
    };

    let result = if metadata.is_dir() {
        let files = count_files(path);
        fs::remove_dir_all(path).map(|_| files)
    } else {
        fs::remove_file(path).map(|_| 1)
    };

    match result {
        Ok(files) => CleanOutcome::Removed {
            path: path.to_path_buf(),
            files,
        },
        Err(e) => from_io_error(path, e),
    }
}

fn count_files(dir: &Path) -> usize {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| !entry.file_type().is_dir())
        .count()
}

fn from_io_error(path: &Path, error: io::Error) -> CleanOutcome {
    if error.kind() == io::ErrorKind::NotFound {
        CleanOutcome::Absent {
            path: path.to_path_buf(),
        }
    } else {
        CleanOutcome::Failed {
            path: path.to_path_buf(),
            error: error.to_string(),
        }
    }
}

fn log_outcome(root: &Path, outcome: &CleanOutcome) {
    let path = outcome.path();
    let shown = path.strip_prefix(root).unwrap_or(path).display();

    match outcome {
        CleanOutcome::Removed { files, .. } => {
            tracing::debug!(step = steps::CLEAN, path = %shown, files = *files, "removed");
        }
        CleanOutcome::Absent { .. } => {
            tracing::debug!(step = steps::CLEAN, path = %shown, "absent");
        }
        CleanOutcome::Failed { error, .. } => {
            tracing::warn!(step = steps::CLEAN, path = %shown, "could not remove: {}", error);
        }
    }
}
