use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::adapters::AdapterRegistry;

/// Directory names never descended into.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    "__pycache__",
    ".git",
    "node_modules",
    "public",
    "templates",
    "migrations",
];

/// Filename prefixes never scanned (test modules, dunder files).
pub const DEFAULT_EXCLUDED_FILE_PREFIXES: &[&str] = &["test_", "_test", "__"];

/// Hard cap on files visited per target; a deliberate backpressure bound
/// against unbounded repositories, not a correctness guarantee.
pub const DEFAULT_MAX_FILES: usize = 200;

#[derive(Debug, Clone, Default)]
pub struct WalkOutcome {
    pub files: Vec<PathBuf>,
    /// True when the file cap cut the walk short.
    pub truncated: bool,
}

pub struct SourceTreeWalker {
    registry: AdapterRegistry,
    excluded_dirs: HashSet<String>,
    excluded_file_prefixes: Vec<String>,
    max_files: usize,
}

impl SourceTreeWalker {
    pub fn new(registry: AdapterRegistry) -> Self {
        Self {
            registry,
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect(),
            excluded_file_prefixes: DEFAULT_EXCLUDED_FILE_PREFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_files: DEFAULT_MAX_FILES,
        }
    }

    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    /// Enumerates candidate source files under `root`. Excluded directories
    /// are pruned before descent; unreadable entries are skipped. Stops at
    /// the file cap, marking the outcome truncated.
    pub fn walk(&self, root: &Path) -> WalkOutcome {
        let mut outcome = WalkOutcome::default();

        let excluded_dirs = self.excluded_dirs.clone();
        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                if !is_dir {
                    return true;
                }
                entry
                    .file_name()
                    .to_str()
                    .map(|name| !excluded_dirs.contains(name))
                    .unwrap_or(true)
            })
            .build();

        for entry in walker.flatten() {
            let path = entry.path();
            if !path.is_file() || !self.is_candidate(path) {
                continue;
            }
            if outcome.files.len() >= self.max_files {
                outcome.truncated = true;
                break;
            }
            outcome.files.push(path.to_path_buf());
        }

        outcome
    }

    fn is_candidate(&self, path: &Path) -> bool {
        if !self.registry.is_supported(path) {
            return false;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        !self
            .excluded_file_prefixes
            .iter()
            .any(|prefix| file_name.starts_with(prefix.as_str()))
    }
}
