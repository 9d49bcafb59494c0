//! Source discovery: turns a target directory into the ordered
//! `(path, content)` corpus the native engine scans.

use std::path::{Path, PathBuf};

use crate::error::{Result, ScanError};

/// A source file handed to the rule engine.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content: String,
}

const MAX_FILE_BYTES: u64 = 1_048_576;
const MAX_DEPTH: usize = 16;

/// Collect `.sol` files under `root`, honoring gitignore, skipping hidden
/// entries and files over 1 MiB. `excludes` are glob patterns matched
/// against root-relative paths; an invalid pattern is a configuration
/// fault, not a per-file skip.
pub fn collect_sources(root: &Path, excludes: &[String]) -> Result<Vec<SourceFile>> {
    let mut patterns = Vec::with_capacity(excludes.len());
    for raw in excludes {
        let pattern = glob::Pattern::new(raw)
            .map_err(|e| ScanError::Config(format!("invalid exclude pattern '{raw}': {e}")))?;
        patterns.push(pattern);
    }

    let walker = ignore::WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .max_depth(Some(MAX_DEPTH))
        .build();

    let mut files = Vec::new();
    for entry in walker.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if !path.extension().is_some_and(|e| e == "sol") {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        if patterns.iter().any(|p| p.matches_path(relative)) {
            continue;
        }

        let metadata = std::fs::metadata(path)?;
        if metadata.len() > MAX_FILE_BYTES {
            tracing::debug!(path = %path.display(), "skipping oversized source file");
            continue;
        }

        if let Ok(content) = std::fs::read_to_string(path) {
            files.push(SourceFile {
                path: path.to_path_buf(),
                content,
            });
        }
    }

    // Walk order varies across platforms; sequential finding ids must not.
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}
