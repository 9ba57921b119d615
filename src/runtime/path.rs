//! Path-list helpers.

use std::env;
use std::path::PathBuf;

/// Split a platform path-list (`:` on Unix, `;` on Windows) into directories.
/// Empty and whitespace-only entries are dropped.
pub fn split_path_list(raw: &str) -> Vec<PathBuf> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    env::split_paths(raw)
        .filter(|p| !p.as_os_str().to_string_lossy().trim().is_empty())
        .collect()
}
