use anyhow::Result;
use log::debug;
use std::path::PathBuf;

use crate::runtime::{Runtime, split_path_list};

/// Directory list searched before any fallback.
pub const PATH_ENV: &str = "PKG_CONFIG_PATH";

/// Explicit repository root; the working directory is used when unset.
pub const REPO_ROOT_ENV: &str = "PCSHIM_REPO_ROOT";

/// Repository-relative fallbacks, searched in this order after `PKG_CONFIG_PATH`.
pub const FALLBACK_DIRS: &[&[&str]] = &[
    &["lib"],
    &["lib", "zstd_build"],
    &["lib", "zstd_build", "lib"],
];

#[tracing::instrument(skip(runtime))]
pub fn repo_root<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    match runtime.env_var(REPO_ROOT_ENV) {
        Ok(root) if !root.trim().is_empty() => Ok(PathBuf::from(root)),
        _ => runtime.current_dir(),
    }
}

/// Ordered search roots for this invocation. Earlier roots shadow later
/// ones. Roots that are not existing directories are dropped.
#[tracing::instrument(skip(runtime))]
pub fn search_roots<R: Runtime>(runtime: &R) -> Result<Vec<PathBuf>> {
    let mut roots = runtime
        .env_var(PATH_ENV)
        .map(|raw| split_path_list(&raw))
        .unwrap_or_default();

    let repo = repo_root(runtime)?;
    for parts in FALLBACK_DIRS {
        roots.push(parts.iter().fold(repo.clone(), |dir, part| dir.join(part)));
    }

    roots.retain(|root| {
        let keep = runtime.is_dir(root);
        if !keep {
            debug!("Skipping missing search root {}", root.display());
        }
        keep
    });
    Ok(roots)
}
