use glob::Pattern;
use indexmap::IndexMap;
use log::debug;
use std::path::{Path, PathBuf};

use super::pc_file::package_name;
use crate::runtime::Runtime;

/// File name pattern of metadata files.
pub const PC_PATTERN: &str = "*.pc";

/// Package name -> metadata file, built from an ordered list of roots.
///
/// The first file found for a name is kept; later roots never replace it.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PackageIndex {
    packages: IndexMap<String, PathBuf>,
}

impl PackageIndex {
    #[tracing::instrument(skip(runtime))]
    pub fn build<R: Runtime>(runtime: &R, roots: &[PathBuf]) -> Self {
        let pattern = Pattern::new(PC_PATTERN).expect("valid metadata file pattern");
        let mut index = Self::default();

        for root in roots {
            let mut found = Vec::new();
            walk(runtime, root, &pattern, &mut found);
            for path in found {
                let name = package_name(&path);
                if let Some(existing) = index.packages.get(&name) {
                    debug!(
                        "{} shadowed by {}",
                        path.display(),
                        existing.display()
                    );
                    continue;
                }
                index.packages.insert(name, path);
            }
        }

        debug!("Indexed {} packages", index.packages.len());
        index
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.packages.get(name).map(PathBuf::as_path)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    /// Packages in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.packages
            .iter()
            .map(|(name, path)| (name.as_str(), path.as_path()))
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Depth-first walk collecting files matching `pattern`. Unreadable
/// directories are skipped. Symlinked directories are not followed.
fn walk<R: Runtime>(runtime: &R, dir: &Path, pattern: &Pattern, out: &mut Vec<PathBuf>) {
    let entries = match runtime.read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Skipping unreadable directory {}: {:#}", dir.display(), e);
            return;
        }
    };

    for entry in entries {
        if runtime.is_dir(&entry) {
            if !runtime.is_symlink(&entry) {
                walk(runtime, &entry, pattern, out);
            }
            continue;
        }
        let matches = entry
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| pattern.matches(n));
        if matches {
            out.push(entry);
        }
    }
}
