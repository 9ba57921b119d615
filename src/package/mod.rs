//! Package metadata discovery and parsing.
//!
//! This module turns search roots into a name -> `.pc` file index, parses
//! individual metadata files and expands `${name}` references in them.

mod expand;
mod index;
mod pc_file;
mod roots;

pub use expand::{MAX_PASSES, expand};
pub use index::{PC_PATTERN, PackageIndex};
pub use pc_file::{PcFile, package_name};
pub use roots::{FALLBACK_DIRS, PATH_ENV, REPO_ROOT_ENV, repo_root, search_roots};
