//! pcshim - a filesystem-local stand-in for `pkg-config`.
//!
//! Finds `.pc` metadata files under `PKG_CONFIG_PATH` and a few
//! repository-relative fallback directories, expands their `${name}`
//! variables and prints compiler or linker flags for build tools.

pub mod commands;
pub mod package;
pub mod runtime;
