use anyhow::Result;
use indexmap::IndexMap;
use log::debug;

use super::error::QueryError;
use crate::package::{PackageIndex, PcFile, expand};
use crate::runtime::Runtime;

/// Variable injected into every expansion context, holding the directory
/// of the metadata file.
pub const PCFILEDIR: &str = "pcfiledir";

/// Printed by `--modversion` when a package declares no version.
pub const DEFAULT_VERSION: &str = "0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    Cflags,
    Libs,
}

impl FlagKind {
    /// Field consulted for this kind. `Libs.private` is never read.
    pub fn field(self) -> &'static str {
        match self {
            FlagKind::Cflags => "Cflags",
            FlagKind::Libs => "Libs",
        }
    }
}

/// Variables of `pc` plus `pcfiledir` unless the file defines it.
pub fn expansion_context(pc: &PcFile) -> IndexMap<String, String> {
    let mut vars = pc.vars.clone();
    vars.entry(PCFILEDIR.to_string())
        .or_insert_with(|| pc.dir().to_string_lossy().into_owned());
    vars
}

/// Resolves package queries against one index.
pub struct Query<'a, R: Runtime> {
    runtime: &'a R,
    index: PackageIndex,
}

impl<'a, R: Runtime> Query<'a, R> {
    pub fn new(runtime: &'a R, index: PackageIndex) -> Self {
        Self { runtime, index }
    }

    #[tracing::instrument(skip(self))]
    fn load(&self, name: &str) -> Result<PcFile> {
        let path = self
            .index
            .get(name)
            .ok_or_else(|| QueryError::NotFound(name.to_string()))?;
        debug!("Loading {} from {}", name, path.display());
        Ok(PcFile::load(self.runtime, path))
    }

    fn first<'n>(names: &'n [String]) -> Result<&'n str> {
        names
            .first()
            .map(String::as_str)
            .ok_or_else(|| QueryError::MalformedInvocation("no package given".to_string()).into())
    }

    /// True iff every name is indexed.
    #[tracing::instrument(skip(self))]
    pub fn exists(&self, names: &[String]) -> bool {
        names.iter().all(|name| {
            let found = self.index.contains(name);
            if !found {
                debug!("Package {} not found", name);
            }
            found
        })
    }

    /// Raw `Version` field of the first named package.
    #[tracing::instrument(skip(self))]
    pub fn modversion(&self, names: &[String]) -> Result<String> {
        let pc = self.load(Self::first(names)?)?;
        Ok(pc.field("Version").unwrap_or(DEFAULT_VERSION).to_string())
    }

    /// Expanded `Cflags` or `Libs` tokens of every named package, in order.
    /// Fails without partial output if any package is unknown.
    #[tracing::instrument(skip(self))]
    pub fn flags(&self, names: &[String], kind: FlagKind) -> Result<Vec<String>> {
        let mut tokens = Vec::new();
        for name in names {
            let pc = self.load(name)?;
            let raw = pc.field(kind.field()).unwrap_or_default();
            let expanded = expand(raw, &expansion_context(&pc));
            tokens.extend(expanded.split_whitespace().map(str::to_string));
        }
        Ok(tokens)
    }

    /// Expanded value of `variable` in the first named package. Unknown
    /// variables are empty.
    #[tracing::instrument(skip(self))]
    pub fn variable(&self, names: &[String], variable: &str) -> Result<String> {
        let pc = self.load(Self::first(names)?)?;
        let vars = expansion_context(&pc);
        Ok(vars
            .get(variable)
            .map(|value| expand(value, &vars))
            .unwrap_or_default())
    }

    /// Variable names of the first named package in declaration order.
    #[tracing::instrument(skip(self))]
    pub fn variable_names(&self, names: &[String]) -> Result<Vec<String>> {
        let pc = self.load(Self::first(names)?)?;
        Ok(expansion_context(&pc).into_keys().collect())
    }

    /// One `<package> <Name> - <Description>` line per indexed package,
    /// sorted by package name.
    #[tracing::instrument(skip(self))]
    pub fn list_all(&self) -> Vec<String> {
        let mut lines: Vec<(String, String)> = self
            .index
            .iter()
            .map(|(name, path)| {
                let pc = PcFile::load(self.runtime, path);
                let description = pc.field("Description").unwrap_or_default();
                (name.to_string(), format!("{} {} - {}", name, pc.name, description))
            })
            .collect();
        lines.sort();
        lines.into_iter().map(|(_, line)| line).collect()
    }
}
