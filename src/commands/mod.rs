//! Query actions and their dispatch.
//!
//! An [`Action`] plus the requested package names form a [`Request`];
//! [`execute`] builds the package index from the configured search roots,
//! runs the query and returns a [`QueryResult`] for the caller to print.

use anyhow::Result;
use log::debug;
use std::io::{self, Write};

mod error;
mod module_spec;
mod query;

pub use error::QueryError;
pub use module_spec::{ModuleSpec, VersionConstraint, parse_module_list};
pub use query::{DEFAULT_VERSION, FlagKind, PCFILEDIR, Query, expansion_context};

use crate::package::{PackageIndex, search_roots};
use crate::runtime::Runtime;

/// Printed by `--version`.
pub const SHIM_VERSION: &str = "0.0.0-pcshim";

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Version,
    ListAll,
    Exists,
    ModVersion,
    Variable(String),
    PrintVariables,
    /// Compiler or linker flags. When both are requested only cflags print.
    Flags(FlagKind),
}

impl Action {
    pub fn needs_packages(&self) -> bool {
        !matches!(self, Action::Version | Action::ListAll)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub action: Action,
    pub packages: Vec<String>,
}

impl Request {
    /// Build a request, rejecting actions that need package names but got none.
    pub fn new(action: Action, packages: Vec<String>) -> Result<Self, QueryError> {
        if action.needs_packages() && packages.is_empty() {
            return Err(QueryError::MalformedInvocation(format!(
                "{:?} requires at least one package name",
                action
            )));
        }
        Ok(Self { action, packages })
    }
}

/// Outcome of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Exists(bool),
    Text(String),
    Tokens(Vec<String>),
    Lines(Vec<String>),
}

impl QueryResult {
    pub fn is_success(&self) -> bool {
        !matches!(self, QueryResult::Exists(false))
    }

    /// Single values are written without a trailing newline; listings end
    /// every line with one. Existence checks print nothing.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self {
            QueryResult::Exists(_) => Ok(()),
            QueryResult::Text(text) => write!(out, "{}", text),
            QueryResult::Tokens(tokens) => write!(out, "{}", tokens.join(" ")),
            QueryResult::Lines(lines) => lines.iter().try_for_each(|line| writeln!(out, "{}", line)),
        }
    }
}

#[tracing::instrument(skip(runtime))]
pub fn execute<R: Runtime>(runtime: &R, request: &Request) -> Result<QueryResult> {
    if request.action == Action::Version {
        return Ok(QueryResult::Text(SHIM_VERSION.to_string()));
    }

    let roots = search_roots(runtime)?;
    debug!("Search roots: {:?}", roots);
    let query = Query::new(runtime, PackageIndex::build(runtime, &roots));
    let names = &request.packages;

    let result = match &request.action {
        Action::Version => QueryResult::Text(SHIM_VERSION.to_string()),
        Action::ListAll => QueryResult::Lines(query.list_all()),
        Action::Exists => QueryResult::Exists(query.exists(names)),
        Action::ModVersion => QueryResult::Text(query.modversion(names)?),
        Action::Variable(variable) => QueryResult::Text(query.variable(names, variable)?),
        Action::PrintVariables => QueryResult::Lines(query.variable_names(names)?),
        Action::Flags(kind) => QueryResult::Tokens(query.flags(names, *kind)?),
    };
    Ok(result)
}
