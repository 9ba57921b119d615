//! Module list parsing.
//!
//! Build tools pass package names either bare (`zlib`) or with a version
//! constraint, inline (`zlib>=1.2`) or as separate arguments
//! (`zlib >= 1.2`). Names may also be comma separated. Constraints are
//! recorded but never compared.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static OPERATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(>=|<=|!=|=|<|>)").expect("valid operator pattern"));

#[derive(Debug, PartialEq, Clone)]
pub struct VersionConstraint {
    pub op: String,
    pub version: String,
}

/// One requested package with an optional version constraint.
#[derive(Debug, PartialEq, Clone)]
pub struct ModuleSpec {
    pub name: String,
    pub constraint: Option<VersionConstraint>,
}

impl fmt::Display for ModuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.constraint {
            Some(c) => write!(f, "{} {} {}", self.name, c.op, c.version),
            None => write!(f, "{}", self.name),
        }
    }
}

fn is_operator(token: &str) -> bool {
    matches!(token, ">=" | "<=" | "!=" | "=" | "<" | ">")
}

/// Parse positional arguments into module specs, in request order.
pub fn parse_module_list<S: AsRef<str>>(args: &[S]) -> Vec<ModuleSpec> {
    let mut tokens = Vec::new();
    for arg in args {
        let spaced = OPERATOR.replace_all(arg.as_ref(), " $1 ").replace(',', " ");
        tokens.extend(spaced.split_whitespace().map(str::to_string));
    }

    let mut specs: Vec<ModuleSpec> = Vec::new();
    let mut iter = tokens.into_iter();
    while let Some(token) = iter.next() {
        if is_operator(&token) {
            let version = iter.next().unwrap_or_default();
            if let Some(last) = specs.last_mut()
                && last.constraint.is_none()
            {
                last.constraint = Some(VersionConstraint { op: token, version });
            }
            continue;
        }
        specs.push(ModuleSpec {
            name: token,
            constraint: None,
        });
    }
    specs
}
