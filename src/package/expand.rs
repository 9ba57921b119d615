//! `${name}` variable expansion.
//!
//! Substitution runs in passes until the string stops changing or the pass
//! limit is hit, so chained variables (`prefix` -> `libdir` -> `Libs`)
//! resolve while cyclic ones (`a=${a}`) terminate with a partial result.

use indexmap::IndexMap;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Upper bound on substitution passes.
pub const MAX_PASSES: usize = 10;

static VAR_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid variable pattern"));

/// Expand every `${name}` in `value` from `vars`. Unknown names expand to
/// the empty string. Never fails.
pub fn expand(value: &str, vars: &IndexMap<String, String>) -> String {
    let mut current = value.to_string();
    for _ in 0..MAX_PASSES {
        let next = VAR_REF
            .replace_all(&current, |caps: &Captures| {
                vars.get(&caps[1]).cloned().unwrap_or_default()
            })
            .into_owned();
        if next == current {
            break;
        }
        current = next;
    }
    current
}
