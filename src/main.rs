use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use log::debug;
use pcshim::commands::{Action, FlagKind, QueryError, Request, execute, parse_module_list};
use pcshim::runtime::RealRuntime;
use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;

/// pcshim - minimal pkg-config for vendored dependency trees
///
/// Searches PKG_CONFIG_PATH, then <repo>/lib (repo root from
/// PCSHIM_REPO_ROOT or the current directory), recursively for .pc files.
///
/// Examples:
///   pcshim --cflags zlib
///   pcshim --exists zlib libpng16
#[derive(Parser, Debug)]
#[command(name = "pcshim", disable_version_flag = true, args_override_self = true)]
struct Cli {
    /// Print the shim's own version
    #[arg(long)]
    version: bool,

    /// List every package found in the search roots
    #[arg(long)]
    list_all: bool,

    /// Exit 0 if all packages exist, 1 otherwise
    #[arg(long)]
    exists: bool,

    /// Print the version of the first package
    #[arg(long)]
    modversion: bool,

    /// Print an expanded variable of the first package
    #[arg(long, value_name = "NAME")]
    variable: Option<String>,

    /// Print the variable names of the first package
    #[arg(long)]
    print_variables: bool,

    /// Print compiler flags
    #[arg(long)]
    cflags: bool,

    /// Print linker flags
    #[arg(long)]
    libs: bool,

    /// Log search and parse decisions to stderr
    #[arg(long)]
    debug: bool,

    // Accepted for compatibility with pkg-config callers; no effect.
    #[arg(long, hide = true)]
    print_errors: bool,
    #[arg(long, hide = true)]
    short_errors: bool,
    #[arg(long, hide = true)]
    silence_errors: bool,
    #[arg(long, hide = true)]
    errors_to_stdout: bool,
    #[arg(long = "static", hide = true)]
    static_libs: bool,
    #[arg(long, hide = true, value_name = "VERSION")]
    atleast_version: Option<String>,
    #[arg(long, hide = true, value_name = "VERSION")]
    exact_version: Option<String>,
    #[arg(long, hide = true, value_name = "VERSION")]
    max_version: Option<String>,
    #[arg(long, hide = true, value_name = "VERSION")]
    atleast_pkgconfig_version: Option<String>,
    #[arg(long, hide = true, value_name = "NAME=VALUE")]
    define_variable: Vec<String>,

    /// Package names, optionally with version constraints (ignored)
    #[arg(value_name = "PACKAGE")]
    packages: Vec<String>,
}

impl Cli {
    fn action(&self) -> Option<Action> {
        if self.version {
            return Some(Action::Version);
        }
        if self.list_all {
            return Some(Action::ListAll);
        }
        if self.exists {
            return Some(Action::Exists);
        }
        if self.modversion {
            return Some(Action::ModVersion);
        }
        if let Some(variable) = &self.variable {
            return Some(Action::Variable(variable.clone()));
        }
        if self.print_variables {
            return Some(Action::PrintVariables);
        }

        if self.cflags {
            return Some(Action::Flags(FlagKind::Cflags));
        }
        if self.libs {
            return Some(Action::Flags(FlagKind::Libs));
        }
        None
    }

    fn log_ignored_options(&self) {
        if self.print_errors || self.short_errors || self.silence_errors || self.errors_to_stdout {
            debug!("Error reporting options have no effect");
        }
        if self.static_libs {
            debug!("--static given; Libs.private is still not used");
        }
        let versions = [
            ("--atleast-version", &self.atleast_version),
            ("--exact-version", &self.exact_version),
            ("--max-version", &self.max_version),
            ("--atleast-pkgconfig-version", &self.atleast_pkgconfig_version),
        ];
        for (option, value) in versions {
            if let Some(version) = value {
                debug!("Ignoring {}={}", option, version);
            }
        }
        for definition in &self.define_variable {
            debug!("Ignoring --define-variable={}", definition);
        }
    }

    fn into_request(self) -> anyhow::Result<Request> {
        self.log_ignored_options();
        let action = self
            .action()
            .ok_or_else(|| QueryError::MalformedInvocation("no action given".to_string()))?;
        let packages = parse_module_list(&self.packages)
            .into_iter()
            .map(|spec| {
                if spec.constraint.is_some() {
                    debug!("Ignoring version constraint in '{}'", spec);
                }
                spec.name
            })
            .collect();
        Ok(Request::new(action, packages)?)
    }
}

fn init_logger(debug: bool) {
    let default_filter = if debug { "pcshim=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();
}

/// Whether `arg` names an option the CLI defines. `--name=value` is
/// matched on `name`; a bare `--` separator is kept.
fn is_known_option(command: &clap::Command, arg: &str) -> bool {
    if arg == "--" || arg == "-h" {
        return true;
    }
    let Some(long) = arg.strip_prefix("--") else {
        return false;
    };
    let name = long.split_once('=').map_or(long, |(name, _)| name);
    name == "help" || command.get_arguments().any(|a| a.get_long() == Some(name))
}

/// Drop `-`-prefixed arguments the CLI does not define, so options added
/// by newer pkg-config callers never fail an otherwise valid query.
fn drop_unknown_options(args: Vec<OsString>) -> Vec<OsString> {
    let command = Cli::command();
    args.into_iter()
        .enumerate()
        .filter(|(i, arg)| {
            let Some(arg) = arg.to_str().filter(|a| *i > 0 && a.starts_with('-')) else {
                return true;
            };
            let known = is_known_option(&command, arg);
            if !known {
                debug!("Ignoring unknown option {}", arg);
            }
            known
        })
        .map(|(_, arg)| arg)
        .collect()
}

fn run(args: Vec<OsString>) -> anyhow::Result<bool> {
    let cli = Cli::try_parse_from(drop_unknown_options(args))?;
    if cli.debug {
        debug!("Debug logging enabled");
    }
    let request = cli.into_request()?;
    let result = execute(&RealRuntime, &request)?;

    let mut stdout = io::stdout().lock();
    result.write_to(&mut stdout)?;
    stdout.flush()?;
    Ok(result.is_success())
}

fn main() -> ExitCode {
    let args: Vec<OsString> = std::env::args_os().collect();
    init_logger(args.iter().any(|a| a == "--debug"));

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            if let Some(clap_err) = e.downcast_ref::<clap::Error>()
                && clap_err.kind() == ErrorKind::DisplayHelp
            {
                let _ = clap_err.print();
                return ExitCode::SUCCESS;
            }
            debug!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_cflags_parsing() {
        let request = parse(&["pcshim", "--cflags", "zlib"]).into_request().unwrap();
        assert_eq!(request.action, Action::Flags(FlagKind::Cflags));
        assert_eq!(request.packages, vec!["zlib"]);
    }

    #[test]
    fn test_cli_interleaved_flags_and_names() {
        let request = parse(&["pcshim", "zlib", "--libs", "png"])
            .into_request()
            .unwrap();
        assert_eq!(request.action, Action::Flags(FlagKind::Libs));
        assert_eq!(request.packages, vec!["zlib", "png"]);
    }

    #[test]
    fn test_cli_cflags_win_over_libs() {
        let request = parse(&["pcshim", "--libs", "zlib", "--cflags"])
            .into_request()
            .unwrap();
        assert_eq!(request.action, Action::Flags(FlagKind::Cflags));
    }

    #[test]
    fn test_cli_repeated_flags_are_accepted() {
        let request = parse(&["pcshim", "--cflags", "--cflags", "zlib"])
            .into_request()
            .unwrap();
        assert_eq!(request.action, Action::Flags(FlagKind::Cflags));

        let request = parse(&["pcshim", "--variable=a", "--variable=b", "zlib"])
            .into_request()
            .unwrap();
        assert_eq!(request.action, Action::Variable("b".to_string()));
    }

    fn filtered(args: &[&str]) -> Vec<String> {
        drop_unknown_options(args.iter().map(OsString::from).collect())
            .into_iter()
            .map(|a| a.into_string().unwrap())
            .collect()
    }

    #[test]
    fn test_drop_unknown_options() {
        assert_eq!(
            filtered(&["pcshim", "--define-prefix", "--cflags", "-x", "zlib", "--msvc-syntax"]),
            vec!["pcshim", "--cflags", "zlib"]
        );
        assert_eq!(
            filtered(&["pcshim", "--variable=libdir", "--atleast-version", "1.0", "zlib"]),
            vec!["pcshim", "--variable=libdir", "--atleast-version", "1.0", "zlib"]
        );
        assert_eq!(
            filtered(&["pcshim", "--help", "-h", "--", "zlib"]),
            vec!["pcshim", "--help", "-h", "--", "zlib"]
        );
    }

    #[test]
    fn test_cli_define_variable_is_accepted() {
        let args = drop_unknown_options(
            ["pcshim", "--define-variable", "prefix=/opt", "--cflags", "zlib"]
                .iter()
                .map(OsString::from)
                .collect(),
        );
        let request = Cli::try_parse_from(args).unwrap().into_request().unwrap();
        assert_eq!(request.packages, vec!["zlib"]);
    }

    #[test]
    fn test_cli_version_takes_precedence() {
        let request = parse(&["pcshim", "--exists", "--version"]).into_request().unwrap();
        assert_eq!(request.action, Action::Version);
    }

    #[test]
    fn test_cli_exists_before_flags() {
        let request = parse(&["pcshim", "--cflags", "--exists", "zlib"])
            .into_request()
            .unwrap();
        assert_eq!(request.action, Action::Exists);
    }

    #[test]
    fn test_cli_variable_parsing() {
        let request = parse(&["pcshim", "--variable=libdir", "zlib"])
            .into_request()
            .unwrap();
        assert_eq!(request.action, Action::Variable("libdir".to_string()));

        let request = parse(&["pcshim", "--variable", "prefix", "zlib"])
            .into_request()
            .unwrap();
        assert_eq!(request.action, Action::Variable("prefix".to_string()));
        assert_eq!(request.packages, vec!["zlib"]);
    }

    #[test]
    fn test_cli_compat_flags_are_accepted() {
        let request = parse(&[
            "pcshim",
            "--print-errors",
            "--short-errors",
            "--static",
            "--atleast-version=1.2",
            "--exists",
            "zlib",
        ])
        .into_request()
        .unwrap();
        assert_eq!(request.action, Action::Exists);
        assert_eq!(request.packages, vec!["zlib"]);
    }

    #[test]
    fn test_cli_version_constraints_are_stripped() {
        let request = parse(&["pcshim", "--exists", "zlib >= 1.2", "libpng16"])
            .into_request()
            .unwrap();
        assert_eq!(request.packages, vec!["zlib", "libpng16"]);
    }

    #[test]
    fn test_cli_action_without_packages_fails() {
        assert!(parse(&["pcshim", "--cflags"]).into_request().is_err());
        assert!(parse(&["pcshim", "--modversion"]).into_request().is_err());
    }

    #[test]
    fn test_cli_no_action_fails() {
        assert!(parse(&["pcshim", "zlib"]).into_request().is_err());
        assert!(parse(&["pcshim"]).into_request().is_err());
    }

    #[test]
    fn test_cli_unknown_flag_without_action_fails() {
        let args = drop_unknown_options(
            ["pcshim", "--frobnicate", "zlib"]
                .iter()
                .map(OsString::from)
                .collect(),
        );
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.into_request().is_err());
    }
}
