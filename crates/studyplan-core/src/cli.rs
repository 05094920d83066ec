use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::commands::{expand_command_abbrev, known_command_names};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "study",
    version,
    about = "Study planner: tasks, timetables and a focus timer",
    disable_help_subcommand = true,
    arg_required_else_help = false
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,

    /// Override one studyrc setting, e.g. `--rc theme=blue`.
    #[arg(long = "rc", value_name = "KEY=VALUE", value_parser = parse_setting, action = ArgAction::Append)]
    pub rc_overrides: Vec<(String, String)>,

    #[arg(long = "studyrc")]
    pub studyrc: Option<PathBuf>,

    #[arg(long = "data")]
    pub data: Option<PathBuf>,

    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub rest: Vec<OsString>,
}

fn parse_setting(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

/// `-q` beats `-v`; each `-v` step goes one level more detailed than `warn`.
fn default_level(verbose: u8, quiet: u8) -> &'static str {
    match (quiet, verbose) {
        (2.., _) => "error",
        (1, _) | (0, 0) => "warn",
        (0, 1) => "info",
        (0, 2) => "debug",
        _ => "trace",
    }
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level(verbose, quiet)))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(verbose >= 2)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: String,
    pub command_args: Vec<String>,
}

impl Invocation {
    /// With no tokens, `default_command` runs instead; it may be abbreviated
    /// like a typed command.
    #[tracing::instrument(skip(rest))]
    pub fn parse(default_command: &str, rest: Vec<OsString>) -> anyhow::Result<Self> {
        let mut tokens = rest
            .into_iter()
            .map(|arg| arg.to_string_lossy().into_owned());

        let first = tokens.next();
        let token = first.as_deref().unwrap_or(default_command);
        let known = known_command_names();
        let command = expand_command_abbrev(token, &known)
            .ok_or_else(|| anyhow!("unknown or ambiguous command: {token}"))?;
        debug!(token, expanded = command, defaulted = first.is_none(), "resolved command token");

        Ok(Self {
            command: command.to_string(),
            command_args: tokens.collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn invocation_expands_prefixes() {
        let inv = Invocation::parse("list", os(&["sched", "09:00", "17:00", "Math"]))
            .expect("parse");
        assert_eq!(inv.command, "schedule");
        assert_eq!(inv.command_args, vec!["09:00", "17:00", "Math"]);
    }

    #[test]
    fn invocation_uses_default_command() {
        let inv = Invocation::parse("list", vec![]).expect("parse");
        assert_eq!(inv.command, "list");
        assert!(inv.command_args.is_empty());

        let inv = Invocation::parse("wat", vec![]).expect("parse");
        assert_eq!(inv.command, "watch");
        assert!(Invocation::parse("nonsense", vec![]).is_err());
    }

    #[test]
    fn invocation_rejects_unknown_and_ambiguous() {
        assert!(Invocation::parse("list", os(&["frobnicate"])).is_err());
        // "d" matches both done and delete
        assert!(Invocation::parse("list", os(&["d", "1"])).is_err());
    }

    #[test]
    fn global_flags_parse() {
        let cli = GlobalCli::parse_from(os(&[
            "study",
            "-vv",
            "--rc",
            "timer.minutes = 50",
            "--data",
            "/tmp/x",
            "timer",
        ]));
        assert_eq!(cli.verbose, 2);
        assert_eq!(
            cli.rc_overrides,
            vec![("timer.minutes".to_string(), "50".to_string())]
        );
        assert_eq!(cli.rest, os(&["timer"]));
        assert!(GlobalCli::try_parse_from(os(&["study", "--rc", "=x"])).is_err());
    }

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(default_level(0, 0), "warn");
        assert_eq!(default_level(1, 0), "info");
        assert_eq!(default_level(2, 0), "debug");
        assert_eq!(default_level(5, 0), "trace");
        assert_eq!(default_level(3, 1), "warn");
        assert_eq!(default_level(0, 2), "error");
    }
}
