use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use chrono::NaiveDate;
use clap::{ArgAction, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::datetime::parse_day;
use crate::filter::FilterState;
use crate::palette::ColorTag;

#[derive(Debug, Clone)]
pub struct PreprocessedArgs {
    pub cleaned_args: Vec<OsString>,
    pub rc_overrides: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "almanac",
    version,
    about = "Almanac: month-grid calendar for the terminal",
    disable_help_subcommand = true,
    arg_required_else_help = false
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append
    )]
    pub rc_overrides: Vec<KeyVal>,

    #[arg(long = "almanacrc")]
    pub almanacrc: Option<PathBuf>,

    /// JSON or JSON-lines file of events.
    #[arg(long = "events")]
    pub events: Option<PathBuf>,

    /// Hide a color category; repeatable.
    #[arg(
        long = "hide",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<ColorTag>()),
        action = ArgAction::Append
    )]
    pub hide: Vec<ColorTag>,

    /// Show only these color categories; repeatable.
    #[arg(
        long = "only",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<ColorTag>()),
        action = ArgAction::Append
    )]
    pub only: Vec<ColorTag>,

    /// Pretend today is this date (YYYY-MM-DD).
    #[arg(
        long = "today",
        value_parser = clap::builder::ValueParser::new(parse_day)
    )]
    pub today: Option<NaiveDate>,

    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub rest: Vec<OsString>,
}

impl GlobalCli {
    /// `--only` replaces the configured toggles; `--hide` then switches tags off.
    pub fn apply_filter_flags(&self, filters: &mut FilterState) {
        if !self.only.is_empty() {
            for tag in ColorTag::ALL {
                filters.set(tag, self.only.contains(&tag));
            }
        }
        for tag in &self.hide {
            filters.set(*tag, false);
        }
        debug!(active = ?filters.active_set(), "applied filter flags");
    }
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

/// Pulls positional `rc.key=value` / `rc.key:value` tokens out of the argument list.
#[tracing::instrument(skip_all)]
pub fn preprocess_args(raw: &[OsString]) -> anyhow::Result<PreprocessedArgs> {
    let mut cleaned = Vec::with_capacity(raw.len());
    let mut overrides: Vec<(String, String)> = Vec::new();

    let mut iter = raw.iter().cloned();
    if let Some(bin) = iter.next() {
        cleaned.push(bin);
    }

    for arg in iter {
        let s = arg.to_string_lossy();
        if let Some(rest) = s.strip_prefix("rc.") {
            let parsed = rest
                .split_once('=')
                .or_else(|| rest.split_once(':'))
                .map(|(k, v)| (format!("rc.{k}"), v.to_string()));

            if let Some((k, v)) = parsed {
                debug!(key = %k, value = %v, "captured positional rc override");
                overrides.push((k, v));
                continue;
            }
        }

        cleaned.push(arg);
    }

    Ok(PreprocessedArgs {
        cleaned_args: cleaned,
        rc_overrides: overrides,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: String,
    pub command_args: Vec<String>,
}

impl Invocation {
    /// First token names the command (abbreviations allowed); with no
    /// recognised command the tokens are arguments to `month`.
    #[tracing::instrument(skip(rest))]
    pub fn parse(rest: Vec<OsString>) -> anyhow::Result<Self> {
        let tokens: Vec<String> = rest
            .into_iter()
            .map(|arg| arg.to_string_lossy().to_string())
            .collect();

        let known = crate::commands::known_command_names();
        let Some(first) = tokens.first() else {
            debug!("no explicit command, using month");
            return Ok(Self {
                command: "month".to_string(),
                command_args: vec![],
            });
        };

        if let Some(full) = crate::commands::expand_command_abbrev(first, &known) {
            debug!(token = %first, expanded = %full, "resolved command token");
            return Ok(Self {
                command: full.to_string(),
                command_args: tokens[1..].to_vec(),
            });
        }

        if tokens.len() > 1 {
            return Err(anyhow!("unknown command: {first}"));
        }

        Ok(Self {
            command: "month".to_string(),
            command_args: tokens,
        })
    }
}
