pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod controller;
pub mod cursor;
pub mod datetime;
pub mod error;
pub mod event;
pub mod filter;
pub mod grid;
pub mod locale;
pub mod mapper;
pub mod palette;
pub mod render;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info,
  warn
};

use crate::clock::{
  Clock,
  FixedClock,
  SystemClock
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let pre =
    cli::preprocess_args(&raw_args)?;
  let cli = cli::GlobalCli::parse_from(
    pre.cleaned_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting almanac CLI"
  );
  debug!(?pre.rc_overrides, "preprocessed rc overrides");

  let mut cfg = config::Config::load(
    cli.almanacrc.as_deref()
  )?;
  cfg.apply_overrides(
    pre.rc_overrides.into_iter().chain(
      cli
        .rc_overrides
        .iter()
        .cloned()
        .map(|kv| (kv.key, kv.value))
    )
  );

  let tz =
    datetime::resolve_calendar_timezone(
      cfg
        .get("calendar.timezone")
        .as_deref()
    );
  debug!(timezone = %tz, "calendar timezone");

  let records = match cli
    .events
    .clone()
    .or_else(|| cfg.events_path())
  {
    | Some(path) => {
      event::load_event_file(&path)
        .with_context(|| {
          format!(
            "failed to load events from \
             {}",
            path.display()
          )
        })?
    }
    | None => {
      debug!(
        "no event file configured; \
         calendar is empty"
      );
      vec![]
    }
  };

  let (store, rejected) =
    event::EventStore::ingest(
      records, tz
    );
  if !rejected.is_empty() {
    warn!(
      rejected = rejected.len(),
      "some events were skipped"
    );
  }

  let mut filters =
    cfg.filter_defaults();
  cli.apply_filter_flags(&mut filters);

  let clock: Box<dyn Clock> =
    match cli.today {
      | Some(day) => {
        Box::new(FixedClock::new(day))
      }
      | None => {
        Box::new(SystemClock::new(tz))
      }
    };

  let locale = cfg.locale()?;
  let mut controller =
    controller::CalendarController::new(
      store, filters, clock
    )
    .with_locale(locale);

  let renderer =
    render::Renderer::new(
      &cfg, locale
    )?;
  let inv =
    cli::Invocation::parse(cli.rest)?;

  commands::dispatch(
    &mut controller,
    &renderer,
    inv
  )?;

  info!("done");
  Ok(())
}
