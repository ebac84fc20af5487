use std::io::{self, Write};

use anyhow::{Context, anyhow};
use tracing::{debug, info, instrument};

use crate::cli::Invocation;
use crate::controller::CalendarController;
use crate::datetime::parse_month_expr;
use crate::grid::year_overview;
use crate::render::Renderer;

pub fn known_command_names() -> Vec<&'static str> {
    vec!["month", "agenda", "year", "export", "legend", "help", "version"]
}

pub fn expand_command_abbrev<'a>(token: &'a str, known: &[&'a str]) -> Option<&'a str> {
    if known.contains(&token) {
        return Some(token);
    }

    let mut matches = known.iter().copied().filter(|name| name.starts_with(token));
    let first = matches.next()?;
    if matches.next().is_some() {
        None
    } else {
        Some(first)
    }
}

#[instrument(skip(controller, renderer, inv))]
pub fn dispatch(
    controller: &mut CalendarController,
    renderer: &Renderer,
    inv: Invocation,
) -> anyhow::Result<()> {
    let command = inv.command.as_str();
    debug!(command, args = ?inv.command_args, "dispatching command");

    match command {
        "month" => cmd_month(controller, renderer, &inv.command_args),
        "agenda" => cmd_agenda(controller, renderer, &inv.command_args),
        "year" => cmd_year(controller, renderer, &inv.command_args),
        "export" => cmd_export(controller, &inv.command_args),
        "legend" => renderer.print_legend(controller.filters()),
        "help" => cmd_help(),
        "version" => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => Err(anyhow!("unknown command: {other}")),
    }
}

/// Moves the controller to the month named by the optional `WHEN` argument.
pub fn select_month(controller: &mut CalendarController, args: &[String]) -> anyhow::Result<()> {
    match args {
        [] => Ok(()),
        [when] => {
            let target = parse_month_expr(when, controller.current(), controller.today())
                .with_context(|| format!("cannot resolve month selector: {when}"))?;
            controller.go_to(target.year, i64::from(target.month));
            debug!(year = target.year, month = target.month, "selected month");
            Ok(())
        }
        _ => Err(anyhow!("expected at most one month selector, got: {}", args.join(" "))),
    }
}

#[instrument(skip(controller, renderer))]
fn cmd_month(
    controller: &mut CalendarController,
    renderer: &Renderer,
    args: &[String],
) -> anyhow::Result<()> {
    select_month(controller, args)?;
    let view = controller.view();
    info!(
        year = view.cursor.year,
        month = view.cursor.month,
        segments = view.segments.len(),
        "rendering month"
    );
    renderer.print_month(&view)
}

#[instrument(skip(controller, renderer))]
fn cmd_agenda(
    controller: &mut CalendarController,
    renderer: &Renderer,
    args: &[String],
) -> anyhow::Result<()> {
    select_month(controller, args)?;
    let view = controller.view();
    renderer.print_agenda(&view)
}

#[instrument(skip(controller, renderer))]
fn cmd_year(
    controller: &mut CalendarController,
    renderer: &Renderer,
    args: &[String],
) -> anyhow::Result<()> {
    let year = match args {
        [] => i64::from(controller.current().year),
        [raw] => raw
            .trim()
            .parse::<i64>()
            .with_context(|| format!("expected a year, got: {raw}"))?,
        _ => return Err(anyhow!("expected at most one year, got: {}", args.join(" "))),
    };

    let grids = year_overview(year);
    println!("{year}");
    renderer.print_year(&grids, controller.today())
}

#[instrument(skip(controller))]
fn cmd_export(controller: &mut CalendarController, args: &[String]) -> anyhow::Result<()> {
    select_month(controller, args)?;
    let dto = controller.view().to_dto();
    let text = serde_json::to_string_pretty(&dto).context("failed to serialize month view")?;
    println!("{text}");
    info!(cells = dto.cells.len(), "exported month view");
    Ok(())
}

fn cmd_help() -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "usage: almanac [flags] [month|agenda|year|export|legend] [WHEN]")?;
    writeln!(out)?;
    writeln!(out, "WHEN:  YYYY-MM | today | next | prev | +N | -N | month name")?;
    writeln!(out, "flags: --events PATH  --hide TAG  --only TAG  --today YYYY-MM-DD")?;
    writeln!(out, "       --almanacrc PATH  --rc KEY=VALUE  -v  -q")?;
    writeln!(out, "tags:  sky indigo yellow green red")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::clock::FixedClock;
    use crate::cursor::DateCursor;
    use crate::event::EventStore;
    use crate::filter::FilterState;

    fn controller() -> CalendarController {
        CalendarController::new(
            EventStore::default(),
            FilterState::all_visible(),
            Box::new(FixedClock::new(NaiveDate::from_ymd_opt(2024, 1, 17).expect("valid date"))),
        )
    }

    #[test]
    fn abbreviations_must_be_unique() {
        let known = known_command_names();
        assert_eq!(expand_command_abbrev("ag", &known), Some("agenda"));
        assert_eq!(expand_command_abbrev("export", &known), Some("export"));
        assert_eq!(expand_command_abbrev("zzz", &known), None);
    }

    #[test]
    fn select_month_accepts_relative_and_absolute() {
        let mut controller = controller();
        select_month(&mut controller, &["+13".to_string()]).expect("relative");
        assert_eq!(controller.current(), DateCursor { year: 2025, month: 1 });

        select_month(&mut controller, &["2023-12".to_string()]).expect("absolute");
        assert_eq!(controller.current(), DateCursor { year: 2023, month: 11 });

        select_month(&mut controller, &["today".to_string()]).expect("today");
        assert_eq!(controller.current(), DateCursor { year: 2024, month: 0 });

        assert!(select_month(&mut controller, &["a".to_string(), "b".to_string()]).is_err());
        assert!(select_month(&mut controller, &["someday".to_string()]).is_err());
    }
}
