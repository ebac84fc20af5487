use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use chrono::NaiveDate;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::config::Config;
use crate::controller::{DayCell, MonthView};
use crate::filter::FilterState;
use crate::grid::{CellKind, DAYS_PER_WEEK, MonthGrid};
use crate::locale::Locale;
use crate::mapper::DayAssignment;
use crate::palette::ColorTag;

const CELL_WIDTH: usize = 12;
const MINI_CELL_WIDTH: usize = 2;
const YEAR_BAND: usize = 3;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
    week_numbers: bool,
    locale: Locale,
}

impl Renderer {
    pub fn new(cfg: &Config, locale: Locale) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => true,
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self {
            color,
            week_numbers: cfg.get_bool("calendar.week_numbers").unwrap_or(true),
            locale,
        })
    }

    #[must_use]
    pub fn plain(locale: Locale) -> Self {
        Self {
            color: false,
            week_numbers: true,
            locale,
        }
    }

    #[tracing::instrument(skip(self, view), fields(year = view.cursor.year, month = view.cursor.month))]
    pub fn print_month(&self, view: &MonthView<'_>) -> anyhow::Result<()> {
        let out = io::stdout().lock();
        self.write_month(out, view)
    }

    pub fn write_month<W: Write>(&self, mut out: W, view: &MonthView<'_>) -> anyhow::Result<()> {
        let gutter = if self.week_numbers { 4 } else { 0 };
        let total_width = gutter + DAYS_PER_WEEK * (CELL_WIDTH + 1);
        writeln!(out, "{}", center(&view.title, total_width))?;

        if self.week_numbers {
            write!(out, "{:>3} ", "wk")?;
        }
        for label in view.locale.weekday_labels() {
            write!(out, "{} ", fit(label, CELL_WIDTH))?;
        }
        writeln!(out)?;

        for (row, cells) in view.cells.chunks(DAYS_PER_WEEK).enumerate() {
            if self.week_numbers {
                let week = view
                    .week_numbers
                    .get(row)
                    .map(|week| week.to_string())
                    .unwrap_or_default();
                write!(out, "{:>3} ", week)?;
            }
            for cell in cells {
                write!(out, "{} ", self.day_heading(cell))?;
            }
            writeln!(out)?;

            let depth = cells.iter().map(|cell| cell.assignments.len()).max().unwrap_or(0);
            for level in 0..depth {
                if self.week_numbers {
                    write!(out, "{:>3} ", "")?;
                }
                for cell in cells {
                    let chip = cell
                        .assignments
                        .get(level)
                        .map(|assignment| self.chip(assignment))
                        .unwrap_or_else(|| " ".repeat(CELL_WIDTH));
                    write!(out, "{chip} ")?;
                }
                writeln!(out)?;
            }
        }

        Ok(())
    }

    #[tracing::instrument(skip(self, view))]
    pub fn print_agenda(&self, view: &MonthView<'_>) -> anyhow::Result<()> {
        let out = io::stdout().lock();
        self.write_agenda(out, view)
    }

    /// One row per (day, event) of the current month, in cell order.
    pub fn write_agenda<W: Write>(&self, mut out: W, view: &MonthView<'_>) -> anyhow::Result<()> {
        writeln!(out, "{}", view.title)?;

        let mut rows = Vec::new();
        for cell in &view.cells {
            if cell.slot.kind != CellKind::Current {
                continue;
            }
            let Some(date) = cell.date else {
                continue;
            };
            for (idx, assignment) in cell.assignments.iter().enumerate() {
                let day = if idx == 0 {
                    view.locale.format_day(date)
                } else {
                    String::new()
                };
                let day = if cell.is_today { self.paint(&day, "1") } else { day };
                let color = assignment.event.color();
                rows.push(vec![
                    day,
                    assignment.marker.as_str().to_string(),
                    self.paint(color.category_label(view.locale), color.presentation().ansi),
                    assignment.event.label().to_string(),
                ]);
            }
        }

        if rows.is_empty() {
            writeln!(out, "No events.")?;
            return Ok(());
        }

        let headers = vec![
            "Day".to_string(),
            "Span".to_string(),
            "Category".to_string(),
            "Event".to_string(),
        ];
        write_table(&mut out, headers, rows)
    }

    #[tracing::instrument(skip(self, grids, today), fields(months = grids.len()))]
    pub fn print_year(&self, grids: &[MonthGrid], today: NaiveDate) -> anyhow::Result<()> {
        let out = io::stdout().lock();
        self.write_year(out, grids, today)
    }

    /// Months side by side, three per band.
    pub fn write_year<W: Write>(
        &self,
        mut out: W,
        grids: &[MonthGrid],
        today: NaiveDate,
    ) -> anyhow::Result<()> {
        let block_width = DAYS_PER_WEEK * (MINI_CELL_WIDTH + 1);

        for band in grids.chunks(YEAR_BAND) {
            let blocks: Vec<Vec<String>> = band
                .iter()
                .map(|grid| self.mini_month(grid, today, block_width))
                .collect();
            let height = blocks.iter().map(Vec::len).max().unwrap_or(0);

            for line in 0..height {
                let joined = blocks
                    .iter()
                    .map(|block| {
                        block
                            .get(line)
                            .cloned()
                            .unwrap_or_else(|| " ".repeat(block_width))
                    })
                    .collect::<Vec<_>>()
                    .join("  ");
                writeln!(out, "{}", joined.trim_end())?;
            }
            writeln!(out)?;
        }

        Ok(())
    }

    pub fn print_legend(&self, filters: &FilterState) -> anyhow::Result<()> {
        let out = io::stdout().lock();
        self.write_legend(out, filters)
    }

    pub fn write_legend<W: Write>(&self, mut out: W, filters: &FilterState) -> anyhow::Result<()> {
        let headers = vec!["Tag".to_string(), "Category".to_string(), "Shown".to_string()];
        let rows = ColorTag::ALL
            .into_iter()
            .map(|tag| {
                vec![
                    self.paint(tag.as_key(), tag.presentation().ansi),
                    tag.category_label(self.locale).to_string(),
                    if filters.is_active(tag) { "yes" } else { "no" }.to_string(),
                ]
            })
            .collect();
        write_table(&mut out, headers, rows)
    }

    fn day_heading(&self, cell: &DayCell<'_>) -> String {
        let marker = if cell.is_today { "*" } else { "" };
        let text = fit(&format!("{marker}{}", cell.slot.day), CELL_WIDTH);
        if cell.is_today {
            self.paint(&text, "7")
        } else if cell.slot.kind != CellKind::Current {
            self.paint(&text, "2")
        } else if cell.slot.is_weekend() {
            self.paint(&text, "31")
        } else {
            text
        }
    }

    /// Continuation arrows mark days that are not the first or last of a span.
    fn chip(&self, assignment: &DayAssignment<'_>) -> String {
        let before = if assignment.marker.is_start { "" } else { "<" };
        let after = if assignment.marker.is_end { "" } else { ">" };
        let body_width = CELL_WIDTH - before.len() - after.len();
        let body = truncate(assignment.event.label(), body_width);
        let text = fit(&format!("{before}{body}{after}"), CELL_WIDTH);
        self.paint(&text, assignment.event.color().presentation().ansi)
    }

    fn mini_month(&self, grid: &MonthGrid, today: NaiveDate, width: usize) -> Vec<String> {
        let mut lines = Vec::with_capacity(grid.rows() + 2);
        lines.push(center(self.locale.month_name(grid.month), width));
        lines.push(
            self.locale
                .weekday_labels()
                .iter()
                .map(|label| fit(&truncate(label, MINI_CELL_WIDTH), MINI_CELL_WIDTH))
                .collect::<Vec<_>>()
                .join(" ")
                + " ",
        );

        for row in grid.cells().chunks(DAYS_PER_WEEK) {
            let line = row
                .iter()
                .map(|cell| {
                    if cell.kind != CellKind::Current {
                        return " ".repeat(MINI_CELL_WIDTH);
                    }
                    let text = format!("{:>2}", cell.day);
                    if cell.date() == Some(today) {
                        self.paint(&text, "7")
                    } else {
                        text
                    }
                })
                .collect::<Vec<_>>()
                .join(" ");
            lines.push(line + " ");
        }

        lines
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || !io::stdout().is_terminal() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for (header, width) in headers.iter().zip(&widths) {
        write!(writer, "{} ", fit(header, *width))?;
    }
    writeln!(writer)?;

    for width in &widths {
        write!(writer, "{:-<width$} ", "", width = *width)?;
    }
    writeln!(writer)?;

    for row in rows {
        for (cell, width) in row.iter().zip(&widths) {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = width.saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

/// Cuts `text` to at most `width` terminal columns.
fn truncate(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(ch);
    }
    out
}

/// Truncates, then pads with spaces to exactly `width` columns.
fn fit(text: &str, width: usize) -> String {
    let cut = truncate(text, width);
    let padding = width.saturating_sub(UnicodeWidthStr::width(cut.as_str()));
    format!("{cut}{}", " ".repeat(padding))
}

fn center(text: &str, width: usize) -> String {
    let len = UnicodeWidthStr::width(text);
    if len >= width {
        return text.to_string();
    }
    let left = (width - len) / 2;
    format!("{}{}", " ".repeat(left), fit(text, width - left))
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
