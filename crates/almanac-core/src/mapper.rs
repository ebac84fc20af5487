//! Event-to-cell mapping and per-row bar slicing.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, trace};

use crate::event::CalendarEvent;
use crate::filter::FilterState;
use crate::grid::{DAYS_PER_WEEK, MonthGrid};

/// Where a day sits inside an event's day span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanMarker {
    pub is_start: bool,
    pub is_middle: bool,
    pub is_end: bool,
}

impl SpanMarker {
    #[must_use]
    pub fn for_day(day: NaiveDate, span_start: NaiveDate, span_end: NaiveDate) -> Self {
        let is_start = day == span_start;
        let is_end = day == span_end;
        Self {
            is_start,
            is_middle: !is_start && !is_end,
            is_end,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match (self.is_start, self.is_end) {
            (true, true) => "single",
            (true, false) => "start",
            (false, true) => "end",
            (false, false) => "middle",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DayAssignment<'a> {
    /// Position of the event in the store; doubles as stacking order.
    pub event_index: usize,
    pub event: &'a CalendarEvent,
    pub marker: SpanMarker,
}

/// Assignments for every visible date of one grid.
#[derive(Debug, Clone, Default)]
pub struct GridAssignments<'a> {
    cells: BTreeMap<NaiveDate, Vec<DayAssignment<'a>>>,
}

impl<'a> GridAssignments<'a> {
    #[must_use]
    pub fn for_date(&self, date: NaiveDate) -> &[DayAssignment<'a>] {
        self.cells.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn dates(&self) -> usize {
        self.cells.len()
    }
}

/// Maps every admitted event onto the visible dates it touches.
///
/// Each visible date gets an entry, possibly empty. Within a date, events keep
/// store order. With no active category nothing is placed.
#[tracing::instrument(skip(grid, events, filters), fields(year = grid.year, month = grid.month, events = events.len()))]
pub fn map_events_to_grid<'a>(
    grid: &MonthGrid,
    events: &'a [CalendarEvent],
    filters: &FilterState,
) -> GridAssignments<'a> {
    let visible = grid.visible_dates();
    let mut cells: BTreeMap<NaiveDate, Vec<DayAssignment<'a>>> =
        visible.iter().map(|date| (*date, Vec::new())).collect();

    let (Some(&first), Some(&last)) = (visible.first(), visible.last()) else {
        debug!("grid has no representable dates");
        return GridAssignments { cells };
    };

    if filters.active_set().is_empty() {
        debug!("no active categories; placing nothing");
        return GridAssignments { cells };
    }

    for (event_index, event) in events.iter().enumerate() {
        if !filters.admits(event) {
            continue;
        }
        let (span_start, span_end) = event.day_span();
        if span_end < first || span_start > last {
            trace!(label = event.label(), "event outside visible range");
            continue;
        }

        let from = span_start.max(first);
        let to = span_end.min(last);
        for day in from.iter_days().take_while(|day| *day <= to) {
            if let Some(slot) = cells.get_mut(&day) {
                slot.push(DayAssignment {
                    event_index,
                    event,
                    marker: SpanMarker::for_day(day, span_start, span_end),
                });
            }
        }
    }

    let assignments = GridAssignments { cells };
    debug!(assignments = assignments.total(), "mapped events to grid");
    assignments
}

/// One continuous bar of an event inside a single grid row.
#[derive(Debug, Clone, Copy)]
pub struct EventSegment<'a> {
    pub row: usize,
    pub start_column: usize,
    pub end_column: usize,
    pub event_index: usize,
    pub event: &'a CalendarEvent,
    pub continues_before: bool,
    pub continues_after: bool,
}

impl EventSegment<'_> {
    #[must_use]
    pub fn width(&self) -> usize {
        self.end_column - self.start_column + 1
    }
}

/// Slices every admitted event into per-row bars, ordered by row and then
/// store order.
#[tracing::instrument(skip(grid, events, filters), fields(year = grid.year, month = grid.month))]
pub fn week_segments<'a>(
    grid: &MonthGrid,
    events: &'a [CalendarEvent],
    filters: &FilterState,
) -> Vec<EventSegment<'a>> {
    let visible = grid.visible_dates();
    let mut segments = Vec::new();

    for (row, week) in visible.chunks(DAYS_PER_WEEK).enumerate() {
        let (Some(&row_start), Some(&row_end)) = (week.first(), week.last()) else {
            continue;
        };

        for (event_index, event) in events.iter().enumerate() {
            if !filters.admits(event) {
                continue;
            }
            let (span_start, span_end) = event.day_span();
            if span_end < row_start || span_start > row_end {
                continue;
            }

            let bar_start = span_start.max(row_start);
            let bar_end = span_end.min(row_end);
            segments.push(EventSegment {
                row,
                start_column: (bar_start - row_start).num_days() as usize,
                end_column: (bar_end - row_start).num_days() as usize,
                event_index,
                event,
                continues_before: span_start < row_start,
                continues_after: span_end > row_end,
            });
        }
    }

    debug!(segments = segments.len(), "sliced week segments");
    segments
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;
    use crate::grid::build_month_grid;
    use crate::palette::ColorTag;

    fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, 0, 0))
            .expect("valid datetime")
    }

    fn day(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn event(
        start: NaiveDateTime,
        end: Option<NaiveDateTime>,
        label: &str,
        color: ColorTag,
    ) -> CalendarEvent {
        CalendarEvent::new(start, end, label, color).expect("valid event")
    }

    #[test]
    fn multi_day_event_marks_start_middle_end() {
        let grid = build_month_grid(2024, 0);
        let events = vec![event(at(2024, 1, 5, 10), Some(at(2024, 1, 7, 9)), "Offsite", ColorTag::Indigo)];
        let assignments = map_events_to_grid(&grid, &events, &FilterState::all_visible());

        assert_eq!(assignments.total(), 3);
        let fifth = assignments.for_date(day(2024, 1, 5));
        let sixth = assignments.for_date(day(2024, 1, 6));
        let seventh = assignments.for_date(day(2024, 1, 7));
        assert_eq!(fifth[0].marker, SpanMarker { is_start: true, is_middle: false, is_end: false });
        assert_eq!(sixth[0].marker, SpanMarker { is_start: false, is_middle: true, is_end: false });
        assert_eq!(seventh[0].marker, SpanMarker { is_start: false, is_middle: false, is_end: true });
        assert!(assignments.for_date(day(2024, 1, 8)).is_empty());
    }

    #[test]
    fn point_event_lands_on_one_day() {
        let grid = build_month_grid(2024, 0);
        let events = vec![event(at(2024, 1, 9, 13), None, "Pick up", ColorTag::Green)];
        let assignments = map_events_to_grid(&grid, &events, &FilterState::all_visible());

        assert_eq!(assignments.total(), 1);
        let cell = assignments.for_date(day(2024, 1, 9));
        assert_eq!(cell.len(), 1);
        assert!(cell[0].marker.is_start && cell[0].marker.is_end && !cell[0].marker.is_middle);
        assert_eq!(cell[0].marker.as_str(), "single");
    }

    #[test]
    fn same_day_event_is_single_day() {
        let grid = build_month_grid(2024, 0);
        let events = vec![event(at(2024, 1, 3, 9), Some(at(2024, 1, 3, 10)), "Review", ColorTag::Yellow)];
        let assignments = map_events_to_grid(&grid, &events, &FilterState::all_visible());
        assert_eq!(assignments.total(), 1);
    }

    #[test]
    fn cells_preserve_store_order() {
        let grid = build_month_grid(2024, 0);
        let events = vec![
            event(at(2024, 1, 9, 19), None, "Reservation", ColorTag::Indigo),
            event(at(2024, 1, 8, 10), Some(at(2024, 1, 10, 11)), "Workshop", ColorTag::Sky),
            event(at(2024, 1, 9, 8), None, "Breakfast", ColorTag::Green),
        ];
        let assignments = map_events_to_grid(&grid, &events, &FilterState::all_visible());
        let labels: Vec<&str> = assignments
            .for_date(day(2024, 1, 9))
            .iter()
            .map(|assignment| assignment.event.label())
            .collect();
        assert_eq!(labels, vec!["Reservation", "Workshop", "Breakfast"]);
    }

    #[test]
    fn toggling_a_category_removes_only_its_events() {
        let grid = build_month_grid(2024, 0);
        let events = vec![
            event(at(2024, 1, 9, 10), None, "Catch-up", ColorTag::Sky),
            event(at(2024, 1, 9, 11), None, "Semi-final", ColorTag::Red),
            event(at(2024, 1, 9, 12), None, "Stand-up", ColorTag::Sky),
            event(at(2024, 1, 10, 12), Some(at(2024, 1, 12, 12)), "Trip", ColorTag::Red),
        ];
        let mut filters = FilterState::all_visible();
        let before = map_events_to_grid(&grid, &events, &filters);
        filters.toggle(ColorTag::Red);
        let after = map_events_to_grid(&grid, &events, &filters);

        for (date, cell) in before.cells.iter() {
            let expected: Vec<usize> = cell
                .iter()
                .filter(|assignment| assignment.event.color() != ColorTag::Red)
                .map(|assignment| assignment.event_index)
                .collect();
            let actual: Vec<usize> = after
                .for_date(*date)
                .iter()
                .map(|assignment| assignment.event_index)
                .collect();
            assert_eq!(actual, expected, "{date}");
        }
        assert_eq!(after.total(), 2);
    }

    #[test]
    fn empty_filter_state_shows_nothing() {
        let grid = build_month_grid(2024, 0);
        let events = vec![event(at(2024, 1, 9, 10), None, "Catch-up", ColorTag::Sky)];
        let filters = FilterState::with_defaults(ColorTag::ALL.into_iter().map(|tag| (tag, false)));
        let assignments = map_events_to_grid(&grid, &events, &filters);
        assert_eq!(assignments.total(), 0);
        assert_eq!(assignments.dates(), 35);
    }

    #[test]
    fn events_outside_visible_range_contribute_nothing() {
        // January 2024 shows Dec 31 2023 through Feb 3 2024.
        let grid = build_month_grid(2024, 0);
        let events = vec![
            event(at(2023, 12, 30, 10), None, "Before", ColorTag::Sky),
            event(at(2024, 2, 4, 10), Some(at(2024, 2, 9, 10)), "After", ColorTag::Sky),
        ];
        let assignments = map_events_to_grid(&grid, &events, &FilterState::all_visible());
        assert_eq!(assignments.total(), 0);
    }

    #[test]
    fn adjacent_month_days_receive_events_and_spans_are_clipped() {
        let grid = build_month_grid(2024, 0);
        let events = vec![
            event(at(2023, 12, 12, 10), Some(at(2024, 1, 2, 11)), "Long haul", ColorTag::Sky),
            event(at(2024, 2, 2, 3), Some(at(2024, 2, 20, 7)), "Project", ColorTag::Yellow),
        ];
        let assignments = map_events_to_grid(&grid, &events, &FilterState::all_visible());

        let dec31 = assignments.for_date(day(2023, 12, 31));
        assert_eq!(dec31.len(), 1);
        assert!(dec31[0].marker.is_middle);
        assert!(assignments.for_date(day(2024, 1, 2))[0].marker.is_end);
        assert!(assignments.for_date(day(2024, 2, 2))[0].marker.is_start);
        assert!(assignments.for_date(day(2024, 2, 3))[0].marker.is_middle);
        assert_eq!(assignments.total(), 3 + 2);
    }

    #[test]
    fn unrepresentable_grid_yields_no_assignments() {
        let grid = build_month_grid(i64::MAX, 0);
        let events = vec![event(at(2024, 1, 9, 10), None, "Catch-up", ColorTag::Sky)];
        let assignments = map_events_to_grid(&grid, &events, &FilterState::all_visible());
        assert_eq!(assignments.total(), 0);
        assert!(week_segments(&grid, &events, &FilterState::all_visible()).is_empty());
    }

    #[test]
    fn segments_split_at_row_boundaries() {
        // Jan 2024 rows: Dec 31-Jan 6, Jan 7-13, ...
        let grid = build_month_grid(2024, 0);
        let events = vec![event(at(2024, 1, 5, 10), Some(at(2024, 1, 9, 10)), "Offsite", ColorTag::Indigo)];
        let segments = week_segments(&grid, &events, &FilterState::all_visible());

        assert_eq!(segments.len(), 2);
        assert_eq!((segments[0].row, segments[0].start_column, segments[0].end_column), (0, 5, 6));
        assert!(!segments[0].continues_before && segments[0].continues_after);
        assert_eq!((segments[1].row, segments[1].start_column, segments[1].end_column), (1, 0, 2));
        assert!(segments[1].continues_before && !segments[1].continues_after);
        assert_eq!(segments[1].width(), 3);
    }

    #[test]
    fn segments_order_by_row_then_store_order() {
        let grid = build_month_grid(2024, 0);
        let events = vec![
            event(at(2024, 1, 10, 10), None, "Second row", ColorTag::Sky),
            event(at(2024, 1, 2, 10), None, "First row", ColorTag::Red),
            event(at(2024, 1, 8, 10), None, "Second row too", ColorTag::Green),
        ];
        let segments = week_segments(&grid, &events, &FilterState::all_visible());
        let order: Vec<usize> = segments.iter().map(|segment| segment.event_index).collect();
        assert_eq!(order, vec![1, 0, 2]);
    }
}
