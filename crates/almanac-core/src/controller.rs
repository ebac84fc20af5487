use almanac_shared::{CellKindDto, ChipDto, DayCellDto, MonthViewDto, SegmentDto};
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::cursor::{DateCursor, MonthCursor};
use crate::event::EventStore;
use crate::filter::FilterState;
use crate::grid::{CellKind, GridCell, MonthGrid, build_month_grid};
use crate::locale::Locale;
use crate::mapper::{DayAssignment, EventSegment, map_events_to_grid, week_segments};
use crate::palette::ColorTag;

/// Everything the renderer needs for one month.
#[derive(Debug, Clone)]
pub struct MonthView<'a> {
    pub cursor: DateCursor,
    pub title: String,
    pub grid: MonthGrid,
    pub week_numbers: Vec<u32>,
    pub cells: Vec<DayCell<'a>>,
    pub segments: Vec<EventSegment<'a>>,
    pub active_filters: Vec<ColorTag>,
    pub locale: Locale,
}

#[derive(Debug, Clone)]
pub struct DayCell<'a> {
    pub slot: GridCell,
    /// `None` only outside chrono's date range.
    pub date: Option<NaiveDate>,
    pub is_today: bool,
    pub is_past: bool,
    pub assignments: Vec<DayAssignment<'a>>,
}

/// Single owner of the calendar page state.
pub struct CalendarController {
    cursor: MonthCursor,
    filters: FilterState,
    store: EventStore,
    clock: Box<dyn Clock>,
    locale: Locale,
    /// Grid of the most recently viewed month.
    grid_cache: Option<(DateCursor, MonthGrid)>,
}

impl CalendarController {
    /// Starts on the clock's current month.
    pub fn new(store: EventStore, filters: FilterState, clock: Box<dyn Clock>) -> Self {
        let cursor = MonthCursor::from_clock(clock.as_ref());
        info!(
            year = cursor.current().year,
            month = cursor.current().month,
            events = store.len(),
            "calendar controller ready"
        );
        Self {
            cursor,
            filters,
            store,
            clock,
            locale: Locale::default(),
            grid_cache: None,
        }
    }

    #[must_use]
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    #[must_use]
    pub fn current(&self) -> DateCursor {
        self.cursor.current()
    }

    #[must_use]
    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    #[must_use]
    pub fn locale(&self) -> Locale {
        self.locale
    }

    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn next(&mut self) {
        self.cursor.next();
    }

    pub fn previous(&mut self) {
        self.cursor.previous();
    }

    pub fn go_to(&mut self, year: i32, month: i64) {
        self.cursor.go_to(year, month);
    }

    pub fn jump_to_today(&mut self) {
        self.cursor.jump_to_today(self.clock.as_ref());
    }

    pub fn toggle(&mut self, category: ColorTag) -> bool {
        self.filters.toggle(category)
    }

    /// Grid for the current month; rebuilt only when the month changes.
    pub fn grid(&mut self) -> MonthGrid {
        let cursor = self.cursor.current();
        if let Some((cached, grid)) = &self.grid_cache
            && *cached == cursor
        {
            return grid.clone();
        }

        debug!(year = cursor.year, month = cursor.month, "building month grid");
        let grid = build_month_grid(i64::from(cursor.year), i64::from(cursor.month));
        self.grid_cache = Some((cursor, grid.clone()));
        grid
    }

    #[tracing::instrument(skip(self))]
    pub fn view(&mut self) -> MonthView<'_> {
        let cursor = self.cursor.current();
        let grid = self.grid();
        let today = self.clock.today();
        let events = self.store.events();

        let assignments = map_events_to_grid(&grid, events, &self.filters);
        let segments = week_segments(&grid, events, &self.filters);

        let cells = grid
            .cells()
            .into_iter()
            .map(|slot| {
                let date = slot.date();
                DayCell {
                    slot,
                    date,
                    is_today: date == Some(today),
                    is_past: date.is_some_and(|date| date < today),
                    assignments: date
                        .map(|date| assignments.for_date(date).to_vec())
                        .unwrap_or_default(),
                }
            })
            .collect();

        MonthView {
            cursor,
            title: self.locale.month_title(grid.year, grid.month),
            week_numbers: grid.week_numbers(),
            grid,
            cells,
            segments,
            active_filters: self.filters.active_set().into_iter().collect(),
            locale: self.locale,
        }
    }
}

impl MonthView<'_> {
    #[must_use]
    pub fn to_dto(&self) -> MonthViewDto {
        let cells = self
            .cells
            .iter()
            .map(|cell| DayCellDto {
                date: cell.date.map(|date| date.format("%Y-%m-%d").to_string()).unwrap_or_default(),
                day: cell.slot.day,
                row: cell.slot.row,
                column: cell.slot.column,
                kind: match cell.slot.kind {
                    CellKind::Leading => CellKindDto::Leading,
                    CellKind::Current => CellKindDto::Current,
                    CellKind::Trailing => CellKindDto::Trailing,
                },
                is_today: cell.is_today,
                is_past: cell.is_past,
                is_weekend: cell.slot.is_weekend(),
                chips: cell
                    .assignments
                    .iter()
                    .map(|assignment| ChipDto {
                        label: assignment.event.label().to_string(),
                        color: assignment.event.color().as_key().to_string(),
                        css_class: assignment.event.color().presentation().chip_class.to_string(),
                        is_start: assignment.marker.is_start,
                        is_middle: assignment.marker.is_middle,
                        is_end: assignment.marker.is_end,
                    })
                    .collect(),
            })
            .collect();

        let segments = self
            .segments
            .iter()
            .map(|segment| SegmentDto {
                row: segment.row,
                start_column: segment.start_column,
                end_column: segment.end_column,
                label: segment.event.label().to_string(),
                color: segment.event.color().as_key().to_string(),
                continues_before: segment.continues_before,
                continues_after: segment.continues_after,
            })
            .collect();

        MonthViewDto {
            year: self.cursor.year,
            month: self.cursor.month,
            title: self.title.clone(),
            weekday_labels: self.locale.weekday_labels().iter().map(|label| label.to_string()).collect(),
            leading_blank_count: self.grid.leading_blank_count,
            trailing_blank_count: self.grid.trailing_blank_count,
            month_day_numbers: self.grid.month_day_numbers.clone(),
            week_numbers: self.week_numbers.clone(),
            active_filters: self.active_filters.iter().map(|tag| tag.as_key().to_string()).collect(),
            cells,
            segments,
        }
    }
}
