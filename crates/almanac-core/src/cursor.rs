use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::clock::Clock;
use crate::grid::normalize_month;

/// The displayed `(year, month)`; `month` is zero-based and always in `0..=11`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateCursor {
    pub year: i32,
    pub month: u32,
}

impl DateCursor {
    /// Normalizes `month` into `0..=11`, carrying into `year`. Targets past the
    /// `i32` year range clamp to the first or last representable month.
    #[must_use]
    pub fn new(year: i32, month: i64) -> Self {
        let (year, month) = normalize_month(i64::from(year), month);
        match i32::try_from(year) {
            Ok(year) => Self { year, month },
            Err(_) if year > 0 => Self {
                year: i32::MAX,
                month: 11,
            },
            Err(_) => Self {
                year: i32::MIN,
                month: 0,
            },
        }
    }

    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month0(),
        }
    }

    /// Moves by `months`; a move that would leave the `i32` year range
    /// keeps the cursor where it is.
    #[must_use]
    pub fn offset(self, months: i64) -> Self {
        let (year, month) =
            normalize_month(i64::from(self.year), i64::from(self.month).saturating_add(months));
        match i32::try_from(year) {
            Ok(year) => Self { year, month },
            Err(_) => self,
        }
    }
}

/// Navigation state of the calendar page.
#[derive(Debug, Clone)]
pub struct MonthCursor {
    current: DateCursor,
}

impl MonthCursor {
    #[must_use]
    pub fn new(start: DateCursor) -> Self {
        Self { current: start }
    }

    pub fn from_clock(clock: &dyn Clock) -> Self {
        Self::new(DateCursor::containing(clock.today()))
    }

    #[must_use]
    pub fn current(&self) -> DateCursor {
        self.current
    }

    pub fn next(&mut self) {
        self.current = self.current.offset(1);
        debug!(year = self.current.year, month = self.current.month, "cursor next");
    }

    pub fn previous(&mut self) {
        self.current = self.current.offset(-1);
        debug!(year = self.current.year, month = self.current.month, "cursor previous");
    }

    pub fn go_to(&mut self, year: i32, month: i64) {
        self.current = DateCursor::new(year, month);
        debug!(year = self.current.year, month = self.current.month, "cursor go_to");
    }

    pub fn jump_to_today(&mut self, clock: &dyn Clock) {
        self.current = DateCursor::containing(clock.today());
        debug!(year = self.current.year, month = self.current.month, "cursor today");
    }
}
