//! Month matrix builder.
//!
//! All arithmetic here is proleptic Gregorian on plain integers, so a grid can
//! be built for any `(year, month)` pair without touching a timezone or a
//! date library range limit. Weeks start on Sunday (column 0).

use chrono::NaiveDate;

pub const DAYS_PER_WEEK: usize = 7;

const DAYS_BEFORE_WEEKDAY_TABLE: [i64; 12] = [0, 3, 2, 5, 0, 3, 5, 1, 4, 6, 2, 4];

/// Folds an arbitrary month offset into `(year, 0..=11)`.
#[must_use]
pub fn normalize_month(year: i64, month: i64) -> (i64, u32) {
    let year = year.saturating_add(month.div_euclid(12));
    (year, month.rem_euclid(12) as u32)
}

#[must_use]
pub fn is_leap_year(year: i64) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Day count for a normalized zero-based month.
#[must_use]
pub fn days_in_month(year: i64, month: u32) -> u32 {
    match month {
        1 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        3 | 5 | 8 | 10 => 30,
        _ => 31,
    }
}

/// Day of week for a calendar date, `0 = Sunday .. 6 = Saturday`.
#[must_use]
pub fn weekday_of(year: i64, month: u32, day: u32) -> u32 {
    // 146_097 days per 400-year cycle is a whole number of weeks.
    let mut y = 2000 + year.rem_euclid(400);
    let m = month as usize % 12;
    if m < 2 {
        y -= 1;
    }
    let idx = y + y / 4 - y / 100 + y / 400 + DAYS_BEFORE_WEEKDAY_TABLE[m] + i64::from(day);
    idx.rem_euclid(7) as u32
}

fn day_of_year0(year: i64, month: u32, day: u32) -> u32 {
    (0..month).map(|m| days_in_month(year, m)).sum::<u32>() + day.saturating_sub(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Leading,
    Current,
    Trailing,
}

/// One rendered slot of the grid, in row-major order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub year: i64,
    pub month: u32,
    pub day: u32,
    pub row: usize,
    pub column: usize,
    pub kind: CellKind,
}

impl GridCell {
    /// `None` only for years chrono cannot represent.
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        let year = i32::try_from(self.year).ok()?;
        NaiveDate::from_ymd_opt(year, self.month + 1, self.day)
    }

    #[must_use]
    pub fn is_weekend(&self) -> bool {
        self.column == 0 || self.column == DAYS_PER_WEEK - 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub year: i64,
    pub month: u32,
    pub leading_blank_count: usize,
    pub month_day_numbers: Vec<u32>,
    pub trailing_blank_count: usize,
}

/// Builds the grid for `(year, month)`; `month` is zero-based and is
/// normalized first, so `(2024, -1)` yields December 2023.
#[tracing::instrument(level = "trace")]
#[must_use]
pub fn build_month_grid(year: i64, month: i64) -> MonthGrid {
    let (year, month) = normalize_month(year, month);
    let day_count = days_in_month(year, month);

    let starting_weekday = weekday_of(year, month, 1);
    let ending_weekday = weekday_of(year, month, day_count);
    let trailing_blank_count = if ending_weekday < 6 {
        (6 - ending_weekday) as usize
    } else {
        0
    };

    MonthGrid {
        year,
        month,
        leading_blank_count: starting_weekday as usize,
        month_day_numbers: (1..=day_count).collect(),
        trailing_blank_count,
    }
}

/// The twelve grids of one year, January first.
#[must_use]
pub fn year_overview(year: i64) -> Vec<MonthGrid> {
    (0..12).map(|month| build_month_grid(year, month)).collect()
}

impl MonthGrid {
    #[must_use]
    pub fn days_in_month(&self) -> u32 {
        self.month_day_numbers.len() as u32
    }

    #[must_use]
    pub fn total_slots(&self) -> usize {
        self.leading_blank_count + self.month_day_numbers.len() + self.trailing_blank_count
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.total_slots().div_ceil(DAYS_PER_WEEK)
    }

    #[must_use]
    pub fn previous_month(&self) -> (i64, u32) {
        normalize_month(self.year, i64::from(self.month) - 1)
    }

    #[must_use]
    pub fn next_month(&self) -> (i64, u32) {
        normalize_month(self.year, i64::from(self.month) + 1)
    }

    /// Day numbers of the previous month shown before day 1.
    #[must_use]
    pub fn leading_day_numbers(&self) -> Vec<u32> {
        let (year, month) = self.previous_month();
        let prev_days = days_in_month(year, month);
        let first = prev_days + 1 - self.leading_blank_count as u32;
        (first..=prev_days).collect()
    }

    #[must_use]
    pub fn trailing_day_numbers(&self) -> Vec<u32> {
        (1..=self.trailing_blank_count as u32).collect()
    }

    /// Every slot with its concrete calendar date, Sunday to Saturday per row.
    #[must_use]
    pub fn cells(&self) -> Vec<GridCell> {
        let (prev_year, prev_month) = self.previous_month();
        let (next_year, next_month) = self.next_month();

        let leading = self
            .leading_day_numbers()
            .into_iter()
            .map(|day| (prev_year, prev_month, day, CellKind::Leading));
        let current = self
            .month_day_numbers
            .iter()
            .map(|&day| (self.year, self.month, day, CellKind::Current));
        let trailing = self
            .trailing_day_numbers()
            .into_iter()
            .map(|day| (next_year, next_month, day, CellKind::Trailing));

        leading
            .chain(current)
            .chain(trailing)
            .enumerate()
            .map(|(slot, (year, month, day, kind))| GridCell {
                year,
                month,
                day,
                row: slot / DAYS_PER_WEEK,
                column: slot % DAYS_PER_WEEK,
                kind,
            })
            .collect()
    }

    /// Visible concrete dates in row-major order. Empty when the grid lies
    /// outside the range chrono can represent.
    #[must_use]
    pub fn visible_dates(&self) -> Vec<NaiveDate> {
        let dates: Option<Vec<NaiveDate>> = self.cells().iter().map(GridCell::date).collect();
        dates.unwrap_or_default()
    }

    /// Thursday-based week number of every row: a Sunday-first row belongs to
    /// the year of its Thursday and is counted from the row holding that
    /// year's first Thursday.
    #[must_use]
    pub fn week_numbers(&self) -> Vec<u32> {
        self.cells()
            .chunks(DAYS_PER_WEEK)
            .filter_map(|row| row.get(4))
            .map(|thursday| day_of_year0(thursday.year, thursday.month, thursday.day) / 7 + 1)
            .collect()
    }
}
