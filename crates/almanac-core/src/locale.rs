use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Ko,
}

const MONTHS_EN: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const MONTHS_KO: [&str; 12] = [
    "1월", "2월", "3월", "4월", "5월", "6월", "7월", "8월", "9월", "10월", "11월", "12월",
];

const WEEKDAYS_EN: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

const WEEKDAYS_KO: [&str; 7] = ["일", "월", "화", "수", "목", "금", "토"];

impl Locale {
    #[must_use]
    pub fn from_key(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "english" => Some(Locale::En),
            "ko" | "ko-kr" | "korean" => Some(Locale::Ko),
            _ => None,
        }
    }

    /// `month` is zero-based.
    #[must_use]
    pub fn month_name(self, month: u32) -> &'static str {
        let idx = month as usize % 12;
        match self {
            Locale::En => MONTHS_EN[idx],
            Locale::Ko => MONTHS_KO[idx],
        }
    }

    /// Sunday first, matching the grid columns.
    #[must_use]
    pub fn weekday_labels(self) -> [&'static str; 7] {
        match self {
            Locale::En => WEEKDAYS_EN,
            Locale::Ko => WEEKDAYS_KO,
        }
    }

    #[must_use]
    pub fn month_title(self, year: i64, month: u32) -> String {
        match self {
            Locale::En => format!("{} {year}", self.month_name(month)),
            Locale::Ko => format!("{year}년 {}", self.month_name(month)),
        }
    }

    #[must_use]
    pub fn format_day(self, date: NaiveDate) -> String {
        match self {
            Locale::En => date.format("%a %Y-%m-%d").to_string(),
            Locale::Ko => {
                let weekday = WEEKDAYS_KO[date.weekday().num_days_from_sunday() as usize];
                format!("{} ({weekday})", date.format("%Y-%m-%d"))
            }
        }
    }
}
