//! Validation errors raised while turning raw records into calendar events.

use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("event '{label}' ends ({end}) before it starts ({start})")]
    InvalidInterval {
        label: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("unknown color tag: {0}")]
    UnknownColorTag(String),

    #[error("invalid {field} timestamp: {value}")]
    InvalidTimestamp { field: &'static str, value: String },

    #[error("event label cannot be empty")]
    EmptyLabel,
}

pub type Result<T> = std::result::Result<T, CalendarError>;
