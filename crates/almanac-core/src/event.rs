use std::fs;
use std::path::Path;

use almanac_shared::EventRecord;
use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use tracing::{debug, info, warn};

use crate::datetime::parse_event_timestamp;
use crate::error::{CalendarError, Result};
use crate::palette::ColorTag;

/// A validated event. `start`/`end` are wall-clock times in the calendar
/// timezone. `end`, when present, is never before `start` as an instant; across
/// a fall-back hour its wall-clock value may read earlier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    start: NaiveDateTime,
    end: Option<NaiveDateTime>,
    label: String,
    color: ColorTag,
}

impl CalendarEvent {
    /// Builds an event from calendar-local times.
    pub fn new(
        start: NaiveDateTime,
        end: Option<NaiveDateTime>,
        label: impl Into<String>,
        color: ColorTag,
    ) -> Result<Self> {
        let label = label.into();
        if let Some(end) = end
            && end < start
        {
            return Err(CalendarError::InvalidInterval { label, start, end });
        }
        Self::checked(start, end, label, color)
    }

    /// Orders `start`/`end` by the instants they name before keeping their
    /// wall-clock projection.
    pub fn from_record(record: &EventRecord, tz: Tz) -> Result<Self> {
        let start = parse_event_timestamp(&record.start, "start", tz)?;
        let end = record
            .end
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| parse_event_timestamp(raw, "end", tz))
            .transpose()?;
        let color = record.color.parse::<ColorTag>()?;
        let label = record.label.trim().to_string();

        if let Some(end) = end
            && end.precedes(&start)
        {
            return Err(CalendarError::InvalidInterval {
                label,
                start: start.wall,
                end: end.wall,
            });
        }
        Self::checked(start.wall, end.map(|end| end.wall), label, color)
    }

    fn checked(
        start: NaiveDateTime,
        end: Option<NaiveDateTime>,
        label: String,
        color: ColorTag,
    ) -> Result<Self> {
        if label.trim().is_empty() {
            return Err(CalendarError::EmptyLabel);
        }
        Ok(Self {
            start,
            end,
            label,
            color,
        })
    }

    #[must_use]
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> Option<NaiveDateTime> {
        self.end
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn color(&self) -> ColorTag {
        self.color
    }

    #[must_use]
    pub fn is_point(&self) -> bool {
        self.end.is_none()
    }

    /// First and last calendar day the event touches.
    #[must_use]
    pub fn day_span(&self) -> (NaiveDate, NaiveDate) {
        let first = self.start.date();
        let last = self.end.map_or(first, |end| end.date().max(first));
        (first, last)
    }
}

/// A record that failed validation, with the reason.
#[derive(Debug, Clone)]
pub struct Rejected {
    pub record: EventRecord,
    pub error: CalendarError,
}

/// Insertion-ordered, read-only-after-load collection of events.
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    events: Vec<CalendarEvent>,
}

impl EventStore {
    #[must_use]
    pub fn new(events: Vec<CalendarEvent>) -> Self {
        Self { events }
    }

    /// Validates every record in order; valid ones are kept, the rest are
    /// returned alongside the store.
    #[tracing::instrument(skip(records), fields(records = records.len()))]
    pub fn ingest(records: Vec<EventRecord>, tz: Tz) -> (Self, Vec<Rejected>) {
        let mut events = Vec::with_capacity(records.len());
        let mut rejected = Vec::new();

        for record in records {
            match CalendarEvent::from_record(&record, tz) {
                Ok(event) => events.push(event),
                Err(error) => {
                    warn!(label = %record.label, error = %error, "rejected event");
                    rejected.push(Rejected { record, error });
                }
            }
        }

        info!(accepted = events.len(), rejected = rejected.len(), "ingested events");
        (Self { events }, rejected)
    }

    #[must_use]
    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Reads event records from a JSON array or a JSON-lines file.
#[tracing::instrument(skip(path), fields(file = %path.display()))]
pub fn load_event_file(path: &Path) -> anyhow::Result<Vec<EventRecord>> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(vec![]);
    }

    if trimmed.starts_with('[') {
        let records: Vec<EventRecord> = serde_json::from_str(trimmed)
            .with_context(|| format!("failed parsing {} as a JSON array", path.display()))?;
        debug!(count = records.len(), "loaded events from json array");
        return Ok(records);
    }

    let mut out = Vec::new();
    for (idx, line) in trimmed.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let record: EventRecord = serde_json::from_str(line)
            .with_context(|| format!("failed parsing {} line {}", path.display(), idx + 1))?;
        out.push(record);
    }

    debug!(count = out.len(), "loaded events from jsonl");
    Ok(out)
}
