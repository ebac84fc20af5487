use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use chrono::{
  DateTime,
  NaiveDate,
  NaiveDateTime,
  TimeZone,
  Utc
};
use chrono_tz::Tz;
use regex::Regex;
use serde::Deserialize;

use crate::cursor::DateCursor;
use crate::error::CalendarError;

const TIMEZONE_CONFIG_FILE: &str =
  "almanac-time.toml";
const TIMEZONE_ENV_VAR: &str =
  "ALMANAC_TIMEZONE";
const TIMEZONE_CONFIG_ENV_VAR: &str =
  "ALMANAC_TIME_CONFIG";
const DEFAULT_CALENDAR_TIMEZONE: &str =
  "UTC";

#[derive(Debug, Deserialize)]
struct TimezoneConfig {
  timezone: Option<String>,
  time:     Option<TimezoneSection>
}

#[derive(Debug, Deserialize)]
struct TimezoneSection {
  timezone: Option<String>
}

/// Picks the timezone in which instants become calendar days: the rc value,
/// then `ALMANAC_TIMEZONE`, then `almanac-time.toml`, then UTC.
#[tracing::instrument]
pub fn resolve_calendar_timezone(
  configured: Option<&str>
) -> Tz {
  if let Some(raw) = configured
    && let Some(tz) =
      parse_timezone(raw, "rc")
  {
    return tz;
  }

  if let Ok(raw) =
    std::env::var(TIMEZONE_ENV_VAR)
    && let Some(tz) = parse_timezone(
      &raw,
      TIMEZONE_ENV_VAR
    )
  {
    return tz;
  }

  if let Some(path) =
    timezone_config_path()
    && let Some(tz) =
      load_timezone_from_file(&path)
  {
    return tz;
  }

  parse_timezone(
    DEFAULT_CALENDAR_TIMEZONE,
    "DEFAULT_CALENDAR_TIMEZONE"
  )
  .unwrap_or(chrono_tz::UTC)
}

fn timezone_config_path()
-> Option<PathBuf> {
  if let Ok(raw) = std::env::var(
    TIMEZONE_CONFIG_ENV_VAR
  ) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
      return Some(PathBuf::from(
        trimmed
      ));
    }
  }

  std::env::current_dir().ok().map(
    |dir| {
      dir.join(TIMEZONE_CONFIG_FILE)
    }
  )
}

pub(crate) fn load_timezone_from_file(
  path: &Path
) -> Option<Tz> {
  if !path.exists() {
    tracing::debug!(
      file = %path.display(),
      "timezone config file not found"
    );
    return None;
  }

  let raw = match fs::read_to_string(
    path
  ) {
    | Ok(raw) => raw,
    | Err(err) => {
      tracing::error!(
        file = %path.display(),
        error = %err,
        "failed reading timezone config file"
      );
      return None;
    }
  };

  let parsed = match toml::from_str::<
    TimezoneConfig
  >(&raw)
  {
    | Ok(parsed) => parsed,
    | Err(err) => {
      tracing::error!(
        file = %path.display(),
        error = %err,
        "failed parsing timezone config file"
      );
      return None;
    }
  };

  let timezone =
    parsed.timezone.or_else(|| {
      parsed.time.and_then(|section| {
        section.timezone
      })
    });
  let Some(timezone) = timezone else {
    tracing::warn!(
      file = %path.display(),
      "timezone config had no timezone field"
    );
    return None;
  };

  parse_timezone(
    timezone.as_str(),
    &format!("file:{}", path.display())
  )
}

fn parse_timezone(
  raw: &str,
  source: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    tracing::warn!(
      source,
      "timezone source was empty"
    );
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => {
      tracing::debug!(
        source,
        timezone = %trimmed,
        "configured calendar timezone"
      );
      Some(tz)
    }
    | Err(err) => {
      tracing::error!(
        source,
        timezone = %trimmed,
        error = %err,
        "failed to parse timezone id"
      );
      None
    }
  }
}

/// A parsed event timestamp: wall-clock time in the calendar timezone plus
/// the instant it names, when that instant is unambiguous.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub struct EventTimestamp {
  pub wall:    NaiveDateTime,
  pub instant: Option<DateTime<Utc>>
}

impl EventTimestamp {
  fn zoned(
    instant: DateTime<Utc>,
    tz: Tz
  ) -> Self {
    Self {
      wall: instant
        .with_timezone(&tz)
        .naive_local(),
      instant: Some(instant)
    }
  }

  /// Naive input is calendar-local. The repeated hour of a fall-back
  /// resolves to its first occurrence; a spring-forward gap has no instant.
  fn local(
    wall: NaiveDateTime,
    tz: Tz
  ) -> Self {
    Self {
      wall,
      instant: tz
        .from_local_datetime(&wall)
        .earliest()
        .map(|dt| {
          dt.with_timezone(&Utc)
        })
    }
  }

  /// Whether `self` is strictly before `other`: by instant when both
  /// are known, by wall clock otherwise.
  #[must_use]
  pub fn precedes(
    &self,
    other: &Self
  ) -> bool {
    match (self.instant, other.instant)
    {
      | (Some(a), Some(b)) => a < b,
      | _ => self.wall < other.wall
    }
  }
}

/// Parses an event timestamp against the calendar timezone `tz`.
///
/// Zoned inputs (RFC3339, `YYYYMMDDTHHMMSSZ`) are converted; naive inputs are
/// taken to already be calendar-local. A bare date means local midnight.
pub fn parse_event_timestamp(
  raw: &str,
  field: &'static str,
  tz: Tz
) -> Result<EventTimestamp, CalendarError>
{
  let token = raw.trim();

  if let Ok(dt) =
    DateTime::parse_from_rfc3339(token)
  {
    return Ok(EventTimestamp::zoned(
      dt.with_timezone(&Utc),
      tz
    ));
  }

  if let Ok(ndt) =
    NaiveDateTime::parse_from_str(
      token,
      "%Y%m%dT%H%M%SZ"
    )
  {
    return Ok(EventTimestamp::zoned(
      DateTime::<Utc>::from_naive_utc_and_offset(ndt, Utc),
      tz
    ));
  }

  for fmt in [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M"
  ] {
    if let Ok(ndt) =
      NaiveDateTime::parse_from_str(
        token, fmt
      )
    {
      return Ok(EventTimestamp::local(
        ndt, tz
      ));
    }
  }

  NaiveDate::parse_from_str(
    token, "%Y-%m-%d"
  )
  .ok()
  .and_then(|date| {
    date.and_hms_opt(0, 0, 0)
  })
  .map(|ndt| {
    EventTimestamp::local(ndt, tz)
  })
  .ok_or_else(|| {
    CalendarError::InvalidTimestamp {
      field,
      value: token.to_string()
    }
  })
}

/// Parses a `--today` style day: `YYYY-MM-DD`.
pub fn parse_day(
  input: &str
) -> anyhow::Result<NaiveDate> {
  NaiveDate::parse_from_str(
    input.trim(),
    "%Y-%m-%d"
  )
  .with_context(|| {
    format!(
      "expected YYYY-MM-DD, got: \
       {input}"
    )
  })
}

/// Resolves a month selector relative to `current`.
///
/// Accepts `today`/`now`, `+N`/`-N` month offsets, `YYYY-MM`, and month names
/// (`march`, `mar`) which pick that month of the current year.
#[tracing::instrument(skip(current, today), fields(input = input))]
pub fn parse_month_expr(
  input: &str,
  current: DateCursor,
  today: NaiveDate
) -> anyhow::Result<DateCursor> {
  let token = input.trim();
  let lower =
    token.to_ascii_lowercase();

  match lower.as_str() {
    | "today" | "now" => {
      return Ok(
        DateCursor::containing(today)
      );
    }
    | "next" => {
      return Ok(current.offset(1));
    }
    | "prev" | "previous" => {
      return Ok(current.offset(-1));
    }
    | _ => {}
  }

  if let Some(month) =
    parse_month_name(&lower)
  {
    return Ok(DateCursor::new(
      current.year,
      i64::from(month) - 1
    ));
  }

  let rel_re = Regex::new(
    r"^(?P<sign>[+-])(?P<num>\d+)$"
  )
  .map_err(|e| {
    anyhow!(
      "internal regex compile \
       failure: {e}"
    )
  })?;

  if let Some(caps) =
    rel_re.captures(token)
  {
    let num: i64 = caps
      .name("num")
      .map(|m| m.as_str())
      .ok_or_else(|| {
        anyhow!(
          "missing relative amount"
        )
      })?
      .parse()
      .context(
        "invalid relative number"
      )?;
    let sign = caps
      .name("sign")
      .map(|m| m.as_str())
      .ok_or_else(|| {
        anyhow!("missing relative sign")
      })?;
    return Ok(current.offset(
      if sign == "-" {
        -num
      } else {
        num
      }
    ));
  }

  let ym_re = Regex::new(
    r"^(?P<year>-?\d{1,6})-(?P<month>\d{1,2})$"
  )
  .map_err(|e| {
    anyhow!(
      "internal regex compile \
       failure: {e}"
    )
  })?;

  if let Some(caps) =
    ym_re.captures(token)
  {
    let year: i32 = caps
      .name("year")
      .map(|m| m.as_str())
      .unwrap_or_default()
      .parse()
      .context("invalid year")?;
    let month: u32 = caps
      .name("month")
      .map(|m| m.as_str())
      .unwrap_or_default()
      .parse()
      .context("invalid month")?;
    if !(1..=12).contains(&month) {
      return Err(anyhow!(
        "month out of range (1-12): \
         {month}"
      ));
    }
    return Ok(DateCursor::new(
      year,
      i64::from(month) - 1
    ));
  }

  Err(anyhow!(
    "unrecognized month expression: \
     {input}"
  ))
  .with_context(|| {
    "supported formats: today/now, \
     next/prev, +N/-N months, \
     YYYY-MM, month names (e.g. \
     march)"
  })
}

fn parse_month_name(
  token: &str
) -> Option<u32> {
  match token.trim() {
    | "january" | "jan" => Some(1),
    | "february" | "feb" => Some(2),
    | "march" | "mar" => Some(3),
    | "april" | "apr" => Some(4),
    | "may" => Some(5),
    | "june" | "jun" => Some(6),
    | "july" | "jul" => Some(7),
    | "august" | "aug" => Some(8),
    | "september" | "sep" | "sept" => {
      Some(9)
    }
    | "october" | "oct" => Some(10),
    | "november" | "nov" => Some(11),
    | "december" | "dec" => Some(12),
    | _ => None
  }
}

#[cfg(test)]
mod tests {
  use chrono::{
    NaiveDate,
    Timelike
  };

  use super::*;

  fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19)
      .expect("valid today")
  }

  #[test]
  fn rfc3339_is_projected_into_timezone()
  {
    let tz: Tz = "Asia/Seoul"
      .parse()
      .expect("valid tz");
    let parsed = parse_event_timestamp(
      "2024-01-05T20:00:00Z",
      "start",
      tz
    )
    .expect("parse rfc3339")
    .wall;
    assert_eq!(
      parsed.date(),
      NaiveDate::from_ymd_opt(2024, 1, 6)
        .expect("valid date")
    );
    assert_eq!(parsed.hour(), 5);
  }

  #[test]
  fn naive_timestamps_are_calendar_local()
  {
    let parsed = parse_event_timestamp(
      "2024-01-05 10:30",
      "start",
      chrono_tz::America::New_York
    )
    .expect("parse naive")
    .wall;
    assert_eq!(parsed.hour(), 10);
    assert_eq!(parsed.minute(), 30);
  }

  #[test]
  fn bare_date_means_midnight() {
    let parsed = parse_event_timestamp(
      "2024-02-29",
      "end",
      chrono_tz::UTC
    )
    .expect("parse date")
    .wall;
    assert_eq!(parsed.hour(), 0);
  }

  #[test]
  fn garbage_timestamp_is_rejected() {
    let err = parse_event_timestamp(
      "next tuesday",
      "start",
      chrono_tz::UTC
    )
    .expect_err("should fail");
    assert_eq!(
      err,
      CalendarError::InvalidTimestamp {
        field: "start",
        value: "next tuesday"
          .to_string()
      }
    );
  }

  #[test]
  fn fall_back_hour_orders_by_instant()
  {
    let tz = chrono_tz::America::New_York;
    let first = parse_event_timestamp(
      "2024-11-03T01:50:00-04:00",
      "start",
      tz
    )
    .expect("parse edt");
    let second = parse_event_timestamp(
      "2024-11-03T01:10:00-05:00",
      "end",
      tz
    )
    .expect("parse est");

    assert!(second.wall < first.wall);
    assert!(first.precedes(&second));
    assert!(!second.precedes(&first));
  }

  #[test]
  fn spring_forward_gap_has_no_instant()
  {
    let parsed = parse_event_timestamp(
      "2024-03-10 02:30",
      "start",
      chrono_tz::America::New_York
    )
    .expect("parse gap");
    assert_eq!(parsed.instant, None);
    assert_eq!(parsed.wall.hour(), 2);
  }

  #[test]
  fn month_expressions_resolve() {
    let current =
      DateCursor::new(2024, 0);
    assert_eq!(
      parse_month_expr(
        "-1", current, today()
      )
      .expect("relative"),
      DateCursor::new(2023, 11)
    );
    assert_eq!(
      parse_month_expr(
        "2025-03", current, today()
      )
      .expect("year-month"),
      DateCursor::new(2025, 2)
    );
    assert_eq!(
      parse_month_expr(
        "march", current, today()
      )
      .expect("month name"),
      DateCursor::new(2024, 2)
    );
    assert_eq!(
      parse_month_expr(
        "today", current, today()
      )
      .expect("today"),
      DateCursor::new(2026, 9)
    );
    assert!(
      parse_month_expr(
        "2024-13", current, today()
      )
      .is_err()
    );
  }

  #[test]
  fn timezone_file_is_read() {
    let dir = tempfile::tempdir()
      .expect("tempdir");
    let path =
      dir.path().join("time.toml");
    fs::write(
      &path,
      "[time]\ntimezone = \"Asia/Seoul\"\n"
    )
    .expect("write config");
    assert_eq!(
      load_timezone_from_file(&path),
      Some(chrono_tz::Asia::Seoul)
    );
  }
}
