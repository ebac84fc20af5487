use serde::{
  Deserialize,
  Serialize
};

/// One event as it arrives from an event file or an upstream API, before
/// validation. Timestamps stay textual until ingestion resolves them in the
/// calendar timezone.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct EventRecord {
  pub start: String,
  #[serde(default)]
  pub end:   Option<String>,
  pub label: String,
  pub color: String
}

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(rename_all = "lowercase")]
pub enum CellKindDto {
  Leading,
  Current,
  Trailing
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct ChipDto {
  pub label:     String,
  pub color:     String,
  pub css_class: String,
  pub is_start:  bool,
  pub is_middle: bool,
  pub is_end:    bool
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct DayCellDto {
  pub date:       String,
  pub day:        u32,
  pub row:        usize,
  pub column:     usize,
  pub kind:       CellKindDto,
  pub is_today:   bool,
  pub is_past:    bool,
  pub is_weekend: bool,
  pub chips:      Vec<ChipDto>
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct SegmentDto {
  pub row:             usize,
  pub start_column:    usize,
  pub end_column:      usize,
  pub label:           String,
  pub color:           String,
  pub continues_before: bool,
  pub continues_after: bool
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct MonthViewDto {
  pub year:           i32,
  /// Zero-based, matching the cursor.
  pub month:          u32,
  pub title:          String,
  pub weekday_labels: Vec<String>,
  pub leading_blank_count: usize,
  pub trailing_blank_count: usize,
  pub month_day_numbers: Vec<u32>,
  pub week_numbers:   Vec<u32>,
  pub active_filters: Vec<String>,
  pub cells:          Vec<DayCellDto>,
  pub segments:       Vec<SegmentDto>
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn event_record_end_defaults_to_none()
  {
    let raw = r#"{"start":"2024-01-05T10:00","label":"Team Catch-up","color":"sky"}"#;
    let record: EventRecord =
      serde_json::from_str(raw)
        .expect("parse record");
    assert_eq!(record.end, None);
    assert_eq!(record.color, "sky");
  }

  #[test]
  fn cell_kind_serializes_lowercase() {
    let raw = serde_json::to_string(
      &CellKindDto::Trailing
    )
    .expect("serialize kind");
    assert_eq!(raw, "\"trailing\"");
  }
}
