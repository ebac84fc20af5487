use std::fs;

use almanac_core::clock::FixedClock;
use almanac_core::config::Config;
use almanac_core::controller::CalendarController;
use almanac_core::cursor::DateCursor;
use almanac_core::event::{EventStore, load_event_file};
use almanac_core::grid::{CellKind, build_month_grid};
use almanac_core::locale::Locale;
use almanac_core::mapper::map_events_to_grid;
use almanac_core::palette::ColorTag;
use chrono::NaiveDate;
use tempfile::tempdir;

const EVENTS: &str = r#"[
  {"start": "2024-01-05T10:00:00", "end": "2024-01-07T11:00:00", "label": "Seoul trip", "color": "indigo"},
  {"start": "2024-01-05T09:00:00", "label": "Room 3F", "color": "sky"},
  {"start": "2024-01-30T09:00:00", "end": "2024-02-02T18:00:00", "label": "Offsite", "color": "red"},
  {"start": "2024-01-12T09:00:00", "end": "2024-01-11T09:00:00", "label": "Broken", "color": "green"},
  {"start": "2024-01-15T09:00:00", "label": "Unknown", "color": "purple"}
]"#;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

#[test]
fn rc_file_and_event_file_drive_the_month_view() {
    let temp = tempdir().expect("tempdir");
    let events_path = temp.path().join("events.json");
    fs::write(&events_path, EVENTS).expect("write events");

    let rc_path = temp.path().join("almanacrc");
    fs::write(
        &rc_path,
        format!(
            "calendar.events = {}\ncalendar.locale = ko\nfilter.sky = off\n",
            events_path.display()
        ),
    )
    .expect("write rc");

    let cfg = Config::load(Some(&rc_path)).expect("load config");
    let path = cfg.events_path().expect("events path configured");
    let records = load_event_file(&path).expect("load events");
    assert_eq!(records.len(), 5);

    let (store, rejected) = EventStore::ingest(records, chrono_tz::UTC);
    assert_eq!(store.len(), 3);
    assert_eq!(rejected.len(), 2);

    let mut controller = CalendarController::new(
        store,
        cfg.filter_defaults(),
        Box::new(FixedClock::new(date(2024, 1, 17))),
    )
    .with_locale(cfg.locale().expect("locale"));
    assert_eq!(controller.locale(), Locale::Ko);

    let view = controller.view();
    assert_eq!(view.title, "2024년 1월");
    let jan5 = view
        .cells
        .iter()
        .find(|cell| cell.date == Some(date(2024, 1, 5)))
        .expect("jan 5 visible");
    // the sky booking is filtered out by the rc file
    assert_eq!(jan5.assignments.len(), 1);
    assert_eq!(jan5.assignments[0].event.label(), "Seoul trip");

    // Feb 1 and 2 fall in trailing cells of January's grid.
    let trailing: Vec<_> = view
        .cells
        .iter()
        .filter(|cell| cell.slot.kind == CellKind::Trailing && !cell.assignments.is_empty())
        .collect();
    assert_eq!(trailing.len(), 2);
    assert!(trailing.iter().all(|cell| cell.assignments[0].event.color() == ColorTag::Red));

    controller.toggle(ColorTag::Sky);
    let view = controller.view();
    let jan5 = view
        .cells
        .iter()
        .find(|cell| cell.date == Some(date(2024, 1, 5)))
        .expect("jan 5 visible");
    let labels: Vec<_> = jan5.assignments.iter().map(|a| a.event.label()).collect();
    assert_eq!(labels, vec!["Seoul trip", "Room 3F"]);
}

#[test]
fn every_month_of_a_long_range_tiles_whole_weeks() {
    for year in [1582_i64, 1900, 2000, 2023, 2024, 2100] {
        for month in 0..12 {
            let grid = build_month_grid(year, month);
            assert_eq!(grid.total_slots() % 7, 0, "{year}-{month}");
            assert!(grid.leading_blank_count < 7);
            assert!(grid.trailing_blank_count < 7);
            let cells = grid.cells();
            assert_eq!(cells.len(), grid.total_slots());
            let current: Vec<u32> = cells
                .iter()
                .filter(|cell| cell.kind == CellKind::Current)
                .map(|cell| cell.day)
                .collect();
            assert_eq!(current, grid.month_day_numbers);
        }
    }
}

#[test]
fn navigation_round_trips_across_years() {
    let mut controller = CalendarController::new(
        EventStore::default(),
        Default::default(),
        Box::new(FixedClock::new(date(2023, 12, 31))),
    );
    let start = controller.current();
    assert_eq!(start, DateCursor { year: 2023, month: 11 });

    for _ in 0..25 {
        controller.next();
    }
    assert_eq!(controller.current(), DateCursor { year: 2026, month: 0 });
    for _ in 0..25 {
        controller.previous();
    }
    assert_eq!(controller.current(), start);
}

#[test]
fn mapper_places_nothing_for_an_empty_filter() {
    let temp = tempdir().expect("tempdir");
    let events_path = temp.path().join("events.jsonl");
    fs::write(
        &events_path,
        "{\"start\":\"2024-01-05\",\"label\":\"A\",\"color\":\"yellow\"}\n",
    )
    .expect("write events");

    let (store, _) = EventStore::ingest(
        load_event_file(&events_path).expect("load events"),
        chrono_tz::UTC,
    );
    let grid = build_month_grid(2024, 0);

    let mut filters = almanac_core::filter::FilterState::all_visible();
    assert_eq!(map_events_to_grid(&grid, store.events(), &filters).total(), 1);

    for tag in ColorTag::ALL {
        filters.set(tag, false);
    }
    let assignments = map_events_to_grid(&grid, store.events(), &filters);
    assert_eq!(assignments.total(), 0);
    assert_eq!(assignments.dates(), grid.total_slots());
}
