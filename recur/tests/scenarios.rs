// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! End-to-end occurrence queries on single components.

use aimcal_recur::{
    CalDateTime, ComponentKind, Evaluator, PeriodList, RecurrencePatternEvaluator,
    RecurringComponent, Zone, get_occurrences,
};

fn dt(src: &str) -> CalDateTime {
    CalDateTime::parse(src).unwrap()
}

/// Start of every occurrence of `component` in `[start, end]`.
fn occurrence_starts(component: &mut RecurringComponent, start: &str, end: &str) -> Vec<String> {
    get_occurrences(component, &dt(start), &dt(end), true)
        .unwrap()
        .iter()
        .map(|occurrence| occurrence.period().start().to_string())
        .collect()
}

fn event(start: &str, rule: &str) -> RecurringComponent {
    let mut event = RecurringComponent::new("event", ComponentKind::Event, dt(start));
    event.add_rrule(rule.parse().unwrap());
    event
}

#[test]
fn daily_with_count_stops_after_five() {
    let mut event = event("20240101T090000", "FREQ=DAILY;COUNT=5");
    assert_eq!(
        occurrence_starts(&mut event, "20240101", "20240131"),
        [
            "20240101T090000",
            "20240102T090000",
            "20240103T090000",
            "20240104T090000",
            "20240105T090000",
        ]
    );
}

#[test]
fn weekly_by_day_expands_the_week() {
    let mut event = event("20240101T090000", "FREQ=WEEKLY;BYDAY=MO,WE,FR");
    assert_eq!(
        occurrence_starts(&mut event, "20240101", "20240107T235959"),
        ["20240101T090000", "20240103T090000", "20240105T090000"]
    );
}

#[test]
fn monthly_first_monday() {
    let mut event = event("20240101T090000", "FREQ=MONTHLY;BYDAY=1MO");
    assert_eq!(
        occurrence_starts(&mut event, "20240101", "20240331"),
        ["20240101T090000", "20240205T090000", "20240304T090000"]
    );
}

#[test]
fn excluded_date_is_absent() {
    let mut event = event("20240101T090000", "FREQ=DAILY;COUNT=10");
    event.add_exdate(PeriodList::parse("20240105T090000", &Zone::Floating).unwrap());

    let starts = occurrence_starts(&mut event, "20240101", "20240131");
    assert_eq!(starts.len(), 9);
    assert!(!starts.contains(&"20240105T090000".to_owned()));
    assert!(starts.contains(&"20240104T090000".to_owned()));
    assert!(starts.contains(&"20240106T090000".to_owned()));
}

#[test]
fn leap_day_only_in_leap_years() {
    let pattern = "FREQ=YEARLY;BYMONTH=2;BYMONTHDAY=29".parse().unwrap();
    let seed = dt("20230101T100000");
    let mut evaluator = RecurrencePatternEvaluator::new();
    let periods = evaluator
        .evaluate(&pattern, &seed, &dt("20230101"), &dt("20251231"), false)
        .unwrap();

    let starts: Vec<_> = periods.iter().map(|p| p.start().to_string()).collect();
    assert_eq!(starts, ["20240229T100000"]);
}

#[test]
fn all_day_events_span_their_day() {
    let mut event = event("20240101", "FREQ=WEEKLY;COUNT=3");
    let occurrences = get_occurrences(&mut event, &dt("20240108T120000"), &dt("20240131"), true)
        .unwrap();

    // the occurrence of January 8 started at midnight and still runs at noon
    let periods: Vec<_> = occurrences
        .iter()
        .map(|o| (o.period().start().to_string(), o.period().effective_end().to_string()))
        .collect();
    assert_eq!(
        periods,
        [
            ("20240108".to_owned(), "20240109".to_owned()),
            ("20240115".to_owned(), "20240116".to_owned()),
        ]
    );
}

#[test]
fn rdate_periods_keep_their_own_length() {
    let mut event = event("20240101T090000", "FREQ=DAILY;COUNT=2");
    event.set_duration(Some("PT1H".parse().unwrap()));
    event.add_rdate(PeriodList::parse("20240110T130000/PT3H", &Zone::Floating).unwrap());

    let occurrences = get_occurrences(&mut event, &dt("20240101"), &dt("20240131"), true).unwrap();
    let ends: Vec<_> = occurrences
        .iter()
        .map(|o| o.period().effective_end().to_string())
        .collect();
    assert_eq!(
        ends,
        ["20240101T100000", "20240102T100000", "20240110T160000"]
    );
}

#[test]
fn zoned_rules_follow_the_wall_clock() {
    use jiff::civil::datetime;
    use jiff::tz::TimeZone;

    let zone = Zone::named(
        "America/New_York",
        TimeZone::posix("EST5EDT,M3.2.0,M11.1.0").unwrap(),
    );
    let start = CalDateTime::new(datetime(2024, 3, 8, 9, 0, 0, 0), zone.clone()).unwrap();
    let mut event = RecurringComponent::new("zoned", ComponentKind::Event, start);
    event.add_rrule("FREQ=DAILY;COUNT=4".parse().unwrap());

    let occurrences =
        get_occurrences(&mut event, &dt("20240301T000000Z"), &dt("20240401T000000Z"), true)
            .unwrap();
    let hours: Vec<_> = occurrences
        .iter()
        .map(|o| o.period().start().to_zone(&Zone::Utc).unwrap().civil().hour())
        .collect();
    // 09:00 EST is 14:00 UTC, 09:00 EDT is 13:00 UTC
    assert_eq!(hours, [14, 14, 13, 13]);
}
