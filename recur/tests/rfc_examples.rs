// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! The recurrence examples of RFC 5545 Section 3.8.5.3, with floating start
//! times.

use aimcal_recur::{
    CalDateTime, ComponentKind, PeriodList, RecurrencePattern, RecurrencePatternEvaluator,
    RecurringComponent, Zone, get_occurrences,
};

fn dt(src: &str) -> CalDateTime {
    CalDateTime::parse(src).unwrap()
}

/// Every occurrence of `rule` seeded at `dtstart`, up to `end`.
fn expand(dtstart: &str, rule: &str, end: &str) -> Vec<String> {
    let pattern: RecurrencePattern = rule.parse().unwrap();
    let seed = dt(dtstart);
    RecurrencePatternEvaluator::new()
        .expand(&pattern, &seed, &seed, &dt(end))
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect()
}

/// Dates at 09:00, written as `YYYYMMDD`.
fn at_nine(dates: &[&str]) -> Vec<String> {
    dates.iter().map(|d| format!("{d}T090000")).collect()
}

#[test]
fn daily_for_ten_occurrences() {
    assert_eq!(
        expand("19970902T090000", "FREQ=DAILY;COUNT=10", "20000101"),
        at_nine(&[
            "19970902", "19970903", "19970904", "19970905", "19970906", "19970907", "19970908",
            "19970909", "19970910", "19970911",
        ])
    );
}

#[test]
fn daily_until_december_24() {
    let got = expand(
        "19970902T090000",
        "FREQ=DAILY;UNTIL=19971224T000000Z",
        "20000101",
    );
    assert_eq!(got.len(), 113);
    assert_eq!(got.first().map(String::as_str), Some("19970902T090000"));
    assert_eq!(got.last().map(String::as_str), Some("19971223T090000"));
}

#[test]
fn every_other_day() {
    assert_eq!(
        expand("19970902T090000", "FREQ=DAILY;INTERVAL=2", "19970915"),
        at_nine(&[
            "19970902", "19970904", "19970906", "19970908", "19970910", "19970912", "19970914",
        ])
    );
}

#[test]
fn every_ten_days_five_occurrences() {
    assert_eq!(
        expand("19970902T090000", "FREQ=DAILY;INTERVAL=10;COUNT=5", "20000101"),
        at_nine(&["19970902", "19970912", "19970922", "19971002", "19971012"])
    );
}

#[test]
fn every_day_in_january_for_three_years() {
    let yearly = expand(
        "19980101T090000",
        "FREQ=YEARLY;UNTIL=20000131T140000Z;BYMONTH=1;BYDAY=SU,MO,TU,WE,TH,FR,SA",
        "20010101",
    );
    let daily = expand(
        "19980101T090000",
        "FREQ=DAILY;UNTIL=20000131T140000Z;BYMONTH=1",
        "20010101",
    );
    assert_eq!(yearly.len(), 93);
    assert_eq!(yearly, daily);
    assert!(yearly.iter().all(|d| d.get(4..6) == Some("01")));
    assert_eq!(yearly.last().map(String::as_str), Some("20000131T090000"));
}

#[test]
fn weekly_for_ten_occurrences() {
    assert_eq!(
        expand("19970902T090000", "FREQ=WEEKLY;COUNT=10", "20000101"),
        at_nine(&[
            "19970902", "19970909", "19970916", "19970923", "19970930", "19971007", "19971014",
            "19971021", "19971028", "19971104",
        ])
    );
}

#[test]
fn weekly_until_december_24() {
    let got = expand(
        "19970902T090000",
        "FREQ=WEEKLY;UNTIL=19971224T000000Z",
        "20000101",
    );
    assert_eq!(got.len(), 17);
    assert_eq!(got.last().map(String::as_str), Some("19971223T090000"));
}

#[test]
fn weekly_on_tuesday_and_thursday() {
    assert_eq!(
        expand(
            "19970902T090000",
            "FREQ=WEEKLY;COUNT=10;WKST=SU;BYDAY=TU,TH",
            "20000101"
        ),
        at_nine(&[
            "19970902", "19970904", "19970909", "19970911", "19970916", "19970918", "19970923",
            "19970925", "19970930", "19971002",
        ])
    );
}

#[test]
fn every_other_week_on_monday_wednesday_friday() {
    let got = expand(
        "19970901T090000",
        "FREQ=WEEKLY;INTERVAL=2;UNTIL=19971224T000000Z;WKST=SU;BYDAY=MO,WE,FR",
        "20000101",
    );
    assert_eq!(got.len(), 25);
    assert_eq!(
        got.get(..8),
        Some(
            at_nine(&[
                "19970901", "19970903", "19970905", "19970915", "19970917", "19970919",
                "19970929", "19971001",
            ])
            .as_slice()
        )
    );
    assert_eq!(got.last().map(String::as_str), Some("19971222T090000"));
}

#[test]
fn monthly_on_the_first_friday() {
    assert_eq!(
        expand("19970905T090000", "FREQ=MONTHLY;COUNT=10;BYDAY=1FR", "20000101"),
        at_nine(&[
            "19970905", "19971003", "19971107", "19971205", "19980102", "19980206", "19980306",
            "19980403", "19980501", "19980605",
        ])
    );
}

#[test]
fn every_other_month_on_first_and_last_sunday() {
    assert_eq!(
        expand(
            "19970907T090000",
            "FREQ=MONTHLY;INTERVAL=2;COUNT=10;BYDAY=1SU,-1SU",
            "20000101"
        ),
        at_nine(&[
            "19970907", "19970928", "19971102", "19971130", "19980104", "19980125", "19980301",
            "19980329", "19980503", "19980531",
        ])
    );
}

#[test]
fn monthly_on_the_second_to_last_monday() {
    assert_eq!(
        expand("19970922T090000", "FREQ=MONTHLY;COUNT=6;BYDAY=-2MO", "20000101"),
        at_nine(&[
            "19970922", "19971020", "19971117", "19971222", "19980119", "19980216",
        ])
    );
}

#[test]
fn monthly_on_the_third_to_last_day() {
    assert_eq!(
        expand("19970928T090000", "FREQ=MONTHLY;BYMONTHDAY=-3", "19980227"),
        at_nine(&[
            "19970928", "19971029", "19971128", "19971229", "19980129", "19980226",
        ])
    );
}

#[test]
fn monthly_on_the_second_and_fifteenth() {
    assert_eq!(
        expand(
            "19970902T090000",
            "FREQ=MONTHLY;COUNT=10;BYMONTHDAY=2,15",
            "20000101"
        ),
        at_nine(&[
            "19970902", "19970915", "19971002", "19971015", "19971102", "19971115", "19971202",
            "19971215", "19980102", "19980115",
        ])
    );
}

#[test]
fn monthly_on_the_first_and_last_day() {
    assert_eq!(
        expand(
            "19970930T090000",
            "FREQ=MONTHLY;COUNT=10;BYMONTHDAY=1,-1",
            "20000101"
        ),
        at_nine(&[
            "19970930", "19971001", "19971031", "19971101", "19971130", "19971201", "19971231",
            "19980101", "19980131", "19980201",
        ])
    );
}

#[test]
fn every_eighteen_months_on_the_tenth_to_fifteenth() {
    assert_eq!(
        expand(
            "19970910T090000",
            "FREQ=MONTHLY;INTERVAL=18;COUNT=10;BYMONTHDAY=10,11,12,13,14,15",
            "20010101"
        ),
        at_nine(&[
            "19970910", "19970911", "19970912", "19970913", "19970914", "19970915", "19990310",
            "19990311", "19990312", "19990313",
        ])
    );
}

#[test]
fn every_tuesday_every_other_month() {
    assert_eq!(
        expand("19970902T090000", "FREQ=MONTHLY;INTERVAL=2;BYDAY=TU", "19980101"),
        at_nine(&[
            "19970902", "19970909", "19970916", "19970923", "19970930", "19971104", "19971111",
            "19971118", "19971125",
        ])
    );
}

#[test]
fn yearly_in_june_and_july() {
    assert_eq!(
        expand("19970610T090000", "FREQ=YEARLY;COUNT=10;BYMONTH=6,7", "20100101"),
        at_nine(&[
            "19970610", "19970710", "19980610", "19980710", "19990610", "19990710", "20000610",
            "20000710", "20010610", "20010710",
        ])
    );
}

#[test]
fn every_other_year_in_the_first_quarter() {
    assert_eq!(
        expand(
            "19970310T090000",
            "FREQ=YEARLY;INTERVAL=2;COUNT=10;BYMONTH=1,2,3",
            "20100101"
        ),
        at_nine(&[
            "19970310", "19990110", "19990210", "19990310", "20010110", "20010210", "20010310",
            "20030110", "20030210", "20030310",
        ])
    );
}

#[test]
fn every_third_year_on_year_days() {
    assert_eq!(
        expand(
            "19970101T090000",
            "FREQ=YEARLY;INTERVAL=3;COUNT=10;BYYEARDAY=1,100,200",
            "20100101"
        ),
        at_nine(&[
            "19970101", "19970410", "19970719", "20000101", "20000409", "20000718", "20030101",
            "20030410", "20030719", "20060101",
        ])
    );
}

#[test]
fn yearly_on_the_twentieth_monday() {
    assert_eq!(
        expand("19970519T090000", "FREQ=YEARLY;BYDAY=20MO", "19991231"),
        at_nine(&["19970519", "19980518", "19990517"])
    );
}

#[test]
fn monday_of_week_twenty() {
    assert_eq!(
        expand("19970512T090000", "FREQ=YEARLY;BYWEEKNO=20;BYDAY=MO", "19991231"),
        at_nine(&["19970512", "19980511", "19990517"])
    );
}

#[test]
fn every_thursday_in_march() {
    assert_eq!(
        expand("19970313T090000", "FREQ=YEARLY;BYMONTH=3;BYDAY=TH", "19991231"),
        at_nine(&[
            "19970313", "19970320", "19970327", "19980305", "19980312", "19980319", "19980326",
            "19990304", "19990311", "19990318", "19990325",
        ])
    );
}

#[test]
fn every_thursday_in_summer() {
    assert_eq!(
        expand(
            "19970605T090000",
            "FREQ=YEARLY;BYDAY=TH;BYMONTH=6,7,8",
            "19971231"
        ),
        at_nine(&[
            "19970605", "19970612", "19970619", "19970626", "19970703", "19970710", "19970717",
            "19970724", "19970731", "19970807", "19970814", "19970821", "19970828",
        ])
    );
}

#[test]
fn friday_the_thirteenth_except_the_start() {
    let mut event =
        RecurringComponent::new("friday", ComponentKind::Event, dt("19970902T090000"));
    event.add_rrule("FREQ=MONTHLY;BYDAY=FR;BYMONTHDAY=13".parse().unwrap());
    event.add_exdate(PeriodList::parse("19970902T090000", &Zone::Floating).unwrap());

    let occurrences =
        get_occurrences(&mut event, &dt("19970902"), &dt("20001231"), true).unwrap();
    let starts: Vec<_> = occurrences
        .iter()
        .map(|o| o.period().start().to_string())
        .collect();
    assert_eq!(
        starts,
        at_nine(&["19980213", "19980313", "19981113", "19990813", "20001013"])
    );
}

#[test]
fn first_saturday_after_the_first_sunday() {
    assert_eq!(
        expand(
            "19970913T090000",
            "FREQ=MONTHLY;BYDAY=SA;BYMONTHDAY=7,8,9,10,11,12,13",
            "19980630"
        ),
        at_nine(&[
            "19970913", "19971011", "19971108", "19971213", "19980110", "19980207", "19980307",
            "19980411", "19980509", "19980613",
        ])
    );
}

#[test]
fn us_presidential_election_day() {
    assert_eq!(
        expand(
            "19961105T090000",
            "FREQ=YEARLY;INTERVAL=4;BYMONTH=11;BYDAY=TU;BYMONTHDAY=2,3,4,5,6,7,8",
            "20041231"
        ),
        at_nine(&["19961105", "20001107", "20041102"])
    );
}

#[test]
fn third_weekday_of_tuesday_to_thursday() {
    assert_eq!(
        expand(
            "19970904T090000",
            "FREQ=MONTHLY;COUNT=3;BYDAY=TU,WE,TH;BYSETPOS=3",
            "20000101"
        ),
        at_nine(&["19970904", "19971007", "19971106"])
    );
}

#[test]
fn second_to_last_weekday_of_the_month() {
    assert_eq!(
        expand(
            "19970929T090000",
            "FREQ=MONTHLY;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-2",
            "19980331"
        ),
        at_nine(&[
            "19970929", "19971030", "19971127", "19971230", "19980129", "19980226", "19980330",
        ])
    );
}

#[test]
fn every_three_hours_until_the_afternoon() {
    assert_eq!(
        expand(
            "19970902T090000",
            "FREQ=HOURLY;INTERVAL=3;UNTIL=19970902T170000Z",
            "19970903"
        ),
        ["19970902T090000", "19970902T120000", "19970902T150000"]
    );
}

#[test]
fn every_fifteen_minutes() {
    assert_eq!(
        expand("19970902T090000", "FREQ=MINUTELY;INTERVAL=15;COUNT=6", "19970903"),
        [
            "19970902T090000",
            "19970902T091500",
            "19970902T093000",
            "19970902T094500",
            "19970902T100000",
            "19970902T101500",
        ]
    );
}

#[test]
fn every_hour_and_a_half() {
    assert_eq!(
        expand("19970902T090000", "FREQ=MINUTELY;INTERVAL=90;COUNT=4", "19970903"),
        [
            "19970902T090000",
            "19970902T103000",
            "19970902T120000",
            "19970902T133000",
        ]
    );
}

#[test]
fn every_twenty_minutes_during_office_hours() {
    let daily = expand(
        "19970902T090000",
        "FREQ=DAILY;BYHOUR=9,10,11,12,13,14,15,16;BYMINUTE=0,20,40",
        "19970903T235959",
    );
    let minutely = expand(
        "19970902T090000",
        "FREQ=MINUTELY;INTERVAL=20;BYHOUR=9,10,11,12,13,14,15,16",
        "19970903T235959",
    );
    assert_eq!(daily.len(), 48);
    assert_eq!(daily, minutely);
    assert_eq!(daily.get(23).map(String::as_str), Some("19970902T164000"));
}

#[test]
fn week_start_changes_the_weeks() {
    assert_eq!(
        expand(
            "19970805T090000",
            "FREQ=WEEKLY;INTERVAL=2;COUNT=4;BYDAY=TU,SU;WKST=MO",
            "20000101"
        ),
        at_nine(&["19970805", "19970810", "19970819", "19970824"])
    );
    assert_eq!(
        expand(
            "19970805T090000",
            "FREQ=WEEKLY;INTERVAL=2;COUNT=4;BYDAY=TU,SU;WKST=SU",
            "20000101"
        ),
        at_nine(&["19970805", "19970817", "19970819", "19970831"])
    );
}

#[test]
fn skips_invalid_month_days() {
    assert_eq!(
        expand(
            "20070115T090000",
            "FREQ=MONTHLY;BYMONTHDAY=15,30;COUNT=5",
            "20080101"
        ),
        at_nine(&["20070115", "20070130", "20070215", "20070315", "20070330"])
    );
}
