// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Calendar helpers over `jiff::civil` used by the recurrence expansion.
//!
//! Base periods of the expansion are indexed by epoch day, the number of days
//! since 1970-01-01, so stepping by an interval stays integer arithmetic.
//! Weeks follow RFC 5545: they start on a configurable weekday, and week 1 of
//! a year is the first week that contains at least four days of that year.

use jiff::Span;
use jiff::civil::{self, Date, Weekday};

use crate::value::WeekDay;

const EPOCH: Date = civil::date(1970, 1, 1);

/// Days since 1970-01-01.
#[must_use]
pub fn epoch_day(date: Date) -> i64 {
    i64::from((date - EPOCH).get_days())
}

/// Inverse of [`epoch_day`], `None` outside the supported date range.
#[must_use]
pub fn date_from_epoch_day(days: i64) -> Option<Date> {
    let span = Span::new().try_days(days).ok()?;
    EPOCH.checked_add(span).ok()
}

/// Every date from `first` to `last`, inclusive.
pub fn days_between(first: Date, last: Date) -> impl Iterator<Item = Date> {
    first
        .series(Span::new().days(1))
        .take_while(move |date| *date <= last)
}

/// Zero-based position of `weekday` in a week starting on `week_start`.
#[must_use]
pub fn weekday_offset(weekday: Weekday, week_start: WeekDay) -> i64 {
    i64::from(weekday.since(Weekday::from(week_start)))
}

/// Epoch day of the first day of the week containing `date`.
#[must_use]
pub fn week_start(date: Date, week_start: WeekDay) -> i64 {
    epoch_day(date) - weekday_offset(date.weekday(), week_start)
}

/// Epoch day on which week 1 of `year` starts.
///
/// The week containing January 4th always has at least four days in the
/// year, and no earlier week does.
#[must_use]
pub fn first_week_start(year: i16, week_start_day: WeekDay) -> Option<i64> {
    let jan4 = Date::new(year, 1, 4).ok()?;
    Some(week_start(jan4, week_start_day))
}

/// Number of weeks (52 or 53) of the week-numbering `year`.
#[must_use]
pub fn weeks_in_year(year: i16, week_start: WeekDay) -> Option<i64> {
    let this = first_week_start(year, week_start)?;
    let next = first_week_start(year.checked_add(1)?, week_start)?;
    Some((next - this) / 7)
}

/// The week-numbering year and the week number (1-53) of `date`.
#[must_use]
pub fn week_number(date: Date, week_start: WeekDay) -> Option<(i16, i64)> {
    let day = epoch_day(date);
    let year = date.year();

    if let Some(next_year) = year.checked_add(1) {
        let next_start = first_week_start(next_year, week_start)?;
        if day >= next_start {
            return Some((next_year, (day - next_start) / 7 + 1));
        }
    }

    let start = first_week_start(year, week_start)?;
    if day < start {
        let prev_year = year.checked_sub(1)?;
        let prev_start = first_week_start(prev_year, week_start)?;
        return Some((prev_year, (day - prev_start) / 7 + 1));
    }

    Some((year, (day - start) / 7 + 1))
}

/// Whether `date` is the `nth` of its weekday in its month, counting back
/// from the end of the month when `nth` is negative.
#[must_use]
pub fn is_nth_weekday_of_month(date: Date, nth: i8) -> bool {
    date.nth_weekday_of_month(nth, date.weekday())
        .is_ok_and(|found| found == date)
}

/// Whether `date` is the `nth` of its weekday in its year, counting back
/// from the end of the year when `nth` is negative.
#[must_use]
pub fn is_nth_weekday_of_year(date: Date, nth: i8) -> bool {
    nth_weekday_of_year(date, nth, date.weekday()) == Some(date)
}

/// The `nth` `weekday` of the year of `date`.
fn nth_weekday_of_year(date: Date, nth: i8, weekday: Weekday) -> Option<Date> {
    let (from, edge) = match nth > 0 {
        true => (date.first_of_year(), 1),
        false => (date.last_of_year(), -1),
    };

    // nth_weekday never counts its starting day
    let found = match from.weekday() == weekday {
        true if nth == edge => from,
        true => from.nth_weekday(i32::from(nth - edge), weekday).ok()?,
        false => from.nth_weekday(i32::from(nth), weekday).ok()?,
    };
    (found.year() == date.year()).then_some(found)
}
