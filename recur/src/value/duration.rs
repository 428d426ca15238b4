// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Duration value type as defined in RFC 5545 Section 3.3.6.

use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::str::FromStr;

use chumsky::extra::ParserExtra;
use chumsky::input::Input;
use chumsky::label::LabelError;
use chumsky::prelude::*;
use chumsky::span::SimpleSpan;

use crate::error::{DateTimeError, ParseError};
use crate::value::CalDateTime;
use crate::value::util::{ValueExpected, is_positive, parse_with, u32_any};

/// Duration Value defined in RFC 5545 Section 3.3.6
///
/// Weeks and days are nominal and follow the wall clock of the value they
/// are added to, hours, minutes and seconds are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Duration {
    /// Date and Time Duration
    DateTime {
        /// Whether the duration is positive
        positive: bool,
        /// Day Duration
        day: u32,
        /// Hour Duration
        hour: u32,
        /// Minute Duration
        minute: u32,
        /// Second Duration
        second: u32,
    },

    /// Week Duration
    Week {
        /// Whether the duration is positive
        positive: bool,
        /// Week Duration
        week: u32,
    },
}

impl Duration {
    /// A positive duration of whole days.
    #[must_use]
    pub const fn days(day: u32) -> Self {
        Self::DateTime {
            positive: true,
            day,
            hour: 0,
            minute: 0,
            second: 0,
        }
    }

    /// A positive duration of whole weeks.
    #[must_use]
    pub const fn weeks(week: u32) -> Self {
        Self::Week {
            positive: true,
            week,
        }
    }

    /// A positive exact duration of hours, minutes and seconds.
    #[must_use]
    pub const fn time(hour: u32, minute: u32, second: u32) -> Self {
        Self::DateTime {
            positive: true,
            day: 0,
            hour,
            minute,
            second,
        }
    }

    /// The exact time between two date-times, negative if `end` is before
    /// `start`.
    ///
    /// # Errors
    /// If the difference does not fit the duration fields.
    pub fn between(start: &CalDateTime, end: &CalDateTime) -> Result<Self, DateTimeError> {
        let diff = end.instant().0 - start.instant().0;
        let total = diff.unsigned_abs();
        let hour = u32::try_from(total / 3600).map_err(|_| DateTimeError::OutOfRange {
            message: format!("{diff} seconds do not fit a duration"),
        })?;

        #[expect(clippy::cast_possible_truncation)]
        let (minute, second) = ((total % 3600 / 60) as u32, (total % 60) as u32);
        Ok(Self::DateTime {
            positive: diff >= 0,
            day: 0,
            hour,
            minute,
            second,
        })
    }

    /// The same length with the opposite sign.
    #[must_use]
    pub const fn negated(self) -> Self {
        match self {
            Duration::DateTime {
                positive,
                day,
                hour,
                minute,
                second,
            } => Duration::DateTime {
                positive: !positive,
                day,
                hour,
                minute,
                second,
            },
            Duration::Week { positive, week } => Duration::Week {
                positive: !positive,
                week,
            },
        }
    }

    /// Whether the duration has a positive sign and is not zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        // both parts share the sign
        let (days, seconds) = self.nominal_parts();
        days > 0 || seconds > 0
    }

    /// Whether the duration is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.nominal_parts() == (0, 0)
    }

    /// Signed nominal days and signed exact seconds.
    #[must_use]
    pub fn nominal_parts(&self) -> (i64, i64) {
        let (positive, days, seconds) = match *self {
            Duration::DateTime {
                positive,
                day,
                hour,
                minute,
                second,
            } => (
                positive,
                i64::from(day),
                i64::from(hour) * 3600 + i64::from(minute) * 60 + i64::from(second),
            ),
            Duration::Week { positive, week } => (positive, i64::from(week) * 7, 0),
        };

        match positive {
            true => (days, seconds),
            false => (-days, -seconds),
        }
    }

    /// Length in seconds, counting a day as 86 400 seconds.
    #[must_use]
    pub fn approximate_seconds(&self) -> i64 {
        let (days, seconds) = self.nominal_parts();
        days * 86_400 + seconds
    }

    fn key(&self) -> (bool, bool, u32, u32, u32, u32, u32) {
        match *self {
            Duration::DateTime {
                positive,
                day,
                hour,
                minute,
                second,
            } => (positive, false, 0, day, hour, minute, second),
            Duration::Week { positive, week } => (positive, true, week, 0, 0, 0, 0),
        }
    }
}

impl PartialOrd for Duration {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Duration {
    fn cmp(&self, other: &Self) -> Ordering {
        self.approximate_seconds()
            .cmp(&other.approximate_seconds())
            .then_with(|| self.key().cmp(&other.key()))
    }
}

impl Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Duration::Week { positive, week } => {
                write!(f, "{}P{week}W", if positive { "" } else { "-" })
            }
            Duration::DateTime {
                positive,
                day,
                hour,
                minute,
                second,
            } => {
                write!(f, "{}P", if positive { "" } else { "-" })?;
                if day > 0 {
                    write!(f, "{day}D")?;
                }

                if hour > 0 {
                    write!(f, "T{hour}H")?;
                    if minute > 0 || second > 0 {
                        write!(f, "{minute}M")?;
                    }
                    if second > 0 {
                        write!(f, "{second}S")?;
                    }
                } else if minute > 0 {
                    write!(f, "T{minute}M")?;
                    if second > 0 {
                        write!(f, "{second}S")?;
                    }
                } else if second > 0 || day == 0 {
                    write!(f, "T{second}S")?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for Duration {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_with("duration", value_duration(), s)
    }
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// dur-value  = (["+"] / "-") "P" (dur-date / dur-time / dur-week)
///
/// dur-date   = dur-day [dur-time]
/// dur-time   = "T" (dur-hour / dur-minute / dur-second)
/// dur-week   = 1*DIGIT "W"
/// dur-hour   = 1*DIGIT "H" [dur-minute]
/// dur-minute = 1*DIGIT "M" [dur-second]
/// dur-second = 1*DIGIT "S"
/// dur-day    = 1*DIGIT "D"
/// ```
pub(crate) fn value_duration<'src, I, E>() -> impl Parser<'src, I, Duration, E> + Clone
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    let int = u32_any();

    let second = int.clone().then_ignore(just('S'));
    let minute = int.clone().then_ignore(just('M'));
    let hour = int.clone().then_ignore(just('H'));

    // dur-minute = 1*DIGIT "M" [dur-second]
    let minute_with_second = minute
        .clone()
        .then(second.clone().or_not())
        .map(|(m, s)| (m, s.unwrap_or(0)));

    // dur-hour = 1*DIGIT "H" [dur-minute]
    let hour_with_minute = hour
        .then(minute_with_second.clone().or_not())
        .map(|(h, ms)| {
            let (m, s) = ms.unwrap_or((0, 0));
            (h, m, s)
        });

    // dur-time = "T" (dur-hour / dur-minute / dur-second)
    let time = just('T').ignore_then(choice((
        hour_with_minute,
        minute_with_second.map(|(m, s)| (0, m, s)),
        second.map(|s| (0, 0, s)),
    )));

    let day = int.clone().then_ignore(just('D'));
    let date = day.then(time.clone().or_not());
    let week = int.then_ignore(just('W'));

    // (week, day, (hour, minute, second)), week is set only for dur-week
    let body = choice((
        date.map(|(day, time)| (None, day, time.unwrap_or((0, 0, 0)))),
        time.map(|time| (None, 0, time)),
        week.map(|week| (Some(week), 0, (0, 0, 0))),
    ));

    is_positive()
        .then_ignore(just('P'))
        .then(body)
        .map(|(positive, (week, day, (hour, minute, second)))| match week {
            Some(week) => Duration::Week { positive, week },
            None => Duration::DateTime {
                positive,
                day,
                hour,
                minute,
                second,
            },
        })
}

#[cfg(test)]
mod tests {
    use jiff::civil::datetime;

    use super::*;

    #[test]
    fn parses_duration() {
        use Duration::{DateTime, Week};

        #[rustfmt::skip]
        let success_cases = [
            // examples from RFC 5545 Section 3.3.6
            ("P15DT5H0M20S", DateTime { positive: true, day: 15, hour: 5, minute: 0, second: 20 }),
            ("P7W",  Week { positive: true,  week: 7 }),
            // extra tests
            ("+P3W", Week { positive: true,  week: 3 }),
            ("-P1W", Week { positive: false, week: 1 }),
            ("P1D",          DateTime { positive: true,  day: 1, hour:  0, minute:  0, second:  0 }),
            ("-PT10H11M12S", DateTime { positive: false, day: 0, hour: 10, minute: 11, second: 12 }),
            ("PT15M",        DateTime { positive: true,  day: 0, hour:  0, minute: 15, second:  0 }),
            ("PT30S",        DateTime { positive: true,  day: 0, hour:  0, minute:  0, second: 30 }),
            ("PT1H30M",      DateTime { positive: true,  day: 0, hour:  1, minute: 30, second:  0 }),
        ];
        for (src, expected) in success_cases {
            assert_eq!(src.parse::<Duration>().unwrap(), expected, "Failed to parse: {src}");
        }

        let fail_cases = [
            "P",         // missing duration value
            "PT",        // missing time value
            "P3X",       // invalid designator
            "P-3W",      // invalid negative sign position
            "P3DT4H5M6", // missing 'S' designator
            "3W",        // missing 'P' designator
        ];
        for src in fail_cases {
            assert!(src.parse::<Duration>().is_err(), "Parse {src} should fail");
        }
    }

    #[test]
    fn displays_duration() {
        let cases = [
            ("P15DT5H0M20S", "P15DT5H0M20S"),
            ("P7W", "P7W"),
            ("-P1D", "-P1D"),
            ("PT1H", "PT1H"),
            ("PT1H0M20S", "PT1H0M20S"),
            ("PT0S", "PT0S"),
            ("P1DT30S", "P1DT30S"),
        ];
        for (src, expected) in cases {
            assert_eq!(src.parse::<Duration>().unwrap().to_string(), expected);
        }
    }

    #[test]
    fn splits_nominal_and_exact_parts() {
        assert_eq!(Duration::weeks(2).nominal_parts(), (14, 0));
        assert_eq!(
            "-P1DT1H".parse::<Duration>().unwrap().nominal_parts(),
            (-1, -3600)
        );
        assert!(Duration::days(1).is_positive());
        assert!(!"-PT1S".parse::<Duration>().unwrap().is_positive());
        assert!(!"PT0S".parse::<Duration>().unwrap().is_positive());
        assert!("PT0S".parse::<Duration>().unwrap().is_zero());
        assert_eq!(Duration::weeks(1).negated().nominal_parts(), (-7, 0));
    }

    #[test]
    fn measures_exact_time_between() {
        let start = CalDateTime::floating(datetime(2024, 1, 1, 9, 0, 0, 0));
        let end = CalDateTime::floating(datetime(2024, 1, 2, 10, 30, 15, 0));
        assert_eq!(
            Duration::between(&start, &end).unwrap(),
            Duration::time(25, 30, 15)
        );
        assert!(!Duration::between(&end, &start).unwrap().is_positive());
    }

    #[test]
    fn orders_by_length() {
        assert!(Duration::time(1, 0, 0) < Duration::days(1));
        assert!(Duration::days(6) < Duration::weeks(1));
        assert_ne!(Duration::days(7), Duration::weeks(1));
    }
}
