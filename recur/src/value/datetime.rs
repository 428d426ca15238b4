// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Calendar date-time values as used by DTSTART, RDATE, EXDATE and UNTIL.

use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};

use chumsky::extra::ParserExtra;
use chumsky::input::Input;
use chumsky::label::LabelError;
use chumsky::prelude::*;
use chumsky::span::SimpleSpan;
use jiff::civil::{Date, DateTime, Time};
use jiff::tz::TimeZone;
use jiff::{Span, Timestamp};

use crate::calendar::epoch_day;
use crate::error::{DateTimeError, ParseError};
use crate::value::Duration;
use crate::value::util::{
    ValueExpected, i8_0_1, i8_0_2, i8_0_9, i8_1_2, i8_1_9, i16_0_9, parse_with, u8_0_1, u8_0_3,
    u8_0_5, u8_0_9,
};

/// Time zone attached to a [`CalDateTime`].
#[derive(Debug, Clone)]
pub enum Zone {
    /// Local time of whoever observes it, compared as if it were UTC
    Floating,

    /// Coordinated Universal Time
    Utc,

    /// A time zone referenced by a TZID parameter
    Named {
        /// The TZID as written
        tzid: String,
        /// Rules of the zone
        tz: TimeZone,
    },
}

impl Zone {
    /// Resolve an IANA time zone identifier.
    ///
    /// # Errors
    /// If the identifier is not known to the time zone database.
    pub fn get(tzid: &str) -> Result<Self, DateTimeError> {
        let tz = TimeZone::get(tzid).map_err(|_| DateTimeError::UnknownTimeZone {
            tzid: tzid.to_string(),
        })?;
        Ok(Self::Named {
            tzid: tzid.to_string(),
            tz,
        })
    }

    /// A named zone with explicitly provided rules.
    pub fn named(tzid: impl Into<String>, tz: TimeZone) -> Self {
        Self::Named {
            tzid: tzid.into(),
            tz,
        }
    }

    /// The TZID of a named zone.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        match self {
            Zone::Named { tzid, .. } => Some(tzid),
            Zone::Floating | Zone::Utc => None,
        }
    }

    /// Rules used for instant conversion, UTC for floating values.
    #[must_use]
    pub fn time_zone(&self) -> TimeZone {
        match self {
            Zone::Named { tz, .. } => tz.clone(),
            Zone::Floating | Zone::Utc => TimeZone::UTC,
        }
    }

}

impl PartialEq for Zone {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Zone::Floating, Zone::Floating) | (Zone::Utc, Zone::Utc) => true,
            (Zone::Named { tzid: a, .. }, Zone::Named { tzid: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl Eq for Zone {}

/// Calendar units accepted by [`CalDateTime::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[expect(missing_docs)]
pub enum Unit {
    Years,
    Months,
    Weeks,
    Days,
    Hours,
    Minutes,
    Seconds,
}

/// A wall-clock date-time together with its zone and precision.
///
/// Values are immutable, arithmetic returns new values that keep the zone.
/// Equality, hashing and ordering use the absolute instant (floating values
/// as if they were UTC) and then the date-only flag, so the same moment
/// written in two zones compares equal.
#[derive(Debug, Clone)]
pub struct CalDateTime {
    civil: DateTime,
    zone: Zone,
    date_only: bool,
    instant: (i64, i32),
}

impl CalDateTime {
    /// A floating date-time.
    #[must_use]
    pub fn floating(civil: DateTime) -> Self {
        Self {
            civil,
            zone: Zone::Floating,
            date_only: false,
            instant: utc_instant(civil),
        }
    }

    /// A UTC date-time.
    #[must_use]
    pub fn utc(civil: DateTime) -> Self {
        Self {
            civil,
            zone: Zone::Utc,
            date_only: false,
            instant: utc_instant(civil),
        }
    }

    /// A floating date-only value, midnight of `date`.
    #[must_use]
    pub fn date(date: Date) -> Self {
        Self {
            date_only: true,
            ..Self::floating(date.to_datetime(Time::midnight()))
        }
    }

    /// A date-time in the given zone.
    ///
    /// # Errors
    /// If the wall-clock value cannot be resolved to an instant in `zone`.
    pub fn new(civil: DateTime, zone: Zone) -> Result<Self, DateTimeError> {
        Self::from_parts(civil, zone, false)
    }

    /// A date-only value in the given zone.
    ///
    /// # Errors
    /// If midnight of `date` cannot be resolved to an instant in `zone`.
    pub fn date_in(date: Date, zone: Zone) -> Result<Self, DateTimeError> {
        Self::from_parts(date.to_datetime(Time::midnight()), zone, true)
    }

    /// A date-time in the zone identified by `tzid`.
    ///
    /// # Errors
    /// If the zone is unknown or the value cannot be resolved in it.
    pub fn in_zone(civil: DateTime, tzid: &str) -> Result<Self, DateTimeError> {
        Self::new(civil, Zone::get(tzid)?)
    }

    /// A wall-clock time skipped by a daylight saving transition moves
    /// forward by the length of the gap.
    fn from_parts(civil: DateTime, zone: Zone, date_only: bool) -> Result<Self, DateTimeError> {
        let (civil, instant) = match &zone {
            Zone::Named { tz, .. } => {
                let zoned = tz
                    .to_zoned(civil)
                    .map_err(|err| DateTimeError::Unresolvable {
                        value: format_civil(civil, false),
                        message: err.to_string(),
                    })?;
                let ts = zoned.timestamp();
                let civil = if date_only { civil } else { zoned.datetime() };
                (civil, (ts.as_second(), ts.subsec_nanosecond()))
            }
            Zone::Floating | Zone::Utc => (civil, utc_instant(civil)),
        };

        Ok(Self {
            civil,
            zone,
            date_only,
            instant,
        })
    }

    /// Parse a DATE or DATE-TIME value, a trailing `Z` marks UTC and
    /// anything else is floating.
    ///
    /// # Errors
    /// If the text is not a valid DATE or DATE-TIME.
    pub fn parse(src: &str) -> Result<Self, ParseError> {
        Self::parse_with_zone(src, &Zone::Floating)
    }

    /// Parse a DATE or DATE-TIME value carrying a TZID parameter.
    ///
    /// # Errors
    /// If the text is invalid, the zone is unknown or the value does not
    /// resolve in it.
    pub fn parse_in_zone(src: &str, tzid: &str) -> Result<Self, ParseError> {
        Self::parse_with_zone(src, &Zone::get(tzid)?)
    }

    /// Parse a DATE or DATE-TIME value, attaching `zone` unless it is UTC.
    ///
    /// # Errors
    /// If the text is invalid or the value does not resolve in `zone`.
    pub fn parse_with_zone(src: &str, zone: &Zone) -> Result<Self, ParseError> {
        let raw = parse_with("date-time", value_date_or_date_time(), src)?;
        Ok(raw.resolve(zone)?)
    }

    /// The wall-clock value.
    #[must_use]
    pub const fn civil(&self) -> DateTime {
        self.civil
    }

    /// The wall-clock date.
    #[must_use]
    pub fn date_part(&self) -> Date {
        self.civil.date()
    }

    /// The wall-clock time, midnight for date-only values.
    #[must_use]
    pub fn time_part(&self) -> Time {
        self.civil.time()
    }

    /// The zone of the value.
    #[must_use]
    pub const fn zone(&self) -> &Zone {
        &self.zone
    }

    /// The TZID of a value in a named zone.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        self.zone.tzid()
    }

    /// Whether the value is a DATE rather than a DATE-TIME.
    #[must_use]
    pub const fn is_date_only(&self) -> bool {
        self.date_only
    }

    /// Whether the value is in UTC.
    #[must_use]
    pub const fn is_utc(&self) -> bool {
        matches!(self.zone, Zone::Utc)
    }

    /// Whether the value is floating.
    #[must_use]
    pub const fn is_floating(&self) -> bool {
        matches!(self.zone, Zone::Floating)
    }

    /// The absolute instant.
    ///
    /// # Errors
    /// If the instant lies outside the supported range.
    pub fn timestamp(&self) -> Result<Timestamp, DateTimeError> {
        let (seconds, nanos) = self.instant;
        Timestamp::new(seconds, nanos).map_err(|err| DateTimeError::out_of_range(&err))
    }

    /// The same instant expressed in another zone, as a DATE-TIME.
    ///
    /// # Errors
    /// If the instant cannot be represented in the target zone.
    pub fn to_zone(&self, zone: &Zone) -> Result<Self, DateTimeError> {
        let civil = zone.time_zone().to_datetime(self.timestamp()?);
        Self::from_parts(civil, zone.clone(), false)
    }

    /// Another wall-clock value in the same zone, keeping the precision.
    ///
    /// # Errors
    /// If the value cannot be resolved in the zone.
    pub fn with_civil(&self, civil: DateTime) -> Result<Self, DateTimeError> {
        Self::from_parts(civil, self.zone.clone(), self.date_only)
    }

    /// The same wall-clock value marked as a DATE or a DATE-TIME.
    #[must_use]
    pub fn with_date_only(&self, date_only: bool) -> Self {
        Self {
            date_only,
            ..self.clone()
        }
    }

    /// Shift by `n` calendar units.
    ///
    /// Years, months, weeks and days move the wall clock, clamping the day of
    /// month when the target month is shorter. Hours, minutes and seconds
    /// are exact, so across a daylight saving transition the wall clock
    /// moves by more or less than `n` units.
    ///
    /// # Errors
    /// If the result leaves the supported range or cannot be resolved in the
    /// zone.
    pub fn add(&self, unit: Unit, n: i64) -> Result<Self, DateTimeError> {
        let span = match unit {
            Unit::Years => Span::new().try_years(n),
            Unit::Months => Span::new().try_months(n),
            Unit::Weeks => Span::new().try_weeks(n),
            Unit::Days => Span::new().try_days(n),
            Unit::Hours => Span::new().try_hours(n),
            Unit::Minutes => Span::new().try_minutes(n),
            Unit::Seconds => Span::new().try_seconds(n),
        }
        .map_err(|err| DateTimeError::out_of_range(&err))?;

        let civil = match (unit, &self.zone) {
            (Unit::Hours | Unit::Minutes | Unit::Seconds, Zone::Named { tz, .. }) => tz
                .to_zoned(self.civil)
                .and_then(|zoned| zoned.checked_add(span))
                .map(|zoned| zoned.datetime()),
            _ => self.civil.checked_add(span),
        }
        .map_err(|err| DateTimeError::out_of_range(&err))?;

        self.with_civil(civil)
    }

    /// Shift by an RFC 5545 duration: weeks and days are nominal, the time
    /// part is exact.
    ///
    /// # Errors
    /// If the result leaves the supported range or cannot be resolved.
    pub fn add_duration(&self, duration: &Duration) -> Result<Self, DateTimeError> {
        let (days, seconds) = duration.nominal_parts();
        let shifted = match days {
            0 => self.clone(),
            days => self.add(Unit::Days, days)?,
        };
        match seconds {
            0 => Ok(shifted),
            seconds => shifted.add(Unit::Seconds, seconds),
        }
    }

    pub(crate) const fn instant(&self) -> (i64, i32) {
        self.instant
    }
}

impl PartialEq for CalDateTime {
    fn eq(&self, other: &Self) -> bool {
        self.instant == other.instant && self.date_only == other.date_only
    }
}

impl Eq for CalDateTime {}

impl Hash for CalDateTime {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.instant.hash(state);
        self.date_only.hash(state);
    }
}

impl PartialOrd for CalDateTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CalDateTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.instant
            .cmp(&other.instant)
            .then(self.date_only.cmp(&other.date_only))
    }
}

impl Display for CalDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.date_only {
            let date = self.civil.date();
            write!(f, "{:04}{:02}{:02}", date.year(), date.month(), date.day())
        } else {
            write!(f, "{}", format_civil(self.civil, self.is_utc()))
        }
    }
}

fn format_civil(civil: DateTime, utc: bool) -> String {
    format!(
        "{:04}{:02}{:02}T{:02}{:02}{:02}{}",
        civil.year(),
        civil.month(),
        civil.day(),
        civil.hour(),
        civil.minute(),
        civil.second(),
        if utc { "Z" } else { "" },
    )
}

fn utc_instant(civil: DateTime) -> (i64, i32) {
    let seconds = epoch_day(civil.date()) * 86_400
        + i64::from(civil.hour()) * 3600
        + i64::from(civil.minute()) * 60
        + i64::from(civil.second());
    (seconds, civil.subsec_nanosecond())
}

/// A parsed DATE or DATE-TIME before a zone is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RawDateTime {
    pub civil: DateTime,
    pub date_only: bool,
    pub utc: bool,
}

impl RawDateTime {
    pub fn resolve(self, zone: &Zone) -> Result<CalDateTime, DateTimeError> {
        if self.utc {
            Ok(CalDateTime::utc(self.civil))
        } else {
            CalDateTime::from_parts(self.civil, zone.clone(), self.date_only)
        }
    }
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// date               = date-value
///
/// date-value         = date-fullyear date-month date-mday
/// date-fullyear      = 4DIGIT
/// date-month         = 2DIGIT        ;01-12
/// date-mday          = 2DIGIT        ;01-28, 01-29, 01-30, 01-31
///                                    ;based on month/year
/// ```
pub(crate) fn value_date<'src, I, E>() -> impl Parser<'src, I, Date, E> + Clone
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    let year = i16_0_9()
        .then(i16_0_9())
        .then(i16_0_9())
        .then(i16_0_9())
        .map(|(((a, b), c), d)| 1000 * a + 100 * b + 10 * c + d);

    let month = choice((
        just('0').ignore_then(i8_1_9()),
        just('1').ignore_then(i8_0_2()).map(|b| 10 + b),
    ));

    let day = choice((
        just('0').ignore_then(i8_1_9()),
        i8_1_2().then(i8_0_9()).map(|(a, b)| 10 * a + b),
        just('3').ignore_then(i8_0_1()).map(|b| 30 + b),
    ));

    year.then(month)
        .then(day)
        .try_map(|((year, month), day), span| {
            Date::new(year, month, day)
                .map_err(|_| E::Error::expected_found([ValueExpected::Date], None, span))
        })
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// date-time  = date "T" time ;As specified in the DATE and TIME
///
/// time         = time-hour time-minute time-second [time-utc]
/// time-utc     = "Z"
/// ```
pub(crate) fn value_date_time<'src, I, E>() -> impl Parser<'src, I, RawDateTime, E> + Clone
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    value_date()
        .then_ignore(just('T'))
        .then(time_hour())
        .then(time_minute())
        .then(time_second())
        .then(just('Z').or_not())
        .map(|((((date, hour), minute), second), utc)| RawDateTime {
            civil: date.to_datetime(civil_time(hour, minute, second)),
            date_only: false,
            utc: utc.is_some(),
        })
}

/// ```txt
/// date / date-time
/// ```
pub(crate) fn value_date_or_date_time<'src, I, E>() -> impl Parser<'src, I, RawDateTime, E> + Clone
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    choice((
        value_date_time(),
        value_date().map(|date| RawDateTime {
            civil: date.to_datetime(Time::midnight()),
            date_only: true,
            utc: false,
        }),
    ))
}

// NOTE: leap second 60 is contracted to 59
#[expect(clippy::cast_possible_wrap)]
fn civil_time(hour: u8, minute: u8, second: u8) -> Time {
    jiff::civil::time(hour as i8, minute as i8, second.min(59) as i8, 0)
}

fn time_hour<'src, I, E>() -> impl Parser<'src, I, u8, E> + Copy
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        u8_0_1().then(u8_0_9()).map(|(a, b)| 10 * a + b),
        just('2').ignore_then(u8_0_3()).map(|b| 20 + b),
    ))
}

fn time_minute<'src, I, E>() -> impl Parser<'src, I, u8, E> + Copy
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    u8_0_5().then(u8_0_9()).map(|(a, b)| 10 * a + b)
}

fn time_second<'src, I, E>() -> impl Parser<'src, I, u8, E> + Copy
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        u8_0_5().then(u8_0_9()).map(|(a, b)| 10 * a + b),
        just('6').ignore_then(just('0').ignored().to(60)), // leap second
    ))
}
