// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Period of time value type as defined in RFC 5545 Section 3.3.9, and the
//! value lists of RDATE and EXDATE.

use std::fmt::{self, Display};
use std::ops::Deref;
use std::str::FromStr;

use chumsky::extra::ParserExtra;
use chumsky::input::Input;
use chumsky::label::LabelError;
use chumsky::prelude::*;
use chumsky::span::SimpleSpan;

use crate::error::{ParseError, PeriodError};
use crate::value::datetime::{RawDateTime, value_date_or_date_time, value_date_time};
use crate::value::duration::value_duration;
use crate::value::util::{ValueExpected, parse_with};
use crate::value::{CalDateTime, Duration, Zone};

/// A span of time starting at a date-time.
///
/// A period knows its end and its duration whenever either was given, and
/// `end = start + duration` holds. A period with neither is instantaneous.
/// Equality is structural, ordering is by start, then end, then duration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    start: CalDateTime,
    end: Option<CalDateTime>,
    duration: Option<Duration>,
}

impl Period {
    /// A period between two date-times.
    ///
    /// # Errors
    /// If `end` is not after `start`.
    pub fn new(start: CalDateTime, end: CalDateTime) -> Result<Self, PeriodError> {
        if end <= start {
            return Err(PeriodError::EndNotAfterStart {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        let duration = Duration::between(&start, &end)?;
        Ok(Self {
            start,
            end: Some(end),
            duration: Some(duration),
        })
    }

    /// A period of `duration` starting at `start`.
    ///
    /// # Errors
    /// If the duration is not positive or the end cannot be computed.
    pub fn with_duration(start: CalDateTime, duration: Duration) -> Result<Self, PeriodError> {
        if !duration.is_positive() {
            return Err(PeriodError::NonPositiveDuration {
                duration: duration.to_string(),
            });
        }

        let end = start.add_duration(&duration)?;
        Ok(Self {
            start,
            end: Some(end),
            duration: Some(duration),
        })
    }

    /// An instantaneous period.
    #[must_use]
    pub const fn starting_at(start: CalDateTime) -> Self {
        Self {
            start,
            end: None,
            duration: None,
        }
    }

    /// Give an instantaneous period the `duration`, other periods keep
    /// their own.
    ///
    /// # Errors
    /// If the duration is not positive or the end cannot be computed.
    pub fn with_default_duration(self, duration: &Duration) -> Result<Self, PeriodError> {
        match self.end {
            Some(_) => Ok(self),
            None => Self::with_duration(self.start, *duration),
        }
    }

    /// Start of the period.
    #[must_use]
    pub const fn start(&self) -> &CalDateTime {
        &self.start
    }

    /// End of the period, if known.
    #[must_use]
    pub const fn end(&self) -> Option<&CalDateTime> {
        self.end.as_ref()
    }

    /// Duration of the period, if known.
    #[must_use]
    pub const fn duration(&self) -> Option<&Duration> {
        self.duration.as_ref()
    }

    /// End of the period, the start for instantaneous periods.
    #[must_use]
    pub fn effective_end(&self) -> &CalDateTime {
        self.end.as_ref().unwrap_or(&self.start)
    }

    /// Whether the period has neither end nor duration.
    #[must_use]
    pub const fn is_instantaneous(&self) -> bool {
        self.end.is_none()
    }

    /// Whether `dt` falls into the period, start inclusive and end
    /// exclusive. An instantaneous period contains only its start.
    #[must_use]
    pub fn contains(&self, dt: &CalDateTime) -> bool {
        match &self.end {
            Some(end) => self.start <= *dt && dt < end,
            None => self.start == *dt,
        }
    }

    /// Whether a boundary of either period falls into the other one.
    #[must_use]
    pub fn collides_with(&self, other: &Period) -> bool {
        self.contains(&other.start)
            || other.contains(&self.start)
            || self.contains(other.effective_end())
            || other.contains(self.effective_end())
    }

    /// Parse a PERIOD value whose date-times carry the given zone.
    ///
    /// # Errors
    /// If the text is not a valid period.
    pub fn parse_with_zone(src: &str, zone: &Zone) -> Result<Self, ParseError> {
        parse_with("period", value_period(), src)?.resolve(zone)
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.end, &self.duration) {
            (_, Some(duration)) if !self.start.is_date_only() => {
                write!(f, "{}/{duration}", self.start)
            }
            (Some(end), _) => write!(f, "{}/{end}", self.start),
            _ => write!(f, "{}", self.start),
        }
    }
}

impl FromStr for Period {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with_zone(s, &Zone::Floating)
    }
}

/// The values of one RDATE or EXDATE property: dates, date-times or periods.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeriodList(Vec<Period>);

impl PeriodList {
    /// An empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a period.
    pub fn push(&mut self, period: Period) {
        self.0.push(period);
    }

    /// Parse a COMMA-separated list of DATE, DATE-TIME or PERIOD values
    /// whose date-times carry the given zone.
    ///
    /// # Errors
    /// If any of the values is invalid.
    pub fn parse(src: &str, zone: &Zone) -> Result<Self, ParseError> {
        parse_with("period list", values_period_or_date_time(), src)?
            .into_iter()
            .map(|raw| raw.resolve(zone))
            .collect()
    }
}

impl Deref for PeriodList {
    type Target = [Period];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Period>> for PeriodList {
    fn from(periods: Vec<Period>) -> Self {
        Self(periods)
    }
}

impl FromIterator<Period> for PeriodList {
    fn from_iter<T: IntoIterator<Item = Period>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for PeriodList {
    type Item = Period;
    type IntoIter = std::vec::IntoIter<Period>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PeriodList {
    type Item = &'a Period;
    type IntoIter = std::slice::Iter<'a, Period>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromStr for PeriodList {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, &Zone::Floating)
    }
}

#[derive(Debug, Clone, Copy)]
enum RawEnd {
    Explicit(RawDateTime),
    Duration(Duration),
}

/// A parsed period, or a single date or date-time, before zones attach.
#[derive(Debug, Clone, Copy)]
struct RawPeriod {
    start: RawDateTime,
    end: Option<RawEnd>,
}

impl RawPeriod {
    fn resolve(self, zone: &Zone) -> Result<Period, ParseError> {
        let start = self.start.resolve(zone)?;
        let period = match self.end {
            None => Period::starting_at(start),
            Some(RawEnd::Explicit(end)) => Period::new(start, end.resolve(zone)?)?,
            Some(RawEnd::Duration(duration)) => Period::with_duration(start, duration)?,
        };
        Ok(period)
    }
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// period     = period-explicit / period-start
///
/// period-explicit = date-time "/" date-time
/// ; [ISO.8601.2004] complete representation basic format for a
/// ; period of time consisting of a start and end.  The start MUST
/// ; be before the end.
///
/// period-start = date-time "/" dur-value
/// ; [ISO.8601.2004] complete representation basic format for a
/// ; period of time consisting of a start and positive duration
/// ; of time.
/// ```
fn value_period<'src, I, E>() -> impl Parser<'src, I, RawPeriod, E> + Clone
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    // Both date-times must have the same UTC flag (both UTC or both floating)
    let explicit = value_date_time()
        .then_ignore(just('/'))
        .then(value_date_time())
        .try_map(|(start, end), span| {
            if start.utc == end.utc {
                Ok(RawPeriod {
                    start,
                    end: Some(RawEnd::Explicit(end)),
                })
            } else {
                Err(E::Error::expected_found(
                    [ValueExpected::MismatchedTimezone],
                    None,
                    span,
                ))
            }
        });

    let start = value_date_time()
        .then_ignore(just('/'))
        .then(value_duration())
        .map(|(start, duration)| RawPeriod {
            start,
            end: Some(RawEnd::Duration(duration)),
        });

    choice((explicit, start))
}

/// RDATE and EXDATE values, a COMMA-separated list of periods, dates and
/// date-times.
fn values_period_or_date_time<'src, I, E>() -> impl Parser<'src, I, Vec<RawPeriod>, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    let single = value_date_or_date_time().map(|start| RawPeriod { start, end: None });

    choice((value_period(), single))
        .separated_by(just(','))
        .at_least(1)
        .collect()
}

#[cfg(test)]
mod tests {
    use jiff::civil::{date, datetime};

    use super::*;

    fn at(hour: i8) -> CalDateTime {
        CalDateTime::floating(datetime(2024, 1, 1, hour, 0, 0, 0))
    }

    #[test]
    fn derives_duration_from_explicit_end() {
        let period = Period::new(at(9), at(11)).unwrap();
        assert_eq!(period.duration(), Some(&Duration::time(2, 0, 0)));
        assert_eq!(period.effective_end(), &at(11));
    }

    #[test]
    fn derives_end_from_duration() {
        let period = Period::with_duration(at(9), Duration::time(1, 30, 0)).unwrap();
        let end = CalDateTime::floating(datetime(2024, 1, 1, 10, 30, 0, 0));
        assert_eq!(period.end(), Some(&end));
    }

    #[test]
    fn rejects_inverted_and_empty_periods() {
        assert!(matches!(
            Period::new(at(11), at(9)),
            Err(PeriodError::EndNotAfterStart { .. })
        ));
        assert!(Period::new(at(9), at(9)).is_err());
        assert!(matches!(
            Period::with_duration(at(9), "-PT1H".parse().unwrap()),
            Err(PeriodError::NonPositiveDuration { .. })
        ));
    }

    #[test]
    fn contains_start_but_not_end() {
        let period = Period::new(at(9), at(11)).unwrap();
        assert!(period.contains(&at(9)));
        assert!(period.contains(&at(10)));
        assert!(!period.contains(&at(11)));
        assert!(!period.contains(&at(8)));

        let instant = Period::starting_at(at(9));
        assert!(instant.contains(&at(9)));
        assert!(!instant.contains(&at(10)));
        assert_eq!(instant.effective_end(), &at(9));
    }

    #[test]
    fn detects_collisions() {
        let morning = Period::new(at(9), at(12)).unwrap();
        let noon = Period::new(at(11), at(13)).unwrap();
        let evening = Period::new(at(18), at(20)).unwrap();
        let inner = Period::new(at(10), at(11)).unwrap();

        assert!(morning.collides_with(&noon));
        assert!(noon.collides_with(&morning));
        assert!(morning.collides_with(&inner));
        assert!(inner.collides_with(&morning));
        assert!(!morning.collides_with(&evening));
    }

    #[test]
    fn applies_default_duration_only_when_missing() {
        let day = Duration::days(1);
        let start = CalDateTime::date(date(2024, 1, 1));
        let period = Period::starting_at(start.clone())
            .with_default_duration(&day)
            .unwrap();
        assert_eq!(period.end(), Some(&CalDateTime::date(date(2024, 1, 2))));

        let explicit = Period::new(at(9), at(10)).unwrap();
        let kept = explicit.clone().with_default_duration(&day).unwrap();
        assert_eq!(kept, explicit);
    }

    #[test]
    fn orders_by_start_first() {
        let late_short = Period::new(at(10), at(11)).unwrap();
        let early_long = Period::new(at(9), at(12)).unwrap();
        assert!(early_long < late_short);
        assert_ne!(
            Period::new(at(9), at(10)).unwrap(),
            Period::starting_at(at(9))
        );
    }

    #[test]
    fn parses_periods() {
        let period: Period = "19970101T180000Z/19970102T070000Z".parse().unwrap();
        assert!(period.start().is_utc());
        assert_eq!(period.duration(), Some(&Duration::time(13, 0, 0)));

        let period: Period = "19970101T180000Z/PT5H30M".parse().unwrap();
        assert_eq!(
            period.end().map(CalDateTime::civil),
            Some(datetime(1997, 1, 1, 23, 30, 0, 0))
        );

        let fail_cases = [
            "19970101T180000Z/19970102T070000", // mismatched timezone
            "19970102T070000Z/19970101T180000Z", // end before start
            "19970101T180000Z",                  // missing end
            "19970101/19970102",                 // dates are not allowed
        ];
        for src in fail_cases {
            assert!(src.parse::<Period>().is_err(), "Parse {src} should fail");
        }
    }

    #[test]
    fn parses_period_lists() {
        let list: PeriodList = "19970714,19970101T180000Z/PT5H30M,19970715T090000"
            .parse()
            .unwrap();
        assert_eq!(list.len(), 3);

        let first = list.first().unwrap();
        assert!(first.start().is_date_only());
        assert!(first.is_instantaneous());
        assert!(!list.get(1).unwrap().is_instantaneous());
        assert!(list.get(2).unwrap().start().is_floating());

        assert!("".parse::<PeriodList>().is_err());
        assert!("19970714,".parse::<PeriodList>().is_err());
    }

    #[test]
    fn displays_periods() {
        let cases = [
            ("19970101T180000Z/PT5H30M", "19970101T180000Z/PT5H30M"),
            ("19970101T180000Z/19970102T070000Z", "19970101T180000Z/PT13H"),
        ];
        for (src, expected) in cases {
            assert_eq!(src.parse::<Period>().unwrap().to_string(), expected);
        }

        let list: PeriodList = "19970714".parse().unwrap();
        assert_eq!(list.first().unwrap().to_string(), "19970714");
    }
}
