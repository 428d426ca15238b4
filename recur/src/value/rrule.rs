// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Recurrence patterns, the values of RRULE and EXRULE.

use std::fmt::{self, Display};
use std::str::FromStr;

use chumsky::extra::ParserExtra;
use chumsky::input::Input;
use chumsky::label::LabelError;
use chumsky::prelude::*;
use chumsky::span::SimpleSpan;
use jiff::civil::Weekday;

use crate::error::{ParseError, RecurrenceError};
use crate::keyword::{
    KW_DAY_FR, KW_DAY_MO, KW_DAY_SA, KW_DAY_SU, KW_DAY_TH, KW_DAY_TU, KW_DAY_WE, KW_RRULE_BYDAY,
    KW_RRULE_BYHOUR, KW_RRULE_BYMINUTE, KW_RRULE_BYMONTH, KW_RRULE_BYMONTHDAY, KW_RRULE_BYSECOND,
    KW_RRULE_BYSETPOS, KW_RRULE_BYWEEKNO, KW_RRULE_BYYEARDAY, KW_RRULE_COUNT, KW_RRULE_FREQ,
    KW_RRULE_FREQ_DAILY, KW_RRULE_FREQ_HOURLY, KW_RRULE_FREQ_MINUTELY, KW_RRULE_FREQ_MONTHLY,
    KW_RRULE_FREQ_SECONDLY, KW_RRULE_FREQ_WEEKLY, KW_RRULE_FREQ_YEARLY, KW_RRULE_INTERVAL,
    KW_RRULE_UNTIL, KW_RRULE_WKST,
};
use crate::value::CalDateTime;
use crate::value::Zone;
use crate::value::datetime::{RawDateTime, value_date_or_date_time};
use crate::value::util::{
    ValueExpected, i8_0_1, i8_0_3, i8_0_9, i8_1_2, i8_1_4, i8_1_9, i16_0_5, i16_0_6, i16_0_9,
    i16_1_2, i16_1_9, is_positive, parse_with, u8_0_1, u8_0_2, u8_0_3, u8_0_5, u8_0_9,
    u8_1_9, u32_non_zero,
};

/// Recurrence rule
///
/// The fields mirror the rule parts of RFC 5545 Section 3.3.10. Values built
/// programmatically are checked by [`RecurrencePattern::validate`] before
/// they are expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrencePattern {
    /// Frequency of recurrence
    pub freq: Frequency,
    /// Until date for recurrence, inclusive
    pub until: Option<CalDateTime>,
    /// Number of occurrences
    pub count: Option<u32>,
    /// Interval between recurrences, 1 if unset
    pub interval: Option<u32>,
    /// Second specifier
    pub by_second: Vec<u8>,
    /// Minute specifier
    pub by_minute: Vec<u8>,
    /// Hour specifier
    pub by_hour: Vec<u8>,
    /// Day of month specifier
    pub by_month_day: Vec<i8>,
    /// Day of year specifier
    pub by_year_day: Vec<i16>,
    /// Week number specifier
    pub by_week_no: Vec<i8>,
    /// Month specifier
    pub by_month: Vec<u8>,
    /// Day of week specifier
    pub by_day: Vec<WeekDayNum>,
    /// Position in the set of each interval
    pub by_set_pos: Vec<i16>,
    /// Start day of week, Monday if unset
    pub wkst: Option<WeekDay>,
    /// Frequencies refused for evaluation
    pub restriction: RestrictionType,
    /// What happens when the frequency is refused
    pub evaluation_mode: EvaluationMode,
}

impl RecurrencePattern {
    /// A pattern of the given frequency without any other rule part.
    #[must_use]
    pub const fn new(freq: Frequency) -> Self {
        Self {
            freq,
            until: None,
            count: None,
            interval: None,
            by_second: Vec::new(),
            by_minute: Vec::new(),
            by_hour: Vec::new(),
            by_month_day: Vec::new(),
            by_year_day: Vec::new(),
            by_week_no: Vec::new(),
            by_month: Vec::new(),
            by_day: Vec::new(),
            by_set_pos: Vec::new(),
            wkst: None,
            restriction: RestrictionType::NoRestriction,
            evaluation_mode: EvaluationMode::AdjustAutomatically,
        }
    }

    /// Set the COUNT rule part.
    #[must_use]
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// Set the UNTIL rule part.
    #[must_use]
    pub fn with_until(mut self, until: CalDateTime) -> Self {
        self.until = Some(until);
        self
    }

    /// Set the INTERVAL rule part.
    #[must_use]
    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Set the BYDAY rule part.
    #[must_use]
    pub fn with_by_day(mut self, by_day: impl IntoIterator<Item = WeekDayNum>) -> Self {
        self.by_day = by_day.into_iter().collect();
        self
    }

    /// Set the WKST rule part.
    #[must_use]
    pub fn with_wkst(mut self, wkst: WeekDay) -> Self {
        self.wkst = Some(wkst);
        self
    }

    /// Set the restriction policy.
    #[must_use]
    pub fn with_restriction(mut self, restriction: RestrictionType, mode: EvaluationMode) -> Self {
        self.restriction = restriction;
        self.evaluation_mode = mode;
        self
    }

    /// The step between base periods.
    #[must_use]
    pub fn interval_or_default(&self) -> u32 {
        self.interval.unwrap_or(1)
    }

    /// The first day of the week.
    #[must_use]
    pub fn week_start(&self) -> WeekDay {
        self.wkst.unwrap_or(WeekDay::Monday)
    }

    /// Check the invariants of RFC 5545 Section 3.3.10.
    ///
    /// # Errors
    /// If the interval or count is zero, both COUNT and UNTIL are set, or a
    /// BYxxx value is out of its range.
    pub fn validate(&self) -> Result<(), RecurrenceError> {
        if let Some(interval @ 0) = self.interval {
            return Err(RecurrenceError::InvalidInterval { interval });
        }
        if self.count == Some(0) {
            return Err(RecurrenceError::ZeroCount);
        }
        if self.count.is_some() && self.until.is_some() {
            return Err(RecurrenceError::CountUntilConflict);
        }

        check_range(RulePart::BySecond, &self.by_second, 0..=60, false)?;
        check_range(RulePart::ByMinute, &self.by_minute, 0..=59, false)?;
        check_range(RulePart::ByHour, &self.by_hour, 0..=23, false)?;
        check_range(RulePart::ByMonthDay, &self.by_month_day, 1..=31, true)?;
        check_range(RulePart::ByYearDay, &self.by_year_day, 1..=366, true)?;
        check_range(RulePart::ByWeekNo, &self.by_week_no, 1..=53, true)?;
        check_range(RulePart::ByMonth, &self.by_month, 1..=12, false)?;
        check_range(RulePart::BySetPos, &self.by_set_pos, 1..=366, true)?;
        let ordinals: Vec<i8> = self.by_day.iter().filter_map(|d| d.occurrence).collect();
        check_range(RulePart::ByDay, &ordinals, 1..=53, true)?;
        Ok(())
    }

    /// Validate the pattern and apply its restriction policy, giving the
    /// pattern that is actually expanded.
    ///
    /// With [`EvaluationMode::AdjustAutomatically`] a refused frequency is
    /// raised to the finest allowed one, dropping the time rule parts finer
    /// than it.
    ///
    /// # Errors
    /// If the pattern is invalid, or its frequency is refused and the mode is
    /// [`EvaluationMode::ThrowException`].
    pub fn restricted(&self) -> Result<Self, RecurrenceError> {
        self.validate()?;

        let Some(finest) = self.restriction.finest_allowed() else {
            return Ok(self.clone());
        };
        if self.freq >= finest {
            return Ok(self.clone());
        }

        match self.evaluation_mode {
            EvaluationMode::ThrowException => Err(RecurrenceError::FrequencyRestricted {
                frequency: self.freq,
            }),
            EvaluationMode::AdjustAutomatically => {
                tracing::warn!(from = %self.freq, to = %finest, "adjusting restricted frequency");
                let mut adjusted = self.clone();
                adjusted.freq = finest;
                if finest >= Frequency::Minutely {
                    adjusted.by_second.clear();
                }
                if finest >= Frequency::Hourly {
                    adjusted.by_minute.clear();
                }
                if finest >= Frequency::Daily {
                    adjusted.by_hour.clear();
                }
                Ok(adjusted)
            }
        }
    }

    /// Parse an RRULE or EXRULE value, a floating UNTIL takes `zone`.
    ///
    /// # Errors
    /// If the text does not follow the grammar or the rule is invalid.
    pub fn parse_with_zone(src: &str, zone: &Zone) -> Result<Self, ParseError> {
        let parts = parse_with("recurrence rule", value_rrule(), src)?;
        let until = parts.until.map(|until| until.resolve(zone)).transpose()?;
        let pattern = Self {
            until,
            ..parts.pattern
        };
        pattern.validate()?;
        Ok(pattern)
    }
}

fn check_range<T>(
    part: RulePart,
    values: &[T],
    range: std::ops::RangeInclusive<i32>,
    signed: bool,
) -> Result<(), RecurrenceError>
where
    T: Copy + Into<i32>,
{
    for &value in values {
        let value: i32 = value.into();
        let magnitude = if signed { value.abs() } else { value };
        if !range.contains(&magnitude) {
            return Err(RecurrenceError::OutOfRange { part, value });
        }
    }
    Ok(())
}

impl FromStr for RecurrencePattern {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with_zone(s, &Zone::Floating)
    }
}

impl Display for RecurrencePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list<T: Display>(f: &mut fmt::Formatter<'_>, kw: &str, values: &[T]) -> fmt::Result {
            if values.is_empty() {
                return Ok(());
            }
            write!(f, ";{kw}=")?;
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{value}")?;
            }
            Ok(())
        }

        write!(f, "{KW_RRULE_FREQ}={}", self.freq)?;
        if let Some(until) = &self.until {
            write!(f, ";{KW_RRULE_UNTIL}={until}")?;
        }
        if let Some(count) = self.count {
            write!(f, ";{KW_RRULE_COUNT}={count}")?;
        }
        if let Some(interval) = self.interval {
            write!(f, ";{KW_RRULE_INTERVAL}={interval}")?;
        }
        list(f, KW_RRULE_BYSECOND, &self.by_second)?;
        list(f, KW_RRULE_BYMINUTE, &self.by_minute)?;
        list(f, KW_RRULE_BYHOUR, &self.by_hour)?;
        list(f, KW_RRULE_BYDAY, &self.by_day)?;
        list(f, KW_RRULE_BYMONTHDAY, &self.by_month_day)?;
        list(f, KW_RRULE_BYYEARDAY, &self.by_year_day)?;
        list(f, KW_RRULE_BYWEEKNO, &self.by_week_no)?;
        list(f, KW_RRULE_BYMONTH, &self.by_month)?;
        list(f, KW_RRULE_BYSETPOS, &self.by_set_pos)?;
        if let Some(wkst) = self.wkst {
            write!(f, ";{KW_RRULE_WKST}={wkst}")?;
        }
        Ok(())
    }
}

/// Recurrence frequency, ordered from the finest to the coarsest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, strum::EnumIter)]
#[expect(missing_docs)]
pub enum Frequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Secondly => write!(f, "{KW_RRULE_FREQ_SECONDLY}"),
            Frequency::Minutely => write!(f, "{KW_RRULE_FREQ_MINUTELY}"),
            Frequency::Hourly => write!(f, "{KW_RRULE_FREQ_HOURLY}"),
            Frequency::Daily => write!(f, "{KW_RRULE_FREQ_DAILY}"),
            Frequency::Weekly => write!(f, "{KW_RRULE_FREQ_WEEKLY}"),
            Frequency::Monthly => write!(f, "{KW_RRULE_FREQ_MONTHLY}"),
            Frequency::Yearly => write!(f, "{KW_RRULE_FREQ_YEARLY}"),
        }
    }
}

/// Day of week with optional occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekDayNum {
    /// Day of the week
    pub day: WeekDay,
    /// Occurrence within the month or year, negative from its end
    pub occurrence: Option<i8>,
}

impl WeekDayNum {
    /// Every `day` of the period.
    #[must_use]
    pub const fn every(day: WeekDay) -> Self {
        Self {
            day,
            occurrence: None,
        }
    }

    /// The `occurrence`-th `day` of the period.
    #[must_use]
    pub const fn nth(occurrence: i8, day: WeekDay) -> Self {
        Self {
            day,
            occurrence: Some(occurrence),
        }
    }
}

impl Display for WeekDayNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.occurrence {
            Some(n) => write!(f, "{n}{}", self.day),
            None => write!(f, "{}", self.day),
        }
    }
}

/// Day of the week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[expect(missing_docs)]
pub enum WeekDay {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Display for WeekDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeekDay::Sunday => write!(f, "{KW_DAY_SU}"),
            WeekDay::Monday => write!(f, "{KW_DAY_MO}"),
            WeekDay::Tuesday => write!(f, "{KW_DAY_TU}"),
            WeekDay::Wednesday => write!(f, "{KW_DAY_WE}"),
            WeekDay::Thursday => write!(f, "{KW_DAY_TH}"),
            WeekDay::Friday => write!(f, "{KW_DAY_FR}"),
            WeekDay::Saturday => write!(f, "{KW_DAY_SA}"),
        }
    }
}

impl From<WeekDay> for Weekday {
    fn from(day: WeekDay) -> Self {
        match day {
            WeekDay::Sunday => Weekday::Sunday,
            WeekDay::Monday => Weekday::Monday,
            WeekDay::Tuesday => Weekday::Tuesday,
            WeekDay::Wednesday => Weekday::Wednesday,
            WeekDay::Thursday => Weekday::Thursday,
            WeekDay::Friday => Weekday::Friday,
            WeekDay::Saturday => Weekday::Saturday,
        }
    }
}

impl From<Weekday> for WeekDay {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Sunday => WeekDay::Sunday,
            Weekday::Monday => WeekDay::Monday,
            Weekday::Tuesday => WeekDay::Tuesday,
            Weekday::Wednesday => WeekDay::Wednesday,
            Weekday::Thursday => WeekDay::Thursday,
            Weekday::Friday => WeekDay::Friday,
            Weekday::Saturday => WeekDay::Saturday,
        }
    }
}

/// Rule parts holding value lists, named as in the rule text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "UPPERCASE")]
#[expect(missing_docs)]
pub enum RulePart {
    BySecond,
    ByMinute,
    ByHour,
    ByDay,
    ByMonthDay,
    ByYearDay,
    ByWeekNo,
    ByMonth,
    BySetPos,
}

/// Frequencies refused for evaluation, finer frequencies are expensive to
/// expand over long windows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestrictionType {
    /// Every frequency is allowed
    #[default]
    NoRestriction,

    /// SECONDLY is refused
    RestrictSecondly,

    /// SECONDLY and MINUTELY are refused
    RestrictMinutely,

    /// SECONDLY, MINUTELY and HOURLY are refused
    RestrictHourly,
}

impl RestrictionType {
    /// The finest frequency allowed, `None` if all are.
    #[must_use]
    pub const fn finest_allowed(self) -> Option<Frequency> {
        match self {
            RestrictionType::NoRestriction => None,
            RestrictionType::RestrictSecondly => Some(Frequency::Minutely),
            RestrictionType::RestrictMinutely => Some(Frequency::Hourly),
            RestrictionType::RestrictHourly => Some(Frequency::Daily),
        }
    }
}

/// How a refused frequency is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvaluationMode {
    /// Raise the frequency to the finest allowed one
    #[default]
    AdjustAutomatically,

    /// Fail with [`RecurrenceError::FrequencyRestricted`]
    ThrowException,
}

/// A parsed rule whose UNTIL still lacks its zone.
#[derive(Debug, Clone)]
struct RuleParts {
    pattern: RecurrencePattern,
    until: Option<RawDateTime>,
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// recur           = recur-rule-part *( ";" recur-rule-part )
///                 ;
///                 ; The rule parts are not ordered in any
///                 ; particular sequence.
///                 ;
///                 ; The FREQ rule part is REQUIRED,
///                 ; but MUST NOT occur more than once.
///                 ;
///                 ; The UNTIL or COUNT rule parts are OPTIONAL,
///                 ; but they MUST NOT occur in the same 'recur'.
///                 ;
///                 ; The other rule parts are OPTIONAL,
///                 ; but MUST NOT occur more than once.
/// ```
fn value_rrule<'src, I, E>() -> impl Parser<'src, I, RuleParts, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    recur_rule_part()
        .separated_by(just(';'))
        .at_least(1)
        .collect()
        .try_map(build_from_parts::<I, E::Error>)
}

fn build_from_parts<'src, I, Err>(parts: Vec<Part>, span: I::Span) -> Result<RuleParts, Err>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    Err: LabelError<'src, I, ValueExpected>,
{
    fn set_once<T>(slot: &mut Option<T>, value: T) -> bool {
        let vacant = slot.is_none();
        if vacant {
            *slot = Some(value);
        }
        vacant
    }

    let mut freq = None;
    let mut until = None;
    let mut count = None;
    let mut interval = None;
    let mut by_second = None;
    let mut by_minute = None;
    let mut by_hour = None;
    let mut by_month_day = None;
    let mut by_year_day = None;
    let mut by_week_no = None;
    let mut by_month = None;
    let mut by_day = None;
    let mut by_set_pos = None;
    let mut wkst = None;

    for part in parts {
        let vacant = match part {
            Part::Freq(v) => set_once(&mut freq, v),
            Part::Until(v) => set_once(&mut until, v),
            Part::Count(v) => set_once(&mut count, v),
            Part::Interval(v) => set_once(&mut interval, v),
            Part::BySecond(v) => set_once(&mut by_second, v),
            Part::ByMinute(v) => set_once(&mut by_minute, v),
            Part::ByHour(v) => set_once(&mut by_hour, v),
            Part::ByMonthDay(v) => set_once(&mut by_month_day, v),
            Part::ByYearDay(v) => set_once(&mut by_year_day, v),
            Part::ByWeekNo(v) => set_once(&mut by_week_no, v),
            Part::ByMonth(v) => set_once(&mut by_month, v),
            Part::ByDay(v) => set_once(&mut by_day, v),
            Part::BySetPos(v) => set_once(&mut by_set_pos, v),
            Part::Wkst(v) => set_once(&mut wkst, v),
        };
        if !vacant {
            return Err(Err::expected_found(
                [ValueExpected::RRuleDuplicatePart],
                None,
                span,
            ));
        }
    }

    // Validate required FREQ
    let freq =
        freq.ok_or_else(|| Err::expected_found([ValueExpected::RRuleRequiredFreq], None, span))?;

    Ok(RuleParts {
        pattern: RecurrencePattern {
            freq,
            until: None,
            count,
            interval,
            by_second: by_second.unwrap_or_default(),
            by_minute: by_minute.unwrap_or_default(),
            by_hour: by_hour.unwrap_or_default(),
            by_month_day: by_month_day.unwrap_or_default(),
            by_year_day: by_year_day.unwrap_or_default(),
            by_week_no: by_week_no.unwrap_or_default(),
            by_month: by_month.unwrap_or_default(),
            by_day: by_day.unwrap_or_default(),
            by_set_pos: by_set_pos.unwrap_or_default(),
            wkst,
            ..RecurrencePattern::new(freq)
        },
        until,
    })
}

#[derive(Debug, Clone)]
enum Part {
    Freq(Frequency),
    Until(RawDateTime),
    Count(u32),
    Interval(u32),
    BySecond(Vec<u8>),
    ByMinute(Vec<u8>),
    ByHour(Vec<u8>),
    ByMonthDay(Vec<i8>),
    ByYearDay(Vec<i16>),
    ByWeekNo(Vec<i8>),
    ByMonth(Vec<u8>),
    ByDay(Vec<WeekDayNum>),
    BySetPos(Vec<i16>),
    Wkst(WeekDay),
}

/// ```txt
/// recur-rule-part = ( "FREQ" "=" freq )
///                 / ( "UNTIL" "=" enddate )
///                 / ( "COUNT" "=" 1*DIGIT )
///                 / ( "INTERVAL" "=" 1*DIGIT )
///                 / ( "BYSECOND" "=" byseclist )
///                 / ( "BYMINUTE" "=" byminlist )
///                 / ( "BYHOUR" "=" byhrlist )
///                 / ( "BYDAY" "=" bywdaylist )
///                 / ( "BYMONTHDAY" "=" bymodaylist )
///                 / ( "BYYEARDAY" "=" byyrdaylist )
///                 / ( "BYWEEKNO" "=" bywknolist )
///                 / ( "BYMONTH" "=" bymolist )
///                 / ( "BYSETPOS" "=" bysplist )
///                 / ( "WKST" "=" weekday )
/// ```
fn recur_rule_part<'src, I, E>() -> impl Parser<'src, I, Part, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    let kw = |kw| just(kw).ignore_then(just('='));

    choice((
        kw(KW_RRULE_FREQ).ignore_then(freq()).map(Part::Freq),
        // enddate = date / date-time
        kw(KW_RRULE_UNTIL)
            .ignore_then(value_date_or_date_time())
            .map(Part::Until),
        kw(KW_RRULE_COUNT)
            .ignore_then(u32_non_zero())
            .map(Part::Count),
        kw(KW_RRULE_INTERVAL)
            .ignore_then(u32_non_zero())
            .map(Part::Interval),
        kw(KW_RRULE_BYSECOND)
            .ignore_then(seconds().separated_by(just(',')).at_least(1).collect())
            .map(Part::BySecond),
        kw(KW_RRULE_BYMINUTE)
            .ignore_then(minutes().separated_by(just(',')).at_least(1).collect())
            .map(Part::ByMinute),
        kw(KW_RRULE_BYHOUR)
            .ignore_then(hour().separated_by(just(',')).at_least(1).collect())
            .map(Part::ByHour),
        kw(KW_RRULE_BYDAY)
            .ignore_then(weekdaynum().separated_by(just(',')).at_least(1).collect())
            .map(Part::ByDay),
        kw(KW_RRULE_BYMONTHDAY)
            .ignore_then(signed(ordmoday()).separated_by(just(',')).at_least(1).collect())
            .map(Part::ByMonthDay),
        kw(KW_RRULE_BYYEARDAY)
            .ignore_then(signed(ordyrday()).separated_by(just(',')).at_least(1).collect())
            .map(Part::ByYearDay),
        kw(KW_RRULE_BYWEEKNO)
            .ignore_then(signed(ordwk()).separated_by(just(',')).at_least(1).collect())
            .map(Part::ByWeekNo),
        kw(KW_RRULE_BYMONTH)
            .ignore_then(monthnum().separated_by(just(',')).at_least(1).collect())
            .map(Part::ByMonth),
        // setposday = yeardaynum
        kw(KW_RRULE_BYSETPOS)
            .ignore_then(signed(ordyrday()).separated_by(just(',')).at_least(1).collect())
            .map(Part::BySetPos),
        kw(KW_RRULE_WKST).ignore_then(weekday()).map(Part::Wkst),
    ))
}

/// ```txt
/// freq        = "SECONDLY" / "MINUTELY" / "HOURLY" / "DAILY"
///             / "WEEKLY" / "MONTHLY" / "YEARLY"
/// ```
fn freq<'src, I, E>() -> impl Parser<'src, I, Frequency, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        just(KW_RRULE_FREQ_SECONDLY).to(Frequency::Secondly),
        just(KW_RRULE_FREQ_MINUTELY).to(Frequency::Minutely),
        just(KW_RRULE_FREQ_HOURLY).to(Frequency::Hourly),
        just(KW_RRULE_FREQ_DAILY).to(Frequency::Daily),
        just(KW_RRULE_FREQ_WEEKLY).to(Frequency::Weekly),
        just(KW_RRULE_FREQ_MONTHLY).to(Frequency::Monthly),
        just(KW_RRULE_FREQ_YEARLY).to(Frequency::Yearly),
    ))
}

/// ```txt
/// seconds     = 1*2DIGIT       ;0 to 60
/// ```
fn seconds<'src, I, E>() -> impl Parser<'src, I, u8, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        u8_0_5().then(u8_0_9()).map(|(a, b)| a * 10 + b), // 00-59
        just("60").to(60),                                // 60
        u8_0_9(),                                         // 0-9
    ))
}

/// ```txt
/// minutes     = 1*2DIGIT       ;0 to 59
/// ```
fn minutes<'src, I, E>() -> impl Parser<'src, I, u8, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        u8_0_5().then(u8_0_9()).map(|(a, b)| a * 10 + b), // 00-59
        u8_0_9(),                                         // 0-9
    ))
}

/// ```txt
/// hour        = 1*2DIGIT       ;0 to 23
/// ```
fn hour<'src, I, E>() -> impl Parser<'src, I, u8, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        u8_0_1().then(u8_0_9()).map(|(a, b)| a * 10 + b), // 00-19
        just('2').ignore_then(u8_0_3()).map(|b| 20 + b),  // 20-23
        u8_0_9(),                                         // 0-9
    ))
}

/// ```txt
/// weekdaynum  = [[plus / minus] ordwk] weekday
/// plus        = "+"
/// minus       = "-"
/// ```
fn weekdaynum<'src, I, E>() -> impl Parser<'src, I, WeekDayNum, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    signed(ordwk())
        .or_not()
        .then(weekday())
        .map(|(occurrence, day)| WeekDayNum { day, occurrence })
}

/// ```txt
/// ordwk       = 1*2DIGIT       ;1 to 53
/// ```
fn ordwk<'src, I, E>() -> impl Parser<'src, I, i8, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        i8_1_4().then(i8_0_9()).map(|(a, b)| a * 10 + b), // 10-49
        just('5').ignore_then(i8_0_3()).map(|a| 50 + a),  // 50-53
        just('0').ignore_then(i8_1_9()),                  // 01-09
        i8_1_9(),                                         // 1-9
    ))
}

/// ```txt
/// weekday     = "SU" / "MO" / "TU" / "WE" / "TH" / "FR" / "SA"
/// ```
fn weekday<'src, I, E>() -> impl Parser<'src, I, WeekDay, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        just(KW_DAY_SU).to(WeekDay::Sunday),
        just(KW_DAY_MO).to(WeekDay::Monday),
        just(KW_DAY_TU).to(WeekDay::Tuesday),
        just(KW_DAY_WE).to(WeekDay::Wednesday),
        just(KW_DAY_TH).to(WeekDay::Thursday),
        just(KW_DAY_FR).to(WeekDay::Friday),
        just(KW_DAY_SA).to(WeekDay::Saturday),
    ))
}

/// ```txt
/// ordmoday    = 1*2DIGIT       ;1 to 31
/// ```
fn ordmoday<'src, I, E>() -> impl Parser<'src, I, i8, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        i8_1_2().then(i8_0_9()).map(|(a, b)| a * 10 + b), // 10-29
        just('3').ignore_then(i8_0_1()).map(|a| 30 + a),  // 30-31
        just('0').or_not().ignore_then(i8_1_9()),         // 1-9 / 01-09
    ))
}

/// ```txt
/// ordyrday    = 1*3DIGIT      ;1 to 366
/// ```
fn ordyrday<'src, I, E>() -> impl Parser<'src, I, i16, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    let i16_1_99 = i16_1_9().then(i16_0_9().or_not()).map(|(a, b)| match b {
        Some(b) => a * 10 + b, // 10-99
        None => a,             // 1-9
    });

    choice((
        just('3').ignore_then(choice((
            just('6').ignore_then(i16_0_6()).map(|a| 360 + a), // 360- 366
            i16_0_5().then(i16_0_9()).map(|(a, b)| 300 + a * 10 + b), // 300-359
        ))),
        i16_1_2()
            .then(i16_0_9())
            .then(i16_0_9())
            .map(|((a, b), c)| a * 100 + b * 10 + c), // 100-299
        just('0').or_not().ignore_then(choice((
            just('0').ignore_then(i16_1_9()), // 001-009
            i16_1_99,                         // 1-9 / 10-99 / 01-09 / 010-099
        ))),
    ))
}

/// ```txt
/// monthnum    = 1*2DIGIT       ;1 to 12
/// ```
fn monthnum<'src, I, E>() -> impl Parser<'src, I, u8, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        just('0').ignore_then(u8_1_9()),                 // 01-09
        just('1').ignore_then(u8_0_2()).map(|a| 10 + a), // 10-12
        u8_1_9(),                                        // 1-9
    ))
}

/// ```txt
/// [plus / minus] n
/// ```
fn signed<'src, I, E, T, P>(ord: P) -> impl Parser<'src, I, T, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    T: std::ops::Neg<Output = T>,
    P: Parser<'src, I, T, E>,
{
    is_positive()
        .then(ord)
        .map(|(positive, n)| if positive { n } else { -n })
}
