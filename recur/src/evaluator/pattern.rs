// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeSet;

use jiff::civil::{Date, DateTime, Time, Weekday};

use crate::calendar::{
    date_from_epoch_day, days_between, epoch_day, first_week_start, is_nth_weekday_of_month,
    is_nth_weekday_of_year, week_number, week_start, weeks_in_year,
};
use crate::config::EvaluationOptions;
use crate::error::EvaluationError;
use crate::evaluator::table::{ByRule, OrdinalScope, by_rule, is_active, ordinal_scope};
use crate::evaluator::{EvaluationBounds, EvaluationCache, Evaluator, within};
use crate::value::{
    CalDateTime, Frequency, Period, RecurrencePattern, RulePart, WeekDay, WeekDayNum,
};

/// Expands one RRULE or EXRULE.
///
/// The pattern is seeded by the reference date: it gives the first candidate,
/// the zone the rule is evaluated in, and every time and date part that no
/// BYxxx rule part overrides.
#[derive(Debug, Clone, Default)]
pub struct RecurrencePatternEvaluator {
    options: EvaluationOptions,
    cache: EvaluationCache,
}

impl RecurrencePatternEvaluator {
    /// An evaluator with the default budgets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An evaluator with the given budgets.
    #[must_use]
    pub fn with_options(options: EvaluationOptions) -> Self {
        Self {
            options,
            cache: EvaluationCache::default(),
        }
    }

    /// The budgets of this evaluator.
    #[must_use]
    pub const fn options(&self) -> &EvaluationOptions {
        &self.options
    }

    /// The occurrences of `pattern` seeded at `reference` in `[start, end]`,
    /// ascending. Neither reads nor updates the cache, and the reference
    /// counts toward COUNT only when the rule itself produces it.
    ///
    /// # Errors
    /// If the pattern is invalid or refused by its restriction policy, or
    /// the expansion exceeds its budget.
    pub fn expand(
        &self,
        pattern: &RecurrencePattern,
        reference: &CalDateTime,
        start: &CalDateTime,
        end: &CalDateTime,
    ) -> Result<Vec<CalDateTime>, EvaluationError> {
        expand(&self.options, pattern, reference, start, end, false)
    }
}

impl Evaluator for RecurrencePatternEvaluator {
    type Source = RecurrencePattern;

    #[tracing::instrument(skip_all, fields(rule = %pattern, %start, %end))]
    fn evaluate(
        &mut self,
        pattern: &RecurrencePattern,
        reference: &CalDateTime,
        start: &CalDateTime,
        end: &CalDateTime,
        include_reference: bool,
    ) -> Result<BTreeSet<Period>, EvaluationError> {
        let options = self.options;
        self.cache
            .evaluate(reference, start, end, include_reference, |s, e| {
                let expanded = expand(&options, pattern, reference, s, e, include_reference)?;
                let mut periods: BTreeSet<_> = expanded
                    .into_iter()
                    .map(Period::starting_at)
                    .collect();
                if include_reference && within(reference, s, e) {
                    periods.insert(Period::starting_at(reference.clone()));
                }
                Ok(periods)
            })
    }

    fn clear(&mut self) {
        self.cache.clear();
    }

    fn bounds(&self) -> &EvaluationBounds {
        self.cache.bounds()
    }

    fn periods(&self) -> &BTreeSet<Period> {
        self.cache.periods()
    }
}

/// With `count_reference` the reference is the first occurrence toward COUNT,
/// whether or not the rule produces it.
fn expand(
    options: &EvaluationOptions,
    pattern: &RecurrencePattern,
    reference: &CalDateTime,
    start: &CalDateTime,
    end: &CalDateTime,
    count_reference: bool,
) -> Result<Vec<CalDateTime>, EvaluationError> {
    if end.instant() < start.instant() {
        return Err(EvaluationError::InvertedWindow {
            start: start.to_string(),
            end: end.to_string(),
        });
    }

    let pattern = pattern.restricted()?;
    Expansion::new(pattern, reference, *options, count_reference)?.run(start, end)
}

/// Which day-level rule parts take part in the expansion.
#[derive(Debug, Clone, Copy)]
#[expect(clippy::struct_excessive_bools)]
struct ActiveParts {
    month: bool,
    week_no: bool,
    year_day: bool,
    month_day: bool,
    day: bool,
    set_pos: bool,
}

/// One step of the frequency: the days it spans and, for frequencies finer
/// than daily, the fixed time parts.
#[derive(Debug, Clone, Copy)]
struct Base {
    first: i64,
    last: i64,
    start: DateTime,
    hour: Option<i8>,
    minute: Option<i8>,
    second: Option<i8>,
}

impl Base {
    fn days(first: i64, last: i64) -> Option<Self> {
        Self::at(first, last, None, None, None)
    }

    fn at(
        first: i64,
        last: i64,
        hour: Option<i8>,
        minute: Option<i8>,
        second: Option<i8>,
    ) -> Option<Self> {
        let date = date_from_epoch_day(first)?;
        let time = Time::new(
            hour.unwrap_or(0),
            minute.unwrap_or(0),
            second.unwrap_or(0),
            0,
        )
        .ok()?;
        Some(Self {
            first,
            last,
            start: date.to_datetime(time),
            hour,
            minute,
            second,
        })
    }
}

/// A validated pattern bound to its seed.
#[derive(Debug)]
struct Expansion<'a> {
    pattern: RecurrencePattern,
    reference: &'a CalDateTime,
    options: EvaluationOptions,
    count_reference: bool,
    seed: DateTime,
    wkst: WeekDay,
    interval: i64,
    origin: i64,
    week_phase: i64,
    until: Option<DateTime>,
    parts: ActiveParts,
    defaults: bool,
    scope: OrdinalScope,
    hours: Option<Vec<i8>>,
    minutes: Option<Vec<i8>>,
    seconds: Option<Vec<i8>>,
}

impl<'a> Expansion<'a> {
    fn new(
        pattern: RecurrencePattern,
        reference: &'a CalDateTime,
        options: EvaluationOptions,
        count_reference: bool,
    ) -> Result<Self, EvaluationError> {
        let seed = reference.civil();
        let wkst = pattern.week_start();

        // UNTIL is compared on the wall clock of the seed
        let until = match &pattern.until {
            None => None,
            Some(until) if until.is_date_only() => Some(until.date_part().to_datetime(Time::MAX)),
            Some(until) if until.is_floating() => Some(until.civil()),
            Some(until) => Some(until.to_zone(reference.zone())?.civil()),
        };

        let parts = ActiveParts {
            month: is_active(&pattern, RulePart::ByMonth),
            week_no: is_active(&pattern, RulePart::ByWeekNo),
            year_day: is_active(&pattern, RulePart::ByYearDay),
            month_day: is_active(&pattern, RulePart::ByMonthDay),
            day: is_active(&pattern, RulePart::ByDay),
            set_pos: is_active(&pattern, RulePart::BySetPos),
        };
        let defaults = !(parts.week_no || parts.year_day || parts.month_day || parts.day);

        let mut expansion = Self {
            scope: ordinal_scope(&pattern),
            hours: time_list(&pattern.by_hour),
            minutes: time_list(&pattern.by_minute),
            seconds: time_list(&pattern.by_second),
            interval: i64::from(pattern.interval_or_default()),
            pattern,
            reference,
            options,
            count_reference,
            seed,
            wkst,
            origin: 0,
            week_phase: week_start(seed.date(), wkst).rem_euclid(7),
            until,
            parts,
            defaults,
        };
        expansion.origin = expansion.unit_of(seed);
        Ok(expansion)
    }

    fn run(
        &self,
        start: &CalDateTime,
        end: &CalDateTime,
    ) -> Result<Vec<CalDateTime>, EvaluationError> {
        let zone = self.reference.zone();
        let window_end = end.to_zone(zone)?.civil();
        let stop = match self.until {
            Some(until) => until.min(window_end),
            None => window_end,
        };

        // without COUNT nothing before the window matters, skip to it
        let mut index = match self.pattern.count {
            Some(_) => 0,
            None => {
                let target = self.unit_of(start.to_zone(zone)?.civil());
                ((target - self.origin).div_euclid(self.interval) - 1).max(0)
            }
        };

        let count = self.pattern.count.map(u64::from);
        let mut occurrences = Vec::new();
        let (mut iterations, mut emitted) = (0_u64, 0_u64);
        let mut produced = u64::from(self.count_reference);
        if count.is_some_and(|count| produced >= count) {
            return Ok(occurrences);
        }
        loop {
            iterations += 1;
            if iterations > self.options.max_iterations {
                return Err(EvaluationError::LimitExceeded {
                    what: "iterations",
                    limit: self.options.max_iterations,
                });
            }

            let Some(base) = index
                .checked_mul(self.interval)
                .and_then(|offset| offset.checked_add(self.origin))
                .and_then(|unit| self.base(unit))
            else {
                break;
            };
            if base.start > stop {
                break;
            }

            if self.pattern.freq < Frequency::Daily && !self.day_matches(base.start.date()) {
                let Some(next) = (base.first + 1).checked_mul(self.units_per_day()) else {
                    break;
                };
                index = ceil_div(next - self.origin, self.interval);
                continue;
            }

            for civil in self.candidates(&base) {
                if civil < self.seed {
                    continue;
                }
                if self.until.is_some_and(|until| civil > until) {
                    return Ok(occurrences);
                }

                // the reference is already counted
                if !(self.count_reference && civil == self.seed) {
                    produced += 1;
                }
                // a wall clock time in a gap moves forward by the gap
                let occurrence = self.reference.with_civil(civil)?;
                if within(&occurrence, start, end) {
                    emitted += 1;
                    if emitted > self.options.max_occurrences {
                        return Err(EvaluationError::LimitExceeded {
                            what: "occurrences",
                            limit: self.options.max_occurrences,
                        });
                    }
                    occurrences.push(occurrence);
                }

                if count.is_some_and(|count| produced >= count) {
                    return Ok(occurrences);
                }
            }
            index += 1;
        }

        Ok(occurrences)
    }

    /// Index of the base period containing `civil`, counted in units of the
    /// frequency.
    fn unit_of(&self, civil: DateTime) -> i64 {
        let day = epoch_day(civil.date());
        let (hour, minute, second) = (
            i64::from(civil.hour()),
            i64::from(civil.minute()),
            i64::from(civil.second()),
        );
        match self.pattern.freq {
            Frequency::Yearly => i64::from(civil.year()),
            Frequency::Monthly => i64::from(civil.year()) * 12 + i64::from(civil.month()) - 1,
            Frequency::Weekly => week_start(civil.date(), self.wkst).div_euclid(7),
            Frequency::Daily => day,
            Frequency::Hourly => day * 24 + hour,
            Frequency::Minutely => (day * 24 + hour) * 60 + minute,
            Frequency::Secondly => ((day * 24 + hour) * 60 + minute) * 60 + second,
        }
    }

    const fn units_per_day(&self) -> i64 {
        match self.pattern.freq {
            Frequency::Hourly => 24,
            Frequency::Minutely => 24 * 60,
            Frequency::Secondly => 24 * 60 * 60,
            Frequency::Daily | Frequency::Weekly | Frequency::Monthly | Frequency::Yearly => 1,
        }
    }

    fn base(&self, unit: i64) -> Option<Base> {
        match self.pattern.freq {
            Frequency::Yearly => {
                let year = i16::try_from(unit).ok()?;
                if self.parts.week_no {
                    // the week-numbering year
                    let first = first_week_start(year, self.wkst)?;
                    let next = first_week_start(year.checked_add(1)?, self.wkst)?;
                    Base::days(first, next - 1)
                } else {
                    let first = Date::new(year, 1, 1).ok()?;
                    Base::days(epoch_day(first), epoch_day(first.last_of_year()))
                }
            }
            Frequency::Monthly => {
                let year = i16::try_from(unit.div_euclid(12)).ok()?;
                let month = i8::try_from(unit.rem_euclid(12) + 1).ok()?;
                let first = Date::new(year, month, 1).ok()?;
                Base::days(epoch_day(first), epoch_day(first.last_of_month()))
            }
            Frequency::Weekly => {
                let first = unit.checked_mul(7)?.checked_add(self.week_phase)?;
                Base::days(first, first + 6)
            }
            Frequency::Daily => Base::days(unit, unit),
            Frequency::Hourly => {
                let day = unit.div_euclid(24);
                let hour = i8::try_from(unit.rem_euclid(24)).ok()?;
                Base::at(day, day, Some(hour), None, None)
            }
            Frequency::Minutely => {
                let day = unit.div_euclid(24 * 60);
                let rem = unit.rem_euclid(24 * 60);
                let hour = i8::try_from(rem / 60).ok()?;
                let minute = i8::try_from(rem % 60).ok()?;
                Base::at(day, day, Some(hour), Some(minute), None)
            }
            Frequency::Secondly => {
                let day = unit.div_euclid(24 * 60 * 60);
                let rem = unit.rem_euclid(24 * 60 * 60);
                let hour = i8::try_from(rem / 3600).ok()?;
                let minute = i8::try_from(rem % 3600 / 60).ok()?;
                let second = i8::try_from(rem % 60).ok()?;
                Base::at(day, day, Some(hour), Some(minute), Some(second))
            }
        }
    }

    /// Every candidate of a base period, ascending, after BYSETPOS.
    fn candidates(&self, base: &Base) -> Vec<DateTime> {
        let times = self.times(base);
        if times.is_empty() {
            return Vec::new();
        }

        let (Some(first), Some(last)) = (
            date_from_epoch_day(base.first),
            date_from_epoch_day(base.last),
        ) else {
            return Vec::new();
        };

        let mut candidates = Vec::new();
        for date in days_between(first, last).filter(|&date| self.day_matches(date)) {
            candidates.extend(times.iter().map(|&time| date.to_datetime(time)));
        }
        candidates.sort_unstable();
        candidates.dedup();
        tracing::trace!(base = %base.start, count = candidates.len(), "expanded base period");

        match self.parts.set_pos {
            true => self.select_positions(&candidates),
            false => candidates,
        }
    }

    fn times(&self, base: &Base) -> Vec<Time> {
        let seed = self.seed;
        let hours = self.time_values(
            RulePart::ByHour,
            self.hours.as_deref(),
            base.hour,
            seed.hour(),
        );
        let minutes = self.time_values(
            RulePart::ByMinute,
            self.minutes.as_deref(),
            base.minute,
            seed.minute(),
        );
        let seconds = self.time_values(
            RulePart::BySecond,
            self.seconds.as_deref(),
            base.second,
            seed.second(),
        );

        let mut times = Vec::with_capacity(hours.len() * minutes.len() * seconds.len());
        for &hour in &hours {
            for &minute in &minutes {
                for &second in &seconds {
                    if let Ok(time) = Time::new(hour, minute, second, 0) {
                        times.push(time);
                    }
                }
            }
        }
        times
    }

    /// Values of one time part: the base value when the part limits, the
    /// listed values when it expands, the seed value when it is not set.
    fn time_values(
        &self,
        part: RulePart,
        list: Option<&[i8]>,
        base: Option<i8>,
        seed: i8,
    ) -> Vec<i8> {
        match (by_rule(&self.pattern, part), base) {
            (ByRule::Limit, Some(value)) => match list {
                Some(list) if !list.contains(&value) => Vec::new(),
                _ => vec![value],
            },
            _ => list.map_or_else(|| vec![seed], <[i8]>::to_vec),
        }
    }

    fn day_matches(&self, date: Date) -> bool {
        let pattern = &self.pattern;

        if self.parts.month && !pattern.by_month.contains(&date.month().unsigned_abs()) {
            return false;
        }

        if self.parts.week_no {
            let Some((year, week)) = week_number(date, self.wkst) else {
                return false;
            };
            let Some(weeks) = weeks_in_year(year, self.wkst) else {
                return false;
            };
            if !pattern
                .by_week_no
                .iter()
                .any(|&n| from_end(i64::from(n), weeks) == week)
            {
                return false;
            }
        }

        if self.parts.year_day {
            let len = i64::from(date.days_in_year());
            let day = i64::from(date.day_of_year());
            if !pattern
                .by_year_day
                .iter()
                .any(|&n| from_end(i64::from(n), len) == day)
            {
                return false;
            }
        }

        if self.parts.month_day {
            let len = i64::from(date.days_in_month());
            let day = i64::from(date.day());
            if !pattern
                .by_month_day
                .iter()
                .any(|&n| from_end(i64::from(n), len) == day)
            {
                return false;
            }
        }

        if self.parts.day && !pattern.by_day.iter().any(|d| self.week_day_matches(date, d)) {
            return false;
        }

        if !self.defaults {
            return true;
        }
        match pattern.freq {
            Frequency::Yearly => {
                (self.parts.month || date.month() == self.seed.month())
                    && date.day() == self.seed.day()
            }
            Frequency::Monthly => date.day() == self.seed.day(),
            Frequency::Weekly => date.weekday() == self.seed.weekday(),
            _ => true,
        }
    }

    fn week_day_matches(&self, date: Date, day: &WeekDayNum) -> bool {
        if date.weekday() != Weekday::from(day.day) {
            return false;
        }

        match (day.occurrence, self.scope) {
            (None, _) | (_, OrdinalScope::Ignored) => true,
            (Some(n), OrdinalScope::Month) => is_nth_weekday_of_month(date, n),
            (Some(n), OrdinalScope::Year) => is_nth_weekday_of_year(date, n),
        }
    }

    fn select_positions(&self, candidates: &[DateTime]) -> Vec<DateTime> {
        let len = i64::try_from(candidates.len()).unwrap_or(i64::MAX);
        let mut picked: Vec<usize> = self
            .pattern
            .by_set_pos
            .iter()
            .filter_map(|&pos| {
                let index = match pos {
                    pos if pos > 0 => i64::from(pos) - 1,
                    pos => len + i64::from(pos),
                };
                (0..len)
                    .contains(&index)
                    .then(|| usize::try_from(index).ok())
                    .flatten()
            })
            .collect();
        picked.sort_unstable();
        picked.dedup();
        picked
            .into_iter()
            .filter_map(|index| candidates.get(index).copied())
            .collect()
    }
}

/// Sorted time values of a BYHOUR, BYMINUTE or BYSECOND list, `None` when the
/// part is not set.
fn time_list(values: &[u8]) -> Option<Vec<i8>> {
    if values.is_empty() {
        return None;
    }

    let mut list: Vec<i8> = values
        .iter()
        .filter_map(|&v| i8::try_from(v).ok())
        .filter(|&v| v < 60)
        .collect();
    if list.len() < values.len() {
        tracing::warn!(?values, "dropping leap seconds, they cannot be represented");
    }
    list.sort_unstable();
    list.dedup();
    Some(list)
}

/// Resolve a possibly negative position counting back from `len`.
const fn from_end(n: i64, len: i64) -> i64 {
    if n < 0 { len + 1 + n } else { n }
}

const fn ceil_div(a: i64, b: i64) -> i64 {
    let q = a.div_euclid(b);
    if a.rem_euclid(b) == 0 { q } else { q + 1 }
}
