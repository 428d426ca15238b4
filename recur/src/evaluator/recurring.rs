// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::{BTreeSet, HashSet};

use crate::config::EvaluationOptions;
use crate::error::EvaluationError;
use crate::evaluator::{
    EvaluationBounds, EvaluationCache, Evaluator, RecurrencePatternEvaluator, intersects, within,
};
use crate::recurrable::Recurrable;
use crate::value::{CalDateTime, Period, PeriodList, RecurrencePattern};

/// Combines the rule lists of a [`Recurrable`] into its occurrences:
/// RRULE and RDATE periods, minus EXRULE and EXDATE ones.
///
/// Exclusions always win over inclusions. Each rule gets its own
/// [`RecurrencePatternEvaluator`], owned by this evaluator and cleared with
/// it.
#[derive(Debug, Clone, Default)]
pub struct RecurringEvaluator {
    options: EvaluationOptions,
    rules: Vec<RecurrencePatternEvaluator>,
    exceptions: Vec<RecurrencePatternEvaluator>,
    cache: EvaluationCache,
}

impl RecurringEvaluator {
    /// An evaluator with the default budgets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An evaluator whose rule expansions use the given budgets.
    #[must_use]
    pub fn with_options(options: EvaluationOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }
}

impl Evaluator for RecurringEvaluator {
    type Source = dyn Recurrable;

    #[tracing::instrument(skip_all, fields(%reference, %start, %end))]
    fn evaluate(
        &mut self,
        source: &Self::Source,
        reference: &CalDateTime,
        start: &CalDateTime,
        end: &CalDateTime,
        include_reference: bool,
    ) -> Result<BTreeSet<Period>, EvaluationError> {
        let Self {
            options,
            rules,
            exceptions,
            cache,
        } = self;

        cache.evaluate(reference, start, end, include_reference, |s, e| {
            let mut included = BTreeSet::new();
            let rrules = expand_rules(
                options,
                rules,
                source.recurrence_rules(),
                reference,
                s,
                e,
                include_reference,
            )?;
            included.extend(rrules.into_iter().map(Period::starting_at));
            if include_reference && within(reference, s, e) {
                included.insert(Period::starting_at(reference.clone()));
            }
            included.extend(dates_in(source.recurrence_dates(), s, e));

            // an RDATE may start before the range and still reach into it
            let earliest = match included.first() {
                Some(first) if first.start().instant() < s.instant() => first.start().clone(),
                _ => s.clone(),
            };
            let exrules = expand_rules(
                options,
                exceptions,
                source.exception_rules(),
                reference,
                &earliest,
                e,
                false,
            )?;
            let exclusions = Exclusions::new(&exrules, source.exception_dates());

            let before = included.len();
            included.retain(|period| !exclusions.excludes(period.start()));
            tracing::debug!(
                included = included.len(),
                excluded = before - included.len(),
                "combined recurrence range"
            );
            Ok(included)
        })
    }

    fn clear(&mut self) {
        self.rules.clear();
        self.exceptions.clear();
        self.cache.clear();
    }

    fn bounds(&self) -> &EvaluationBounds {
        self.cache.bounds()
    }

    fn periods(&self) -> &BTreeSet<Period> {
        self.cache.periods()
    }
}

/// Union of the expansions of `patterns`, one evaluator per pattern.
///
/// With `count_reference` every pattern counts the reference as its first
/// occurrence toward COUNT.
#[expect(clippy::too_many_arguments)]
fn expand_rules(
    options: &EvaluationOptions,
    evaluators: &mut Vec<RecurrencePatternEvaluator>,
    patterns: &[RecurrencePattern],
    reference: &CalDateTime,
    start: &CalDateTime,
    end: &CalDateTime,
    count_reference: bool,
) -> Result<Vec<CalDateTime>, EvaluationError> {
    evaluators.resize_with(patterns.len(), || {
        RecurrencePatternEvaluator::with_options(*options)
    });

    let mut starts = Vec::new();
    for (pattern, evaluator) in patterns.iter().zip(evaluators.iter_mut()) {
        let periods = evaluator.evaluate(pattern, reference, start, end, count_reference)?;
        starts.extend(periods.into_iter().map(|period| period.start().clone()));
    }
    Ok(starts)
}

fn dates_in<'a>(
    lists: &'a [PeriodList],
    start: &'a CalDateTime,
    end: &'a CalDateTime,
) -> impl Iterator<Item = Period> + 'a {
    lists
        .iter()
        .flatten()
        .filter(move |period| intersects(period, start, end))
        .cloned()
}

/// Start instants and dates that remove an occurrence.
struct Exclusions {
    instants: HashSet<(i64, i32)>,
    dates: HashSet<jiff::civil::Date>,
}

impl Exclusions {
    fn new(rules: &[CalDateTime], dates: &[PeriodList]) -> Self {
        let mut instants: HashSet<_> = rules.iter().map(CalDateTime::instant).collect();
        let mut days = HashSet::new();
        for period in dates.iter().flatten() {
            match period.start().is_date_only() {
                true => days.insert(period.start().date_part()),
                false => instants.insert(period.start().instant()),
            };
        }
        Self {
            instants,
            dates: days,
        }
    }

    /// A DATE exclusion removes every occurrence on that day.
    fn excludes(&self, start: &CalDateTime) -> bool {
        self.instants.contains(&start.instant()) || self.dates.contains(&start.date_part())
    }
}
