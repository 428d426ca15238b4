// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Evaluation of recurrences over query windows, with memoization of the
//! ranges already covered.

mod pattern;
mod recurring;
pub mod table;

use std::collections::BTreeSet;

use crate::error::EvaluationError;
use crate::value::{CalDateTime, Period};

pub use crate::evaluator::pattern::RecurrencePatternEvaluator;
pub use crate::evaluator::recurring::RecurringEvaluator;

/// Expands a recurrence source into the periods falling in a window.
///
/// Implementations memoize the windows they have evaluated. The cached state
/// belongs to one source: after the source changes, call
/// [`clear`](Self::clear) before evaluating again.
pub trait Evaluator {
    /// What this evaluator expands.
    type Source: ?Sized;

    /// The periods of `source` intersecting `[start, end]`.
    ///
    /// `reference` is the seed of the recurrence, usually the start of the
    /// owning component. With `include_reference` the reference itself is
    /// always part of the result when it lies in the window.
    ///
    /// # Errors
    /// If the window is inverted, the recurrence is invalid, or the
    /// expansion exceeds its budget.
    fn evaluate(
        &mut self,
        source: &Self::Source,
        reference: &CalDateTime,
        start: &CalDateTime,
        end: &CalDateTime,
        include_reference: bool,
    ) -> Result<BTreeSet<Period>, EvaluationError>;

    /// Forget every evaluated range and period.
    fn clear(&mut self);

    /// The envelope of all windows evaluated since the last clear.
    fn bounds(&self) -> &EvaluationBounds;

    /// All periods accumulated for [`bounds`](Self::bounds).
    fn periods(&self) -> &BTreeSet<Period>;
}

/// The range of time an evaluator has already covered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EvaluationBounds {
    /// Nothing evaluated yet
    #[default]
    Empty,

    /// Every window inside `[start, end]` has been evaluated
    Covered {
        /// Start of the envelope
        start: CalDateTime,
        /// End of the envelope
        end: CalDateTime,
    },
}

impl EvaluationBounds {
    /// Whether `[start, end]` lies entirely inside the covered range.
    #[must_use]
    pub fn contains(&self, start: &CalDateTime, end: &CalDateTime) -> bool {
        match self {
            EvaluationBounds::Empty => false,
            EvaluationBounds::Covered { start: s, end: e } => {
                s.instant() <= start.instant() && end.instant() <= e.instant()
            }
        }
    }

    /// The sub-ranges of `[start, end]` still to be evaluated.
    ///
    /// A window disjoint from the covered range also yields the gap between
    /// them, so that the envelope stays contiguous after the merge.
    #[must_use]
    pub fn missing(
        &self,
        start: &CalDateTime,
        end: &CalDateTime,
    ) -> Vec<(CalDateTime, CalDateTime)> {
        match self {
            EvaluationBounds::Empty => vec![(start.clone(), end.clone())],
            EvaluationBounds::Covered { start: s, end: e } => {
                let mut ranges = Vec::with_capacity(2);
                if start.instant() < s.instant() {
                    ranges.push((start.clone(), s.clone()));
                }
                if end.instant() > e.instant() {
                    ranges.push((e.clone(), end.clone()));
                }
                ranges
            }
        }
    }

    /// Grow the envelope to include `[start, end]`.
    pub fn extend(&mut self, start: &CalDateTime, end: &CalDateTime) {
        *self = match std::mem::take(self) {
            EvaluationBounds::Empty => EvaluationBounds::Covered {
                start: start.clone(),
                end: end.clone(),
            },
            EvaluationBounds::Covered { start: s, end: e } => EvaluationBounds::Covered {
                start: earliest(s, start),
                end: latest(e, end),
            },
        };
    }
}

fn earliest(a: CalDateTime, b: &CalDateTime) -> CalDateTime {
    if b.instant() < a.instant() { b.clone() } else { a }
}

fn latest(a: CalDateTime, b: &CalDateTime) -> CalDateTime {
    if b.instant() > a.instant() { b.clone() } else { a }
}

/// Whether `dt` lies in `[start, end]`, comparing instants only.
pub(crate) fn within(dt: &CalDateTime, start: &CalDateTime, end: &CalDateTime) -> bool {
    start.instant() <= dt.instant() && dt.instant() <= end.instant()
}

/// Whether `period` intersects `[start, end]`.
pub(crate) fn intersects(period: &Period, start: &CalDateTime, end: &CalDateTime) -> bool {
    period.start().instant() <= end.instant()
        && (start.instant() <= period.start().instant()
            || start.instant() < period.effective_end().instant())
}

/// Bounds and periods shared by the evaluators.
///
/// The cache is keyed by the reference and the reference flag, a query with
/// another key starts over.
#[derive(Debug, Clone, Default)]
pub(crate) struct EvaluationCache {
    bounds: EvaluationBounds,
    periods: BTreeSet<Period>,
    key: Option<(CalDateTime, bool)>,
}

impl EvaluationCache {
    pub fn clear(&mut self) {
        self.bounds = EvaluationBounds::Empty;
        self.periods.clear();
        self.key = None;
    }

    pub const fn bounds(&self) -> &EvaluationBounds {
        &self.bounds
    }

    pub const fn periods(&self) -> &BTreeSet<Period> {
        &self.periods
    }

    /// Run `expand` over every part of `[start, end]` not covered yet, then
    /// return the cached periods intersecting the window.
    pub fn evaluate<F>(
        &mut self,
        reference: &CalDateTime,
        start: &CalDateTime,
        end: &CalDateTime,
        include_reference: bool,
        mut expand: F,
    ) -> Result<BTreeSet<Period>, EvaluationError>
    where
        F: FnMut(&CalDateTime, &CalDateTime) -> Result<BTreeSet<Period>, EvaluationError>,
    {
        if end.instant() < start.instant() {
            return Err(EvaluationError::InvertedWindow {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        let key = (reference.clone(), include_reference);
        let changed = self.key.as_ref().is_some_and(|(r, i)| {
            // same instant in another zone still expands to other wall clocks
            r != &key.0 || r.zone() != key.0.zone() || *i != key.1
        });
        if changed {
            tracing::debug!("evaluation key changed, dropping cached periods");
            self.clear();
        }
        self.key = Some(key);

        let missing = self.bounds.missing(start, end);
        if missing.is_empty() {
            tracing::debug!(%start, %end, "window already evaluated");
        }
        for (s, e) in missing {
            tracing::debug!(start = %s, end = %e, "evaluating uncovered range");
            let periods = expand(&s, &e)?;
            self.periods.extend(periods);
            self.bounds.extend(&s, &e);
        }

        Ok(self
            .periods
            .iter()
            .filter(|p| intersects(p, start, end))
            .cloned()
            .collect())
    }
}
