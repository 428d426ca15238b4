// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Calendar components carrying recurrence rules.

use std::collections::BTreeSet;
use std::fmt::{self, Display};

use crate::config::EvaluationOptions;
use crate::error::EvaluationError;
use crate::evaluator::{Evaluator, RecurringEvaluator};
use crate::occurrence::OccurrenceSource;
use crate::value::{CalDateTime, Duration, Period, PeriodList, RecurrencePattern};

/// Anything exposing the recurrence properties of RFC 5545 Section 3.8.5.
pub trait Recurrable {
    /// DTSTART, the seed of every rule.
    fn start(&self) -> Option<&CalDateTime>;

    /// RRULE values.
    fn recurrence_rules(&self) -> &[RecurrencePattern];

    /// EXRULE values.
    fn exception_rules(&self) -> &[RecurrencePattern];

    /// RDATE values, one list per property.
    fn recurrence_dates(&self) -> &[PeriodList];

    /// EXDATE values, one list per property.
    fn exception_dates(&self) -> &[PeriodList];
}

/// The start and recurrence properties of a component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecurrenceSet {
    /// DTSTART
    pub start: Option<CalDateTime>,
    /// RRULE properties
    pub rrules: Vec<RecurrencePattern>,
    /// EXRULE properties
    pub exrules: Vec<RecurrencePattern>,
    /// RDATE properties
    pub rdates: Vec<PeriodList>,
    /// EXDATE properties
    pub exdates: Vec<PeriodList>,
}

impl Recurrable for RecurrenceSet {
    fn start(&self) -> Option<&CalDateTime> {
        self.start.as_ref()
    }

    fn recurrence_rules(&self) -> &[RecurrencePattern] {
        &self.rrules
    }

    fn exception_rules(&self) -> &[RecurrencePattern] {
        &self.exrules
    }

    fn recurrence_dates(&self) -> &[PeriodList] {
        &self.rdates
    }

    fn exception_dates(&self) -> &[PeriodList] {
        &self.exdates
    }
}

/// The kind of a recurring component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum ComponentKind {
    /// VEVENT
    #[strum(serialize = "VEVENT")]
    Event,
    /// VTODO
    #[strum(serialize = "VTODO")]
    Todo,
    /// VJOURNAL
    #[strum(serialize = "VJOURNAL")]
    Journal,
}

/// A recurring VEVENT, VTODO or VJOURNAL owning its evaluator.
///
/// Every mutation of the recurrence properties clears the evaluator, so
/// cached occurrences never outlive the rules they came from.
#[derive(Debug, Clone)]
pub struct RecurringComponent {
    uid: String,
    kind: ComponentKind,
    duration: Option<Duration>,
    set: RecurrenceSet,
    evaluator: RecurringEvaluator,
}

impl RecurringComponent {
    /// A component starting at `start` without any rule.
    pub fn new(uid: impl Into<String>, kind: ComponentKind, start: CalDateTime) -> Self {
        Self::from_set(
            uid,
            kind,
            RecurrenceSet {
                start: Some(start),
                ..RecurrenceSet::default()
            },
        )
    }

    /// A component with the given recurrence properties.
    pub fn from_set(uid: impl Into<String>, kind: ComponentKind, set: RecurrenceSet) -> Self {
        Self {
            uid: uid.into(),
            kind,
            duration: None,
            set,
            evaluator: RecurringEvaluator::new(),
        }
    }

    /// Replace the evaluation budgets, dropping cached occurrences.
    #[must_use]
    pub fn with_options(mut self, options: EvaluationOptions) -> Self {
        self.evaluator = RecurringEvaluator::with_options(options);
        self
    }

    /// UID of the component.
    #[must_use]
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Kind of the component.
    #[must_use]
    pub const fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// DURATION of each occurrence, if set.
    #[must_use]
    pub const fn duration(&self) -> Option<&Duration> {
        self.duration.as_ref()
    }

    /// The recurrence properties.
    #[must_use]
    pub const fn recurrence_set(&self) -> &RecurrenceSet {
        &self.set
    }

    /// The evaluator, for inspecting what has been evaluated.
    #[must_use]
    pub const fn evaluator(&self) -> &RecurringEvaluator {
        &self.evaluator
    }

    /// Set DTSTART.
    pub fn set_start(&mut self, start: Option<CalDateTime>) {
        self.set.start = start;
        self.clear_evaluation();
    }

    /// Set DURATION.
    pub fn set_duration(&mut self, duration: Option<Duration>) {
        self.duration = duration;
        self.clear_evaluation();
    }

    /// Add an RRULE.
    pub fn add_rrule(&mut self, rule: RecurrencePattern) {
        self.set.rrules.push(rule);
        self.clear_evaluation();
    }

    /// Add an EXRULE.
    pub fn add_exrule(&mut self, rule: RecurrencePattern) {
        self.set.exrules.push(rule);
        self.clear_evaluation();
    }

    /// Add an RDATE property.
    pub fn add_rdate(&mut self, dates: PeriodList) {
        self.set.rdates.push(dates);
        self.clear_evaluation();
    }

    /// Add an EXDATE property.
    pub fn add_exdate(&mut self, dates: PeriodList) {
        self.set.exdates.push(dates);
        self.clear_evaluation();
    }

    /// Replace all recurrence properties.
    pub fn set_recurrence_set(&mut self, set: RecurrenceSet) {
        self.set = set;
        self.clear_evaluation();
    }

    /// Forget every evaluated occurrence.
    pub fn clear_evaluation(&mut self) {
        self.evaluator.clear();
    }

    /// Length of every occurrence: DURATION, or one day for all-day
    /// components.
    fn occurrence_duration(&self) -> Option<Duration> {
        match (self.duration, &self.set.start) {
            (Some(duration), _) => Some(duration),
            (None, Some(start)) if start.is_date_only() => Some(Duration::days(1)),
            (None, _) => None,
        }
    }
}

impl Recurrable for RecurringComponent {
    fn start(&self) -> Option<&CalDateTime> {
        self.set.start()
    }

    fn recurrence_rules(&self) -> &[RecurrencePattern] {
        self.set.recurrence_rules()
    }

    fn exception_rules(&self) -> &[RecurrencePattern] {
        self.set.exception_rules()
    }

    fn recurrence_dates(&self) -> &[PeriodList] {
        self.set.recurrence_dates()
    }

    fn exception_dates(&self) -> &[PeriodList] {
        self.set.exception_dates()
    }
}

impl OccurrenceSource for RecurringComponent {
    #[tracing::instrument(skip(self), fields(uid = %self.uid))]
    fn evaluate_periods(
        &mut self,
        start: &CalDateTime,
        end: &CalDateTime,
        include_reference: bool,
    ) -> Result<BTreeSet<Period>, EvaluationError> {
        let Some(reference) = self.set.start.clone() else {
            tracing::warn!("component has no start, it has no occurrences");
            return Ok(BTreeSet::new());
        };

        let duration = self
            .occurrence_duration()
            .filter(Duration::is_positive);

        // occurrences starting before the window may still overlap it
        let lookback = match &duration {
            Some(duration) => start.add_duration(&duration.negated())?,
            None => start.clone(),
        };

        let periods = self
            .evaluator
            .evaluate(&self.set, &reference, &lookback, end, include_reference)?;

        periods
            .into_iter()
            .map(|period| match (&duration, period.end()) {
                (Some(duration), None) => period.with_default_duration(duration),
                _ => Ok(period),
            })
            .collect::<Result<_, _>>()
            .map_err(EvaluationError::from)
    }
}

impl Display for RecurringComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.uid)
    }
}
