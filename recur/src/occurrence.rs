// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Occurrences: the periods of a recurring source, tagged with the source.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use crate::error::EvaluationError;
use crate::evaluator::intersects;
use crate::recurrable::RecurringComponent;
use crate::value::{CalDateTime, Period};

/// Something that evaluates into periods over a window.
pub trait OccurrenceSource {
    /// The periods of this source relevant to `[start, end]`.
    ///
    /// The result may contain periods outside the window, callers filter
    /// them.
    ///
    /// # Errors
    /// If the recurrence is invalid or its expansion fails.
    fn evaluate_periods(
        &mut self,
        start: &CalDateTime,
        end: &CalDateTime,
        include_reference: bool,
    ) -> Result<BTreeSet<Period>, EvaluationError>;
}

/// One period of a source.
///
/// Two occurrences are equal only if they come from the same source object
/// and their periods are equal, so identical periods of different components
/// stay distinct.
#[derive(Debug)]
pub struct Occurrence<'a, R: ?Sized> {
    source: &'a R,
    period: Period,
}

impl<'a, R: ?Sized> Occurrence<'a, R> {
    /// Tag `period` with its source.
    pub const fn new(source: &'a R, period: Period) -> Self {
        Self { source, period }
    }

    /// The source of the occurrence.
    #[must_use]
    pub const fn source(&self) -> &'a R {
        self.source
    }

    /// The period of the occurrence.
    #[must_use]
    pub const fn period(&self) -> &Period {
        &self.period
    }

    fn address(&self) -> *const () {
        std::ptr::from_ref(self.source).cast()
    }
}

impl<R: ?Sized> Clone for Occurrence<'_, R> {
    fn clone(&self) -> Self {
        Self {
            source: self.source,
            period: self.period.clone(),
        }
    }
}

impl<R: ?Sized> PartialEq for Occurrence<'_, R> {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address() && self.period == other.period
    }
}

impl<R: ?Sized> Eq for Occurrence<'_, R> {}

impl<R: ?Sized> Hash for Occurrence<'_, R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state);
        self.period.hash(state);
    }
}

impl<R: ?Sized> PartialOrd for Occurrence<'_, R> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<R: ?Sized> Ord for Occurrence<'_, R> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.period
            .cmp(&other.period)
            .then_with(|| self.address().cmp(&other.address()))
    }
}

/// The occurrences of `source` overlapping `[start, end]`.
///
/// A period is kept when it ends after `start` and starts no later than
/// `end`; an instantaneous period is kept when it lies in the window. An
/// instantaneous period starting exactly at `start` is therefore kept, even
/// though it does not end after `start`.
///
/// With `include_reference` the start of the component is an occurrence and
/// counts as the first one toward the COUNT of each RRULE.
///
/// # Errors
/// If the window is inverted or the evaluation of the source fails.
#[tracing::instrument(skip(source))]
pub fn get_occurrences<'a, R: OccurrenceSource>(
    source: &'a mut R,
    start: &CalDateTime,
    end: &CalDateTime,
    include_reference: bool,
) -> Result<BTreeSet<Occurrence<'a, R>>, EvaluationError> {
    let periods = source.evaluate_periods(start, end, include_reference)?;
    let source: &'a R = source;
    Ok(periods
        .into_iter()
        .filter(|period| intersects(period, start, end))
        .map(|period| Occurrence::new(source, period))
        .collect())
}

/// A collection of recurring components, queried together.
#[derive(Debug, Clone, Default)]
pub struct Calendar {
    components: Vec<RecurringComponent>,
}

impl Calendar {
    /// An empty calendar.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// Add a component.
    pub fn push(&mut self, component: RecurringComponent) {
        self.components.push(component);
    }

    /// The components of the calendar.
    #[must_use]
    pub fn components(&self) -> &[RecurringComponent] {
        &self.components
    }

    /// The component with the given UID, for mutation.
    pub fn component_mut(&mut self, uid: &str) -> Option<&mut RecurringComponent> {
        self.components.iter_mut().find(|c| c.uid() == uid)
    }

    /// The occurrences of every component in `[start, end]`, ordered by
    /// period.
    ///
    /// # Errors
    /// If any component fails to evaluate.
    #[tracing::instrument(skip(self), fields(components = self.components.len()))]
    pub fn occurrences(
        &mut self,
        start: &CalDateTime,
        end: &CalDateTime,
    ) -> Result<BTreeSet<Occurrence<'_, RecurringComponent>>, EvaluationError> {
        let evaluated = self
            .components
            .iter_mut()
            .map(|component| component.evaluate_periods(start, end, true))
            .collect::<Result<Vec<_>, _>>()?;

        let mut occurrences = BTreeSet::new();
        for (component, periods) in self.components.iter().zip(evaluated) {
            occurrences.extend(
                periods
                    .into_iter()
                    .filter(|period| intersects(period, start, end))
                    .map(|period| Occurrence::new(component, period)),
            );
        }
        Ok(occurrences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrable::ComponentKind;

    fn dt(src: &str) -> CalDateTime {
        CalDateTime::parse(src).unwrap()
    }

    fn daily(uid: &str) -> RecurringComponent {
        let mut event = RecurringComponent::new(uid, ComponentKind::Event, dt("20240101T090000"));
        event.add_rrule("FREQ=DAILY;COUNT=3".parse().unwrap());
        event
    }

    #[test]
    fn keeps_identical_periods_of_different_sources() {
        let mut calendar = Calendar::new();
        calendar.push(daily("a"));
        calendar.push(daily("b"));

        let occurrences = calendar
            .occurrences(&dt("20240101"), &dt("20240201"))
            .unwrap();
        assert_eq!(occurrences.len(), 6);

        let uids: Vec<_> = occurrences
            .iter()
            .take(2)
            .map(|o| o.source().uid())
            .collect();
        assert!(uids.contains(&"a") && uids.contains(&"b"));
    }

    #[test]
    fn equal_only_with_same_source() {
        let (a, b) = (daily("a"), daily("a"));
        let period = Period::starting_at(dt("20240101T090000"));
        assert_eq!(
            Occurrence::new(&a, period.clone()),
            Occurrence::new(&a, period.clone())
        );
        assert_ne!(Occurrence::new(&a, period.clone()), Occurrence::new(&b, period));
    }

    #[test]
    fn trims_to_the_window() {
        let mut event = daily("standup");
        event.set_duration(Some("PT1H".parse().unwrap()));

        let occurrences =
            get_occurrences(&mut event, &dt("20240102T093000"), &dt("20240103T083000"), true)
                .unwrap();
        let starts: Vec<_> = occurrences
            .iter()
            .map(|o| o.period().start().to_string())
            .collect();
        assert_eq!(starts, ["20240102T090000"]);
    }

    #[test]
    fn keeps_instantaneous_occurrence_at_window_start() {
        let mut event = daily("reminder");
        let occurrences =
            get_occurrences(&mut event, &dt("20240102T090000"), &dt("20240102T090000"), true)
                .unwrap();
        let starts: Vec<_> = occurrences
            .iter()
            .map(|o| o.period().start().to_string())
            .collect();
        assert_eq!(starts, ["20240102T090000"]);
    }

    #[test]
    fn counts_unmatched_start_toward_count() {
        let mut event =
            RecurringComponent::new("review", ComponentKind::Event, dt("20240110T090000"));
        event.add_rrule("FREQ=MONTHLY;BYMONTHDAY=15;COUNT=2".parse().unwrap());

        let occurrences =
            get_occurrences(&mut event, &dt("20240101"), &dt("20241231"), true).unwrap();
        let starts: Vec<_> = occurrences
            .iter()
            .map(|o| o.period().start().to_string())
            .collect();
        assert_eq!(starts, ["20240110T090000", "20240115T090000"]);
    }

    #[test]
    fn finds_components_by_uid() {
        let mut calendar = Calendar::new();
        calendar.push(daily("a"));
        let component = calendar.component_mut("a").unwrap();
        component.add_exdate("20240102T090000".parse().unwrap());

        let occurrences = calendar
            .occurrences(&dt("20240101"), &dt("20240201"))
            .unwrap();
        assert_eq!(occurrences.len(), 2);
        assert!(calendar.component_mut("missing").is_none());
    }
}
