// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Expand iCalendar recurrence rules into concrete occurrences.
//!
//! The crate takes already-parsed recurrence data (RRULE, EXRULE, RDATE and
//! EXDATE) of a recurring component and turns it into the set of periods that
//! fall inside a queried window. Repeated and overlapping queries reuse what
//! was evaluated before.
//!
//! ```
//! use aimcal_recur::{CalDateTime, ComponentKind, RecurringComponent};
//!
//! let start = CalDateTime::parse("20240101T090000").unwrap();
//! let mut event = RecurringComponent::new("standup", ComponentKind::Event, start);
//! event.add_rrule("FREQ=DAILY;COUNT=5".parse().unwrap());
//!
//! let from = CalDateTime::parse("20240101").unwrap();
//! let to = CalDateTime::parse("20240131").unwrap();
//! let occurrences = aimcal_recur::get_occurrences(&mut event, &from, &to, true).unwrap();
//! assert_eq!(occurrences.len(), 5);
//! ```

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
// Allow certain clippy lints that are too restrictive for this crate
#![allow(
    clippy::similar_names,
    clippy::single_match_else,
    clippy::match_bool,
    clippy::module_name_repetitions
)]

pub mod calendar;
pub mod config;
pub mod error;
pub mod evaluator;
mod keyword;
pub mod occurrence;
pub mod recurrable;
pub mod value;

pub use crate::config::EvaluationOptions;
pub use crate::error::{DateTimeError, EvaluationError, ParseError, PeriodError, RecurrenceError};
pub use crate::evaluator::{
    EvaluationBounds, Evaluator, RecurrencePatternEvaluator, RecurringEvaluator,
};
pub use crate::occurrence::{Calendar, Occurrence, OccurrenceSource, get_occurrences};
pub use crate::recurrable::{ComponentKind, Recurrable, RecurrenceSet, RecurringComponent};
pub use crate::value::{
    CalDateTime, Duration, EvaluationMode, Frequency, Period, PeriodList, RecurrencePattern,
    RestrictionType, RulePart, Unit, WeekDay, WeekDayNum, Zone,
};
