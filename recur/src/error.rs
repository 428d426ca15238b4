// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Error types of the recurrence engine.

use crate::value::{Frequency, RulePart};

/// Failures of date-time construction, arithmetic and conversion.
#[non_exhaustive]
#[derive(Debug, Clone, thiserror::Error)]
pub enum DateTimeError {
    /// The time zone identifier is not known to the time zone database
    #[error("Unknown time zone '{tzid}'")]
    UnknownTimeZone {
        /// The identifier that failed to resolve
        tzid: String,
    },

    /// Arithmetic left the supported date range
    #[error("Date-time arithmetic out of range: {message}")]
    OutOfRange {
        /// Description from the underlying date library
        message: String,
    },

    /// The value could not be converted to an absolute instant
    #[error("Cannot resolve '{value}' to an instant: {message}")]
    Unresolvable {
        /// The wall-clock value
        value: String,
        /// Description from the underlying date library
        message: String,
    },
}

impl DateTimeError {
    pub(crate) fn out_of_range(err: &jiff::Error) -> Self {
        Self::OutOfRange {
            message: err.to_string(),
        }
    }
}

/// Invalid period construction.
#[non_exhaustive]
#[derive(Debug, Clone, thiserror::Error)]
pub enum PeriodError {
    /// The end of an explicit period is not after its start
    #[error("Period end {end} must be after its start {start}")]
    EndNotAfterStart {
        /// Start of the period
        start: String,
        /// End of the period
        end: String,
    },

    /// Periods only accept positive durations
    #[error("Period duration {duration} must be positive")]
    NonPositiveDuration {
        /// The rejected duration
        duration: String,
    },

    /// Computing the end of the period failed
    #[error(transparent)]
    DateTime(#[from] DateTimeError),
}

/// Invalid recurrence pattern, detected before any expansion happens.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecurrenceError {
    /// INTERVAL must be a positive integer
    #[error("INTERVAL must be positive, got {interval}")]
    InvalidInterval {
        /// The rejected interval
        interval: u32,
    },

    /// COUNT must be a positive integer
    #[error("COUNT must be positive")]
    ZeroCount,

    /// UNTIL and COUNT must not occur in the same rule
    #[error("UNTIL and COUNT must not both be set")]
    CountUntilConflict,

    /// A BYxxx value is outside its valid range
    #[error("{part} value {value} is out of range")]
    OutOfRange {
        /// The rule part carrying the value
        part: RulePart,
        /// The rejected value
        value: i32,
    },

    /// The frequency is forbidden by the restriction policy of the pattern
    #[error("{frequency} recurrence is restricted by the evaluation policy")]
    FrequencyRestricted {
        /// The rejected frequency
        frequency: Frequency,
    },
}

/// Failures while evaluating recurrences over a window.
#[non_exhaustive]
#[derive(Debug, Clone, thiserror::Error)]
pub enum EvaluationError {
    /// The recurrence pattern failed validation
    #[error("Invalid recurrence pattern: {0}")]
    InvalidPattern(#[from] RecurrenceError),

    /// The window end lies before its start
    #[error("Evaluation window end {end} is before its start {start}")]
    InvertedWindow {
        /// Start of the window
        start: String,
        /// End of the window
        end: String,
    },

    /// The expansion budget was exhausted before the window was covered
    #[error("Recurrence expansion exceeded the limit of {limit} {what}")]
    LimitExceeded {
        /// What was counted, iterations or occurrences
        what: &'static str,
        /// The configured limit
        limit: u64,
    },

    /// Date-time arithmetic or conversion failed
    #[error(transparent)]
    DateTime(#[from] DateTimeError),

    /// A period could not be built from an occurrence
    #[error(transparent)]
    Period(#[from] PeriodError),
}

/// Errors produced by the text parsers.
#[non_exhaustive]
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    /// The text does not follow the RFC 5545 grammar
    #[error("Invalid {kind}: {}", messages.join("; "))]
    Syntax {
        /// The value type being parsed
        kind: &'static str,
        /// Messages reported by the parser
        messages: Vec<String>,
    },

    /// The text is well formed but the rule it describes is invalid
    #[error(transparent)]
    Recurrence(#[from] RecurrenceError),

    /// The time zone of a zoned value could not be resolved
    #[error(transparent)]
    DateTime(#[from] DateTimeError),

    /// The period described by the text is invalid
    #[error(transparent)]
    Period(#[from] PeriodError),
}

impl ParseError {
    pub(crate) fn syntax<E: std::fmt::Display>(kind: &'static str, errors: &[E]) -> Self {
        Self::Syntax {
            kind,
            messages: errors.iter().map(ToString::to_string).collect(),
        }
    }
}
