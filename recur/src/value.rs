// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Value types consumed and produced by the recurrence engine.
//!
//! Each type comes with a parser for its RFC 5545 Section 3.3 text form, so
//! rules and date lists can be built from property values as well as
//! programmatically.

mod datetime;
mod duration;
mod period;
mod rrule;
mod util;

pub use datetime::{CalDateTime, Unit, Zone};
pub use duration::Duration;
pub use period::{Period, PeriodList};
pub use rrule::{
    EvaluationMode, Frequency, RecurrencePattern, RestrictionType, RulePart, WeekDay, WeekDayNum,
};
