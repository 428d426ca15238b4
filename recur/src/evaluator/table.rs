// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! How each BYxxx rule part acts for each frequency, RFC 5545 Section 3.3.10.
//!
//! ```txt
//! +----------+--------+--------+-------+-------+------+-------+------+
//! |          |SECONDLY|MINUTELY|HOURLY |DAILY  |WEEKLY|MONTHLY|YEARLY|
//! +----------+--------+--------+-------+-------+------+-------+------+
//! |BYMONTH   |Limit   |Limit   |Limit  |Limit  |Limit |Limit  |Expand|
//! +----------+--------+--------+-------+-------+------+-------+------+
//! |BYWEEKNO  |N/A     |N/A     |N/A    |N/A    |N/A   |N/A    |Expand|
//! +----------+--------+--------+-------+-------+------+-------+------+
//! |BYYEARDAY |Limit   |Limit   |Limit  |N/A    |N/A   |N/A    |Expand|
//! +----------+--------+--------+-------+-------+------+-------+------+
//! |BYMONTHDAY|Limit   |Limit   |Limit  |Limit  |N/A   |Expand |Expand|
//! +----------+--------+--------+-------+-------+------+-------+------+
//! |BYDAY     |Limit   |Limit   |Limit  |Limit  |Expand|Note 1 |Note 2|
//! +----------+--------+--------+-------+-------+------+-------+------+
//! |BYHOUR    |Limit   |Limit   |Limit  |Expand |Expand|Expand |Expand|
//! +----------+--------+--------+-------+-------+------+-------+------+
//! |BYMINUTE  |Limit   |Limit   |Expand |Expand |Expand|Expand |Expand|
//! +----------+--------+--------+-------+-------+------+-------+------+
//! |BYSECOND  |Limit   |Expand  |Expand |Expand |Expand|Expand |Expand|
//! +----------+--------+--------+-------+-------+------+-------+------+
//! |BYSETPOS  |Limit   |Limit   |Limit  |Limit  |Limit |Limit  |Limit |
//! +----------+--------+--------+-------+-------+------+-------+------+
//!
//! Note 1:  Limit if BYMONTHDAY is present; otherwise, special expand
//!          for MONTHLY.
//!
//! Note 2:  Limit if BYYEARDAY or BYMONTHDAY is present; otherwise,
//!          special expand for WEEKLY if BYWEEKNO present; otherwise,
//!          special expand for MONTHLY if BYMONTH present; otherwise,
//!          special expand for YEARLY.
//! ```

use crate::value::{Frequency, RecurrencePattern, RulePart};

/// The action of a rule part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByRule {
    /// Multiplies each candidate of the base period
    Expand,
    /// Drops candidates that do not match
    Limit,
    /// Ignored
    NotApplicable,
}

/// A cell of the table, the notes still unresolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Expand,
    Limit,
    NotApplicable,
    /// Note 1
    LimitWithMonthDay,
    /// Note 2
    LimitWithYearOrMonthDay,
}

#[rustfmt::skip]
const fn cell(freq: Frequency, part: RulePart) -> Cell {
    use Cell::{Expand as E, Limit as L, LimitWithMonthDay as N1, LimitWithYearOrMonthDay as N2, NotApplicable as NA};

    // SECONDLY, MINUTELY, HOURLY, DAILY, WEEKLY, MONTHLY, YEARLY
    let row = match part {
        RulePart::ByMonth =>    [L,  L,  L,  L,  L,  L,  E ],
        RulePart::ByWeekNo =>   [NA, NA, NA, NA, NA, NA, E ],
        RulePart::ByYearDay =>  [L,  L,  L,  NA, NA, NA, E ],
        RulePart::ByMonthDay => [L,  L,  L,  L,  NA, E,  E ],
        RulePart::ByDay =>      [L,  L,  L,  L,  E,  N1, N2],
        RulePart::ByHour =>     [L,  L,  L,  E,  E,  E,  E ],
        RulePart::ByMinute =>   [L,  L,  E,  E,  E,  E,  E ],
        RulePart::BySecond =>   [L,  E,  E,  E,  E,  E,  E ],
        RulePart::BySetPos =>   [L,  L,  L,  L,  L,  L,  L ],
    };

    match freq {
        Frequency::Secondly => row[0],
        Frequency::Minutely => row[1],
        Frequency::Hourly => row[2],
        Frequency::Daily => row[3],
        Frequency::Weekly => row[4],
        Frequency::Monthly => row[5],
        Frequency::Yearly => row[6],
    }
}

/// The action of `part` in `pattern`, with the notes resolved against the
/// other rule parts present.
#[must_use]
pub fn by_rule(pattern: &RecurrencePattern, part: RulePart) -> ByRule {
    match cell(pattern.freq, part) {
        Cell::Expand => ByRule::Expand,
        Cell::Limit => ByRule::Limit,
        Cell::NotApplicable => ByRule::NotApplicable,
        Cell::LimitWithMonthDay if !pattern.by_month_day.is_empty() => ByRule::Limit,
        Cell::LimitWithYearOrMonthDay
            if !pattern.by_year_day.is_empty() || !pattern.by_month_day.is_empty() =>
        {
            ByRule::Limit
        }
        Cell::LimitWithMonthDay | Cell::LimitWithYearOrMonthDay => ByRule::Expand,
    }
}

/// Whether `part` is set in `pattern` and takes part in its expansion.
#[must_use]
pub fn is_active(pattern: &RecurrencePattern, part: RulePart) -> bool {
    let set = match part {
        RulePart::BySecond => !pattern.by_second.is_empty(),
        RulePart::ByMinute => !pattern.by_minute.is_empty(),
        RulePart::ByHour => !pattern.by_hour.is_empty(),
        RulePart::ByDay => !pattern.by_day.is_empty(),
        RulePart::ByMonthDay => !pattern.by_month_day.is_empty(),
        RulePart::ByYearDay => !pattern.by_year_day.is_empty(),
        RulePart::ByWeekNo => !pattern.by_week_no.is_empty(),
        RulePart::ByMonth => !pattern.by_month.is_empty(),
        RulePart::BySetPos => !pattern.by_set_pos.is_empty(),
    };
    set && by_rule(pattern, part) != ByRule::NotApplicable
}

/// The period BYDAY ordinals such as `1MO` or `-1FR` count within.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrdinalScope {
    /// Ordinals count within the month
    Month,
    /// Ordinals count within the year
    Year,
    /// Ordinals are ignored, only the weekday matters
    Ignored,
}

/// Where the BYDAY ordinals of `pattern` count.
#[must_use]
pub fn ordinal_scope(pattern: &RecurrencePattern) -> OrdinalScope {
    match pattern.freq {
        Frequency::Monthly => OrdinalScope::Month,
        Frequency::Yearly if !pattern.by_week_no.is_empty() => OrdinalScope::Ignored,
        Frequency::Yearly if !pattern.by_month.is_empty() => OrdinalScope::Month,
        Frequency::Yearly => OrdinalScope::Year,
        _ => OrdinalScope::Ignored,
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    fn rule(src: &str) -> RecurrencePattern {
        src.parse().unwrap()
    }

    #[test]
    fn reproduces_rfc_table() {
        let weekly = rule("FREQ=WEEKLY");
        assert_eq!(by_rule(&weekly, RulePart::ByDay), ByRule::Expand);
        assert_eq!(by_rule(&weekly, RulePart::ByMonthDay), ByRule::NotApplicable);
        assert_eq!(by_rule(&weekly, RulePart::ByMonth), ByRule::Limit);

        let daily = rule("FREQ=DAILY");
        assert_eq!(by_rule(&daily, RulePart::ByYearDay), ByRule::NotApplicable);
        assert_eq!(by_rule(&daily, RulePart::ByHour), ByRule::Expand);

        let hourly = rule("FREQ=HOURLY");
        assert_eq!(by_rule(&hourly, RulePart::ByHour), ByRule::Limit);
        assert_eq!(by_rule(&hourly, RulePart::ByMinute), ByRule::Expand);

        let yearly = rule("FREQ=YEARLY");
        assert_eq!(by_rule(&yearly, RulePart::ByWeekNo), ByRule::Expand);
        assert_eq!(by_rule(&yearly, RulePart::ByMonth), ByRule::Expand);
    }

    #[test]
    fn only_yearly_uses_week_numbers() {
        for freq in Frequency::iter() {
            let expected = match freq {
                Frequency::Yearly => ByRule::Expand,
                _ => ByRule::NotApplicable,
            };
            let pattern = RecurrencePattern::new(freq);
            assert_eq!(by_rule(&pattern, RulePart::ByWeekNo), expected, "{freq}");
        }
    }

    #[test]
    fn set_position_always_limits() {
        for freq in Frequency::iter() {
            let pattern = RecurrencePattern::new(freq);
            assert_eq!(by_rule(&pattern, RulePart::BySetPos), ByRule::Limit);
        }
    }

    #[test]
    fn resolves_by_day_notes() {
        assert_eq!(
            by_rule(&rule("FREQ=MONTHLY;BYDAY=MO"), RulePart::ByDay),
            ByRule::Expand
        );
        assert_eq!(
            by_rule(&rule("FREQ=MONTHLY;BYDAY=FR;BYMONTHDAY=13"), RulePart::ByDay),
            ByRule::Limit
        );
        assert_eq!(
            by_rule(&rule("FREQ=YEARLY;BYDAY=MO"), RulePart::ByDay),
            ByRule::Expand
        );
        assert_eq!(
            by_rule(&rule("FREQ=YEARLY;BYDAY=MO;BYYEARDAY=1,100"), RulePart::ByDay),
            ByRule::Limit
        );
    }

    #[test]
    fn ignores_inapplicable_parts() {
        assert!(!is_active(&rule("FREQ=WEEKLY;BYMONTHDAY=1"), RulePart::ByMonthDay));
        assert!(is_active(&rule("FREQ=MONTHLY;BYMONTHDAY=1"), RulePart::ByMonthDay));
        assert!(!is_active(&rule("FREQ=MONTHLY"), RulePart::ByMonthDay));
    }

    #[test]
    fn scopes_by_day_ordinals() {
        assert_eq!(ordinal_scope(&rule("FREQ=MONTHLY")), OrdinalScope::Month);
        assert_eq!(ordinal_scope(&rule("FREQ=YEARLY")), OrdinalScope::Year);
        assert_eq!(
            ordinal_scope(&rule("FREQ=YEARLY;BYMONTH=3")),
            OrdinalScope::Month
        );
        assert_eq!(
            ordinal_scope(&rule("FREQ=YEARLY;BYWEEKNO=1")),
            OrdinalScope::Ignored
        );
        assert_eq!(ordinal_scope(&rule("FREQ=WEEKLY")), OrdinalScope::Ignored);
    }
}
