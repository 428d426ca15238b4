// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

/// Budgets bounding a single expansion of a recurrence pattern.
///
/// A rule such as `FREQ=SECONDLY` without COUNT or UNTIL queried over years
/// would otherwise produce an unbounded amount of work. Exceeding a budget
/// fails the evaluation with
/// [`EvaluationError::LimitExceeded`](crate::EvaluationError::LimitExceeded).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
pub struct EvaluationOptions {
    /// Maximum number of base periods (years, months, weeks, ...) visited.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u64,

    /// Maximum number of occurrences produced.
    #[serde(default = "default_max_occurrences")]
    pub max_occurrences: u64,
}

const fn default_max_iterations() -> u64 {
    1_000_000
}

const fn default_max_occurrences() -> u64 {
    100_000
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            max_occurrences: default_max_occurrences(),
        }
    }
}
