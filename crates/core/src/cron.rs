// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cron schedule parsing and occurrence queries.
//!
//! Expressions use the six-field format with seconds included
//! (`"ss mm hh DD MM DOW"`), e.g. `"*/5 * * * * *"` fires every five
//! seconds. Malformed expressions fail at parse time with a descriptive
//! error.

use crate::error::CronParseError;
use chrono::{DateTime, TimeZone};
use cron::Schedule;
use std::fmt;
use std::str::FromStr;

const EVERY_SECOND: &str = "* * * * * *";

/// An immutable parsed cron expression.
#[derive(Debug, Clone)]
pub struct CronSchedule {
    expr: String,
    schedule: Schedule,
}

impl CronSchedule {
    /// Parse a six-field cron expression.
    ///
    /// Fails fast: an invalid expression is a configuration error, never
    /// deferred to occurrence queries.
    pub fn parse(expr: &str) -> Result<Self, CronParseError> {
        let trimmed = expr.trim();
        if trimmed.is_empty() {
            return Err(CronParseError {
                expr: expr.to_string(),
                reason: "expression is empty, use the six-field format with seconds, e.g. `* * * * * *`".to_string(),
            });
        }

        let field_count = trimmed.split_whitespace().count();
        if field_count != 6 {
            return Err(CronParseError {
                expr: expr.to_string(),
                reason: format!("expected 6 fields (seconds included), got {}", field_count),
            });
        }

        let schedule = Schedule::from_str(trimmed).map_err(|err| CronParseError {
            expr: expr.to_string(),
            reason: err.to_string(),
        })?;

        Ok(Self {
            expr: trimmed.to_string(),
            schedule,
        })
    }

    /// The `"* * * * * *"` schedule, firing every second.
    pub fn every_second() -> Self {
        match Self::parse(EVERY_SECOND) {
            Ok(schedule) => schedule,
            Err(_) => unreachable!("`* * * * * *` always parses"),
        }
    }

    /// First matching instant strictly after `after`, or at `after` itself
    /// when `inclusive`. Returns `None` only for schedules that can never
    /// fire again.
    pub fn next_occurrence<Tz: TimeZone>(
        &self,
        after: DateTime<Tz>,
        inclusive: bool,
    ) -> Option<DateTime<Tz>> {
        if inclusive && self.schedule.includes(after.clone()) {
            return Some(after);
        }
        self.schedule.after(&after).next()
    }

    /// The source expression this schedule was parsed from.
    pub fn expression(&self) -> &str {
        &self.expr
    }
}

impl Default for CronSchedule {
    fn default() -> Self {
        Self::every_second()
    }
}

impl fmt::Display for CronSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}

impl PartialEq for CronSchedule {
    fn eq(&self, other: &Self) -> bool {
        self.expr == other.expr
    }
}

impl Eq for CronSchedule {}

#[cfg(test)]
#[path = "cron_tests.rs"]
mod tests;
