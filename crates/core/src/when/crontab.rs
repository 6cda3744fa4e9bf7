// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Six-field crontab for repeated temporal scopes
//!
//! Field order: seconds, minutes, hours, days of month, weekdays
//! (0 = Monday), months. A timestamp matches when every field contains
//! the corresponding component.

use crate::error::ParseError;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Timelike, Utc};
use std::fmt;
use std::str::FromStr;

/// Give up searching for a match after this many years
const SEARCH_YEARS: i32 = 5;

/// One crontab field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CronField {
    Seconds,
    Minutes,
    Hours,
    Days,
    Weekdays,
    Months,
}

impl CronField {
    pub const ALL: [CronField; 6] = [
        CronField::Seconds,
        CronField::Minutes,
        CronField::Hours,
        CronField::Days,
        CronField::Weekdays,
        CronField::Months,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CronField::Seconds => "seconds",
            CronField::Minutes => "minutes",
            CronField::Hours => "hours",
            CronField::Days => "days",
            CronField::Weekdays => "weekdays",
            CronField::Months => "months",
        }
    }

    /// Inclusive bounds of the field
    pub fn bounds(&self) -> (u32, u32) {
        match self {
            CronField::Seconds | CronField::Minutes => (0, 59),
            CronField::Hours => (0, 23),
            CronField::Days => (1, 31),
            CronField::Weekdays => (0, 6),
            CronField::Months => (1, 12),
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }

    fn full_mask(&self) -> u64 {
        let (min, max) = self.bounds();
        step_mask(min, max, 1)
    }

    fn of(&self, t: &DateTime<Utc>) -> u32 {
        match self {
            CronField::Seconds => t.second(),
            CronField::Minutes => t.minute(),
            CronField::Hours => t.hour(),
            CronField::Days => t.day(),
            CronField::Weekdays => t.weekday().num_days_from_monday(),
            CronField::Months => t.month(),
        }
    }
}

fn step_mask(from: u32, to: u32, step: u32) -> u64 {
    (from..=to)
        .step_by(step.max(1) as usize)
        .fold(0, |mask, v| mask | (1 << v))
}

/// A parsed crontab, one bit set per admitted value in each field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Crontab {
    masks: [u64; 6],
}

impl Crontab {
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let invalid = |reason: String| ParseError::InvalidCrontab {
            text: text.to_string(),
            reason,
        };
        let parts: Vec<&str> = text.split_whitespace().collect();
        if parts.len() != CronField::ALL.len() {
            return Err(invalid(format!(
                "expected {} fields, found {}",
                CronField::ALL.len(),
                parts.len()
            )));
        }
        let mut masks = [0; 6];
        for (field, part) in CronField::ALL.iter().zip(parts) {
            masks[field.index()] = parse_field(*field, part)
                .map_err(|reason| invalid(format!("{}: {}", field.name(), reason)))?;
        }
        Ok(Self { masks })
    }

    /// Whether `value` is admitted by `field`
    pub fn contains(&self, field: CronField, value: u32) -> bool {
        value < 64 && self.masks[field.index()] & (1 << value) != 0
    }

    /// Admitted values of `field`, ascending
    pub fn values(&self, field: CronField) -> Vec<u32> {
        let (min, max) = field.bounds();
        (min..=max).filter(|v| self.contains(field, *v)).collect()
    }

    /// Whether every field admits the matching component of `t`
    pub fn matches(&self, t: &DateTime<Utc>) -> bool {
        CronField::ALL
            .iter()
            .all(|field| self.contains(*field, field.of(t)))
    }

    /// First whole second at or after `from` that matches
    ///
    /// Returns `None` if nothing matches within five years.
    pub fn next_match(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let mut t = from.with_nanosecond(0)?;
        if t < from {
            t += Duration::seconds(1);
        }
        let limit = from.year() + SEARCH_YEARS;

        while t.year() <= limit {
            if !self.contains(CronField::Months, t.month()) {
                t = start_of_next_month(&t)?;
                continue;
            }
            if !self.contains(CronField::Days, t.day())
                || !self.contains(CronField::Weekdays, CronField::Weekdays.of(&t))
            {
                t = start_of_day(&t)? + Duration::days(1);
                continue;
            }
            if !self.contains(CronField::Hours, t.hour()) {
                t = t.with_minute(0)?.with_second(0)? + Duration::hours(1);
                continue;
            }
            if !self.contains(CronField::Minutes, t.minute()) {
                t = t.with_second(0)? + Duration::minutes(1);
                continue;
            }
            if !self.contains(CronField::Seconds, t.second()) {
                t += Duration::seconds(1);
                continue;
            }
            return Some(t);
        }
        None
    }
}

fn start_of_day(t: &DateTime<Utc>) -> Option<DateTime<Utc>> {
    Some(t.date_naive().and_time(NaiveTime::MIN).and_utc())
}

fn start_of_next_month(t: &DateTime<Utc>) -> Option<DateTime<Utc>> {
    let (year, month) = if t.month() == 12 {
        (t.year() + 1, 1)
    } else {
        (t.year(), t.month() + 1)
    };
    Some(
        NaiveDate::from_ymd_opt(year, month, 1)?
            .and_time(NaiveTime::MIN)
            .and_utc(),
    )
}

fn parse_field(field: CronField, text: &str) -> Result<u64, String> {
    let (min, max) = field.bounds();
    let number = |s: &str| -> Result<u32, String> {
        let v: u32 = s.parse().map_err(|_| format!("{:?} is not a number", s))?;
        if v < min || v > max {
            return Err(format!("{} is outside {}-{}", v, min, max));
        }
        Ok(v)
    };

    let mut mask = 0;
    for item in text.split(',') {
        let (range, step) = match item.split_once('/') {
            Some((range, step)) => {
                let step: u32 = step
                    .parse()
                    .map_err(|_| format!("{:?} is not a step", step))?;
                if step == 0 {
                    return Err("step must be positive".to_string());
                }
                (range, step)
            }
            None => (item, 1),
        };
        let (from, to) = if range == "*" {
            (min, max)
        } else if let Some((a, b)) = range.split_once('-') {
            let (a, b) = (number(a)?, number(b)?);
            if a > b {
                return Err(format!("range {}-{} is reversed", a, b));
            }
            (a, b)
        } else {
            let a = number(range)?;
            // `a/n` runs from `a` to the top of the field
            if step > 1 {
                (a, max)
            } else {
                (a, a)
            }
        };
        mask |= step_mask(from, to, step);
    }
    Ok(mask)
}

fn format_field(field: CronField, mask: u64) -> String {
    let (min, max) = field.bounds();
    if mask == field.full_mask() {
        return "*".to_string();
    }
    for step in 2..=(max - min) {
        if mask == step_mask(min, max, step) {
            return format!("*/{}", step);
        }
    }

    let values: Vec<u32> = (min..=max).filter(|v| mask & (1 << v) != 0).collect();
    let mut items = Vec::new();
    let mut i = 0;
    while i < values.len() {
        let mut j = i;
        while j + 1 < values.len() && values[j + 1] == values[j] + 1 {
            j += 1;
        }
        if j > i {
            items.push(format!("{}-{}", values[i], values[j]));
        } else {
            items.push(values[i].to_string());
        }
        i = j + 1;
    }
    items.join(",")
}

impl fmt::Display for Crontab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = CronField::ALL
            .iter()
            .map(|field| format_field(*field, self.masks[field.index()]))
            .collect();
        f.write_str(&fields.join(" "))
    }
}

impl FromStr for Crontab {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Crontab::parse(s)
    }
}

#[cfg(test)]
#[path = "crontab_tests.rs"]
mod tests;
