// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Temporal scopes
//!
//! A [`When`] says when a measurement may run (in a capability), should run
//! (in a specification) or did run (in a result). Text forms:
//!
//! ```text
//! now ... future / 1s                       range with a period
//! 2014-12-24 22:18:42 + 1m / 1s             start plus duration
//! now                                       a single instant
//! repeat now ... future / 1h { now + 5m / 1s }
//! repeat now ... future cron 0 */15 * * * * { now + 5s }
//! ```
//!
//! Relative bounds (`past`, `now`, `future`) are resolved against a
//! reference time supplied by the caller, so every query here is a pure
//! function of the scope and that instant.

mod crontab;
mod duration;
mod occurrences;

pub use crontab::{CronField, Crontab};
pub use duration::{format_duration, parse_duration};
pub use occurrences::Occurrences;

use crate::error::ParseError;
use crate::primitive::{format_time, parse_time};
use chrono::{DateTime, TimeDelta, Utc};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

const PAST: &str = "past";
const NOW: &str = "now";
const FUTURE: &str = "future";

const RANGE_SEP: &str = " ... ";
const DURATION_SEP: &str = " + ";
const PERIOD_SEP: &str = " / ";
const REPEAT_PREFIX: &str = "repeat ";
const CRON_SEP: &str = " cron ";
const INNER_OPEN: &str = " { ";
const INNER_CLOSE: &str = "}";

/// One bound of a temporal scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeRef {
    Past,
    Now,
    Future,
    At(DateTime<Utc>),
}

impl TimeRef {
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        match text.trim() {
            PAST => Ok(TimeRef::Past),
            NOW => Ok(TimeRef::Now),
            FUTURE => Ok(TimeRef::Future),
            other => parse_time(other).map(TimeRef::At),
        }
    }

    /// Concrete instant, `None` for the open-ended sentinels
    pub fn resolve(&self, tzero: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            TimeRef::Past | TimeRef::Future => None,
            TimeRef::Now => Some(tzero),
            TimeRef::At(t) => Some(*t),
        }
    }

    pub fn is_concrete(&self) -> bool {
        matches!(self, TimeRef::At(_))
    }
}

impl fmt::Display for TimeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeRef::Past => f.write_str(PAST),
            TimeRef::Now => f.write_str(NOW),
            TimeRef::Future => f.write_str(FUTURE),
            TimeRef::At(t) => f.write_str(&format_time(t)),
        }
    }
}

impl From<DateTime<Utc>> for TimeRef {
    fn from(t: DateTime<Utc>) -> Self {
        TimeRef::At(t)
    }
}

/// How a repeated scope recurs and what each occurrence looks like
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repetition {
    crontab: Option<Crontab>,
    inner_duration: Option<TimeDelta>,
    inner_period: Option<TimeDelta>,
}

impl Repetition {
    pub fn crontab(&self) -> Option<&Crontab> {
        self.crontab.as_ref()
    }

    pub fn inner_duration(&self) -> Option<TimeDelta> {
        self.inner_duration
    }

    pub fn inner_period(&self) -> Option<TimeDelta> {
        self.inner_period
    }
}

/// A temporal scope
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct When {
    start: TimeRef,
    end: Option<TimeRef>,
    duration: Option<TimeDelta>,
    period: Option<TimeDelta>,
    repeat: Option<Repetition>,
}

/// Bounds and period of a non-repeated scope, as parsed from text
struct Simple {
    start: TimeRef,
    end: Option<TimeRef>,
    duration: Option<TimeDelta>,
    period: Option<TimeDelta>,
}

impl When {
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let text = text.trim();
        let invalid = |reason: &str| ParseError::InvalidWhen {
            text: text.to_string(),
            reason: reason.to_string(),
        };

        let Some(rest) = text.strip_prefix(REPEAT_PREFIX) else {
            let simple = parse_simple(text)?;
            return When::from_simple(simple, text);
        };

        let (outer, inner) = rest
            .split_once(INNER_OPEN)
            .ok_or_else(|| invalid("repeated scope needs an inner scope in braces"))?;
        let inner = inner
            .trim_end()
            .strip_suffix(INNER_CLOSE)
            .ok_or_else(|| invalid("inner scope is not closed"))?
            .trim();
        let inner = parse_simple(inner)?;
        if inner.start != TimeRef::Now || inner.end.is_some() {
            return Err(invalid("inner scope must be of the form now [+ duration] [/ period]"));
        }

        let (outer, crontab) = match outer.split_once(CRON_SEP) {
            Some((outer, cron)) => (outer, Some(Crontab::parse(cron)?)),
            None => (outer, None),
        };
        let outer = parse_simple(outer)?;
        match (&crontab, outer.period) {
            (Some(_), Some(_)) => {
                return Err(invalid("repeated scope cannot have both a period and a crontab"))
            }
            (None, None) => return Err(invalid("repeated scope needs a period or a crontab")),
            _ => {}
        }

        let mut when = When::from_simple(outer, text)?;
        when.repeat = Some(Repetition {
            crontab,
            inner_duration: inner.duration,
            inner_period: inner.period,
        });
        Ok(when)
    }

    fn from_simple(simple: Simple, text: &str) -> Result<Self, ParseError> {
        let when = When {
            start: simple.start,
            end: simple.end,
            duration: simple.duration,
            period: simple.period,
            repeat: None,
        };
        when.check().map_err(|reason| ParseError::InvalidWhen {
            text: text.to_string(),
            reason: reason.to_string(),
        })?;
        Ok(when)
    }

    fn check(&self) -> Result<(), &'static str> {
        if self.start == TimeRef::Future {
            return Err("a scope cannot start in the future sentinel");
        }
        if self.end == Some(TimeRef::Past) {
            return Err("a scope cannot end in the past sentinel");
        }
        if self.duration.is_some() && self.start == TimeRef::Past {
            return Err("a duration needs a concrete or current start");
        }
        if self.period.is_some_and(|p| p <= TimeDelta::zero()) {
            return Err("period must be positive");
        }
        Ok(())
    }

    /// `now ... future`
    pub fn now_to_future() -> Self {
        When::range(TimeRef::Now, TimeRef::Future)
    }

    /// `past ... future`
    pub fn infinite() -> Self {
        When::range(TimeRef::Past, TimeRef::Future)
    }

    /// `now`
    pub fn now() -> Self {
        When::instant(TimeRef::Now)
    }

    pub fn instant(start: impl Into<TimeRef>) -> Self {
        When {
            start: start.into(),
            end: None,
            duration: None,
            period: None,
            repeat: None,
        }
    }

    pub fn range(start: impl Into<TimeRef>, end: impl Into<TimeRef>) -> Self {
        When {
            end: Some(end.into()),
            ..When::instant(start)
        }
    }

    pub fn lasting(start: impl Into<TimeRef>, duration: TimeDelta) -> Self {
        When {
            duration: Some(duration),
            ..When::instant(start)
        }
    }

    pub fn with_period(mut self, period: TimeDelta) -> Self {
        self.period = Some(period);
        self
    }

    pub fn start(&self) -> TimeRef {
        self.start
    }

    pub fn end(&self) -> Option<TimeRef> {
        self.end
    }

    pub fn period(&self) -> Option<TimeDelta> {
        self.period
    }

    pub fn repetition(&self) -> Option<&Repetition> {
        self.repeat.as_ref()
    }

    pub fn is_repeated(&self) -> bool {
        self.repeat.is_some()
    }

    pub fn is_immediate(&self) -> bool {
        self.start == TimeRef::Now
    }

    pub fn is_forever(&self) -> bool {
        self.end == Some(TimeRef::Future)
    }

    /// `past ... now`
    pub fn is_past(&self) -> bool {
        self.start == TimeRef::Past && self.end == Some(TimeRef::Now)
    }

    /// `now ... future`
    pub fn is_future(&self) -> bool {
        self.start == TimeRef::Now && self.end == Some(TimeRef::Future)
    }

    /// `past ... future`
    pub fn is_infinite(&self) -> bool {
        self.start == TimeRef::Past && self.end == Some(TimeRef::Future)
    }

    /// Both bounds are absolute times
    pub fn is_definite(&self) -> bool {
        !self.is_repeated()
            && self.start.is_concrete()
            && self.end.map_or(true, |end| end.is_concrete())
    }

    /// A single instant: no end and no duration
    pub fn is_singleton(&self) -> bool {
        self.end.is_none() && self.duration.is_none()
    }

    /// Resolve to concrete `(start, end)` against `tzero`
    ///
    /// `None` as start means unbounded in the past; `None` as end means
    /// open into the future. A singleton ends where it starts, except the
    /// outer part of a repeated scope, which stays open.
    pub fn datetimes(&self, tzero: DateTime<Utc>) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        let start = self.start.resolve(tzero);
        let end = match (self.end, self.duration) {
            (Some(end), _) => end.resolve(tzero),
            (None, Some(duration)) => start.and_then(|s| s.checked_add_signed(duration)),
            (None, None) if self.is_repeated() => None,
            (None, None) => start,
        };
        (start, end)
    }

    /// Length of the scope, `None` when it is unbounded
    pub fn duration(&self, tzero: DateTime<Utc>) -> Option<TimeDelta> {
        if let Some(duration) = self.duration {
            return Some(duration);
        }
        match self.datetimes(tzero) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    /// Delays from `tzero` until execution should start and stop
    ///
    /// The start delay is clamped at zero for scopes already under way.
    /// Both are `None` when the scope has already ended; the end delay
    /// alone is `None` when the scope has no end.
    pub fn timer_delays(&self, tzero: DateTime<Utc>) -> (Option<Duration>, Option<Duration>) {
        let (start, end) = self.datetimes(tzero);
        let start_delay = start.map_or(TimeDelta::zero(), |s| s - tzero);

        if self.is_singleton() && !self.is_repeated() {
            if start_delay < TimeDelta::zero() {
                return (None, None);
            }
            return (Some(to_std(start_delay)), None);
        }

        if end.is_some_and(|e| e < tzero) {
            return (None, None);
        }
        (Some(to_std(start_delay)), end.map(|e| to_std(e - tzero)))
    }

    /// Whether the scope has already ended at `tzero`
    pub fn is_expired(&self, tzero: DateTime<Utc>) -> bool {
        self.timer_delays(tzero).0.is_none()
    }

    /// Signed distance from the scope to `t`
    ///
    /// Negative before the start, positive after the end, zero within.
    pub fn sort_scope(&self, t: DateTime<Utc>, tzero: DateTime<Utc>) -> TimeDelta {
        let (start, end) = self.datetimes(tzero);
        if let Some(start) = start.filter(|s| t < *s) {
            return t - start;
        }
        if let Some(end) = end.filter(|e| t > *e) {
            return t - end;
        }
        TimeDelta::zero()
    }

    pub fn in_scope(&self, t: DateTime<Utc>, tzero: DateTime<Utc>) -> bool {
        self.sort_scope(t, tzero).is_zero()
    }

    /// The period measurements are taken at: the inner one when repeated
    pub fn effective_period(&self) -> Option<TimeDelta> {
        match &self.repeat {
            Some(repeat) => repeat.inner_period,
            None => self.period,
        }
    }

    /// Whether this scope can be served by a capability scoped by `other`
    ///
    /// The period must be no coarser than `other`'s, and the start (or
    /// failing that, the end) must lie within `other`.
    pub fn follows(&self, other: &When, tzero: DateTime<Utc>) -> bool {
        if let (Some(mine), Some(theirs)) = (self.effective_period(), other.period) {
            if mine > theirs {
                return false;
            }
        }
        match self.datetimes(tzero) {
            (None, None) => other.datetimes(tzero) == (None, None),
            (start, end) => {
                start.is_some_and(|s| other.in_scope(s, tzero))
                    || end.is_some_and(|e| other.in_scope(e, tzero))
            }
        }
    }

    /// Concrete occurrences at or after `t`
    ///
    /// A repeated scope yields one sub-scope per period tick or crontab
    /// match, each carrying the inner duration and period, until the outer
    /// scope ends. Any other scope yields itself once.
    pub fn occurrences(&self, t: DateTime<Utc>) -> Occurrences {
        Occurrences::new(self, t)
    }

    fn fmt_simple(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start)?;
        if let Some(end) = self.end {
            write!(f, "{}{}", RANGE_SEP, end)?;
        } else if let Some(duration) = self.duration {
            write!(f, "{}{}", DURATION_SEP, format_duration(&duration))?;
        }
        if let Some(period) = self.period {
            write!(f, "{}{}", PERIOD_SEP, format_duration(&period))?;
        }
        Ok(())
    }
}

impl Default for When {
    fn default() -> Self {
        When::now_to_future()
    }
}

impl fmt::Display for When {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(repeat) = &self.repeat else {
            return self.fmt_simple(f);
        };
        f.write_str(REPEAT_PREFIX)?;
        self.fmt_simple(f)?;
        if let Some(crontab) = &repeat.crontab {
            write!(f, "{}{}", CRON_SEP, crontab)?;
        }
        write!(f, "{}{}", INNER_OPEN, NOW)?;
        if let Some(duration) = repeat.inner_duration {
            write!(f, "{}{}", DURATION_SEP, format_duration(&duration))?;
        }
        if let Some(period) = repeat.inner_period {
            write!(f, "{}{}", PERIOD_SEP, format_duration(&period))?;
        }
        write!(f, " {}", INNER_CLOSE)
    }
}

impl FromStr for When {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        When::parse(s)
    }
}

fn parse_simple(text: &str) -> Result<Simple, ParseError> {
    let (body, period) = match text.rsplit_once(PERIOD_SEP) {
        Some((body, period)) => (body, Some(parse_duration(period)?)),
        None => (text, None),
    };
    let body = body.trim();
    if body.is_empty() {
        return Err(ParseError::InvalidWhen {
            text: text.to_string(),
            reason: "missing start".to_string(),
        });
    }

    let mut simple = Simple {
        start: TimeRef::Past,
        end: None,
        duration: None,
        period,
    };
    if let Some((start, duration)) = body.split_once(DURATION_SEP) {
        simple.start = TimeRef::parse(start)?;
        simple.duration = Some(parse_duration(duration)?);
    } else if let Some((start, end)) = body.split_once(RANGE_SEP) {
        simple.start = TimeRef::parse(start)?;
        simple.end = Some(TimeRef::parse(end)?);
    } else {
        simple.start = TimeRef::parse(body)?;
    }
    Ok(simple)
}

fn to_std(delta: TimeDelta) -> Duration {
    delta.max(TimeDelta::zero()).to_std().unwrap_or_default()
}

#[cfg(test)]
#[path = "when_tests.rs"]
mod tests;
