// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cursor over the concrete occurrences of a temporal scope

use super::{Crontab, TimeRef, When};
use chrono::{DateTime, TimeDelta, Utc};

#[derive(Debug, Clone)]
enum Step {
    Period(TimeDelta),
    Cron(Crontab),
}

#[derive(Debug, Clone)]
enum Cursor {
    Once(Option<When>),
    Series {
        step: Step,
        next: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        duration: Option<TimeDelta>,
        period: Option<TimeDelta>,
    },
}

/// Lazily yields the occurrences of a [`When`]
///
/// Created by [`When::occurrences`]. Restart from any instant by asking
/// the scope for a new cursor.
#[derive(Debug, Clone)]
pub struct Occurrences {
    cursor: Cursor,
}

impl Occurrences {
    pub(super) fn new(when: &When, t: DateTime<Utc>) -> Self {
        let Some(repeat) = &when.repeat else {
            return Self {
                cursor: Cursor::Once(Some(when.clone())),
            };
        };

        let (start, end) = when.datetimes(t);
        let anchor = start.unwrap_or(t);
        let from = anchor.max(t);
        let (step, next) = match (repeat.crontab, when.period) {
            (Some(crontab), _) => (Step::Cron(crontab), crontab.next_match(from)),
            (None, Some(period)) => (Step::Period(period), first_tick(anchor, from, period)),
            // Rejected at parse time
            (None, None) => (Step::Period(TimeDelta::zero()), None),
        };

        Self {
            cursor: Cursor::Series {
                step,
                next,
                end,
                duration: repeat.inner_duration,
                period: repeat.inner_period,
            },
        }
    }
}

/// First `anchor + k * period` at or after `from`
fn first_tick(
    anchor: DateTime<Utc>,
    from: DateTime<Utc>,
    period: TimeDelta,
) -> Option<DateTime<Utc>> {
    let period_ms = period.num_milliseconds();
    if period_ms <= 0 {
        return None;
    }
    let elapsed_ms = (from - anchor).num_milliseconds().max(0);
    let ticks = elapsed_ms.checked_add(period_ms - 1)? / period_ms;
    anchor.checked_add_signed(TimeDelta::try_milliseconds(ticks.checked_mul(period_ms)?)?)
}

impl Iterator for Occurrences {
    type Item = When;

    fn next(&mut self) -> Option<When> {
        match &mut self.cursor {
            Cursor::Once(when) => when.take(),
            Cursor::Series {
                step,
                next,
                end,
                duration,
                period,
            } => {
                let tick = (*next)?;
                if end.is_some_and(|e| tick > e) {
                    *next = None;
                    return None;
                }
                *next = match step {
                    Step::Period(p) => tick.checked_add_signed(*p),
                    Step::Cron(crontab) => crontab.next_match(tick + TimeDelta::seconds(1)),
                };
                Some(When {
                    start: TimeRef::At(tick),
                    end: None,
                    duration: *duration,
                    period: *period,
                    repeat: None,
                })
            }
        }
    }
}
