//! Temporal scope specs
//!
//! Verify parsing, containment and matching of `When` scopes.

use crate::prelude::*;
use chrono::TimeDelta;
use similar_asserts::assert_eq;

#[test]
fn canonical_scopes_round_trip() {
    for text in [
        "now",
        "past ... future",
        "now ... future / 1s",
        "2014-12-24 22:18:42 + 1m / 1s",
        "2014-12-24 22:18:42 ... 2014-12-24 22:19:42",
        "past ... now",
        "repeat now ... future / 1h { now + 5m / 1s }",
        "repeat now ... future cron 0 */15 * * * * { now + 5s }",
    ] {
        assert_eq!(When::parse(text).unwrap().to_string(), text);
    }
}

#[test]
fn zero_durations_normalize_to_0s() {
    assert_eq!(When::parse("now + 0d").unwrap().to_string(), "now + 0s");
}

#[test]
fn definite_scopes_contain_exactly_their_bounds() {
    let tzero = christmas_eve();
    let when = When::parse("2014-12-24 22:18:42 ... 2014-12-24 22:19:42").unwrap();
    let start = Utc.with_ymd_and_hms(2014, 12, 24, 22, 18, 42).unwrap();
    let end = Utc.with_ymd_and_hms(2014, 12, 24, 22, 19, 42).unwrap();
    let second = TimeDelta::seconds(1);

    assert!(!when.in_scope(start - second, tzero));
    assert!(when.in_scope(start, tzero));
    assert!(when.in_scope(end, tzero));
    assert!(!when.in_scope(end + second, tzero));

    assert!(when.sort_scope(start - second, tzero) < TimeDelta::zero());
    assert!(when.sort_scope(end + second, tzero) > TimeDelta::zero());
}

#[test]
fn anything_concrete_follows_the_infinite_scope() {
    let tzero = christmas_eve();
    let infinite = When::infinite();
    for text in ["now", "2014-12-24 22:18:42 + 1m", "past ... now", "now ... future"] {
        assert!(When::parse(text).unwrap().follows(&infinite, tzero), "{}", text);
    }
}

#[test]
fn coarser_periods_never_follow() {
    let tzero = christmas_eve();
    let cap = When::parse("now ... future / 1s").unwrap();
    assert!(When::parse("now + 1m / 1s").unwrap().follows(&cap, tzero));
    assert!(!When::parse("now + 1m / 10s").unwrap().follows(&cap, tzero));
}

#[test]
fn past_scopes_have_no_timers() {
    let tzero = christmas_eve();
    let when = When::parse("2014-12-24 21:00:00 ... 2014-12-24 21:05:00").unwrap();
    assert_eq!(when.timer_delays(tzero), (None, None));
}
