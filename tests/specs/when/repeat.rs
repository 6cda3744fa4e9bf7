//! Repeated scope specs
//!
//! Verify crontab-driven repetition.

use crate::prelude::*;
use chrono::{Datelike, Timelike};

#[test]
fn cron_repeat_rejects_an_explicit_period() {
    assert!(When::parse("repeat now cron 0 */15 * * * * / 1m { now + 5s }").is_err());
    assert!(When::parse("repeat now / 1m cron 0 */15 * * * * { now + 5s }").is_err());
    assert!(When::parse("repeat now ... future cron 0 */15 * * * * { now + 5s }").is_ok());
}

#[test]
fn cron_occurrences_match_the_fields_and_carry_the_inner_duration() {
    let when = When::parse("repeat now ... future cron 0 */15 9-17 * 0-4 * { now + 5s }").unwrap();
    let tzero = christmas_eve();

    let occurrences: Vec<When> = when.occurrences(tzero).take(12).collect();
    assert_eq!(occurrences.len(), 12);
    for occurrence in &occurrences {
        let (start, end) = occurrence.datetimes(tzero);
        let start = start.unwrap();
        assert_eq!(start.second(), 0);
        assert_eq!(start.minute() % 15, 0);
        assert!((9..=17).contains(&start.hour()));
        assert!(start.weekday().num_days_from_monday() <= 4);
        assert_eq!(end.unwrap() - start, chrono::TimeDelta::seconds(5));
        assert!(start >= tzero);
    }
    // 22:18 on a Wednesday, so the first match is Thursday morning
    let first = occurrences[0].datetimes(tzero).0.unwrap();
    assert_eq!(first, Utc.with_ymd_and_hms(2014, 12, 25, 9, 0, 0).unwrap());
}
