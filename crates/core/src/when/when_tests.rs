use super::*;
use chrono::TimeZone;
use proptest::prelude::*;
use yare::parameterized;

fn at(h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2014, 12, 24, h, mi, s).unwrap()
}

fn secs(n: u64) -> Option<Duration> {
    Some(Duration::from_secs(n))
}

#[parameterized(
    future = { "now ... future" },
    infinite = { "past ... future" },
    past = { "past ... now" },
    instant = { "now" },
    concrete_instant = { "2014-12-24 22:18:42" },
    range = { "2014-12-24 22:18:42 ... 2014-12-24 22:19:42" },
    anchored_duration = { "2014-12-24 22:18:42 + 1m / 1s" },
    relative_duration = { "now + 30s" },
    periodic = { "now ... future / 1s" },
    zero_duration = { "now + 0s" },
    microseconds = { "2014-12-24 22:18:42.500000 ... future" },
    repeated_period = { "repeat now ... future / 1h { now + 5m / 1s }" },
    repeated_cron = { "repeat now ... future cron 0 */15 * * * * { now + 5s }" },
    repeated_instant = { "repeat now / 1d { now }" },
    repeated_bounded = { "repeat 2014-12-24 22:00:00 ... 2014-12-24 23:00:00 / 15m { now + 5m / 1s }" },
)]
fn canonical_text_round_trips(text: &str) {
    let when = When::parse(text).unwrap();
    assert_eq!(when.to_string(), text);
    assert_eq!(When::parse(&when.to_string()).unwrap(), when);
}

#[parameterized(
    seconds_to_minutes = { "now + 90s", "now + 1m30s" },
    iso_time = { "2014-12-24T22:18:42Z + 1m", "2014-12-24 22:18:42 + 1m" },
    list_cron = { "repeat now ... future cron 0 0,30 * * * * { now }", "repeat now ... future cron 0 */30 * * * * { now }" },
    loose_braces = { "repeat now / 1h { now + 5m}", "repeat now / 1h { now + 5m }" },
)]
fn unparse_normalizes(text: &str, canonical: &str) {
    assert_eq!(When::parse(text).unwrap().to_string(), canonical);
}

#[parameterized(
    garbage = { "tomorrow" },
    starts_in_future = { "future ... now" },
    ends_in_past = { "now ... past" },
    duration_from_past = { "past + 1m" },
    zero_period = { "now ... future / 0s" },
    bad_duration = { "now + 5 minutes" },
    empty = { "" },
    repeat_without_inner = { "repeat now ... future / 1h" },
    repeat_unclosed = { "repeat now ... future / 1h { now + 5m" },
    repeat_inner_not_now = { "repeat now ... future / 1h { 2014-12-24 22:00:00 + 5m }" },
    repeat_inner_range = { "repeat now ... future / 1h { now ... future }" },
    repeat_neither = { "repeat now ... future { now + 5m }" },
    repeat_both = { "repeat now ... future / 1h cron 0 * * * * * { now + 5m }" },
)]
fn malformed_scopes_are_rejected(text: &str) {
    assert!(When::parse(text).is_err(), "{:?} should not parse", text);
}

#[test]
fn repeated_cron_rejects_an_explicit_period() {
    let err = When::parse("repeat now cron 0 */15 * * * * / 1m { now + 5s }").unwrap_err();
    assert!(matches!(
        err,
        ParseError::InvalidCrontab { .. } | ParseError::InvalidWhen { .. }
    ));
    let err = When::parse("repeat now / 1m cron 0 */15 * * * * { now + 5s }").unwrap_err();
    assert!(matches!(err, ParseError::InvalidWhen { .. }));
}

#[test]
fn sentinel_predicates() {
    let future = When::parse("now ... future").unwrap();
    assert!(future.is_immediate());
    assert!(future.is_forever());
    assert!(future.is_future());
    assert!(!future.is_infinite());
    assert!(!future.is_definite());

    let past = When::parse("past ... now").unwrap();
    assert!(past.is_past());
    assert!(!past.is_immediate());

    assert!(When::parse("past ... future").unwrap().is_infinite());

    let instant = When::parse("2014-12-24 22:18:42").unwrap();
    assert!(instant.is_singleton());
    assert!(instant.is_definite());

    let lasting = When::parse("2014-12-24 22:18:42 + 1m").unwrap();
    assert!(!lasting.is_singleton());
    assert!(lasting.is_definite());

    assert!(!When::parse("repeat now / 1h { now }").unwrap().is_definite());
}

#[test]
fn datetimes_resolve_sentinels() {
    let tzero = at(22, 18, 0);
    assert_eq!(
        When::parse("now ... future").unwrap().datetimes(tzero),
        (Some(tzero), None)
    );
    assert_eq!(
        When::parse("past ... now").unwrap().datetimes(tzero),
        (None, Some(tzero))
    );
    assert_eq!(
        When::parse("now + 30s").unwrap().datetimes(tzero),
        (Some(tzero), Some(at(22, 18, 30)))
    );
    assert_eq!(
        When::parse("2014-12-24 22:18:42").unwrap().datetimes(tzero),
        (Some(at(22, 18, 42)), Some(at(22, 18, 42)))
    );
    assert_eq!(
        When::parse("repeat now / 1h { now }").unwrap().datetimes(tzero),
        (Some(tzero), None)
    );
}

#[test]
fn duration_prefers_the_explicit_value() {
    let tzero = at(22, 18, 0);
    assert_eq!(
        When::parse("now + 1m").unwrap().duration(tzero),
        Some(TimeDelta::minutes(1))
    );
    assert_eq!(
        When::parse("2014-12-24 22:18:00 ... 2014-12-24 22:20:30")
            .unwrap()
            .duration(tzero),
        Some(TimeDelta::seconds(150))
    );
    assert_eq!(When::parse("now ... future").unwrap().duration(tzero), None);
}

#[parameterized(
    before_start = { at(22, 18, 0), secs(42), secs(102) },
    at_start = { at(22, 18, 42), secs(0), secs(60) },
    under_way = { at(22, 19, 0), secs(0), secs(42) },
    at_end = { at(22, 19, 42), secs(0), secs(0) },
    expired = { at(22, 20, 0), None, None },
)]
fn timer_delays_for_an_anchored_duration(
    tzero: DateTime<Utc>,
    start: Option<Duration>,
    end: Option<Duration>,
) {
    let when = When::parse("2014-12-24 22:18:42 + 1m / 1s").unwrap();
    assert_eq!(when.timer_delays(tzero), (start, end));
    assert_eq!(when.is_expired(tzero), start.is_none());
}

#[test]
fn timer_delays_for_open_and_singleton_scopes() {
    let tzero = at(22, 18, 0);
    assert_eq!(
        When::parse("now ... future").unwrap().timer_delays(tzero),
        (secs(0), None)
    );
    assert_eq!(When::now().timer_delays(tzero), (secs(0), None));
    assert_eq!(
        When::parse("2014-12-24 22:19:00").unwrap().timer_delays(tzero),
        (secs(60), None)
    );
    assert_eq!(
        When::parse("2014-12-24 22:00:00").unwrap().timer_delays(tzero),
        (None, None)
    );
    assert_eq!(
        When::parse("2014-12-24 21:00:00 ... 2014-12-24 22:00:00")
            .unwrap()
            .timer_delays(tzero),
        (None, None)
    );
}

#[test]
fn singletons_cover_only_their_instant() {
    let tzero = at(22, 18, 0);
    let when = When::parse("2014-12-24 22:00:00").unwrap();
    assert_eq!(when.datetimes(tzero), (Some(at(22, 0, 0)), Some(at(22, 0, 0))));
    assert!(when.in_scope(at(22, 0, 0), tzero));
    assert!(!when.in_scope(tzero, tzero));
    assert!(when.is_expired(tzero));
}

#[test]
fn sort_scope_is_signed_distance() {
    let when = When::parse("2014-12-24 22:00:00 ... 2014-12-24 23:00:00").unwrap();
    let tzero = at(12, 0, 0);
    assert_eq!(when.sort_scope(at(21, 59, 0), tzero), TimeDelta::minutes(-1));
    assert_eq!(when.sort_scope(at(22, 30, 0), tzero), TimeDelta::zero());
    assert_eq!(when.sort_scope(at(23, 0, 5), tzero), TimeDelta::seconds(5));
}

proptest! {
    #[test]
    fn containment_flips_exactly_at_the_bounds(a in 0i64..86_400, len in 0i64..86_400, at_s in -10i64..180_000) {
        let base = at(0, 0, 0);
        let start = base + TimeDelta::seconds(a);
        let end = start + TimeDelta::seconds(len);
        let when = When::range(start, end);
        let t = base + TimeDelta::seconds(at_s);
        prop_assert_eq!(when.in_scope(t, base), start <= t && t <= end);
        let sign = when.sort_scope(t, base);
        prop_assert_eq!(sign < TimeDelta::zero(), t < start);
        prop_assert_eq!(sign > TimeDelta::zero(), t > end);
    }

    #[test]
    fn anything_with_a_bound_follows_the_infinite_scope(offset in -86_400i64..86_400, len in 0i64..3_600) {
        let tzero = at(12, 0, 0);
        let start = tzero + TimeDelta::seconds(offset);
        let infinite = When::infinite();
        prop_assert!(When::lasting(start, TimeDelta::seconds(len)).follows(&infinite, tzero));
        prop_assert!(When::instant(start).follows(&infinite, tzero));
    }
}

#[test]
fn follows_checks_period_and_overlap() {
    let tzero = at(22, 18, 0);
    let capability = When::parse("now ... future / 1s").unwrap();

    let spec = When::parse("2014-12-24 22:18:42 + 1m / 1s").unwrap();
    assert!(spec.follows(&capability, tzero));

    let coarser = When::parse("2014-12-24 22:18:42 + 1m / 10s").unwrap();
    assert!(!coarser.follows(&capability, tzero));

    // Started before tzero but still running
    let under_way = When::parse("2014-12-24 22:17:00 + 5m / 1s").unwrap();
    assert!(under_way.follows(&capability, tzero));

    let over = When::parse("2014-12-24 22:10:00 + 1m / 1s").unwrap();
    assert!(!over.follows(&capability, tzero));

    assert!(When::infinite().follows(&When::infinite(), tzero));
}

#[test]
fn follows_uses_the_inner_period_of_repeated_scopes() {
    let tzero = at(22, 18, 0);
    let capability = When::parse("now ... future / 1s").unwrap();
    let repeated = When::parse("repeat now ... future / 1h { now + 5m / 1s }").unwrap();
    assert!(repeated.follows(&capability, tzero));
    let coarse = When::parse("repeat now ... future / 1h { now + 5m / 5s }").unwrap();
    assert!(!coarse.follows(&capability, tzero));
}

#[test]
fn plain_scopes_occur_once() {
    let when = When::parse("now + 30s").unwrap();
    let all: Vec<When> = when.occurrences(at(22, 0, 0)).collect();
    assert_eq!(all, vec![when]);
}

#[test]
fn periodic_occurrences_fast_forward_and_stop_at_the_outer_end() {
    let when = When::parse(
        "repeat 2014-12-24 22:00:00 ... 2014-12-24 23:00:00 / 15m { now + 5m / 1s }",
    )
    .unwrap();
    let all: Vec<String> = when
        .occurrences(at(22, 18, 42))
        .map(|w| w.to_string())
        .collect();
    assert_eq!(
        all,
        vec![
            "2014-12-24 22:30:00 + 5m / 1s",
            "2014-12-24 22:45:00 + 5m / 1s",
            "2014-12-24 23:00:00 + 5m / 1s",
        ]
    );

    let from_before: Vec<When> = when.occurrences(at(21, 0, 0)).take(1).collect();
    assert_eq!(from_before[0].start(), TimeRef::At(at(22, 0, 0)));
}

#[test]
fn cron_occurrences_match_the_crontab() {
    let when = When::parse("repeat now ... future cron 0 */15 * * * * { now + 5s }").unwrap();
    let crontab = when.repetition().and_then(|r| r.crontab()).copied().unwrap();
    let tzero = at(22, 18, 42);
    let all: Vec<When> = when.occurrences(tzero).take(3).collect();
    assert_eq!(all.len(), 3);
    let starts: Vec<TimeRef> = all.iter().map(|w| w.start()).collect();
    assert_eq!(
        starts,
        vec![
            TimeRef::At(at(22, 30, 0)),
            TimeRef::At(at(22, 45, 0)),
            TimeRef::At(at(23, 0, 0)),
        ]
    );
    for occurrence in &all {
        let (start, _) = occurrence.datetimes(tzero);
        assert!(crontab.matches(&start.unwrap()));
        assert_eq!(occurrence.duration(tzero), Some(TimeDelta::seconds(5)));
        assert!(occurrence.is_definite());
    }
}

#[test]
fn occurrence_cursors_restart_from_any_instant() {
    let when = When::parse("repeat now / 1h { now }").unwrap();
    let tzero = at(22, 0, 0);
    let mut first = when.occurrences(tzero);
    assert_eq!(first.next().map(|w| w.start()), Some(TimeRef::At(tzero)));
    let later = at(23, 30, 0);
    assert_eq!(
        when.occurrences(later).next().map(|w| w.start()),
        Some(TimeRef::At(later))
    );
}
