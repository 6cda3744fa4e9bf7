use super::*;
use chrono::TimeZone;
use proptest::prelude::*;
use yare::parameterized;

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}

#[parameterized(
    every_second = { "* * * * * *", "* * * * * *" },
    quarter_hours = { "0 */15 * * * *", "0 */15 * * * *" },
    list_collapses_to_step = { "0 0,15,30,45 * * * *", "0 */15 * * * *" },
    working_hours = { "0 0 9-17 * 0-4 *", "0 0 9-17 * 0-4 *" },
    runs_collapse = { "5,6,7,10 * * * * *", "5-7,10 * * * * *" },
    offset_step = { "10/20 * * * * *", "10,30,50 * * * * *" },
    ranged_step = { "0 0-30/10 * * * *", "0 0,10,20,30 * * * *" },
    full_list = { "* * * * 0,1,2,3,4,5,6 *", "* * * * * *" },
)]
fn unparse_is_canonical(text: &str, canonical: &str) {
    assert_eq!(Crontab::parse(text).unwrap().to_string(), canonical);
}

#[parameterized(
    too_few = { "0 * * * *" },
    too_many = { "0 * * * * * *" },
    second_out_of_range = { "60 * * * * *" },
    day_zero = { "* * * 0 * *" },
    weekday_seven = { "* * * * 7 *" },
    reversed = { "* 30-10 * * * *" },
    zero_step = { "*/0 * * * * *" },
    word = { "* * * * mon *" },
)]
fn malformed_crontabs_are_rejected(text: &str) {
    assert!(matches!(
        Crontab::parse(text),
        Err(ParseError::InvalidCrontab { .. })
    ));
}

#[test]
fn values_lists_admitted_components() {
    let cron = Crontab::parse("0 */15 * * * *").unwrap();
    assert_eq!(cron.values(CronField::Minutes), vec![0, 15, 30, 45]);
    assert_eq!(cron.values(CronField::Seconds), vec![0]);
    assert_eq!(cron.values(CronField::Months).len(), 12);
}

#[parameterized(
    next_quarter = { "0 */15 * * * *", at(2014, 12, 24, 22, 18, 42), at(2014, 12, 24, 22, 30, 0) },
    exact_match = { "0 */15 * * * *", at(2014, 12, 24, 22, 30, 0), at(2014, 12, 24, 22, 30, 0) },
    rolls_year = { "0 0 0 * * *", at(2014, 12, 31, 23, 59, 59), at(2015, 1, 1, 0, 0, 0) },
    weekday = { "0 0 12 * 5 *", at(2014, 12, 24, 22, 18, 42), at(2014, 12, 27, 12, 0, 0) },
    leap_day = { "0 0 0 29 * 2", at(2015, 1, 1, 0, 0, 0), at(2016, 2, 29, 0, 0, 0) },
    month = { "30 * * * * 3", at(2014, 12, 24, 22, 18, 42), at(2015, 3, 1, 0, 0, 30) },
)]
fn next_match_finds_the_first_matching_second(text: &str, from: DateTime<Utc>, expected: DateTime<Utc>) {
    let cron = Crontab::parse(text).unwrap();
    assert_eq!(cron.next_match(from), Some(expected));
}

#[test]
fn next_match_rounds_up_fractional_seconds() {
    let cron = Crontab::parse("0 */15 * * * *").unwrap();
    let from = at(2014, 12, 24, 22, 30, 0) + Duration::milliseconds(500);
    assert_eq!(cron.next_match(from), Some(at(2014, 12, 24, 22, 45, 0)));
}

#[test]
fn impossible_dates_give_up() {
    let cron = Crontab::parse("0 0 0 31 * 2").unwrap();
    assert_eq!(cron.next_match(at(2014, 12, 24, 0, 0, 0)), None);
}

proptest! {
    #[test]
    fn next_match_matches_and_does_not_go_back(
        offset in 0i64..(400 * 86_400),
        cron in prop::sample::select(vec![
            "0 */15 * * * *",
            "*/7 * 3-5 * * *",
            "0 0 12 * 5 *",
            "15 30 1 1,15 * *",
        ]),
    ) {
        let cron = Crontab::parse(cron).unwrap();
        let from = at(2014, 1, 1, 0, 0, 0) + Duration::seconds(offset);
        let found = cron.next_match(from).unwrap();
        prop_assert!(found >= from);
        prop_assert!(cron.matches(&found));
    }
}
