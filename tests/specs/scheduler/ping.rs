//! Ping aggregate specs
//!
//! A client asks a component for one minute of aggregate ping delays.

use crate::prelude::*;
use mplane_engine::JobState;
use std::time::Duration as StdDuration;

const ONE_MINUTE: &str = "2014-12-24 22:18:00 + 1m / 1s";

#[test]
fn the_specification_fulfills_the_capability() {
    let cap = ping_capability();
    let spec = ping_specification(&cap, ONE_MINUTE);
    spec.validate().unwrap();
    assert!(spec.fulfills(&cap, christmas_eve()));

    // A coarser period than the capability offers cannot be served
    let coarse = ping_specification(&cap, "2014-12-24 22:18:00 + 1m / 5s");
    assert!(!coarse.fulfills(&cap, christmas_eve()));
}

#[test]
fn timers_follow_the_scope() {
    let when = When::parse(ONE_MINUTE).unwrap();
    let tzero = christmas_eve();

    assert_eq!(
        when.timer_delays(tzero),
        (Some(StdDuration::ZERO), Some(StdDuration::from_secs(60)))
    );

    let later = tzero + chrono::TimeDelta::seconds(20);
    assert_eq!(
        when.timer_delays(later),
        (Some(StdDuration::ZERO), Some(StdDuration::from_secs(40)))
    );

    let after = tzero + chrono::TimeDelta::minutes(2);
    assert_eq!(when.timer_delays(after), (None, None));
}

#[tokio::test(start_paused = true)]
async fn a_minute_of_pings_yields_one_aggregate_result() {
    let service = ping_service();
    let scheduler = scheduler_with(&service);
    let spec = ping_specification(&ping_capability(), ONE_MINUTE);

    let token = receipt_token(&scheduler.receive_message("client", spec.into()));
    let job = scheduler.job(&token).unwrap();
    job.finished().await;

    assert_eq!(job.state(), JobState::Completed);
    let Message::Result(result) = job.get_reply() else {
        panic!("expected result");
    };
    assert_eq!(result.token(), token);
    assert_eq!(
        result.result_value("delay.twoway.icmp.us.mean", 0),
        Some(&Value::Natural(18_500))
    );
    assert_eq!(
        result.parameter_value("destination.ip4").map(ToString::to_string),
        Some("10.0.37.2".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn an_expired_specification_is_refused() {
    let service = ping_service();
    let scheduler = scheduler_with(&service);
    let spec = ping_specification(&ping_capability(), "2014-12-24 21:00:00 + 1m / 1s");
    let token = spec.token();

    let Message::Exception(exception) = scheduler.receive_message("client", spec.into()) else {
        panic!("expected exception");
    };
    assert_eq!(exception.token(), Some(token.as_str()));
    assert_eq!(scheduler.job_count(), 0);
    assert_eq!(service.run_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn a_finished_job_keeps_answering_with_its_result() {
    let service = ping_service();
    let scheduler = scheduler_with(&service);
    let spec = ping_specification(&ping_capability(), ONE_MINUTE);

    let token = receipt_token(&scheduler.receive_message("client", spec.into()));
    scheduler.job(&token).unwrap().finished().await;

    for _ in 0..3 {
        let redemption = mplane_core::Redemption::new(VERB_MEASURE, token.clone());
        let reply = scheduler.receive_message("client", redemption.into());
        assert!(matches!(reply, Message::Result(_)), "got {}", reply.kind());
    }
}
