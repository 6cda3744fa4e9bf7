//! Job sharing specs
//!
//! Identical specifications from different clients share one job.

use crate::prelude::*;

#[tokio::test(start_paused = true)]
async fn identical_specifications_run_once() {
    let service = ping_service();
    let scheduler = scheduler_with(&service);
    let cap = ping_capability();

    let first = ping_specification(&cap, "2014-12-24 22:18:00 + 1m / 1s");
    let second = ping_specification(&cap, "2014-12-24 22:18:00 + 1m / 1s");

    let a = receipt_token(&scheduler.receive_message("alice", first.into()));
    let b = receipt_token(&scheduler.receive_message("bob", second.into()));
    assert_eq!(a, b);
    assert_eq!(scheduler.job_count(), 1);

    scheduler.job(&a).unwrap().finished().await;
    assert_eq!(service.run_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn different_destinations_run_separately() {
    let service = ping_service();
    let scheduler = scheduler_with(&service);
    let cap = ping_capability();

    let first = ping_specification(&cap, "2014-12-24 22:18:00 + 1m / 1s");
    let mut second = first.clone();
    second
        .set_parameter_text("destination.ip4", "10.0.37.9")
        .unwrap();

    let a = receipt_token(&scheduler.receive_message("alice", first.into()));
    let b = receipt_token(&scheduler.receive_message("alice", second.into()));
    assert_ne!(a, b);

    scheduler.job(&a).unwrap().finished().await;
    scheduler.job(&b).unwrap().finished().await;
    assert_eq!(service.run_count(), 2);
}
