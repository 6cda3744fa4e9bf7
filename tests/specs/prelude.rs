//! Shared fixtures for the behavioural specs

use std::sync::Arc;

pub use chrono::{DateTime, TimeZone, Utc};
pub use mplane_core::{
    Capability, FakeClock, Message, Registries, Specification, Value, When, VERB_MEASURE,
};
pub use mplane_engine::{AllowAll, Behaviour, FakeService, Scheduler};
pub use std::time::Duration;

/// 2014-12-24 22:18:00 UTC
pub fn christmas_eve() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2014, 12, 24, 22, 18, 0).unwrap()
}

pub fn clock() -> FakeClock {
    FakeClock::at(christmas_eve())
}

/// Aggregate ping capability from a fixed source to any destination
pub fn ping_capability() -> Capability {
    let registry = Registries::new().unwrap().core().unwrap();
    let mut cap = Capability::new(VERB_MEASURE, registry);
    cap.set_label("ping-aggregate");
    cap.set_when(When::parse("now ... future / 1s").unwrap());
    cap.add_parameter_text("source.ip4", "10.0.27.2").unwrap();
    cap.add_parameter_text("destination.ip4", "*").unwrap();
    for column in [
        "delay.twoway.icmp.us.min",
        "delay.twoway.icmp.us.max",
        "delay.twoway.icmp.us.mean",
        "delay.twoway.icmp.us.count",
    ] {
        cap.add_result_column(column).unwrap();
    }
    cap
}

/// Ping 10.0.37.2 over `when`
pub fn ping_specification(cap: &Capability, when: &str) -> Specification {
    let mut spec = Specification::from_capability(cap);
    spec.set_parameter_text("destination.ip4", "10.0.37.2").unwrap();
    spec.set_when(When::parse(when).unwrap());
    spec
}

/// A fake ping service answering with one aggregate row
pub fn ping_service() -> FakeService {
    FakeService::new(ping_capability()).with_row([
        ("delay.twoway.icmp.us.min", Value::Natural(12_000)),
        ("delay.twoway.icmp.us.max", Value::Natural(31_000)),
        ("delay.twoway.icmp.us.mean", Value::Natural(18_500)),
        ("delay.twoway.icmp.us.count", Value::Natural(60)),
    ])
}

/// Scheduler at [`christmas_eve`] serving `service` to everyone
pub fn scheduler_with(service: &FakeService) -> Scheduler<FakeClock> {
    let scheduler = Scheduler::new(clock(), Arc::new(AllowAll));
    scheduler.add_service(Arc::new(service.clone())).unwrap();
    scheduler
}

pub fn receipt_token(reply: &Message) -> String {
    match reply {
        Message::Receipt(receipt) => receipt.token(),
        other => panic!("expected receipt, got {}", other.kind()),
    }
}
