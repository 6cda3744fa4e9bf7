//! Wire exchange specs
//!
//! A full client/component conversation carried as JSON text.

use crate::prelude::*;
use mplane_core::wire;
use similar_asserts::assert_eq;

/// Encode on one side, decode on the other
fn carry(registries: &Registries, message: Message) -> Message {
    let text = wire::to_string(&message).unwrap();
    wire::from_str(registries, &text).unwrap()
}

#[tokio::test(start_paused = true)]
async fn capability_specification_receipt_redemption_result() {
    let registries = Registries::new().unwrap();
    let service = ping_service();
    let scheduler = scheduler_with(&service);

    // Component advertises its capability
    let advertised = scheduler.capabilities().remove(0);
    let Message::Capability(cap) = carry(&registries, advertised.clone().into()) else {
        panic!("expected capability");
    };
    assert_eq!(cap.token(), advertised.token());
    assert_eq!(cap.label(), Some("ping-aggregate"));

    // Client fills it in and sends it back
    let spec = ping_specification(&cap, "2014-12-24 22:18:00 + 1m / 1s");
    let request = carry(&registries, spec.clone().into());
    let Message::Receipt(receipt) = carry(&registries, scheduler.receive_message("client", request))
    else {
        panic!("expected receipt");
    };
    assert_eq!(receipt.token(), spec.token());

    scheduler.job(&receipt.token()).unwrap().finished().await;

    let redemption = carry(&registries, receipt.redemption().into());
    let Message::Result(result) = carry(&registries, scheduler.receive_message("client", redemption))
    else {
        panic!("expected result");
    };
    assert_eq!(result.token(), spec.token());
    assert_eq!(result.when().to_string(), "2014-12-24 22:18:00 + 1m / 1s");
    assert_eq!(
        result.result_value("delay.twoway.icmp.us.count", 0),
        Some(&Value::Natural(60))
    );
}

#[test]
fn exceptions_survive_the_wire() {
    let registries = Registries::new().unwrap();
    let exception = mplane_core::Exception::for_token("feedface", "unknown job");
    let Message::Exception(back) = carry(&registries, exception.clone().into()) else {
        panic!("expected exception");
    };
    assert_eq!(back, exception);
}
