//! Statement token specs
//!
//! Tokens identify statements by content, independent of labels.

use crate::prelude::*;

#[test]
fn tokens_are_stable_across_copies() {
    let cap = ping_capability();
    assert_eq!(cap.token(), cap.clone().token());

    let spec = ping_specification(&cap, "now + 1m / 1s");
    let again = ping_specification(&cap, "now + 1m / 1s");
    assert_eq!(spec.token(), again.token());
}

#[test]
fn labels_do_not_change_tokens() {
    let cap = ping_capability();
    let mut relabelled = cap.clone();
    relabelled.set_label("something-else");
    assert_eq!(cap.token(), relabelled.token());
}

#[test]
fn parameter_values_change_tokens() {
    let cap = ping_capability();
    let spec = ping_specification(&cap, "now + 1m / 1s");
    let mut other = spec.clone();
    other
        .set_parameter_text("destination.ip4", "10.0.37.3")
        .unwrap();
    assert_ne!(spec.token(), other.token());
}

#[test]
fn scopes_change_tokens() {
    let cap = ping_capability();
    let minute = ping_specification(&cap, "now + 1m / 1s");
    let hour = ping_specification(&cap, "now + 1h / 1s");
    assert_ne!(minute.token(), hour.token());
}

#[test]
fn specifications_share_schema_with_their_capability() {
    let cap = ping_capability();
    let spec = ping_specification(&cap, "now + 1m / 1s");
    assert_eq!(spec.schema_hash(), cap.schema_hash());
    assert!(spec.fulfills(&cap, christmas_eve()));
}
