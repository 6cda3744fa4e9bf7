use super::*;

#[test]
fn system_clock_returns_nondecreasing_time() {
    let clock = SystemClock;
    let t1 = clock.now();
    std::thread::sleep(Duration::from_millis(1));
    let t2 = clock.now();
    assert!(t2 >= t1);
}

#[test]
fn fake_clock_can_be_advanced() {
    let clock = FakeClock::at_ymd_hms(2014, 12, 24, 22, 18, 42);
    let t1 = clock.now();
    clock.advance(Duration::from_secs(60));
    let t2 = clock.now();
    assert_eq!((t2 - t1).num_seconds(), 60);
}

#[test]
fn fake_clock_is_cloneable_and_shared() {
    let clock1 = FakeClock::new();
    let clock2 = clock1.clone();
    let t1 = clock1.now();
    clock2.advance(Duration::from_secs(30));
    let t2 = clock1.now();
    assert_eq!((t2 - t1).num_seconds(), 30);
}

#[test]
fn fake_clock_set_overrides_time() {
    let clock = FakeClock::new();
    let target = FakeClock::at_ymd_hms(2020, 1, 1, 0, 0, 0).now();
    clock.set(target);
    assert_eq!(clock.now(), target);
}
