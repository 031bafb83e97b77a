use super::*;

#[test]
fn fake_clock_starts_at_given_value() {
    let clock = FakeClock::new(100.0);
    assert_eq!(clock.now(), 100.0);
}

#[test]
fn fake_clock_advance_moves_forward() {
    let clock = FakeClock::new(0.0);
    clock.advance(5.5);
    assert_eq!(clock.now(), 5.5);
}

#[test]
fn fake_clock_clone_shares_state() {
    let clock = FakeClock::new(0.0);
    let clone = clock.clone();
    clone.advance(10.0);
    assert_eq!(clock.now(), 10.0);
}

#[test]
fn system_clock_now_is_positive() {
    let clock = SystemClock;
    assert!(clock.now() > 0.0);
}
