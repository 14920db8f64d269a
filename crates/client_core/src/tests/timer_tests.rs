use super::*;
use chrono::TimeZone;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).single().expect("valid time")
}

#[test]
fn remaining_time_floors_elapsed_seconds_and_never_goes_negative() {
    let started = start();
    assert_eq!(remaining_seconds(started, 30, started), 1800);
    assert_eq!(
        remaining_seconds(started, 30, started + Duration::milliseconds(1999)),
        1799
    );
    assert_eq!(remaining_seconds(started, 30, started + Duration::hours(2)), 0);
    // A start time in the future never yields more than the full duration.
    assert_eq!(remaining_seconds(started, 30, started - Duration::minutes(5)), 1800);
}

#[test]
fn ticks_never_increase_remaining_time() {
    let clock = ManualClock::new(start());
    let mut countdown = Countdown::new(10);
    countdown.resync(start(), clock.now());

    let mut previous = countdown.remaining();
    for step in [1, 1, 3, -20, 1, 0, 620] {
        clock.advance(Duration::seconds(step));
        let now = countdown.tick(clock.now());
        assert!(now <= previous, "tick raised remaining from {previous} to {now}");
        previous = now;
    }
    assert_eq!(countdown.remaining(), 0);
    assert!(countdown.is_expired());
}

#[test]
fn resync_is_authoritative() {
    let clock = ManualClock::new(start() + Duration::minutes(4));
    let mut countdown = Countdown::new(5);
    assert_eq!(countdown.tick(clock.now()), 299);

    assert_eq!(countdown.resync(start(), clock.now()), 60);
    assert!(countdown.is_urgent());
    assert_eq!(countdown.display(), "1:00");
}

#[test]
fn clock_formats_minutes_and_padded_seconds() {
    assert_eq!(format_clock(0), "0:00");
    assert_eq!(format_clock(65), "1:05");
    assert_eq!(format_clock(1800), "30:00");
}
