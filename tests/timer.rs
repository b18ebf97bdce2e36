use std::time::Duration;

use pacman_core::timer::TimerRegistry;
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

#[test]
fn test_paused_interval_does_not_count() {
    let mut timers = TimerRegistry::new();
    let id = timers.schedule(ms(1000), "fire");

    assert_that(&timers.advance(ms(400))).is_empty();
    assert!(timers.pause(id));
    assert_that(&timers.advance(ms(5000))).is_empty();
    assert!(timers.is_paused(id));

    assert!(timers.resume(id));
    assert_eq!(timers.remaining(id), Some(ms(600)));
    assert_that(&timers.advance(ms(599))).is_empty();

    let fired = timers.advance(ms(1));
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].action, "fire");
    assert_eq!(fired[0].overdue, Duration::ZERO);
    assert!(!timers.is_pending(id));
}

#[test]
fn test_pause_all_holds_every_entry() {
    let mut timers = TimerRegistry::new();
    timers.schedule(ms(100), 1);
    timers.schedule(ms(200), 2);

    timers.pause_all();
    assert_that(&timers.advance(ms(1000))).is_empty();
    timers.resume_all();

    let fired: Vec<_> = timers.advance(ms(250)).into_iter().map(|fired| fired.action).collect();
    assert_eq!(fired, vec![1, 2]);
    assert!(timers.is_empty());
    assert_eq!(timers.elapsed(), ms(1250));
}

#[test]
fn test_overdue_reports_lateness() {
    let mut timers = TimerRegistry::new();
    timers.schedule(ms(10), ());
    let fired = timers.advance(ms(16));
    assert_eq!(fired[0].overdue, ms(6));
}
