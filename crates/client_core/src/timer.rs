//! Wall-clock countdown for quiz attempts.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// Under this many seconds the countdown is shown as urgent.
pub const URGENT_BELOW_SECS: u64 = 5 * 60;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// `max(0, duration - floor(now - started_at))` in seconds.
pub fn remaining_seconds(started_at: DateTime<Utc>, duration_minutes: u32, now: DateTime<Utc>) -> u64 {
    let total = i64::from(duration_minutes) * 60;
    let elapsed = (now - started_at).num_milliseconds().div_euclid(1000);
    (total - elapsed).clamp(0, total) as u64
}

pub fn format_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    duration_minutes: u32,
    started_at: Option<DateTime<Utc>>,
    remaining: u64,
}

impl Countdown {
    pub fn new(duration_minutes: u32) -> Self {
        Self {
            duration_minutes,
            started_at: None,
            remaining: u64::from(duration_minutes) * 60,
        }
    }

    /// Authoritative recomputation from the server start time.
    pub fn resync(&mut self, started_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
        self.started_at = Some(started_at);
        self.remaining = remaining_seconds(started_at, self.duration_minutes, now);
        self.remaining
    }

    /// Per-second recomputation; never raises the remaining time.
    pub fn tick(&mut self, now: DateTime<Utc>) -> u64 {
        let computed = match self.started_at {
            Some(started_at) => remaining_seconds(started_at, self.duration_minutes, now),
            None => self.remaining.saturating_sub(1),
        };
        self.remaining = self.remaining.min(computed);
        self.remaining
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    pub fn is_urgent(&self) -> bool {
        self.remaining < URGENT_BELOW_SECS
    }

    pub fn display(&self) -> String {
        format_clock(self.remaining)
    }
}

#[cfg(test)]
#[path = "tests/timer_tests.rs"]
mod tests;
