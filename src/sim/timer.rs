//! Countdown timer with idempotent start

use serde::{Deserialize, Serialize};

use crate::consts::TIMER_RESOLUTION;

/// A countdown that is either stopped (infinite) or running toward zero
///
/// Starting a running timer does nothing: the first requester wins.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Timer {
    remaining: Option<f32>,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.remaining.is_some()
    }

    /// True once a running timer reached zero (never while stopped)
    pub fn is_elapsed(&self) -> bool {
        self.remaining.is_some_and(|t| t <= TIMER_RESOLUTION)
    }

    pub fn remaining(&self) -> Option<f32> {
        self.remaining
    }

    /// Start the countdown; ignored while already running
    pub fn set(&mut self, duration: f32) {
        if !self.is_running() {
            self.remaining = Some(duration);
        }
    }

    /// Stop the countdown (back to infinite)
    pub fn reset(&mut self) {
        self.remaining = None;
    }

    pub fn update(&mut self, dt: f32) {
        if let Some(t) = self.remaining.as_mut() {
            *t = (*t - dt).max(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopped_timer_never_elapses() {
        let mut timer = Timer::new();
        timer.update(100.0);
        assert!(!timer.is_running());
        assert!(!timer.is_elapsed());
        assert_eq!(timer.remaining(), None);
    }

    #[test]
    fn test_set_is_idempotent() {
        let mut timer = Timer::new();
        timer.set(1.0);
        timer.update(0.4);
        timer.set(5.0);
        assert!((timer.remaining().unwrap() - 0.6).abs() < 0.0001);
    }

    #[test]
    fn test_elapses_and_floors_at_zero() {
        let mut timer = Timer::new();
        timer.set(0.5);
        for _ in 0..4 {
            timer.update(0.1);
            assert!(!timer.is_elapsed());
        }
        timer.update(0.1);
        assert!(timer.is_elapsed());
        timer.update(3.0);
        assert_eq!(timer.remaining(), Some(0.0));
    }

    #[test]
    fn test_reset_allows_new_start() {
        let mut timer = Timer::new();
        timer.set(1.0);
        timer.reset();
        assert!(!timer.is_running());
        timer.set(2.0);
        assert_eq!(timer.remaining(), Some(2.0));
    }
}
