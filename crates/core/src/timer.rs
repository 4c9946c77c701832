use chrono::{DateTime, Utc};

/// Dwell time required on a slide before "next" unlocks, in seconds.
pub const SLIDE_TIMER_SECS: u32 = 5;

const SLIDE_TIMER_MS: i64 = (SLIDE_TIMER_SECS as i64) * 1000;

/// Minimum-dwell-time gate for a single slide.
///
/// The timer is a deadline-based state machine: `start` arms it and `poll`
/// recomputes the countdown, fill percentage and unlock flag from the
/// elapsed time. There is never more than one armed timer; starting again
/// replaces the previous deadline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideTimer {
    started_at: Option<DateTime<Utc>>,
    countdown: u32,
    progress: f64,
    allow_next: bool,
}

impl SlideTimer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            started_at: None,
            countdown: SLIDE_TIMER_SECS,
            progress: 0.0,
            allow_next: false,
        }
    }

    /// Arm the gate; any previous run is discarded.
    pub fn start(&mut self, now: DateTime<Utc>) {
        self.started_at = Some(now);
        self.countdown = SLIDE_TIMER_SECS;
        self.progress = 0.0;
        self.allow_next = false;
    }

    /// Disarm without unlocking. Idempotent; display values keep their
    /// last polled state.
    pub fn stop(&mut self) {
        self.started_at = None;
    }

    /// Short-circuit to the finished state without arming a timer, for
    /// slides whose gate was already satisfied.
    pub fn unlock(&mut self) {
        self.started_at = None;
        self.countdown = 0;
        self.progress = 100.0;
        self.allow_next = true;
    }

    /// Advance the state machine to `now`.
    ///
    /// Returns `true` exactly once per run: on the poll where the full
    /// dwell time has elapsed and the gate unlocks.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        let Some(started_at) = self.started_at else {
            return false;
        };
        let elapsed_ms = (now - started_at).num_milliseconds();
        if elapsed_ms >= SLIDE_TIMER_MS {
            self.unlock();
            return true;
        }
        let elapsed_secs = (elapsed_ms / 1000).max(0) as u32;
        self.countdown = SLIDE_TIMER_SECS - elapsed_secs;
        self.progress =
            f64::from(SLIDE_TIMER_SECS - self.countdown) / f64::from(SLIDE_TIMER_SECS) * 100.0;
        false
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Whole seconds left on the countdown display.
    #[must_use]
    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    /// Fill percentage for the countdown bar, 0–100.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    #[must_use]
    pub fn allow_next(&self) -> bool {
        self.allow_next
    }
}

impl Default for SlideTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn starts_locked_with_full_countdown() {
        let mut timer = SlideTimer::new();
        timer.start(fixed_now());
        assert!(!timer.allow_next());
        assert_eq!(timer.countdown(), 5);
        assert_eq!(timer.progress(), 0.0);
    }

    #[test]
    fn counts_down_by_whole_seconds() {
        let start = fixed_now();
        let mut timer = SlideTimer::new();
        timer.start(start);

        assert!(!timer.poll(start + Duration::milliseconds(2500)));
        assert_eq!(timer.countdown(), 3);
        assert_eq!(timer.progress(), 40.0);
        assert!(!timer.allow_next());
    }

    #[test]
    fn unlocks_exactly_once_at_the_deadline() {
        let start = fixed_now();
        let mut timer = SlideTimer::new();
        timer.start(start);

        assert!(timer.poll(start + Duration::seconds(5)));
        assert!(timer.allow_next());
        assert_eq!(timer.countdown(), 0);
        assert_eq!(timer.progress(), 100.0);

        // Subsequent polls do not report the unlock again.
        assert!(!timer.poll(start + Duration::seconds(6)));
        assert!(timer.allow_next());
    }

    #[test]
    fn stop_before_deadline_keeps_gate_locked() {
        let start = fixed_now();
        let mut timer = SlideTimer::new();
        timer.start(start);
        timer.stop();

        assert!(!timer.poll(start + Duration::seconds(10)));
        assert!(!timer.allow_next());
    }

    #[test]
    fn stop_is_idempotent() {
        let mut timer = SlideTimer::new();
        timer.stop();
        timer.stop();
        assert!(!timer.is_running());
    }

    #[test]
    fn restart_replaces_previous_run() {
        let start = fixed_now();
        let mut timer = SlideTimer::new();
        timer.start(start);
        timer.poll(start + Duration::seconds(4));

        let restarted = start + Duration::seconds(4);
        timer.start(restarted);
        assert!(!timer.poll(restarted + Duration::seconds(4)));
        assert!(!timer.allow_next());
        assert!(timer.poll(restarted + Duration::seconds(5)));
    }

    #[test]
    fn unlock_short_circuits_without_running() {
        let mut timer = SlideTimer::new();
        timer.unlock();
        assert!(timer.allow_next());
        assert!(!timer.is_running());
        assert_eq!(timer.countdown(), 0);
        assert_eq!(timer.progress(), 100.0);
    }
}
