use crate::model::VideoProgress;

/// Position jumps within this window are treated as buffering resyncs, not
/// user seeks.
pub const SEEK_RESYNC_TOLERANCE_SECS: f64 = 1.0;

/// Outcome of a seek attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeekDecision {
    /// Let the seek through (rewind, or the guard is lifted).
    Allow,
    /// Small jump around the tracked position; update tracking silently.
    Resync,
    /// Forward seek past the high-watermark; snap back to it.
    ClampTo(f64),
}

/// High-watermark seek guard for one open video.
///
/// Rewinding is always permitted; skipping ahead of the furthest position
/// ever reached is not, until the video has been completed once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekGuard {
    max_allowed: f64,
    completed: bool,
}

impl SeekGuard {
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_allowed: 0.0,
            completed: false,
        }
    }

    /// Seed the guard from persisted progress when a session opens.
    #[must_use]
    pub fn from_progress(saved: Option<&VideoProgress>) -> Self {
        match saved {
            Some(progress) => Self {
                max_allowed: progress.current_time(),
                completed: progress.completed(),
            },
            None => Self::new(),
        }
    }

    /// Decide what to do with a seek to `target`, given the position the
    /// session currently tracks.
    #[must_use]
    pub fn on_seek(&self, target: f64, tracked_current: f64) -> SeekDecision {
        if self.completed {
            return SeekDecision::Allow;
        }
        if (target - tracked_current).abs() <= SEEK_RESYNC_TOLERANCE_SECS {
            return SeekDecision::Resync;
        }
        if target > self.max_allowed {
            return SeekDecision::ClampTo(self.max_allowed);
        }
        SeekDecision::Allow
    }

    /// Raise the high-watermark on natural playback advance.
    pub fn on_time_update(&mut self, position: f64) {
        if !self.completed && position > self.max_allowed {
            self.max_allowed = position;
        }
    }

    /// Lift the guard for the rest of the session.
    pub fn mark_completed(&mut self) {
        self.completed = true;
    }

    #[must_use]
    pub fn max_allowed(&self) -> f64 {
        self.max_allowed
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }
}

impl Default for SeekGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VideoId;
    use crate::time::fixed_now;

    fn guard_at(max_allowed: f64) -> SeekGuard {
        let mut guard = SeekGuard::new();
        guard.on_time_update(max_allowed);
        guard
    }

    #[test]
    fn forward_seek_past_watermark_is_clamped() {
        let guard = guard_at(30.0);
        assert_eq!(guard.on_seek(45.0, 29.0), SeekDecision::ClampTo(30.0));
    }

    #[test]
    fn rewind_is_always_allowed() {
        let guard = guard_at(30.0);
        assert_eq!(guard.on_seek(10.0, 29.0), SeekDecision::Allow);
    }

    #[test]
    fn completed_guard_allows_any_seek() {
        let mut guard = guard_at(30.0);
        guard.mark_completed();
        assert_eq!(guard.on_seek(500.0, 1.0), SeekDecision::Allow);
        assert_eq!(guard.on_seek(0.0, 1.0), SeekDecision::Allow);
    }

    #[test]
    fn small_jump_is_a_resync() {
        let guard = guard_at(30.0);
        assert_eq!(guard.on_seek(29.6, 29.0), SeekDecision::Resync);
        assert_eq!(guard.on_seek(28.2, 29.0), SeekDecision::Resync);
    }

    #[test]
    fn watermark_only_rises() {
        let mut guard = guard_at(30.0);
        guard.on_time_update(12.0);
        assert_eq!(guard.max_allowed(), 30.0);
        guard.on_time_update(31.5);
        assert_eq!(guard.max_allowed(), 31.5);
    }

    #[test]
    fn completed_guard_stops_tracking() {
        let mut guard = guard_at(30.0);
        guard.mark_completed();
        guard.on_time_update(60.0);
        assert_eq!(guard.max_allowed(), 30.0);
    }

    #[test]
    fn seeds_from_saved_progress() {
        let saved =
            VideoProgress::from_persisted(VideoId::new("v"), 42.0, 120.0, false, fixed_now())
                .unwrap();
        let guard = SeekGuard::from_progress(Some(&saved));
        assert_eq!(guard.max_allowed(), 42.0);
        assert!(!guard.completed());

        let fresh = SeekGuard::from_progress(None);
        assert_eq!(fresh.max_allowed(), 0.0);
    }
}
