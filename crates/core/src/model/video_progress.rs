use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::VideoId;

/// A save within this many seconds of the end marks the video completed.
pub const COMPLETION_TOLERANCE_SECS: f64 = 1.0;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum VideoProgressError {
    #[error("negative playback position")]
    NegativeTime,

    #[error("negative duration")]
    NegativeDuration,
}

/// Watch progress for a single video.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoProgress {
    video_id: VideoId,
    current_time: f64,
    duration: f64,
    completed: bool,
    last_updated: DateTime<Utc>,
}

impl VideoProgress {
    /// Build a progress record for a save during playback.
    ///
    /// `completed` is derived here: a position within
    /// [`COMPLETION_TOLERANCE_SECS`] of the end counts as finished.
    #[must_use]
    pub fn at_position(
        video_id: VideoId,
        current_time: f64,
        duration: f64,
        now: DateTime<Utc>,
    ) -> Self {
        let current_time = current_time.max(0.0);
        let duration = duration.max(0.0);
        let completed = duration > 0.0 && current_time >= duration - COMPLETION_TOLERANCE_SECS;
        Self {
            video_id,
            current_time,
            duration,
            completed,
            last_updated: now,
        }
    }

    /// Build the record written when playback reaches the natural end.
    #[must_use]
    pub fn completed_at_end(video_id: VideoId, duration: f64, now: DateTime<Utc>) -> Self {
        let duration = duration.max(0.0);
        Self {
            video_id,
            current_time: duration,
            duration,
            completed: true,
            last_updated: now,
        }
    }

    /// Rehydrate a record from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns an error for negative time or duration values.
    pub fn from_persisted(
        video_id: VideoId,
        current_time: f64,
        duration: f64,
        completed: bool,
        last_updated: DateTime<Utc>,
    ) -> Result<Self, VideoProgressError> {
        if !current_time.is_finite() || current_time < 0.0 {
            return Err(VideoProgressError::NegativeTime);
        }
        if !duration.is_finite() || duration < 0.0 {
            return Err(VideoProgressError::NegativeDuration);
        }
        Ok(Self {
            video_id,
            current_time,
            duration,
            completed,
            last_updated,
        })
    }

    #[must_use]
    pub fn video_id(&self) -> &VideoId {
        &self.video_id
    }

    #[must_use]
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    #[must_use]
    pub fn duration(&self) -> f64 {
        self.duration
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// True when the saved position is close enough to the end that
    /// resuming there would be pointless.
    #[must_use]
    pub fn is_near_end(&self) -> bool {
        self.current_time >= self.duration - COMPLETION_TOLERANCE_SECS
    }

    /// Watched percentage for display, capped at 100.
    #[must_use]
    pub fn percent(&self) -> f64 {
        if self.duration <= 0.0 || !self.current_time.is_finite() {
            return 0.0;
        }
        (self.current_time / self.duration * 100.0).min(100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn id() -> VideoId {
        VideoId::new("v1")
    }

    #[test]
    fn save_near_end_is_completed() {
        let p = VideoProgress::at_position(id(), 119.5, 120.0, fixed_now());
        assert!(p.completed());
    }

    #[test]
    fn save_two_seconds_short_is_not_completed() {
        let p = VideoProgress::at_position(id(), 118.0, 120.0, fixed_now());
        assert!(!p.completed());
    }

    #[test]
    fn completed_at_end_pins_position_to_duration() {
        let p = VideoProgress::completed_at_end(id(), 90.0, fixed_now());
        assert!(p.completed());
        assert_eq!(p.current_time(), 90.0);
        assert_eq!(p.percent(), 100.0);
    }

    #[test]
    fn percent_is_zero_without_duration() {
        let p = VideoProgress::at_position(id(), 10.0, 0.0, fixed_now());
        assert_eq!(p.percent(), 0.0);
    }

    #[test]
    fn percent_is_capped() {
        let p = VideoProgress::at_position(id(), 150.0, 120.0, fixed_now());
        assert_eq!(p.percent(), 100.0);
    }

    #[test]
    fn from_persisted_rejects_negatives() {
        assert!(VideoProgress::from_persisted(id(), -1.0, 10.0, false, fixed_now()).is_err());
        assert!(VideoProgress::from_persisted(id(), 1.0, -10.0, false, fixed_now()).is_err());
        assert!(VideoProgress::from_persisted(id(), f64::NAN, 10.0, false, fixed_now()).is_err());
    }
}
