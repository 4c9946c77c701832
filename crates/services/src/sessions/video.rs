use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use storage::progress::ProgressStore;
use training_core::model::{TrainingVideo, VideoId, VideoProgress};
use training_core::seek::{SeekDecision, SeekGuard};

use crate::error::VideoError;

/// Wall-time gap between periodic autosaves while a video is open.
const AUTOSAVE_INTERVAL_SECS: i64 = 5;
/// Playback-position bucket size for opportunistic saves.
const SAVE_BOUNDARY_SECS: f64 = 30.0;

/// Events reported by the media surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaEvent {
    /// The element knows its duration; saved progress can be applied.
    MetadataLoaded { duration: f64 },
    /// Natural playback advance.
    TimeUpdate { position: f64, duration: f64 },
    /// The playback position is being moved to `target`.
    Seeking { target: f64 },
    Play,
    Pause,
    /// Playback reached the natural end.
    Ended,
}

/// Effects the media surface must apply to the playing element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerCommand {
    SetPosition(f64),
    Play,
    Pause,
}

/// Live playback state for the open video.
struct ActiveVideo {
    id: VideoId,
    source: String,
    title: String,
    current_time: f64,
    duration: f64,
    playing: bool,
    ended: bool,
    guard: SeekGuard,
    last_autosave: DateTime<Utc>,
    last_save_bucket: Option<i64>,
}

impl ActiveVideo {
    fn fresh(video: TrainingVideo, now: DateTime<Utc>) -> Self {
        Self {
            id: video.id,
            source: video.source,
            title: video.title,
            current_time: 0.0,
            duration: 0.0,
            playing: false,
            ended: false,
            guard: SeekGuard::new(),
            last_autosave: now,
            last_save_bucket: None,
        }
    }
}

/// One modal video playback session.
///
/// At most one video is tracked live; opening another flushes the previous
/// session first. Every mutation that matters for resumption ends in a
/// `ProgressStore` save: the autosave tick, 30-second playback boundaries,
/// pause, completion, and close.
pub struct VideoSessionService {
    store: ProgressStore,
    active: Option<ActiveVideo>,
}

impl VideoSessionService {
    #[must_use]
    pub fn new(store: ProgressStore) -> Self {
        Self {
            store,
            active: None,
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.active.as_ref().map(|v| v.title.as_str())
    }

    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.active.as_ref().map(|v| v.source.as_str())
    }

    #[must_use]
    pub fn video_id(&self) -> Option<&VideoId> {
        self.active.as_ref().map(|v| &v.id)
    }

    #[must_use]
    pub fn current_time(&self) -> f64 {
        self.active.as_ref().map_or(0.0, |v| v.current_time)
    }

    #[must_use]
    pub fn duration(&self) -> f64 {
        self.active.as_ref().map_or(0.0, |v| v.duration)
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.active.as_ref().is_some_and(|v| v.playing)
    }

    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.active.as_ref().is_some_and(|v| v.ended)
    }

    /// Watched percentage for the progress bar, 0 while duration is
    /// unknown.
    #[must_use]
    pub fn percent(&self) -> f64 {
        let Some(video) = self.active.as_ref() else {
            return 0.0;
        };
        if video.duration <= 0.0 || !video.current_time.is_finite() {
            return 0.0;
        }
        (video.current_time / video.duration * 100.0).min(100.0)
    }

    /// Open a video session, flushing any session already open.
    ///
    /// Initialization that depends on the element (resume position, seek
    /// guard seeding) waits for `MediaEvent::MetadataLoaded`.
    ///
    /// # Errors
    ///
    /// Returns `VideoError::Storage` if flushing the previous session
    /// fails.
    pub async fn open(
        &mut self,
        video: TrainingVideo,
        now: DateTime<Utc>,
    ) -> Result<Vec<PlayerCommand>, VideoError> {
        let mut commands = Vec::new();
        if self.active.is_some() {
            self.save_progress().await?;
            commands.push(PlayerCommand::Pause);
        }
        self.active = Some(ActiveVideo::fresh(video, now));
        Ok(commands)
    }

    /// Close the session: persist, pause, forget the transient state.
    ///
    /// Overlay clicks and app shutdown funnel through here as well.
    ///
    /// # Errors
    ///
    /// Returns `VideoError::Storage` if the final save fails.
    pub async fn close(&mut self) -> Result<Vec<PlayerCommand>, VideoError> {
        if self.active.is_none() {
            return Ok(Vec::new());
        }
        self.save_progress().await?;
        self.active = None;
        Ok(vec![PlayerCommand::Pause])
    }

    /// Feed one event from the media surface through the session.
    ///
    /// # Errors
    ///
    /// Returns `VideoError::Storage` when a triggered save fails.
    pub async fn on_media_event(
        &mut self,
        event: MediaEvent,
        now: DateTime<Utc>,
    ) -> Result<Vec<PlayerCommand>, VideoError> {
        if self.active.is_none() {
            return Ok(Vec::new());
        }

        match event {
            MediaEvent::MetadataLoaded { duration } => self.initialize(duration).await,
            MediaEvent::TimeUpdate { position, duration } => {
                self.on_time_update(position, duration).await
            }
            MediaEvent::Seeking { target } => Ok(self.on_seeking(target)),
            MediaEvent::Play => {
                if let Some(video) = self.active.as_mut() {
                    video.playing = true;
                }
                Ok(Vec::new())
            }
            MediaEvent::Pause => {
                if let Some(video) = self.active.as_mut() {
                    video.playing = false;
                }
                self.save_progress().await?;
                Ok(Vec::new())
            }
            MediaEvent::Ended => self.on_ended(now).await,
        }
    }

    /// Play, pause, or replay from the start when the video has ended.
    #[must_use]
    pub fn toggle_play_pause(&mut self) -> Vec<PlayerCommand> {
        let (ended, playing) = match self.active.as_ref() {
            Some(video) => (video.ended, video.playing),
            None => return Vec::new(),
        };
        if ended {
            return self.restart();
        }
        if playing {
            vec![PlayerCommand::Pause]
        } else {
            vec![PlayerCommand::Play]
        }
    }

    /// Replay from the beginning after a completed run.
    ///
    /// The only sanctioned backwards move of the tracked position; the
    /// guard's completed flag keeps later seeks unrestricted.
    #[must_use]
    pub fn restart(&mut self) -> Vec<PlayerCommand> {
        let Some(video) = self.active.as_mut() else {
            return Vec::new();
        };
        video.current_time = 0.0;
        video.ended = false;
        video.last_save_bucket = None;
        vec![PlayerCommand::SetPosition(0.0), PlayerCommand::Play]
    }

    /// Periodic autosave, driven by the UI tick.
    ///
    /// # Errors
    ///
    /// Returns `VideoError::Storage` when the save fails.
    pub async fn tick(&mut self, now: DateTime<Utc>) -> Result<(), VideoError> {
        let Some(video) = self.active.as_ref() else {
            return Ok(());
        };
        let due = now - video.last_autosave >= Duration::seconds(AUTOSAVE_INTERVAL_SECS);
        if due && video.current_time > 0.0 {
            self.save_progress().await?;
            if let Some(video) = self.active.as_mut() {
                video.last_autosave = now;
            }
        }
        Ok(())
    }

    /// Apply saved progress once the element reports its metadata.
    async fn initialize(&mut self, duration: f64) -> Result<Vec<PlayerCommand>, VideoError> {
        let saved = match self.active.as_ref() {
            Some(video) => self.store.video_progress(&video.id).await?,
            None => return Ok(Vec::new()),
        };
        let Some(video) = self.active.as_mut() else {
            return Ok(Vec::new());
        };
        video.duration = duration;
        video.guard = SeekGuard::from_progress(saved.as_ref());

        let mut commands = Vec::new();
        if let Some(saved) = saved {
            if saved.completed() {
                // Completed before: show the ended state, position at the
                // start so replay is one click away.
                video.ended = true;
                video.current_time = saved.duration();
                commands.push(PlayerCommand::SetPosition(0.0));
            } else if saved.current_time() > 0.0 && !saved.is_near_end() {
                debug!(video = %video.id, position = saved.current_time(), "resuming playback");
                video.current_time = saved.current_time();
                video.last_save_bucket =
                    Some((saved.current_time() / SAVE_BOUNDARY_SECS) as i64);
                commands.push(PlayerCommand::SetPosition(saved.current_time()));
            }
        }
        Ok(commands)
    }

    async fn on_time_update(
        &mut self,
        position: f64,
        duration: f64,
    ) -> Result<Vec<PlayerCommand>, VideoError> {
        let crossed_boundary = {
            let Some(video) = self.active.as_mut() else {
                return Ok(Vec::new());
            };
            video.current_time = position;
            if duration.is_finite() && duration > 0.0 {
                video.duration = duration;
            }
            video.guard.on_time_update(position);

            let bucket = (position / SAVE_BOUNDARY_SECS) as i64;
            let crossed =
                position > 1.0 && bucket > 0 && video.last_save_bucket != Some(bucket);
            if crossed {
                video.last_save_bucket = Some(bucket);
            }
            crossed
        };

        if crossed_boundary {
            self.save_progress().await?;
        }
        Ok(Vec::new())
    }

    fn on_seeking(&mut self, target: f64) -> Vec<PlayerCommand> {
        let Some(video) = self.active.as_mut() else {
            return Vec::new();
        };
        match video.guard.on_seek(target, video.current_time) {
            SeekDecision::Allow | SeekDecision::Resync => {
                video.current_time = target;
                Vec::new()
            }
            SeekDecision::ClampTo(max_allowed) => {
                debug!(video = %video.id, target, max_allowed, "forward seek clamped");
                vec![PlayerCommand::SetPosition(max_allowed)]
            }
        }
    }

    async fn on_ended(&mut self, now: DateTime<Utc>) -> Result<Vec<PlayerCommand>, VideoError> {
        let record = {
            let Some(video) = self.active.as_mut() else {
                return Ok(Vec::new());
            };
            video.playing = false;
            video.ended = true;
            video.current_time = video.duration;
            video.guard.mark_completed();
            VideoProgress::completed_at_end(video.id.clone(), video.duration, now)
        };
        self.store.save_video_progress(&record).await?;
        Ok(Vec::new())
    }

    /// Persist the tracked position. Skipped until playback has actually
    /// advanced, so opening and closing a video leaves no record.
    async fn save_progress(&self) -> Result<(), VideoError> {
        let Some(video) = self.active.as_ref() else {
            return Ok(());
        };
        if video.current_time <= 0.0 {
            return Ok(());
        }
        // The store restamps on save; this timestamp only seeds the record.
        let record = VideoProgress::at_position(
            video.id.clone(),
            video.current_time,
            video.duration,
            Utc::now(),
        );
        self.store.save_video_progress(&record).await?;
        Ok(())
    }
}
