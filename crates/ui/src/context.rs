use std::sync::Arc;

use tokio::sync::Mutex;

use services::{Clock, SlideSessionService, VideoSessionService};
use training_core::model::{DocumentInfo, TrainingVideo};

/// What the composition root must provide for the UI to run.
pub trait UiApp: Send + Sync {
    fn clock(&self) -> Clock;
    fn documents(&self) -> Vec<DocumentInfo>;
    fn training_videos(&self) -> Vec<TrainingVideo>;

    fn slide_session(&self) -> Arc<Mutex<SlideSessionService>>;
    fn video_session(&self) -> Arc<Mutex<VideoSessionService>>;
}

/// Shared state handed to every view through the Dioxus context.
///
/// The two session services are behind async mutexes: event handlers and
/// the tick loop both mutate them from spawned tasks.
#[derive(Clone)]
pub struct AppContext {
    clock: Clock,
    documents: Vec<DocumentInfo>,
    training_videos: Vec<TrainingVideo>,

    slide_session: Arc<Mutex<SlideSessionService>>,
    video_session: Arc<Mutex<VideoSessionService>>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            clock: app.clock(),
            documents: app.documents(),
            training_videos: app.training_videos(),
            slide_session: app.slide_session(),
            video_session: app.video_session(),
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn documents(&self) -> &[DocumentInfo] {
        &self.documents
    }

    #[must_use]
    pub fn training_videos(&self) -> &[TrainingVideo] {
        &self.training_videos
    }

    #[must_use]
    pub fn slide_session(&self) -> Arc<Mutex<SlideSessionService>> {
        Arc::clone(&self.slide_session)
    }

    #[must_use]
    pub fn video_session(&self) -> Arc<Mutex<VideoSessionService>> {
        Arc::clone(&self.video_session)
    }
}

// This context is provided by the application composition root (`crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
