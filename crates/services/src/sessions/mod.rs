mod slides;
mod video;

// Public API of the session subsystem.
pub use crate::error::{TrainingError, VideoError};
pub use slides::SlideSessionService;
pub use video::{MediaEvent, PlayerCommand, VideoSessionService};

use tracing::warn;

/// Best-effort persistence for app shutdown.
///
/// Closes whatever is open so the next launch resumes from the last
/// observed state; without this, up to an autosave interval of playback
/// would be lost when the window closes. Errors are logged, not
/// propagated: the process is exiting either way.
pub async fn flush_on_exit(slides: &mut SlideSessionService, video: &mut VideoSessionService) {
    if let Err(err) = slides.close_popup().await {
        warn!(%err, "saving slide progress on exit failed");
    }
    if let Err(err) = video.close().await {
        warn!(%err, "saving video progress on exit failed");
    }
}
