use services::VideoSessionService;

use crate::vm::format_time;

/// Render-ready snapshot of the video session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VideoVm {
    pub open: bool,
    pub title: String,
    pub source: String,
    pub current_time: f64,
    pub duration: f64,
    pub percent: f64,
    pub playing: bool,
    pub ended: bool,
}

impl VideoVm {
    #[must_use]
    pub fn snapshot(session: &VideoSessionService) -> Self {
        Self {
            open: session.is_open(),
            title: session.title().unwrap_or_default().to_string(),
            source: session.source().unwrap_or_default().to_string(),
            current_time: session.current_time(),
            duration: session.duration(),
            percent: session.percent(),
            playing: session.is_playing(),
            ended: session.is_ended(),
        }
    }

    #[must_use]
    pub fn time_label(&self) -> String {
        format!(
            "{} / {}",
            format_time(self.current_time),
            format_time(self.duration)
        )
    }

    #[must_use]
    pub fn play_button_label(&self) -> &'static str {
        if self.ended {
            "Replay"
        } else if self.playing {
            "Pause"
        } else {
            "Play"
        }
    }
}
