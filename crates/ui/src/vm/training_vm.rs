use services::SlideSessionService;
use training_core::navigation::BlockReason;

/// Render-ready snapshot of the slide session.
///
/// Views never hold the service lock across a render; they take one of
/// these while they have it and render from the copy.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrainingVm {
    pub open: bool,
    pub current_slide: u32,
    pub total_slides: u32,
    pub viewed_count: usize,
    pub percent: f64,
    pub countdown: u32,
    pub timer_progress: f64,
    pub can_go_previous: bool,
    pub can_go_next: bool,
    pub notice: Option<&'static str>,
}

impl TrainingVm {
    #[must_use]
    pub fn snapshot(session: &SlideSessionService) -> Self {
        Self {
            open: session.is_open(),
            current_slide: session.current_slide(),
            total_slides: session.total_slides(),
            viewed_count: session.viewed_count(),
            percent: session.percent(),
            countdown: session.countdown(),
            timer_progress: session.timer_progress(),
            can_go_previous: session.can_go_previous(),
            can_go_next: session.can_go_next(),
            notice: session.notice().map(notice_message),
        }
    }

    /// True while the dwell countdown badge should be visible.
    #[must_use]
    pub fn countdown_visible(&self) -> bool {
        self.open && !self.can_go_next && self.current_slide < self.total_slides
    }

    #[must_use]
    pub fn progress_label(&self) -> String {
        format!(
            "{} of {} slides viewed ({:.0}%)",
            self.viewed_count, self.total_slides, self.percent
        )
    }

    #[must_use]
    pub fn slide_label(&self) -> String {
        format!("Slide {} of {}", self.current_slide, self.total_slides)
    }
}

/// User-facing text for a rejected navigation input.
#[must_use]
pub fn notice_message(reason: BlockReason) -> &'static str {
    match reason {
        BlockReason::Key | BlockReason::ViewerPageChange => {
            "Please use the Previous / Next buttons to navigate."
        }
        BlockReason::Scroll => "Scrolling between slides is disabled.",
    }
}
