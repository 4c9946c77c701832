use chrono::{DateTime, Utc};
use tracing::debug;

use storage::progress::ProgressStore;
use training_core::model::SlideProgress;
use training_core::navigation::{key_decision, BlockReason, BlockedNotice, KeyDecision};
use training_core::timer::SlideTimer;

use crate::error::TrainingError;

/// Orchestrates the gated walk through the slide deck.
///
/// Owns the progress aggregate, the dwell timer and the blocked-navigation
/// notice. The popup is either open or closed, one at a time; `previous`
/// and `next` are the only sanctioned ways to change the current slide,
/// and `next` stays locked until the dwell gate releases.
pub struct SlideSessionService {
    store: ProgressStore,
    progress: SlideProgress,
    popup_open: bool,
    timer: SlideTimer,
    notice: Option<BlockedNotice>,
}

impl SlideSessionService {
    /// Restore progress from the store, or start fresh.
    ///
    /// A stored record for a deck of a different size is discarded: the
    /// deck changed shape, so the old viewed set no longer means anything.
    ///
    /// # Errors
    ///
    /// Returns `TrainingError::Storage` for backend failures.
    pub async fn load(store: ProgressStore, total_slides: u32) -> Result<Self, TrainingError> {
        let progress = match store.slide_progress().await? {
            Some(saved) if saved.total_slides() == total_slides => saved,
            _ => store.reset_slide_progress(total_slides).await?,
        };

        Ok(Self {
            store,
            progress,
            popup_open: false,
            timer: SlideTimer::new(),
            notice: None,
        })
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.popup_open
    }

    #[must_use]
    pub fn total_slides(&self) -> u32 {
        self.progress.total_slides()
    }

    #[must_use]
    pub fn current_slide(&self) -> u32 {
        self.progress.current_slide_index()
    }

    #[must_use]
    pub fn percent(&self) -> f64 {
        self.progress.percent()
    }

    #[must_use]
    pub fn viewed_count(&self) -> usize {
        self.progress.viewed_slides().len()
    }

    #[must_use]
    pub fn countdown(&self) -> u32 {
        self.timer.countdown()
    }

    #[must_use]
    pub fn timer_progress(&self) -> f64 {
        self.timer.progress()
    }

    #[must_use]
    pub fn allow_next(&self) -> bool {
        self.timer.allow_next()
    }

    #[must_use]
    pub fn can_go_previous(&self) -> bool {
        self.popup_open && self.progress.current_slide_index() > 1
    }

    #[must_use]
    pub fn can_go_next(&self) -> bool {
        self.popup_open
            && self.timer.allow_next()
            && self.progress.current_slide_index() < self.progress.total_slides()
    }

    /// The active advisory notice, if one is showing.
    #[must_use]
    pub fn notice(&self) -> Option<BlockReason> {
        self.notice.map(|n| n.reason())
    }

    /// Open the slide popup, resuming on the persisted slide.
    ///
    /// # Errors
    ///
    /// Returns `TrainingError` for storage failures.
    pub async fn open_popup(&mut self, now: DateTime<Utc>) -> Result<(), TrainingError> {
        self.popup_open = true;
        let slide = self.progress.current_slide_index();
        self.enter_slide(slide, now).await
    }

    /// Close the popup: stop the timer, clear the notice, persist.
    ///
    /// # Errors
    ///
    /// Returns `TrainingError` for storage failures.
    pub async fn close_popup(&mut self) -> Result<(), TrainingError> {
        if !self.popup_open {
            return Ok(());
        }
        self.popup_open = false;
        self.timer.stop();
        self.notice = None;
        self.store.save_slide_progress(&mut self.progress).await?;
        Ok(())
    }

    /// Go back one slide. Never timer-gated.
    ///
    /// Returns `true` when the slide changed.
    ///
    /// # Errors
    ///
    /// Returns `TrainingError` for storage failures.
    pub async fn previous_slide(&mut self, now: DateTime<Utc>) -> Result<bool, TrainingError> {
        if !self.can_go_previous() {
            return Ok(false);
        }
        let destination = self.progress.current_slide_index() - 1;
        self.enter_slide(destination, now).await?;
        Ok(true)
    }

    /// Advance one slide, if the dwell gate has released.
    ///
    /// Returns `true` when the slide changed; a locked gate or the last
    /// slide refuse quietly.
    ///
    /// # Errors
    ///
    /// Returns `TrainingError` for storage failures.
    pub async fn next_slide(&mut self, now: DateTime<Utc>) -> Result<bool, TrainingError> {
        if !self.can_go_next() {
            return Ok(false);
        }
        let destination = self.progress.current_slide_index() + 1;
        self.enter_slide(destination, now).await?;
        Ok(true)
    }

    /// A page-change signal from the embedded viewer. Always rejected.
    pub fn reject_viewer_navigation(&mut self, now: DateTime<Utc>) {
        if !self.popup_open {
            return;
        }
        debug!(slide = self.progress.current_slide_index(), "viewer page change blocked");
        self.notice = Some(BlockedNotice::raise(BlockReason::ViewerPageChange, now));
    }

    /// A keydown seen while the popup is open.
    ///
    /// The caller cancels default behavior and propagation when the
    /// decision is `Block`.
    pub fn handle_key(&mut self, key: &str, now: DateTime<Utc>) -> KeyDecision {
        if !self.popup_open {
            return KeyDecision::Pass;
        }
        let decision = key_decision(key);
        if decision == KeyDecision::Block {
            debug!(key, "keyboard navigation blocked");
            self.notice = Some(BlockedNotice::raise(BlockReason::Key, now));
        }
        decision
    }

    /// Wheel or trackpad scroll over the viewer. Always rejected.
    pub fn reject_scroll(&mut self, now: DateTime<Utc>) {
        if !self.popup_open {
            return;
        }
        debug!("scroll navigation blocked");
        self.notice = Some(BlockedNotice::raise(BlockReason::Scroll, now));
    }

    /// Advance timers and expire the notice. Driven by the UI tick.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if self.timer.poll(now) {
            debug!(slide = self.progress.current_slide_index(), "dwell gate released");
        }
        if let Some(notice) = self.notice {
            if notice.is_expired(now) {
                self.notice = None;
            }
        }
    }

    /// Move onto a slide: arm or bypass the dwell gate, record the view,
    /// persist.
    async fn enter_slide(&mut self, slide: u32, now: DateTime<Utc>) -> Result<(), TrainingError> {
        if self.progress.total_slides() == 0 {
            // Empty deck: nothing to view and the gate never opens.
            self.timer.stop();
            return Ok(());
        }

        if self.progress.has_viewed(slide) {
            // Gate already satisfied in this or an earlier session; make
            // sure no freshly armed timer survives the move.
            self.timer.unlock();
        } else {
            self.timer.start(now);
        }

        self.progress.set_current(slide)?;
        self.progress.record_view(slide, now)?;
        self.store.save_slide_progress(&mut self.progress).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use training_core::time::fixed_now;
    use training_core::Clock;

    async fn open_session(total: u32) -> SlideSessionService {
        let store = ProgressStore::in_memory(Clock::fixed(fixed_now()));
        SlideSessionService::load(store, total).await.unwrap()
    }

    #[tokio::test]
    async fn open_arms_the_gate_on_a_fresh_slide() {
        let mut session = open_session(5).await;
        session.open_popup(fixed_now()).await.unwrap();

        assert!(session.is_open());
        assert_eq!(session.countdown(), 5);
        assert!(!session.allow_next());
        assert_eq!(session.viewed_count(), 1);
        assert_eq!(session.percent(), 20.0);
    }

    #[tokio::test]
    async fn next_is_refused_until_the_gate_releases() {
        let now = fixed_now();
        let mut session = open_session(5).await;
        session.open_popup(now).await.unwrap();

        assert!(!session.next_slide(now).await.unwrap());
        session.tick(now + Duration::seconds(5));
        assert!(session.allow_next());
        assert!(session.next_slide(now + Duration::seconds(5)).await.unwrap());
        assert_eq!(session.current_slide(), 2);
        assert_eq!(session.percent(), 40.0);
    }

    #[tokio::test]
    async fn previous_is_never_gated() {
        let now = fixed_now();
        let mut session = open_session(5).await;
        session.open_popup(now).await.unwrap();
        session.tick(now + Duration::seconds(5));
        session.next_slide(now + Duration::seconds(5)).await.unwrap();

        // Gate for slide 2 is still closed, going back works anyway.
        assert!(!session.allow_next());
        assert!(session
            .previous_slide(now + Duration::seconds(6))
            .await
            .unwrap());
        assert_eq!(session.current_slide(), 1);
        // Slide 1 was already viewed: unlocked immediately.
        assert!(session.allow_next());
    }

    #[tokio::test]
    async fn previous_refuses_on_the_first_slide() {
        let now = fixed_now();
        let mut session = open_session(5).await;
        session.open_popup(now).await.unwrap();
        assert!(!session.previous_slide(now).await.unwrap());
    }

    #[tokio::test]
    async fn blocked_key_raises_a_notice_that_expires() {
        let now = fixed_now();
        let mut session = open_session(5).await;
        session.open_popup(now).await.unwrap();

        assert_eq!(session.handle_key("ArrowRight", now), KeyDecision::Block);
        assert_eq!(session.notice(), Some(BlockReason::Key));
        assert_eq!(session.handle_key("q", now), KeyDecision::Pass);

        session.tick(now + Duration::seconds(1));
        assert!(session.notice().is_some());
        session.tick(now + Duration::seconds(2));
        assert!(session.notice().is_none());
    }

    #[tokio::test]
    async fn keys_pass_while_the_popup_is_closed() {
        let now = fixed_now();
        let mut session = open_session(5).await;
        assert_eq!(session.handle_key("ArrowRight", now), KeyDecision::Pass);
        assert!(session.notice().is_none());
    }

    #[tokio::test]
    async fn viewer_page_change_is_always_rejected() {
        let now = fixed_now();
        let mut session = open_session(5).await;
        session.open_popup(now).await.unwrap();
        session.reject_viewer_navigation(now);
        assert_eq!(session.notice(), Some(BlockReason::ViewerPageChange));
    }

    #[tokio::test]
    async fn scroll_notice_expires_sooner() {
        let now = fixed_now();
        let mut session = open_session(5).await;
        session.open_popup(now).await.unwrap();
        session.reject_scroll(now);
        session.tick(now + Duration::milliseconds(1499));
        assert_eq!(session.notice(), Some(BlockReason::Scroll));
        session.tick(now + Duration::milliseconds(1500));
        assert!(session.notice().is_none());
    }

    #[tokio::test]
    async fn empty_deck_disables_navigation() {
        let now = fixed_now();
        let mut session = open_session(0).await;
        session.open_popup(now).await.unwrap();

        assert_eq!(session.percent(), 0.0);
        session.tick(now + Duration::seconds(60));
        assert!(!session.allow_next());
        assert!(!session.next_slide(now + Duration::seconds(60)).await.unwrap());
        assert!(!session.previous_slide(now).await.unwrap());
    }
}
