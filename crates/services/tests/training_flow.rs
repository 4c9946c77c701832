//! End-to-end walk through the gated slide deck, including resumption
//! across sessions backed by the same store.

use chrono::Duration;

use services::{
    flush_on_exit, Clock, MediaEvent, SlideSessionService, VideoSessionService,
};
use storage::progress::ProgressStore;
use training_core::model::{TrainingVideo, VideoId};
use training_core::time::fixed_now;

#[tokio::test]
async fn full_gated_walk_through_a_five_slide_deck() {
    let mut now = fixed_now();
    let store = ProgressStore::in_memory(Clock::fixed(now));
    let mut session = SlideSessionService::load(store.clone(), 5).await.unwrap();

    session.open_popup(now).await.unwrap();
    assert_eq!(session.current_slide(), 1);
    assert_eq!(session.countdown(), 5);
    assert!(!session.can_go_next());
    assert!(!session.can_go_previous());
    assert_eq!(session.percent(), 20.0);

    for expected_slide in 2..=5 {
        // The gate holds for the full dwell.
        now += Duration::milliseconds(2500);
        session.tick(now);
        assert!(!session.next_slide(now).await.unwrap());

        now += Duration::milliseconds(2500);
        session.tick(now);
        assert!(session.can_go_next());
        assert!(session.next_slide(now).await.unwrap());
        assert_eq!(session.current_slide(), expected_slide);
    }

    assert_eq!(session.percent(), 100.0);
    assert_eq!(session.viewed_count(), 5);
    // Last slide: nothing further to advance to.
    now += Duration::seconds(5);
    session.tick(now);
    assert!(!session.can_go_next());

    session.close_popup().await.unwrap();
    assert!(!session.is_open());
}

#[tokio::test]
async fn revisited_slides_skip_the_dwell_gate() {
    let mut now = fixed_now();
    let store = ProgressStore::in_memory(Clock::fixed(now));
    let mut session = SlideSessionService::load(store.clone(), 3).await.unwrap();

    session.open_popup(now).await.unwrap();
    now += Duration::seconds(5);
    session.tick(now);
    session.next_slide(now).await.unwrap();
    now += Duration::seconds(5);
    session.tick(now);

    // Back to slide 1, then forward again: both already viewed, no wait.
    assert!(session.previous_slide(now).await.unwrap());
    assert!(session.allow_next());
    assert!(session.next_slide(now).await.unwrap());
    assert!(session.allow_next());
    assert_eq!(session.current_slide(), 2);
}

#[tokio::test]
async fn progress_survives_a_restart() {
    let mut now = fixed_now();
    let store = ProgressStore::in_memory(Clock::fixed(now));

    {
        let mut session = SlideSessionService::load(store.clone(), 5).await.unwrap();
        session.open_popup(now).await.unwrap();
        now += Duration::seconds(5);
        session.tick(now);
        session.next_slide(now).await.unwrap();
        session.close_popup().await.unwrap();
    }

    // A new service over the same store resumes on slide 2 with both
    // slides counted, and reopening a viewed slide needs no dwell.
    let mut session = SlideSessionService::load(store, 5).await.unwrap();
    assert_eq!(session.current_slide(), 2);
    assert_eq!(session.viewed_count(), 2);
    assert_eq!(session.percent(), 40.0);

    session.open_popup(now).await.unwrap();
    assert!(session.allow_next());
}

#[tokio::test]
async fn changing_the_deck_size_resets_progress() {
    let now = fixed_now();
    let store = ProgressStore::in_memory(Clock::fixed(now));

    {
        let mut session = SlideSessionService::load(store.clone(), 5).await.unwrap();
        session.open_popup(now).await.unwrap();
        session.close_popup().await.unwrap();
    }

    let session = SlideSessionService::load(store, 8).await.unwrap();
    assert_eq!(session.total_slides(), 8);
    assert_eq!(session.current_slide(), 1);
    assert_eq!(session.viewed_count(), 0);
    assert_eq!(session.percent(), 0.0);
}

#[tokio::test]
async fn exit_flush_persists_both_open_sessions() {
    let now = fixed_now();
    let store = ProgressStore::in_memory(Clock::fixed(now));
    let mut slides = SlideSessionService::load(store.clone(), 5).await.unwrap();
    let mut video = VideoSessionService::new(store.clone());

    slides.open_popup(now).await.unwrap();
    video
        .open(
            TrainingVideo::new("intro", "assets/videos/intro.mp4", "Introduction"),
            now,
        )
        .await
        .unwrap();
    video
        .on_media_event(
            MediaEvent::TimeUpdate {
                position: 7.0,
                duration: 120.0,
            },
            now,
        )
        .await
        .unwrap();

    // Between autosave ticks, the only copy of the 7-second position is
    // in the live session. The exit flush must persist it.
    flush_on_exit(&mut slides, &mut video).await;

    let saved = store
        .video_progress(&VideoId::new("intro"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(saved.current_time(), 7.0);
    assert!(!slides.is_open());
    assert!(!video.is_open());

    // A fresh launch resumes from the flushed state.
    let reloaded = SlideSessionService::load(store, 5).await.unwrap();
    assert_eq!(reloaded.current_slide(), 1);
    assert_eq!(reloaded.viewed_count(), 1);
}

#[tokio::test]
async fn blocked_inputs_raise_and_expire_notices() {
    let mut now = fixed_now();
    let store = ProgressStore::in_memory(Clock::fixed(now));
    let mut session = SlideSessionService::load(store, 5).await.unwrap();
    session.open_popup(now).await.unwrap();

    session.reject_scroll(now);
    assert!(session.notice().is_some());

    // Scroll notices clear after a second and a half.
    now += Duration::milliseconds(1500);
    session.tick(now);
    assert!(session.notice().is_none());

    session.reject_viewer_navigation(now);
    now += Duration::milliseconds(1999);
    session.tick(now);
    assert!(session.notice().is_some());
    now += Duration::milliseconds(1);
    session.tick(now);
    assert!(session.notice().is_none());
}
