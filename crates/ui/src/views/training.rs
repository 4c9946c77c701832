use std::sync::Arc;
use std::time::Duration;

use dioxus::prelude::*;
use tokio::sync::Mutex;
use tracing::error;

use services::{Clock, SlideSessionService};
use training_core::navigation::{key_decision, KeyDecision};

use crate::context::AppContext;
use crate::views::VideoCatalog;
use crate::vm::TrainingVm;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SlideIntent {
    Open,
    Close,
    Previous,
    Next,
}

async fn apply_intent(
    session: &Mutex<SlideSessionService>,
    clock: Clock,
    intent: SlideIntent,
    mut vm: Signal<TrainingVm>,
) {
    let mut guard = session.lock().await;
    let result = match intent {
        SlideIntent::Open => guard.open_popup(clock.now()).await,
        SlideIntent::Close => guard.close_popup().await,
        SlideIntent::Previous => guard.previous_slide(clock.now()).await.map(|_| ()),
        SlideIntent::Next => guard.next_slide(clock.now()).await.map(|_| ()),
    };
    if let Err(err) = result {
        error!(%err, ?intent, "slide intent failed");
    }
    vm.set(TrainingVm::snapshot(&guard));
}

/// The training screen: overall progress, the gated slide popup, and the
/// video catalog underneath.
#[component]
pub fn TrainingView() -> Element {
    let ctx = use_context::<AppContext>();
    let clock = ctx.clock();
    let session = ctx.slide_session();
    let vm = use_signal(TrainingVm::default);

    // Drives the dwell countdown and notice expiry while keeping the
    // rendered snapshot fresh.
    {
        let session = session.clone();
        use_future(move || {
            let session = session.clone();
            let mut vm = vm;
            async move {
                loop {
                    {
                        let mut guard = session.lock().await;
                        guard.tick(clock.now());
                        vm.set(TrainingVm::snapshot(&guard));
                    }
                    tokio::time::sleep(Duration::from_millis(250)).await;
                }
            }
        });
    }

    let dispatch = {
        let session = session.clone();
        use_callback(move |intent: SlideIntent| {
            let session = Arc::clone(&session);
            spawn(async move {
                apply_intent(&session, clock, intent, vm).await;
            });
        })
    };

    let on_keydown = {
        let session = session.clone();
        move |evt: Event<KeyboardData>| {
            let key = evt.key().to_string();
            if key_decision(&key) == KeyDecision::Block {
                evt.prevent_default();
                evt.stop_propagation();
            }
            let session = Arc::clone(&session);
            let mut vm = vm;
            spawn(async move {
                let mut guard = session.lock().await;
                let _ = guard.handle_key(&key, clock.now());
                vm.set(TrainingVm::snapshot(&guard));
            });
        }
    };

    let on_wheel = {
        let session = session.clone();
        move |evt: Event<WheelData>| {
            evt.prevent_default();
            let session = Arc::clone(&session);
            let mut vm = vm;
            spawn(async move {
                let mut guard = session.lock().await;
                guard.reject_scroll(clock.now());
                vm.set(TrainingVm::snapshot(&guard));
            });
        }
    };

    let state = vm();

    rsx! {
        section { class: "training",
            h2 { "Training" }
            div { class: "training-progress",
                div { class: "progress-track",
                    div {
                        class: "progress-fill",
                        style: "width: {state.percent}%",
                    }
                }
                span { class: "progress-label", {state.progress_label()} }
            }
            button {
                class: "primary",
                onclick: move |_| dispatch.call(SlideIntent::Open),
                if state.viewed_count == 0 { "Start training" } else { "Continue training" }
            }

            VideoCatalog {}

            if state.open {
                div {
                    class: "slide-overlay",
                    tabindex: "0",
                    autofocus: true,
                    onkeydown: on_keydown,
                    onwheel: on_wheel,
                    div { class: "slide-popup",
                        header { class: "slide-header",
                            span { {state.slide_label()} }
                            button {
                                class: "close",
                                onclick: move |_| dispatch.call(SlideIntent::Close),
                                "Close"
                            }
                        }
                        div { class: "slide-stage",
                            img {
                                class: "slide-image",
                                src: "assets/slides/slide-{state.current_slide}.png",
                                alt: state.slide_label(),
                                draggable: false,
                            }
                            if state.countdown_visible() {
                                div { class: "dwell-badge",
                                    span { class: "dwell-count", "{state.countdown}" }
                                    div { class: "dwell-track",
                                        div {
                                            class: "dwell-fill",
                                            style: "width: {state.timer_progress}%",
                                        }
                                    }
                                }
                            }
                        }
                        if let Some(notice) = state.notice {
                            div { class: "slide-notice", {notice} }
                        }
                        footer { class: "slide-footer",
                            button {
                                disabled: !state.can_go_previous,
                                onclick: move |_| dispatch.call(SlideIntent::Previous),
                                "Previous"
                            }
                            button {
                                disabled: !state.can_go_next,
                                onclick: move |_| dispatch.call(SlideIntent::Next),
                                "Next"
                            }
                        }
                    }
                }
            }
        }
    }
}
