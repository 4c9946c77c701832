use std::sync::Arc;
use std::time::Duration;

use dioxus::document::eval;
use dioxus::prelude::*;
use tokio::sync::Mutex;
use tracing::error;

use services::{Clock, MediaEvent, PlayerCommand, VideoSessionService};
use training_core::model::TrainingVideo;

use crate::context::AppContext;
use crate::vm::VideoVm;

const VIDEO_ELEMENT_ID: &str = "training-video";

/// Read the element's position and duration. `[0, 0]` when the element is
/// gone or its duration is not yet known.
async fn read_media_state() -> Option<(f64, f64)> {
    let script = format!(
        r#"const v = document.getElementById("{VIDEO_ELEMENT_ID}");
           if (!v) return [0, 0];
           return [v.currentTime || 0, Number.isFinite(v.duration) ? v.duration : 0];"#
    );
    eval(&script).join::<(f64, f64)>().await.ok()
}

async fn apply_commands(commands: &[PlayerCommand]) {
    for command in commands {
        let script = match command {
            PlayerCommand::SetPosition(secs) => format!(
                r#"const v = document.getElementById("{VIDEO_ELEMENT_ID}");
                   if (v) v.currentTime = {secs};"#
            ),
            PlayerCommand::Play => format!(
                r#"const v = document.getElementById("{VIDEO_ELEMENT_ID}");
                   if (v) v.play();"#
            ),
            PlayerCommand::Pause => format!(
                r#"const v = document.getElementById("{VIDEO_ELEMENT_ID}");
                   if (v) v.pause();"#
            ),
        };
        let _ = eval(&script).await;
    }
}

/// Run one media event through the session and apply whatever it asks of
/// the element.
async fn forward_event(
    session: &Mutex<VideoSessionService>,
    clock: Clock,
    event: MediaEvent,
    mut vm: Signal<VideoVm>,
) {
    let mut guard = session.lock().await;
    match guard.on_media_event(event, clock.now()).await {
        Ok(commands) => apply_commands(&commands).await,
        Err(err) => error!(%err, "video event failed"),
    }
    vm.set(VideoVm::snapshot(&guard));
}

/// The list of training videos, plus the modal player for the open one.
#[component]
pub fn VideoCatalog() -> Element {
    let ctx = use_context::<AppContext>();
    let clock = ctx.clock();
    let session = ctx.video_session();
    let videos = ctx.training_videos().to_vec();
    let vm = use_signal(VideoVm::default);

    // Periodic autosave while a video is open.
    {
        let session = session.clone();
        use_future(move || {
            let session = session.clone();
            async move {
                loop {
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    let mut guard = session.lock().await;
                    if let Err(err) = guard.tick(clock.now()).await {
                        error!(%err, "video autosave failed");
                    }
                }
            }
        });
    }

    let open_video = {
        let session = session.clone();
        use_callback(move |video: TrainingVideo| {
            let session = Arc::clone(&session);
            let mut vm = vm;
            spawn(async move {
                let mut guard = session.lock().await;
                match guard.open(video, clock.now()).await {
                    Ok(commands) => apply_commands(&commands).await,
                    Err(err) => error!(%err, "opening video failed"),
                }
                vm.set(VideoVm::snapshot(&guard));
            });
        })
    };

    let close_video = {
        let session = session.clone();
        use_callback(move |()| {
            let session = Arc::clone(&session);
            let mut vm = vm;
            spawn(async move {
                let mut guard = session.lock().await;
                match guard.close().await {
                    Ok(commands) => apply_commands(&commands).await,
                    Err(err) => error!(%err, "closing video failed"),
                }
                vm.set(VideoVm::snapshot(&guard));
            });
        })
    };

    let toggle_play = {
        let session = session.clone();
        use_callback(move |()| {
            let session = Arc::clone(&session);
            let mut vm = vm;
            spawn(async move {
                let mut guard = session.lock().await;
                let commands = guard.toggle_play_pause();
                apply_commands(&commands).await;
                vm.set(VideoVm::snapshot(&guard));
            });
        })
    };

    let state = vm();

    rsx! {
        div { class: "video-catalog",
            h3 { "Videos" }
            ul {
                for video in videos {
                    li {
                        key: "{video.id}",
                        button {
                            class: "video-entry",
                            onclick: {
                                let video = video.clone();
                                move |_| open_video.call(video.clone())
                            },
                            "{video.title}"
                        }
                    }
                }
            }

            if state.open {
                div {
                    class: "video-overlay",
                    onclick: move |_| close_video.call(()),
                    div {
                        class: "video-modal",
                        onclick: move |evt| evt.stop_propagation(),
                        header { class: "video-header",
                            h4 { "{state.title}" }
                            button {
                                class: "close",
                                onclick: move |_| close_video.call(()),
                                "Close"
                            }
                        }
                        VideoSurface { vm }
                        if state.ended {
                            div { class: "video-ended",
                                span { "Video finished" }
                                button {
                                    onclick: move |_| toggle_play.call(()),
                                    "Replay"
                                }
                            }
                        }
                        footer { class: "video-controls",
                            button {
                                onclick: move |_| toggle_play.call(()),
                                {state.play_button_label()}
                            }
                            span { class: "video-time", {state.time_label()} }
                            div { class: "progress-track",
                                div {
                                    class: "progress-fill",
                                    style: "width: {state.percent}%",
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// The media element itself. Every DOM event is read back through `eval`
/// and forwarded to the session, which decides what the element does next.
#[component]
fn VideoSurface(vm: Signal<VideoVm>) -> Element {
    let ctx = use_context::<AppContext>();
    let clock = ctx.clock();
    let session = ctx.video_session();
    let source = vm().source;

    let forward = {
        let session = session.clone();
        use_callback(move |event: MediaEvent| {
            let session = Arc::clone(&session);
            spawn(async move {
                forward_event(&session, clock, event, vm).await;
            });
        })
    };

    rsx! {
        video {
            id: VIDEO_ELEMENT_ID,
            class: "video-element",
            src: "{source}",
            controls: true,
            preload: "metadata",
            onloadedmetadata: move |_| {
                spawn(async move {
                    if let Some((_, duration)) = read_media_state().await {
                        forward.call(MediaEvent::MetadataLoaded { duration });
                    }
                });
            },
            ontimeupdate: move |_| {
                spawn(async move {
                    if let Some((position, duration)) = read_media_state().await {
                        forward.call(MediaEvent::TimeUpdate { position, duration });
                    }
                });
            },
            onseeking: move |_| {
                spawn(async move {
                    if let Some((target, _)) = read_media_state().await {
                        forward.call(MediaEvent::Seeking { target });
                    }
                });
            },
            onplay: move |_| forward.call(MediaEvent::Play),
            onpause: move |_| forward.call(MediaEvent::Pause),
            onended: move |_| forward.call(MediaEvent::Ended),
        }
    }
}
