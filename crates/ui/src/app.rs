use dioxus::desktop::tao::event::{Event as WryEvent, WindowEvent};
use dioxus::desktop::use_wry_event_handler;
use dioxus::prelude::*;
use dioxus_router::Router;
use tokio::sync::mpsc;

use crate::context::AppContext;
use crate::routes::Route;

#[component]
pub fn App() -> Element {
    let ctx = use_context::<AppContext>();

    // Closing the window only hides it (see the desktop config in the
    // app binary); the actual exit happens here, after open sessions
    // have been persisted.
    let shutdown_tx = use_hook(|| {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        let slide_session = ctx.slide_session();
        let video_session = ctx.video_session();
        spawn(async move {
            if rx.recv().await.is_some() {
                let mut slides = slide_session.lock().await;
                let mut video = video_session.lock().await;
                services::flush_on_exit(&mut slides, &mut video).await;
                std::process::exit(0);
            }
        });
        tx
    });

    use_wry_event_handler(move |event, _| {
        if let WryEvent::WindowEvent {
            event: WindowEvent::CloseRequested,
            ..
        } = event
        {
            let _ = shutdown_tx.send(());
        }
    });

    rsx! {
        document::Stylesheet { href: asset!("/assets/style.css") }

        // Stable OS/window title. Per-route titles live inside the right pane.
        document::Title { "Trainview" }

        div { class: "app-root",
            ErrorBoundary {
                handle_error: |errors: ErrorContext| rsx! {
                    div { class: "fatal",
                        h1 { "Something went wrong" }
                        pre { "{errors:?}" }
                    }
                },
                Router::<Route> {}
            }
        }
    }
}
