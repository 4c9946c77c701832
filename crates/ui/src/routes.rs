use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::views::{DocumentsView, TrainingView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", DocumentsView)] Documents {},
        #[route("/training", TrainingView)] Training {},
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            Sidebar {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Sidebar() -> Element {
    rsx! {
        nav { class: "sidebar",
            h1 { "Trainview" }
            ul {
                li { Link { to: Route::Documents {}, "Documents" } }
                li { Link { to: Route::Training {}, "Training" } }
            }
        }
    }
}
