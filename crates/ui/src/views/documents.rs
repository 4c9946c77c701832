use dioxus::prelude::*;

use training_core::model::DocumentInfo;

use crate::context::AppContext;

/// Library of bundled documents with an embedded viewer.
#[component]
pub fn DocumentsView() -> Element {
    let ctx = use_context::<AppContext>();
    let documents = ctx.documents().to_vec();
    let mut selected = use_signal(|| None::<DocumentInfo>);

    rsx! {
        section { class: "documents",
            h2 { "Documents" }
            if documents.is_empty() {
                p { class: "empty", "No documents are bundled with this build." }
            } else {
                ul { class: "document-list",
                    for doc in documents {
                        li {
                            key: "{doc.path}",
                            button {
                                class: if selected().as_ref() == Some(&doc) { "document selected" } else { "document" },
                                onclick: {
                                    let doc = doc.clone();
                                    move |_| selected.set(Some(doc.clone()))
                                },
                                span { class: "document-title", "{doc.title}" }
                                span { class: "document-kind", "{doc.kind.label()}" }
                            }
                        }
                    }
                }
            }
            if let Some(doc) = selected() {
                div { class: "document-viewer",
                    iframe { src: "{doc.path}", title: "{doc.title}" }
                }
            }
        }
    }
}
