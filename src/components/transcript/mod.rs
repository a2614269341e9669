mod loader;

pub use loader::*;

use crate::api::{load_transcript, Transcript};
use crate::components::{Icon, LanguageSignal};
use crate::config::SiteConfig;
use crate::i18n::tr;
use dioxus::logger::tracing::warn;
use dioxus::prelude::*;

/// Collapsible transcript for one stop. Fetches on first expand.
#[component]
pub fn TranscriptPanel(stop_id: String) -> Element {
    let mut loader = use_context::<Signal<TranscriptLoader>>();
    let config = use_context::<Signal<SiteConfig>>();
    let language = use_context::<LanguageSignal>().0;
    let lang = language();

    let entry = loader.read().entry(&stop_id).cloned().unwrap_or_default();
    let toggle_label = if entry.expanded {
        tr(&lang, "transcript.hide")
    } else {
        tr(&lang, "transcript.show")
    };
    let loading_label = tr(&lang, "transcript.loading");
    let error_label = tr(&lang, "transcript.error");

    let on_toggle = {
        let stop_id = stop_id.clone();
        move |_| {
            let outcome = loader.write().toggle(&stop_id);
            let ToggleOutcome::NeedsFetch(path) = outcome else {
                return;
            };
            let stop_id = stop_id.clone();
            let host_base = config.peek().host_base_url.clone();
            spawn(async move {
                let result = load_transcript(&path, &host_base).await;
                if let Err(err) = &result {
                    warn!("transcript for `{stop_id}` failed: {err}");
                }
                // A language change while loading moved the container to
                // another path; drop the stale result.
                if loader.peek().path_for(&stop_id) != path {
                    return;
                }
                loader.write().finish_load(&stop_id, result);
            });
        }
    };

    rsx! {
        div { class: "transcript", "data-transcript": "{stop_id}",
            button {
                r#type: "button",
                class: "transcript-toggle",
                "aria-expanded": "{entry.expanded}",
                onclick: on_toggle,
                span { "{toggle_label}" }
                Icon {
                    name: if entry.expanded { "chevron-up".to_string() } else { "chevron-down".to_string() },
                    class: "w-4 h-4".to_string(),
                }
            }
            if entry.expanded {
                div { class: "transcript-body",
                    {match entry.load {
                        LoadState::NotLoaded | LoadState::Loading => rsx! {
                            p { class: "transcript-loading",
                                Icon { name: "loader".to_string(), class: "w-4 h-4".to_string() }
                                "{loading_label}"
                            }
                        },
                        LoadState::Loaded(transcript) => rsx! {
                            TranscriptText { transcript }
                        },
                        LoadState::Failed { path, message } => rsx! {
                            p { class: "transcript-error", title: "{message}",
                                "{error_label}: {path}"
                            }
                        },
                        LoadState::Placeholder(text) => rsx! {
                            p { class: "transcript-placeholder", "{text}" }
                        },
                    }}
                }
            }
        }
    }
}

#[component]
fn TranscriptText(transcript: Transcript) -> Element {
    let metadata = transcript.metadata.clone().unwrap_or_default();

    rsx! {
        if let Some(title) = metadata.title.clone() {
            h4 { class: "transcript-title", "{title}" }
        }
        if let Some(duration) = metadata.duration.as_ref().map(|duration| duration.label()) {
            p { class: "transcript-duration", "{duration}" }
        }
        for (index, paragraph) in transcript.paragraphs.iter().enumerate() {
            p { key: "{index}", "{paragraph}" }
        }
    }
}
