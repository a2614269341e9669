use crate::components::audio_manager::{ControlKey, PlaybackSignal, TOUR_PLAYLIST};
use crate::components::transcript::TranscriptPanel;
use crate::components::{Icon, LanguageSignal, PlayButton, TourSignal};
use crate::config::SiteConfig;
use crate::events::{EventBus, TourEvent};
use crate::i18n::tr;
use dioxus::prelude::*;

#[derive(Debug, Clone, PartialEq)]
struct StopRow {
    index: usize,
    stop_id: String,
    title: String,
    description: Option<String>,
    duration: Option<String>,
    image_path: Option<String>,
    on_map: bool,
    control: Option<ControlKey>,
}

#[component]
pub fn HomeView() -> Element {
    let tour = use_context::<TourSignal>().0;
    let language = use_context::<LanguageSignal>().0;
    let playback = use_context::<PlaybackSignal>().0;
    let config = use_context::<Signal<SiteConfig>>();
    let lang = language();

    let Some(data) = tour() else {
        return rsx! {};
    };
    let content = match data.content(&lang) {
        Ok(content) => content.clone(),
        Err(err) => {
            return rsx! {
                p { class: "tour-error", "{err}" }
            };
        }
    };

    let rows: Vec<StopRow> = {
        let controller = playback.read();
        let tracks = controller.tracks();
        data.stops(&lang)
            .unwrap_or_default()
            .into_iter()
            .map(|stop| StopRow {
                index: stop.index,
                stop_id: stop.stop_id(),
                title: stop.content.title.clone(),
                description: stop.content.description.clone(),
                duration: stop.content.duration.as_ref().map(|duration| duration.label()),
                image_path: stop.location.and_then(|location| location.image_path.clone()),
                on_map: stop.location.is_some(),
                control: tracks
                    .and_then(|tracks| tracks.index_for_stop(TOUR_PLAYLIST, stop.index))
                    .map(|index| ControlKey::playlist(TOUR_PLAYLIST, index)),
            })
            .collect()
    };
    let intro_id = config
        .read()
        .placeholder_transcript
        .as_ref()
        .map(|placeholder| placeholder.stop_id.clone())
        .unwrap_or_else(|| "intro".to_string());
    let intro_title = content
        .introduction
        .title
        .clone()
        .unwrap_or_else(|| tr(&lang, "intro.heading"));
    let stops_heading = tr(&lang, "stops.heading");

    rsx! {
        section { class: "tour-intro",
            h2 { "{intro_title}" }
            if let Some(description) = content.introduction.description.clone() {
                p { class: "tour-intro-text", "{description}" }
            }
            PlayButton { control: ControlKey::Intro, label: tr(&lang, "intro.heading") }
            TranscriptPanel { stop_id: intro_id }
        }
        section { class: "tour-stops",
            h2 { "{stops_heading}" }
            ol { class: "stop-list",
                for row in rows {
                    StopCard { key: "{row.stop_id}", row: row.clone() }
                }
            }
        }
    }
}

#[component]
fn StopCard(row: StopRow) -> Element {
    let bus = use_context::<EventBus>();
    let language = use_context::<LanguageSignal>().0;
    let lang = language();
    let map_label = tr(&lang, "map.show");
    let duration_label = tr(&lang, "stop.duration");
    let stop_id = row.stop_id.clone();

    rsx! {
        li { class: "stop-card", "data-stop-id": "{row.stop_id}",
            if let Some(image) = row.image_path.clone() {
                img { class: "stop-image", src: "{image}", alt: "{row.title}" }
            }
            div { class: "stop-body",
                h3 { {format!("{}. {}", row.index + 1, row.title)} }
                if let Some(duration) = row.duration.clone() {
                    p { class: "stop-duration",
                        Icon { name: "clock".to_string(), class: "w-4 h-4".to_string() }
                        "{duration_label}: {duration}"
                    }
                }
                if let Some(description) = row.description.clone() {
                    p { class: "stop-description", "{description}" }
                }
                div { class: "stop-actions",
                    if let Some(control) = row.control.clone() {
                        PlayButton { control }
                    }
                    if row.on_map {
                        button {
                            r#type: "button",
                            class: "stop-map-link",
                            onclick: move |_| {
                                bus.publish(TourEvent::HighlightMarker {
                                    stop_id: stop_id.clone(),
                                    animate: true,
                                });
                            },
                            Icon { name: "pin".to_string(), class: "w-4 h-4".to_string() }
                            "{map_label}"
                        }
                    }
                }
                TranscriptPanel { stop_id: row.stop_id.clone() }
            }
        }
    }
}
