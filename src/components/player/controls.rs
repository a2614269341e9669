use super::show_alert;
use crate::components::audio_manager::{ControlKey, ControlVisual, PlaybackSignal};
use crate::components::{Icon, LanguageSignal};
use crate::i18n::tr;
use dioxus::prelude::*;

/// One play/pause control. Identity and click binding come from the
/// controller; the button only mirrors them.
#[component]
pub fn PlayButton(control: ControlKey, #[props(default)] label: Option<String>) -> Element {
    let mut playback = use_context::<PlaybackSignal>().0;
    let language = use_context::<LanguageSignal>().0;
    let lang = language();

    let (handle, visual) = {
        let controller = playback.read();
        (controller.handle(&control), controller.visual(&control))
    };
    let playing = visual == Some(ControlVisual::Playing);
    let player_id = handle
        .as_ref()
        .map(|handle| handle.id.to_string())
        .unwrap_or_default();
    let title = if playing {
        tr(&lang, "player.pause")
    } else {
        tr(&lang, "player.play")
    };
    let bound = handle.is_some();

    rsx! {
        button {
            r#type: "button",
            class: if playing { "play-button playing" } else { "play-button" },
            disabled: !bound,
            title: "{title}",
            "aria-pressed": "{playing}",
            "data-player-id": "{player_id}",
            "data-playlist": control.playlist_name().map(str::to_string),
            "data-index": control.track_index().map(|index| index.to_string()),
            onclick: move |_| {
                let Some(handle) = handle.clone() else {
                    return;
                };
                let result = playback.write().handle_control_click(&handle);
                if let Err(err) = result {
                    if err.needs_alert() {
                        show_alert(&tr(&lang, "player.failed"));
                    }
                }
            },
            if playing {
                Icon {
                    name: "pause".to_string(),
                    class: "w-5 h-5".to_string(),
                }
            } else {
                Icon {
                    name: "play".to_string(),
                    class: "w-5 h-5 ml-0.5".to_string(),
                }
            }
            if let Some(label) = label {
                span { class: "play-button-label", "{label}" }
            }
        }
    }
}
