use crate::components::map::{
    install_marker_click_handler, remove_marker_click_handler, sync_map, MapController,
    MAP_CONTAINER_ID,
};
use crate::components::{Icon, LanguageSignal};
use crate::events::{EventBus, TourEvent};
use crate::i18n::tr;
use dioxus::core::{Runtime, RuntimeGuard};
use dioxus::logger::tracing::{debug, warn};
use dioxus::prelude::*;

#[component]
pub fn MapView() -> Element {
    let mut map = use_context::<Signal<MapController>>();
    let bus = use_context::<EventBus>();
    let language = use_context::<LanguageSignal>().0;
    let mut widget_error = use_signal(|| None::<String>);

    // Marker clicks come back from the widget outside any Dioxus handler.
    use_hook(move || {
        let runtime = Runtime::current();
        let installed = install_marker_click_handler(move |id: String| {
            let _guard = RuntimeGuard::new(runtime.clone());
            if let Err(err) = map.write().select_marker(&id) {
                warn!("{err}");
            }
        });
        if let Err(err) = installed {
            debug!("marker clicks unavailable: {err}");
        }
    });
    use_drop(remove_marker_click_handler);

    use_effect(move || {
        let snapshot = map.read().snapshot();
        let next = sync_map(&snapshot).err().map(|err| err.to_string());
        if let Some(err) = &next {
            warn!("{err}");
        }
        if *widget_error.peek() != next {
            widget_error.set(next);
        }
    });

    let lang = language();
    let reset_label = tr(&lang, "map.reset");
    let unavailable_label = tr(&lang, "map.unavailable");
    let select_label = tr(&lang, "map.select");
    let open_label = tr(&lang, "map.open");
    let (panel, markers, highlighted) = {
        let map = map.read();
        (
            map.panel().cloned(),
            map.markers().to_vec(),
            map.highlighted().map(str::to_string),
        )
    };
    let reset_bus = bus.clone();

    rsx! {
        section { class: "map-view",
            div { class: "map-toolbar",
                button {
                    r#type: "button",
                    class: "map-reset",
                    onclick: move |_| reset_bus.publish(TourEvent::ResetMapView),
                    Icon { name: "reset".to_string(), class: "w-4 h-4".to_string() }
                    "{reset_label}"
                }
            }
            if let Some(err) = widget_error() {
                p { class: "map-unavailable", title: "{err}", "{unavailable_label}" }
            }
            div { id: MAP_CONTAINER_ID, class: "map-container" }
            aside { class: "map-sidebar",
                {match panel {
                    Some(panel) => rsx! {
                        div { class: "map-panel", "data-stop-id": "{panel.stop_id}",
                            h3 { {format!("{}. {}", panel.order, panel.title)} }
                            if let Some(image) = panel.image_path.clone() {
                                img { class: "map-panel-image", src: "{image}", alt: "{panel.title}" }
                            }
                            if let Some(description) = panel.description.clone() {
                                p { "{description}" }
                            }
                            if let Some(url) = panel.google_maps_url.clone() {
                                a {
                                    class: "map-panel-link",
                                    href: "{url}",
                                    target: "_blank",
                                    rel: "noopener",
                                    "{open_label}"
                                }
                            }
                        }
                    },
                    None => rsx! {
                        p { class: "map-panel-empty", "{select_label}" }
                    },
                }}
                ol { class: "map-stop-list",
                    for marker in markers {
                        li { key: "{marker.id}",
                            button {
                                r#type: "button",
                                class: if highlighted.as_deref() == Some(marker.id.as_str()) { "map-stop active" } else { "map-stop" },
                                onclick: {
                                    let bus = bus.clone();
                                    let stop_id = marker.id.clone();
                                    move |_| {
                                        bus.publish(TourEvent::HighlightMarker {
                                            stop_id: stop_id.clone(),
                                            animate: true,
                                        });
                                    }
                                },
                                Icon { name: "pin".to_string(), class: "w-4 h-4".to_string() }
                                {format!("{}. {}", marker.order, marker.title)}
                            }
                        }
                    }
                }
            }
        }
    }
}
