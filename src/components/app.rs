use crate::api::*;
use crate::components::audio_manager::{
    AudioTourController, PlatformEngine, PlaybackController, PlaybackSignal,
};
use crate::components::map::MapController;
use crate::components::transcript::TranscriptLoader;
use crate::components::views::{HomeView, MapView};
use crate::components::{current_year, Footer, FooterInjector, Icon, LanguageSwitcher, TourView};
use crate::config::{load_site_config, SiteConfig};
use crate::db::open_preference_store;
use crate::events::{EventBus, TourEvent};
use crate::i18n::{tr, LanguageRegistry};
use dioxus::logger::tracing::{debug, error, info, warn};
use dioxus::prelude::*;
use std::rc::Rc;

/// Active language code, mirrored from the registry for rendering.
#[derive(Clone, Copy)]
pub struct LanguageSignal(pub Signal<String>);

#[derive(Clone, Copy)]
pub struct TourSignal(pub Signal<Option<Rc<TourData>>>);

#[derive(Debug, Clone, PartialEq)]
enum TourLoad {
    Loading,
    Ready,
    Failed(String),
}

#[component]
pub fn AppShell() -> Element {
    let site_config = use_resource(load_site_config);

    match site_config() {
        Some(config) => rsx! {
            TourApp { site: config }
        },
        None => rsx! {
            div { class: "tour-splash",
                Icon { name: "loader".to_string(), class: "w-8 h-8".to_string() }
            }
        },
    }
}

#[component]
fn TourApp(site: SiteConfig) -> Element {
    let bus = use_hook(EventBus::new);
    let config = use_signal(|| site.clone());
    let registry = use_signal({
        let bus = bus.clone();
        let site = site.clone();
        move || LanguageRegistry::load(open_preference_store(), &site, bus)
    });
    let initial_language = registry.peek().current().to_string();

    let language = use_signal(|| initial_language.clone());
    let mut tour = use_signal(|| None::<Rc<TourData>>);
    let mut load_state = use_signal(|| TourLoad::Loading);
    let mut current_view = use_signal(|| TourView::Home);
    let playback = use_signal(|| PlaybackController::new(PlatformEngine::default()));
    let map = use_signal(|| MapController::new(site.map.clone()));
    let footer = use_signal(|| FooterInjector::new(&initial_language, current_year()));
    let transcripts = use_signal(|| {
        TranscriptLoader::new(
            &site.transcript_base,
            &initial_language,
            site.placeholder_transcript.clone(),
        )
    });

    // Provide state via context
    use_context_provider(|| config);
    use_context_provider(|| bus.clone());
    use_context_provider(|| registry);
    use_context_provider(|| LanguageSignal(language));
    use_context_provider(|| TourSignal(tour));
    use_context_provider(|| current_view);
    use_context_provider(|| PlaybackSignal(playback));
    use_context_provider(|| map);
    use_context_provider(|| footer);
    use_context_provider(|| transcripts);

    // Page-level listeners: language fan-out and map requests.
    let subscription = use_hook({
        let bus = bus.clone();
        move || {
            let publisher = bus.clone();
            bus.subscribe(move |event| {
                let (mut language, mut map, mut footer, mut transcripts, mut current_view) =
                    (language, map, footer, transcripts, current_view);
                match event {
                    TourEvent::DataReady(data) => {
                        let markers = map.write().render_markers(data);
                        debug!("map ready with {markers} markers");
                        let mut footer = footer.write();
                        footer.set_titles(data);
                        if let Err(err) = footer.inject() {
                            debug!("{err}");
                        }
                    }
                    TourEvent::LanguageChanged { code, .. } => {
                        language.set(code.clone());
                        footer.write().refresh_language(code);
                        publisher.publish(TourEvent::ReloadContent);
                    }
                    TourEvent::ReloadContent => {
                        let code = language.peek().clone();
                        transcripts.write().reset_language(&code);
                    }
                    TourEvent::HighlightMarker { stop_id, animate } => {
                        match map.write().highlight_stop(stop_id, *animate) {
                            Ok(()) => current_view.set(TourView::Map),
                            Err(err) => warn!("{err}"),
                        }
                    }
                    TourEvent::ResetMapView => map.write().reset_view(),
                    TourEvent::AudioFilesUpdated { code } => debug!("audio ready for `{code}`"),
                }
            })
        }
    });
    use_drop({
        let bus = bus.clone();
        move || {
            bus.unsubscribe(subscription);
        }
    });

    // Load the tour once the listeners are mounted.
    use_effect({
        let bus = bus.clone();
        move || {
            let bus = bus.clone();
            spawn(async move {
                let (path, host_base) = {
                    let config = config.peek();
                    (config.tour_data_path.clone(), config.host_base_url.clone())
                };
                match load_tour(&path, &host_base).await {
                    Ok(data) => {
                        let lang = language.peek().clone();
                        if !data.has_language(&lang) {
                            warn!("tour has no content for `{lang}`");
                        }
                        info!("tour loaded: {} languages", data.languages().len());
                        let data = Rc::new(data);
                        tour.set(Some(data.clone()));
                        load_state.set(TourLoad::Ready);
                        bus.publish(TourEvent::DataReady(data));
                    }
                    Err(err) => {
                        error!("tour data unavailable: {err}");
                        load_state.set(TourLoad::Failed(err.to_string()));
                    }
                }
            });
        }
    });

    let lang = language();
    let view = current_view();
    let loading_label = tr(&lang, "tour.loading");
    let error_label = tr(&lang, "tour.error");
    let title = tour()
        .and_then(|data| data.content(&lang).ok().map(|content| content.title.clone()))
        .unwrap_or_default();

    rsx! {
        div { class: "tour-app", lang: "{lang}",
            header { class: "tour-header",
                h1 { class: "tour-title", "{title}" }
                nav { class: "tour-nav",
                    for entry in TourView::ALL {
                        button {
                            key: "{entry:?}",
                            r#type: "button",
                            class: if entry == view { "tour-nav-item active" } else { "tour-nav-item" },
                            onclick: move |_| current_view.set(entry),
                            Icon {
                                name: entry.icon().to_string(),
                                class: "w-5 h-5".to_string(),
                            }
                            span { {entry.label(&lang)} }
                        }
                    }
                }
                LanguageSwitcher {}
            }
            main { class: "tour-main",
                {match load_state() {
                    TourLoad::Loading => rsx! {
                        p { class: "tour-loading",
                            Icon { name: "loader".to_string(), class: "w-5 h-5".to_string() }
                            "{loading_label}"
                        }
                    },
                    TourLoad::Failed(message) => rsx! {
                        p { class: "tour-error", title: "{message}", "{error_label}" }
                    },
                    TourLoad::Ready => match view {
                        TourView::Home => rsx! {
                            HomeView {}
                        },
                        TourView::Map => rsx! {
                            MapView {}
                        },
                    },
                }}
            }
            Footer {}
            AudioTourController {}
        }
    }
}
