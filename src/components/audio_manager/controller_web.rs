// Headless component: listens on the bus, initializes the controller on
// data-ready and rebuilds it on language change.
use super::controller::{settle, PlaybackController};
use super::engine::PlaybackFault;
use super::precheck::precheck_audio;
use super::web_engine::PlatformEngine;
use crate::api::TourData;
use crate::components::{show_alert, LanguageSignal};
use crate::config::SiteConfig;
use crate::events::{EventBus, TourEvent};
use crate::i18n::tr;
use dioxus::core::{spawn_forever, Runtime, RuntimeGuard};
use dioxus::logger::tracing::{debug, error, info, warn};
use dioxus::prelude::*;
use std::rc::Rc;
use std::time::Duration;

const READY_POLL_INTERVAL: Duration = Duration::from_millis(50);
const READY_POLL_ATTEMPTS: u32 = 40;

#[derive(Clone, Copy)]
pub struct PlaybackSignal(pub Signal<PlaybackController<PlatformEngine>>);

fn start_audio(
    mut playback: Signal<PlaybackController<PlatformEngine>>,
    config: Signal<SiteConfig>,
    tour: Rc<TourData>,
    lang: String,
) {
    if let Err(err) = playback.write().initialize(&tour, &lang) {
        warn!("audio controls disabled: {err}");
        return;
    }

    spawn_forever(async move {
        for _ in 0..READY_POLL_ATTEMPTS {
            {
                let mut controller = playback.write();
                if controller.on_engine_ready() {
                    return;
                }
                if !controller.is_awaiting_ready() {
                    debug!("readiness wait ended by a language switch");
                    return;
                }
            }
            settle(READY_POLL_INTERVAL).await;
        }
        error!("media library never reported ready; controls stay unbound");
    });

    let (precheck, host_base) = {
        let config = config.peek();
        (config.precheck_audio, config.host_base_url.clone())
    };
    if precheck {
        spawn_forever(async move {
            let Some(tracks) = playback.peek().tracks().cloned() else {
                return;
            };
            let missing = precheck_audio(&tracks, &host_base).await;
            if !missing.is_empty() {
                warn!("{} audio files failed the precheck", missing.len());
            }
        });
    }
}

fn switch_audio(
    mut playback: Signal<PlaybackController<PlatformEngine>>,
    config: Signal<SiteConfig>,
    bus: EventBus,
    tour: Rc<TourData>,
    code: String,
) {
    let ticket = match playback.write().begin_language_switch(&tour, &code) {
        Ok(ticket) => ticket,
        Err(err) => {
            error!("audio not rebuilt for `{code}`: {err}");
            return;
        }
    };
    let delay = config.peek().settling_delay();

    spawn_forever(async move {
        settle(delay).await;
        if playback.write().complete_language_switch(&ticket) {
            info!("audio files updated for `{}`", ticket.code);
            bus.publish(TourEvent::AudioFilesUpdated { code: ticket.code });
        }
    });
}

#[component]
pub fn AudioTourController() -> Element {
    let mut playback = use_context::<PlaybackSignal>().0;
    let config = use_context::<Signal<SiteConfig>>();
    let language = use_context::<LanguageSignal>().0;
    let bus = use_context::<EventBus>();

    // Late media failures arrive from browser callbacks, outside any handler.
    use_hook(move || {
        let runtime = Runtime::current();
        let sink = Rc::new(move |fault: PlaybackFault| {
            let _guard = RuntimeGuard::new(runtime.clone());
            let mut playback = playback;
            let result = playback.write().handle_playback_fault(fault);
            if let Err(err) = result {
                if err.needs_alert() {
                    show_alert(&tr(language.peek().as_str(), "player.failed"));
                }
            }
        });
        playback.write().set_fault_sink(sink);
    });

    let subscription = use_hook({
        let bus = bus.clone();
        move || {
            let publisher = bus.clone();
            bus.subscribe(move |event| match event {
                TourEvent::DataReady(tour) => {
                    start_audio(playback, config, tour.clone(), language.peek().clone())
                }
                TourEvent::LanguageChanged { code, tour } => {
                    switch_audio(playback, config, publisher.clone(), tour.clone(), code.clone())
                }
                _ => {}
            })
        }
    });

    use_drop(move || {
        bus.unsubscribe(subscription);
        playback.write().reset();
    });

    rsx! {}
}
