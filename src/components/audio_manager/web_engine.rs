// Platform media libraries behind `AudioEngine`.
use super::engine::{AudioEngine, EngineError};
use super::tracks::TrackList;

#[cfg(target_arch = "wasm32")]
use super::engine::{FaultSink, PlaybackFault};
#[cfg(target_arch = "wasm32")]
use dioxus::logger::tracing::{debug, warn};
#[cfg(target_arch = "wasm32")]
use std::cell::{Cell, RefCell};
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
#[cfg(target_arch = "wasm32")]
use web_sys::{window, HtmlAudioElement};

#[cfg(target_arch = "wasm32")]
pub const AUDIO_ELEMENT_ID: &str = "audiotour-audio";

#[cfg(target_arch = "wasm32")]
pub type PlatformEngine = WebAudioEngine;
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformEngine = HeadlessEngine;

/// Initialize the page's audio element once.
#[cfg(target_arch = "wasm32")]
pub fn get_or_create_audio_element() -> Option<HtmlAudioElement> {
    let document = window()?.document()?;

    if let Some(existing) = document.get_element_by_id(AUDIO_ELEMENT_ID) {
        return existing.dyn_into::<HtmlAudioElement>().ok();
    }

    let audio: HtmlAudioElement = document.create_element("audio").ok()?.dyn_into().ok()?;
    audio.set_id(AUDIO_ELEMENT_ID);
    audio.set_attribute("preload", "metadata").ok()?;
    document.body()?.append_child(&audio).ok()?;

    Some(audio)
}

#[cfg(target_arch = "wasm32")]
fn media_error_message(audio: &HtmlAudioElement) -> Option<String> {
    let audio_js = JsValue::from(audio.clone());
    let error_js = js_sys::Reflect::get(&audio_js, &"error".into()).ok()?;
    if error_js.is_null() || error_js.is_undefined() {
        return None;
    }
    let code = js_sys::Reflect::get(&error_js, &"code".into())
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0) as u16;

    Some(match code {
        1 => "playback was aborted before the file loaded".to_string(),
        2 => "network error while loading the narration".to_string(),
        3 => "the narration could not be decoded".to_string(),
        4 => "no supported source was found".to_string(),
        _ => "unable to load this audio source".to_string(),
    })
}

#[cfg(target_arch = "wasm32")]
fn js_error_field(err: &JsValue, field: &str) -> Option<String> {
    js_sys::Reflect::get(err, &field.into())
        .ok()
        .and_then(|value| value.as_string())
}

/// Tracks which source is loaded so late failures reach the controller once,
/// and only for the source that is still current.
#[cfg(target_arch = "wasm32")]
#[derive(Default)]
struct FaultReporter {
    sink: RefCell<Option<FaultSink>>,
    current: RefCell<Option<(u64, String)>>,
    reported: Cell<bool>,
    next: Cell<u64>,
}

#[cfg(target_arch = "wasm32")]
impl FaultReporter {
    fn begin(&self, url: &str) -> u64 {
        let load = self.next.get() + 1;
        self.next.set(load);
        self.reported.set(false);
        *self.current.borrow_mut() = Some((load, url.to_string()));
        load
    }

    fn current_load(&self) -> Option<u64> {
        self.current.borrow().as_ref().map(|(load, _)| *load)
    }

    fn clear(&self) {
        *self.current.borrow_mut() = None;
    }

    fn report(&self, load: u64, error: EngineError) {
        let url = match self.current.borrow().as_ref() {
            Some((current, url)) if *current == load && !self.reported.get() => url.clone(),
            _ => {
                debug!("dropping media failure for an earlier source: {error}");
                return;
            }
        };
        self.reported.set(true);
        // The sink re-enters the engine, so no borrow may be held here.
        let sink = self.sink.borrow().clone();
        match sink {
            Some(sink) => sink(PlaybackFault { url, error }),
            None => warn!("media element failed on `{url}`: {error}"),
        }
    }
}

/// `play()` returns a promise; a rejection is reported against `load`.
#[cfg(target_arch = "wasm32")]
fn start_playback(
    audio: &HtmlAudioElement,
    reporter: &Rc<FaultReporter>,
    load: u64,
) -> Result<(), EngineError> {
    let promise = audio
        .play()
        .map_err(|err| EngineError::Rejected(format!("{err:?}")))?;
    let reporter = reporter.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let Err(err) = wasm_bindgen_futures::JsFuture::from(promise).await else {
            return;
        };
        // A newer load or a pause interrupted this call.
        if js_error_field(&err, "name").as_deref() == Some("AbortError") {
            debug!("play request interrupted");
            return;
        }
        let message = js_error_field(&err, "message").unwrap_or_else(|| format!("{err:?}"));
        reporter.report(load, EngineError::Rejected(message));
    });
    Ok(())
}

/// Song list and playlists driving the page's `<audio>` element.
#[cfg(target_arch = "wasm32")]
#[derive(Default)]
pub struct WebAudioEngine {
    audio: Option<HtmlAudioElement>,
    config: Option<TrackList>,
    reporter: Rc<FaultReporter>,
    on_error: Option<Closure<dyn FnMut()>>,
}

#[cfg(target_arch = "wasm32")]
impl WebAudioEngine {
    fn audio(&self) -> Result<&HtmlAudioElement, EngineError> {
        self.audio.as_ref().ok_or(EngineError::NotInitialized)
    }

    fn attach(&mut self, audio: HtmlAudioElement) {
        if self.on_error.is_none() {
            let reporter = self.reporter.clone();
            let element = audio.clone();
            let listener = Closure::wrap(Box::new(move || {
                let Some(load) = reporter.current_load() else {
                    return;
                };
                let message = media_error_message(&element)
                    .unwrap_or_else(|| "unable to load this audio source".to_string());
                reporter.report(load, EngineError::Rejected(message));
            }) as Box<dyn FnMut()>);
            match audio.add_event_listener_with_callback("error", listener.as_ref().unchecked_ref()) {
                Ok(()) => self.on_error = Some(listener),
                Err(err) => warn!("cannot watch the audio element for errors: {err:?}"),
            }
        }
        self.audio = Some(audio);
    }

    fn load_track(&self, url: &str) -> Result<(), EngineError> {
        let audio = self.audio()?;
        let load = self.reporter.begin(url);
        audio.set_src(url);
        audio.set_current_time(0.0);
        start_playback(audio, &self.reporter, load)
    }
}

#[cfg(target_arch = "wasm32")]
impl Drop for WebAudioEngine {
    fn drop(&mut self) {
        if let (Some(audio), Some(listener)) = (&self.audio, &self.on_error) {
            let _ = audio
                .remove_event_listener_with_callback("error", listener.as_ref().unchecked_ref());
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl AudioEngine for WebAudioEngine {
    fn init(&mut self, tracks: TrackList) -> Result<(), EngineError> {
        let audio = get_or_create_audio_element().ok_or_else(|| {
            EngineError::Unavailable("could not create the audio element".to_string())
        })?;
        audio.set_loop(false);
        self.attach(audio);
        self.config = Some(tracks);
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.audio.is_some() && self.config.is_some()
    }

    fn config_mut(&mut self) -> Option<&mut TrackList> {
        self.config.as_mut()
    }

    fn play_song_at_index(&mut self, index: usize) -> Result<(), EngineError> {
        let config = self.config.as_ref().ok_or(EngineError::NotInitialized)?;
        let url = config
            .songs()
            .get(index)
            .map(|track| track.url.clone())
            .ok_or(EngineError::NoSuchTrack(index))?;
        self.load_track(&url)
    }

    fn play_playlist_song_at_index(
        &mut self,
        playlist: &str,
        index: usize,
    ) -> Result<(), EngineError> {
        let config = self.config.as_ref().ok_or(EngineError::NotInitialized)?;
        let url = config
            .playlist(playlist)
            .ok_or_else(|| EngineError::NoSuchPlaylist(playlist.to_string()))?
            .tracks
            .get(index)
            .map(|track| track.url.clone())
            .ok_or(EngineError::NoSuchTrack(index))?;
        self.load_track(&url)
    }

    fn play_direct(&mut self, url: &str) -> Result<(), EngineError> {
        let audio = match &self.audio {
            Some(audio) => audio.clone(),
            None => get_or_create_audio_element().ok_or_else(|| {
                EngineError::Unavailable("no audio element on the page".to_string())
            })?,
        };
        self.attach(audio.clone());
        let load = self.reporter.begin(url);
        audio.set_src(url);
        audio.load();
        start_playback(&audio, &self.reporter, load)
    }

    fn pause(&mut self) {
        if let Some(audio) = &self.audio {
            let _ = audio.pause();
        }
    }

    fn resume(&mut self) -> Result<(), EngineError> {
        let audio = self.audio()?;
        if let Some(message) = media_error_message(audio) {
            return Err(EngineError::Rejected(message));
        }
        let load = self
            .reporter
            .current_load()
            .ok_or(EngineError::NotInitialized)?;
        start_playback(audio, &self.reporter, load)
    }

    fn teardown(&mut self) {
        self.reporter.clear();
        if let Some(audio) = &self.audio {
            let _ = audio.pause();
            audio.set_src("");
            let _ = audio.remove_attribute("src");
            audio.load();
        }
        self.config = None;
    }

    fn set_fault_sink(&mut self, sink: FaultSink) {
        *self.reporter.sink.borrow_mut() = Some(sink);
    }
}

/// Outside the browser there is no media element: init always fails, which
/// leaves the controller inert.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct HeadlessEngine;

#[cfg(not(target_arch = "wasm32"))]
impl AudioEngine for HeadlessEngine {
    fn init(&mut self, _tracks: TrackList) -> Result<(), EngineError> {
        Err(EngineError::Unavailable(
            "no media element outside the browser".to_string(),
        ))
    }

    fn is_ready(&self) -> bool {
        false
    }

    fn config_mut(&mut self) -> Option<&mut TrackList> {
        None
    }

    fn play_song_at_index(&mut self, _index: usize) -> Result<(), EngineError> {
        Err(EngineError::NotInitialized)
    }

    fn play_playlist_song_at_index(
        &mut self,
        _playlist: &str,
        _index: usize,
    ) -> Result<(), EngineError> {
        Err(EngineError::NotInitialized)
    }

    fn play_direct(&mut self, _url: &str) -> Result<(), EngineError> {
        Err(EngineError::NotInitialized)
    }

    fn pause(&mut self) {}

    fn resume(&mut self) -> Result<(), EngineError> {
        Err(EngineError::NotInitialized)
    }

    fn teardown(&mut self) {}
}
