// Playback controller: one "now playing" slot shared by every play control.
use super::cache_token::new_cache_token;
use super::engine::{AudioEngine, EngineError, FaultSink, PlaybackFault};
use super::identity::{ClickHandle, ControlKey, ControlRegistry, ControlVisual, IdentityMap, PlayerId};
use super::state::PlaybackState;
use super::tracks::{BuildWarning, TrackList};
use crate::api::{TourData, TourDataError};
use dioxus::logger::tracing::{debug, error, info, warn};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlaybackError {
    #[error("audio controller is not ready")]
    NotReady,

    #[error("audio controller is inactive: {0}")]
    Inert(String),

    #[error("click binding for {0} is stale")]
    StaleBinding(PlayerId),

    #[error("no control registered as {0}")]
    UnknownControl(PlayerId),

    #[error("no playlist named `{0}`")]
    UnknownPlaylist(String),

    #[error("track {index} is out of range for playlist `{playlist}` ({len} tracks)")]
    IndexOutOfRange {
        playlist: String,
        index: usize,
        len: usize,
    },

    #[error("{0} has no audio file")]
    MissingAudio(PlayerId),

    #[error("playback failed (library: {primary}; media element: {fallback})")]
    PlaybackFailed {
        primary: EngineError,
        fallback: EngineError,
    },

    #[error("resume failed: {0}")]
    ResumeFailed(EngineError),

    #[error("media library failed to initialize: {0}")]
    Init(EngineError),

    #[error(transparent)]
    Tour(#[from] TourDataError),
}

impl PlaybackError {
    /// Failures the visitor has to be told about (blocking alert).
    pub fn needs_alert(&self) -> bool {
        matches!(self, Self::PlaybackFailed { .. } | Self::ResumeFailed(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayStrategy {
    LibraryIndex,
    DirectElement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Paused(PlayerId),
    Resumed(PlayerId),
    Started {
        id: PlayerId,
        previous: Option<PlayerId>,
        strategy: PlayStrategy,
    },
}

/// Returned by `begin_language_switch`; only the most recent ticket completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchTicket {
    generation: u64,
    pub code: String,
}

/// The start currently driving the media element.
#[derive(Debug, Clone, PartialEq)]
struct PlayAttempt {
    id: PlayerId,
    url: String,
    strategy: PlayStrategy,
    primary: Option<EngineError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Lifecycle {
    Uninitialized,
    AwaitingReady,
    Ready,
    Switching(u64),
    Inert(String),
}

pub struct PlaybackController<E: AudioEngine> {
    engine: E,
    state: PlaybackState,
    identities: IdentityMap,
    controls: ControlRegistry,
    tracks: Option<TrackList>,
    language: Option<String>,
    lifecycle: Lifecycle,
    switch_generation: u64,
    attempt: Option<PlayAttempt>,
}

impl<E: AudioEngine> PlaybackController<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            state: PlaybackState::default(),
            identities: IdentityMap::default(),
            controls: ControlRegistry::default(),
            tracks: None,
            language: None,
            lifecycle: Lifecycle::Uninitialized,
            switch_generation: 0,
            attempt: None,
        }
    }

    /// Builds the track list for `lang` and wires the media library. Controls
    /// are bound later, from `on_engine_ready`.
    pub fn initialize(
        &mut self,
        tour: &TourData,
        lang: &str,
    ) -> Result<Vec<BuildWarning>, PlaybackError> {
        let (tracks, warnings) = match TrackList::from_tour(tour, lang) {
            Ok(built) => built,
            Err(err) => {
                error!("audio controller disabled: {err}");
                self.lifecycle = Lifecycle::Inert(err.to_string());
                return Err(err.into());
            }
        };
        for warning in &warnings {
            warn!("{warning}");
        }

        if let Err(err) = self.engine.init(tracks.clone()) {
            error!("media library init failed: {err}");
            self.lifecycle = Lifecycle::Inert(err.to_string());
            return Err(PlaybackError::Init(err));
        }

        info!(
            "audio initialized for `{lang}` with {} tracks",
            tracks.songs().len()
        );
        self.tracks = Some(tracks);
        self.language = Some(lang.to_string());
        self.lifecycle = Lifecycle::AwaitingReady;
        Ok(warnings)
    }

    /// One-time readiness hook. Binds controls the first time the library
    /// reports ready; later calls do nothing.
    pub fn on_engine_ready(&mut self) -> bool {
        if self.lifecycle != Lifecycle::AwaitingReady || !self.engine.is_ready() {
            return false;
        }
        self.bind_controls();
        self.lifecycle = Lifecycle::Ready;
        true
    }

    /// Every control the current track list offers.
    pub fn control_keys(&self) -> Vec<ControlKey> {
        let Some(tracks) = &self.tracks else {
            return Vec::new();
        };
        let mut keys = vec![ControlKey::Intro];
        for (name, playlist) in &tracks.playlists {
            keys.extend((0..playlist.tracks.len()).map(|index| ControlKey::playlist(name, index)));
        }
        keys
    }

    /// Assigns identities and (re)binds one click handler per control, in
    /// the paused visual state.
    pub fn bind_controls(&mut self) {
        let keys = self.control_keys();
        let ids: Vec<PlayerId> = keys.iter().map(|key| self.identities.assign(key)).collect();
        self.controls.retain(|id| ids.contains(id));
        for id in &ids {
            self.controls.bind(id);
        }
        debug!("bound {} play controls", ids.len());
    }

    pub fn reset_all_control_visual_state(&mut self) {
        self.controls.mark_all_paused();
        self.bind_controls();
    }

    pub fn handle(&self, key: &ControlKey) -> Option<ClickHandle> {
        self.identities
            .id_for(key)
            .and_then(|id| self.controls.handle(id))
    }

    pub fn visual(&self, key: &ControlKey) -> Option<ControlVisual> {
        self.identities
            .id_for(key)
            .and_then(|id| self.controls.visual(id))
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn tracks(&self) -> Option<&TrackList> {
        self.tracks.as_ref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn is_ready(&self) -> bool {
        self.lifecycle == Lifecycle::Ready
    }

    /// Still waiting for the first readiness signal after `initialize`.
    pub fn is_awaiting_ready(&self) -> bool {
        self.lifecycle == Lifecycle::AwaitingReady
    }

    pub fn is_switching(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Switching(_))
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn set_fault_sink(&mut self, sink: FaultSink) {
        self.engine.set_fault_sink(sink);
    }

    /// Back to idle without touching the track list.
    pub fn reset(&mut self) {
        self.engine.pause();
        self.state.reset();
        self.controls.mark_all_paused();
        self.attempt = None;
    }

    pub fn handle_control_click(&mut self, click: &ClickHandle) -> Result<Transition, PlaybackError> {
        let result = self.transition(click);
        if let Err(err) = &result {
            match err {
                PlaybackError::StaleBinding(_) => debug!("{err}"),
                _ => error!("click on {} rejected: {err}", click.id),
            }
        }
        result
    }

    fn transition(&mut self, click: &ClickHandle) -> Result<Transition, PlaybackError> {
        match &self.lifecycle {
            Lifecycle::Ready => {}
            Lifecycle::Inert(reason) => return Err(PlaybackError::Inert(reason.clone())),
            _ => return Err(PlaybackError::NotReady),
        }
        if !self.controls.is_current(click) {
            return Err(PlaybackError::StaleBinding(click.id.clone()));
        }
        let id = click.id.clone();
        let key = self
            .identities
            .key_for(&id)
            .cloned()
            .ok_or_else(|| PlaybackError::UnknownControl(id.clone()))?;
        // Validated before anything is mutated.
        let url = self.resolve_url(&id, &key)?;

        if self.state.is_playing(&id) {
            self.engine.pause();
            self.state.pause();
            self.controls.set_visual(&id, ControlVisual::Paused);
            return Ok(Transition::Paused(id));
        }

        if self.state.is_paused_by_user(&id, &key) {
            self.engine.resume().map_err(PlaybackError::ResumeFailed)?;
            self.state.resume();
            self.mark_only_playing(&id);
            return Ok(Transition::Resumed(id));
        }

        let (strategy, primary) = match self.try_library(&key) {
            Ok(()) => (PlayStrategy::LibraryIndex, None),
            Err(primary) => {
                warn!("library playback failed for {id}: {primary}, using media element");
                match self.engine.play_direct(&url) {
                    Ok(()) => (PlayStrategy::DirectElement, Some(primary)),
                    Err(fallback) => return Err(PlaybackError::PlaybackFailed { primary, fallback }),
                }
            }
        };
        self.attempt = Some(PlayAttempt {
            id: id.clone(),
            url,
            strategy,
            primary,
        });

        let previous = self
            .state
            .active_player_id
            .clone()
            .filter(|previous| *previous != id);
        self.state.start(id.clone(), &key);
        self.mark_only_playing(&id);
        Ok(Transition::Started {
            id,
            previous,
            strategy,
        })
    }

    /// A failure reported by the media element after a start was accepted.
    /// A library start falls back to the media element. When the element
    /// fails too the earlier source is already gone, so the page returns to
    /// idle and the caller alerts. Faults for anything but the playing start
    /// are ignored.
    pub fn handle_playback_fault(
        &mut self,
        fault: PlaybackFault,
    ) -> Result<Option<Transition>, PlaybackError> {
        let attempt = match &self.attempt {
            Some(attempt) if attempt.url == fault.url && self.state.is_playing(&attempt.id) => {
                attempt.clone()
            }
            _ => {
                debug!("ignoring late failure for `{}`: {}", fault.url, fault.error);
                return Ok(None);
            }
        };

        let (primary, fallback) = match attempt.strategy {
            PlayStrategy::LibraryIndex => {
                warn!(
                    "library playback of {} failed late: {}, using media element",
                    attempt.id, fault.error
                );
                match self.engine.play_direct(&attempt.url) {
                    Ok(()) => {
                        let id = attempt.id.clone();
                        self.attempt = Some(PlayAttempt {
                            strategy: PlayStrategy::DirectElement,
                            primary: Some(fault.error),
                            ..attempt
                        });
                        return Ok(Some(Transition::Started {
                            id,
                            previous: None,
                            strategy: PlayStrategy::DirectElement,
                        }));
                    }
                    Err(fallback) => (fault.error, fallback),
                }
            }
            PlayStrategy::DirectElement => {
                let fallback = fault.error;
                (attempt.primary.unwrap_or_else(|| fallback.clone()), fallback)
            }
        };

        let err = PlaybackError::PlaybackFailed { primary, fallback };
        error!("{} stopped: {err}", attempt.id);
        self.reset();
        Err(err)
    }

    /// Primary strategy: the library's own index API. The intro always
    /// starts from song 0.
    fn try_library(&mut self, key: &ControlKey) -> Result<(), EngineError> {
        match key {
            ControlKey::Intro => self.engine.play_song_at_index(0),
            ControlKey::Playlist { playlist, index } => {
                self.engine.play_playlist_song_at_index(playlist, *index)
            }
        }
    }

    fn resolve_url(&self, id: &PlayerId, key: &ControlKey) -> Result<String, PlaybackError> {
        let tracks = self.tracks.as_ref().ok_or(PlaybackError::NotReady)?;
        let url = match key {
            ControlKey::Intro => tracks.intro.url.clone(),
            ControlKey::Playlist { playlist, index } => {
                let list = tracks
                    .playlist(playlist)
                    .ok_or_else(|| PlaybackError::UnknownPlaylist(playlist.clone()))?;
                list.tracks
                    .get(*index)
                    .map(|track| track.url.clone())
                    .ok_or_else(|| PlaybackError::IndexOutOfRange {
                        playlist: playlist.clone(),
                        index: *index,
                        len: list.tracks.len(),
                    })?
            }
        };
        if url.is_empty() {
            return Err(PlaybackError::MissingAudio(id.clone()));
        }
        Ok(url)
    }

    fn mark_only_playing(&mut self, id: &PlayerId) {
        self.controls.mark_all_paused();
        self.controls.set_visual(id, ControlVisual::Playing);
    }

    /// Tears the library down and rebuilds it for `lang`. The new URLs carry
    /// a cache token while the library loads them; the token is stripped from
    /// the running configuration afterwards. Controls stay unbound until
    /// `complete_language_switch` is called with the returned ticket.
    pub fn begin_language_switch(
        &mut self,
        tour: &TourData,
        lang: &str,
    ) -> Result<SwitchTicket, PlaybackError> {
        let (tracks, warnings) = TrackList::from_tour(tour, lang).map_err(|err| {
            error!("cannot switch audio to `{lang}`: {err}");
            PlaybackError::from(err)
        })?;
        for warning in &warnings {
            warn!("{warning}");
        }

        self.engine.pause();
        self.engine.teardown();
        self.state.reset();
        self.controls.mark_all_paused();
        self.attempt = None;

        let busted = tracks.with_cache_token(&new_cache_token());
        if let Err(err) = self.engine.init(busted) {
            error!("media library re-init failed: {err}");
            self.lifecycle = Lifecycle::Inert(err.to_string());
            return Err(PlaybackError::Init(err));
        }
        if let Some(config) = self.engine.config_mut() {
            config.strip_cache_tokens();
        }

        self.tracks = Some(tracks);
        self.language = Some(lang.to_string());
        self.switch_generation += 1;
        self.lifecycle = Lifecycle::Switching(self.switch_generation);
        info!("audio switched to `{lang}`, waiting to rebind");
        Ok(SwitchTicket {
            generation: self.switch_generation,
            code: lang.to_string(),
        })
    }

    /// Rebinds controls after the settling delay. Returns false when a later
    /// switch superseded `ticket`.
    pub fn complete_language_switch(&mut self, ticket: &SwitchTicket) -> bool {
        if self.lifecycle != Lifecycle::Switching(ticket.generation) {
            debug!("language switch to `{}` superseded", ticket.code);
            return false;
        }
        self.reset_all_control_visual_state();
        self.lifecycle = Lifecycle::Ready;
        true
    }
}

/// Settling delay after a destructive re-init.
#[cfg(target_arch = "wasm32")]
pub async fn settle(delay: Duration) {
    let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
    gloo_timers::future::TimeoutFuture::new(millis).await;
}

#[cfg(not(target_arch = "wasm32"))]
pub async fn settle(delay: Duration) {
    tokio::time::sleep(delay).await;
}

#[cfg(test)]
mod tests {
    use super::super::engine::fake::{Call, FakeEngine};
    use super::super::tracks::TOUR_PLAYLIST;
    use super::*;
    use crate::api::tour::fixtures::tour;

    fn ready_controller() -> PlaybackController<FakeEngine> {
        let mut controller = PlaybackController::new(FakeEngine::default());
        controller.initialize(&tour(), "it").unwrap();
        assert!(controller.on_engine_ready());
        controller
    }

    fn click(
        controller: &mut PlaybackController<FakeEngine>,
        key: &ControlKey,
    ) -> Result<Transition, PlaybackError> {
        let handle = controller.handle(key).expect("control is bound");
        controller.handle_control_click(&handle)
    }

    fn stop(index: usize) -> ControlKey {
        ControlKey::playlist(TOUR_PLAYLIST, index)
    }

    fn playing_count(controller: &PlaybackController<FakeEngine>) -> usize {
        controller
            .control_keys()
            .iter()
            .filter(|key| controller.visual(key) == Some(ControlVisual::Playing))
            .count()
    }

    #[test]
    fn controls_bind_only_after_ready() {
        let mut controller = PlaybackController::new(FakeEngine::default());
        controller.initialize(&tour(), "it").unwrap();
        assert_eq!(controller.handle(&ControlKey::Intro), None);

        assert!(controller.on_engine_ready());
        assert!(!controller.on_engine_ready());
        assert_eq!(controller.visual(&ControlKey::Intro), Some(ControlVisual::Paused));
        assert_eq!(controller.control_keys().len(), 3);
    }

    #[test]
    fn intro_then_stop_scenario() {
        let mut controller = ready_controller();

        click(&mut controller, &ControlKey::Intro).unwrap();
        let state = controller.state();
        assert_eq!(state.active_player_id.as_ref().map(|id| id.as_str()), Some("main-player"));
        assert!(state.is_playing);
        assert_eq!(state.active_playlist_name, None);

        let transition = click(&mut controller, &stop(1)).unwrap();
        let state = controller.state();
        assert_eq!(
            state.active_player_id.as_ref().map(|id| id.as_str()),
            Some("playlist-episodi-song-1")
        );
        assert!(state.is_playing);
        assert_eq!(state.active_playlist_name.as_deref(), Some("episodi"));
        assert_eq!(state.active_track_index, Some(1));
        assert_eq!(controller.visual(&ControlKey::Intro), Some(ControlVisual::Paused));
        assert!(matches!(
            transition,
            Transition::Started { previous: Some(ref prev), strategy: PlayStrategy::LibraryIndex, .. }
                if prev.as_str() == "main-player"
        ));
        assert_eq!(controller.engine().loaded.as_deref(), Some("audio/it/2.mp3"));
    }

    #[test]
    fn pause_then_resume_keeps_position() {
        let mut controller = ready_controller();
        click(&mut controller, &stop(0)).unwrap();
        controller.engine_mut().position = 42.5;

        assert!(matches!(click(&mut controller, &stop(0)), Ok(Transition::Paused(_))));
        let paused = controller.state().clone();
        assert!(!paused.is_playing);
        assert_eq!(paused.paused_player_id, paused.active_player_id);
        assert_eq!(controller.visual(&stop(0)), Some(ControlVisual::Paused));

        let plays_before = controller.engine().play_calls();
        assert!(matches!(click(&mut controller, &stop(0)), Ok(Transition::Resumed(_))));
        assert_eq!(controller.engine().play_calls(), plays_before);
        assert_eq!(controller.engine().position, 42.5);
        assert_eq!(controller.visual(&stop(0)), Some(ControlVisual::Playing));
        assert_eq!(controller.state().paused_player_id, None);
    }

    #[test]
    fn switching_clears_paused_identity() {
        let mut controller = ready_controller();
        click(&mut controller, &stop(0)).unwrap();
        click(&mut controller, &stop(0)).unwrap();
        assert!(controller.state().paused_player_id.is_some());

        click(&mut controller, &stop(1)).unwrap();
        let state = controller.state();
        assert_eq!(state.paused_player_id, None);
        assert_eq!(controller.visual(&stop(0)), Some(ControlVisual::Paused));
        assert_eq!(controller.visual(&stop(1)), Some(ControlVisual::Playing));
    }

    #[test]
    fn intro_always_starts_at_index_zero() {
        let mut controller = ready_controller();
        click(&mut controller, &stop(1)).unwrap();
        click(&mut controller, &ControlKey::Intro).unwrap();
        click(&mut controller, &ControlKey::Intro).unwrap();
        click(&mut controller, &stop(0)).unwrap();
        click(&mut controller, &ControlKey::Intro).unwrap();

        let intro_plays: Vec<&Call> = controller
            .engine()
            .calls
            .iter()
            .filter(|call| matches!(call, Call::PlaySong(_)))
            .collect();
        assert_eq!(intro_plays, vec![&Call::PlaySong(0), &Call::PlaySong(0)]);
        assert_eq!(controller.engine().loaded.as_deref(), Some("audio/it/0_intro.mp3"));
    }

    #[test]
    fn at_most_one_control_plays() {
        let mut controller = ready_controller();
        let sequence = [
            ControlKey::Intro,
            stop(0),
            stop(0),
            stop(1),
            ControlKey::Intro,
            ControlKey::Intro,
            stop(1),
            stop(0),
        ];
        for key in &sequence {
            click(&mut controller, key).unwrap();
            assert!(playing_count(&controller) <= 1);
            assert_eq!(playing_count(&controller) == 1, controller.state().is_playing);
        }
    }

    #[test]
    fn falls_back_to_media_element() {
        let mut controller = ready_controller();
        controller.engine_mut().fail_primary = true;

        let transition = click(&mut controller, &stop(1)).unwrap();
        assert!(matches!(
            transition,
            Transition::Started { strategy: PlayStrategy::DirectElement, .. }
        ));
        assert_eq!(
            controller.engine().calls.last(),
            Some(&Call::Direct("audio/it/2.mp3".to_string()))
        );
    }

    #[test]
    fn double_failure_leaves_state_unchanged() {
        let mut controller = ready_controller();
        click(&mut controller, &ControlKey::Intro).unwrap();
        let before = controller.state().clone();

        controller.engine_mut().fail_primary = true;
        controller.engine_mut().fail_direct = true;
        let err = click(&mut controller, &stop(0)).unwrap_err();
        assert!(err.needs_alert());
        assert_eq!(controller.state(), &before);
        assert_eq!(controller.visual(&ControlKey::Intro), Some(ControlVisual::Playing));
        assert_eq!(controller.visual(&stop(0)), Some(ControlVisual::Paused));
    }

    fn late_fault(url: &str) -> PlaybackFault {
        PlaybackFault {
            url: url.to_string(),
            error: EngineError::Rejected("404".into()),
        }
    }

    #[test]
    fn late_library_failure_falls_back_to_media_element() {
        let mut controller = ready_controller();
        click(&mut controller, &stop(0)).unwrap();

        let transition = controller
            .handle_playback_fault(late_fault("audio/it/1.mp3"))
            .unwrap();
        assert!(matches!(
            transition,
            Some(Transition::Started { strategy: PlayStrategy::DirectElement, .. })
        ));
        assert_eq!(
            controller.engine().calls.last(),
            Some(&Call::Direct("audio/it/1.mp3".to_string()))
        );
        assert_eq!(controller.visual(&stop(0)), Some(ControlVisual::Playing));
    }

    #[test]
    fn late_failure_of_both_strategies_alerts_and_goes_idle() {
        let mut controller = ready_controller();
        click(&mut controller, &stop(0)).unwrap();
        controller
            .handle_playback_fault(late_fault("audio/it/1.mp3"))
            .unwrap();

        let err = controller
            .handle_playback_fault(late_fault("audio/it/1.mp3"))
            .unwrap_err();
        assert!(err.needs_alert());
        assert!(controller.state().is_idle());
        assert_eq!(playing_count(&controller), 0);

        // The page is usable again.
        click(&mut controller, &stop(1)).unwrap();
        assert_eq!(controller.visual(&stop(1)), Some(ControlVisual::Playing));
    }

    #[test]
    fn late_failure_with_broken_fallback_alerts_at_once() {
        let mut controller = ready_controller();
        click(&mut controller, &ControlKey::Intro).unwrap();
        controller.engine_mut().fail_direct = true;

        let err = controller
            .handle_playback_fault(late_fault("audio/it/0_intro.mp3"))
            .unwrap_err();
        assert!(matches!(err, PlaybackError::PlaybackFailed { .. }));
        assert!(controller.state().is_idle());
    }

    #[test]
    fn stale_late_failures_are_ignored() {
        let mut controller = ready_controller();
        click(&mut controller, &stop(0)).unwrap();
        click(&mut controller, &stop(1)).unwrap();
        let calls = controller.engine().calls.len();

        assert_eq!(controller.handle_playback_fault(late_fault("audio/it/1.mp3")), Ok(None));

        click(&mut controller, &stop(1)).unwrap();
        assert_eq!(controller.handle_playback_fault(late_fault("audio/it/2.mp3")), Ok(None));
        assert_eq!(controller.engine().calls.len(), calls + 1);
        assert!(!controller.state().is_idle());
    }

    #[test]
    fn switch_before_readiness_ends_the_wait() {
        let mut controller = PlaybackController::new(FakeEngine::default());
        controller.initialize(&tour(), "it").unwrap();
        assert!(controller.is_awaiting_ready());

        let ticket = controller.begin_language_switch(&tour(), "en").unwrap();
        assert!(!controller.is_awaiting_ready());
        assert!(!controller.on_engine_ready());
        assert!(controller.complete_language_switch(&ticket));
        assert!(controller.handle(&ControlKey::Intro).is_some());
    }

    #[test]
    fn out_of_range_target_is_rejected_without_mutation() {
        let mut controller = ready_controller();
        click(&mut controller, &stop(0)).unwrap();
        let before = controller.state().clone();

        // Shrink the playlist underneath a still-bound control.
        if let Some(tracks) = controller.tracks.as_mut() {
            if let Some(playlist) = tracks.playlists.get_mut(TOUR_PLAYLIST) {
                playlist.tracks.truncate(1);
            }
        }
        let err = click(&mut controller, &stop(1)).unwrap_err();
        assert_eq!(
            err,
            PlaybackError::IndexOutOfRange {
                playlist: TOUR_PLAYLIST.to_string(),
                index: 1,
                len: 1
            }
        );
        assert_eq!(controller.state(), &before);
    }

    #[test]
    fn init_failure_makes_controller_inert() {
        let mut engine = FakeEngine::default();
        engine.fail_init = true;
        let mut controller = PlaybackController::new(engine);

        assert!(matches!(
            controller.initialize(&tour(), "it"),
            Err(PlaybackError::Init(_))
        ));
        assert!(!controller.on_engine_ready());
        assert_eq!(controller.handle(&ControlKey::Intro), None);
    }

    #[test]
    fn missing_language_makes_controller_inert() {
        let mut controller = PlaybackController::new(FakeEngine::default());
        assert!(matches!(
            controller.initialize(&tour(), "de"),
            Err(PlaybackError::Tour(_))
        ));
        assert!(controller.engine().calls.is_empty());
    }

    #[test]
    fn language_switch_rebuilds_and_resets() {
        let mut controller = ready_controller();
        click(&mut controller, &stop(0)).unwrap();
        let old_handle = controller.handle(&stop(0)).unwrap();

        let ticket = controller.begin_language_switch(&tour(), "en").unwrap();
        assert!(controller.state().is_idle());
        assert_eq!(click(&mut controller, &ControlKey::Intro), Err(PlaybackError::NotReady));

        // Init saw cache-busted URLs; the running config is clean again.
        let init_urls = controller
            .engine()
            .calls
            .iter()
            .rev()
            .find_map(|call| match call {
                Call::Init(urls) => Some(urls.clone()),
                _ => None,
            })
            .unwrap();
        assert!(init_urls.iter().all(|url| url.contains("?v=")));
        let running = controller.engine_mut().config_mut().unwrap().urls();
        assert_eq!(running[1], "audio/en/1.mp3");

        assert!(controller.complete_language_switch(&ticket));
        assert!(controller.is_ready());
        assert_eq!(playing_count(&controller), 0);
        assert_eq!(controller.language(), Some("en"));
        assert_eq!(
            controller.handle_control_click(&old_handle),
            Err(PlaybackError::StaleBinding(old_handle.id.clone()))
        );

        click(&mut controller, &stop(0)).unwrap();
        assert_eq!(controller.engine().loaded.as_deref(), Some("audio/en/1.mp3"));
    }

    #[test]
    fn switching_back_restores_original_urls() {
        let mut controller = ready_controller();
        let original = controller.tracks().cloned().unwrap();

        for lang in ["en", "it"] {
            let ticket = controller.begin_language_switch(&tour(), lang).unwrap();
            controller.complete_language_switch(&ticket);
        }
        assert_eq!(controller.tracks(), Some(&original));
        assert_eq!(controller.engine_mut().config_mut().cloned(), Some(original));
    }

    #[test]
    fn overlapping_switches_only_complete_latest() {
        let mut controller = ready_controller();
        let first = controller.begin_language_switch(&tour(), "en").unwrap();
        let second = controller.begin_language_switch(&tour(), "it").unwrap();

        assert!(!controller.complete_language_switch(&first));
        assert!(controller.is_switching());
        assert!(controller.complete_language_switch(&second));
        assert!(!controller.complete_language_switch(&second));
        assert_eq!(controller.language(), Some("it"));
    }

    #[test]
    fn failed_switch_keeps_current_language() {
        let mut controller = ready_controller();
        assert!(controller.begin_language_switch(&tour(), "de").is_err());
        assert!(controller.is_ready());
        assert_eq!(controller.language(), Some("it"));
    }

    #[tokio::test]
    async fn switch_completes_after_settling() {
        let mut controller = ready_controller();
        click(&mut controller, &stop(0)).unwrap();

        let ticket = controller.begin_language_switch(&tour(), "en").unwrap();
        settle(Duration::from_millis(5)).await;
        assert!(controller.complete_language_switch(&ticket));

        assert!(controller.state().is_idle());
        assert!(controller
            .control_keys()
            .iter()
            .all(|key| controller.visual(key) == Some(ControlVisual::Paused)));
        let urls: Vec<String> = controller
            .tracks()
            .unwrap()
            .playlist(TOUR_PLAYLIST)
            .unwrap()
            .tracks
            .iter()
            .map(|track| track.url.clone())
            .collect();
        assert_eq!(urls, vec!["audio/en/1.mp3", "audio/en/2.mp3"]);
    }
}
