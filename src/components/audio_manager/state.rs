use super::identity::{ControlKey, PlayerId};

/// What the media element is currently associated with.
///
/// `paused_player_id` is only set when the user paused the active control;
/// a control that was superseded by another one is simply no longer active.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackState {
    pub active_player_id: Option<PlayerId>,
    pub is_playing: bool,
    pub paused_player_id: Option<PlayerId>,
    pub active_playlist_name: Option<String>,
    pub active_track_index: Option<usize>,
}

impl PlaybackState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_idle(&self) -> bool {
        self.active_player_id.is_none() && !self.is_playing
    }

    pub fn is_playing(&self, id: &PlayerId) -> bool {
        self.is_playing && self.active_player_id.as_ref() == Some(id)
    }

    /// `id` was paused by the user and `key` still points at the loaded track.
    pub fn is_paused_by_user(&self, id: &PlayerId, key: &ControlKey) -> bool {
        !self.is_playing
            && self.paused_player_id.as_ref() == Some(id)
            && self.active_player_id.as_ref() == Some(id)
            && self.active_playlist_name.as_deref() == key.playlist_name()
            && self.active_track_index == key.track_index()
    }

    pub(crate) fn start(&mut self, id: PlayerId, key: &ControlKey) {
        self.active_player_id = Some(id);
        self.is_playing = true;
        self.paused_player_id = None;
        self.active_playlist_name = key.playlist_name().map(str::to_string);
        self.active_track_index = key.track_index();
    }

    pub(crate) fn pause(&mut self) {
        self.is_playing = false;
        self.paused_player_id = self.active_player_id.clone();
    }

    pub(crate) fn resume(&mut self) {
        self.is_playing = true;
        self.paused_player_id = None;
    }
}
