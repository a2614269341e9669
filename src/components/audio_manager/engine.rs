// Seam between the playback controller and the underlying media library.
use super::tracks::TrackList;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("media library unavailable: {0}")]
    Unavailable(String),

    #[error("media library is not initialized")]
    NotInitialized,

    #[error("no playlist named `{0}`")]
    NoSuchPlaylist(String),

    #[error("no track at index {0}")]
    NoSuchTrack(usize),

    #[error("playback rejected: {0}")]
    Rejected(String),
}

/// A failure the media element reported after a play call had returned,
/// for the source loaded from `url`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackFault {
    pub url: String,
    pub error: EngineError,
}

pub type FaultSink = Rc<dyn Fn(PlaybackFault)>;

/// A media library wrapping one media element: a flat song list (intro
/// first) plus named playlists.
///
/// Playlist replacement is not atomic: callers must `teardown` before
/// calling `init` again with a new track list.
pub trait AudioEngine {
    fn init(&mut self, tracks: TrackList) -> Result<(), EngineError>;

    /// True once `init` has finished and the library accepts playback calls.
    fn is_ready(&self) -> bool;

    /// The running configuration, for in-place URL rewrites.
    fn config_mut(&mut self) -> Option<&mut TrackList>;

    fn play_song_at_index(&mut self, index: usize) -> Result<(), EngineError>;

    fn play_playlist_song_at_index(&mut self, playlist: &str, index: usize)
        -> Result<(), EngineError>;

    /// Fallback path: set the element source directly, load and play.
    fn play_direct(&mut self, url: &str) -> Result<(), EngineError>;

    fn pause(&mut self);

    /// Continue the loaded source from its current position.
    fn resume(&mut self) -> Result<(), EngineError>;

    /// Pause, detach the source and drop the configuration.
    fn teardown(&mut self);

    /// Receives failures that surface after a play call returned, such as a
    /// rejected play promise or a load error on the element. At most one
    /// fault is reported per loaded source.
    fn set_fault_sink(&mut self, _sink: FaultSink) {}
}
