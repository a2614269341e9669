// Track lists built from the tour data for one language.
use super::cache_token::{strip_cache_token, with_cache_token};
use crate::api::{TourData, TourDataError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the playlist holding the stop narrations.
pub const TOUR_PLAYLIST: &str = "episodi";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    pub artist: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildWarning {
    MissingIntroAudio,
    MissingStopAudio { stop_index: usize, title: String },
}

impl std::fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingIntroAudio => write!(f, "introduction has no audio path"),
            Self::MissingStopAudio { stop_index, title } => {
                write!(f, "stop {} ({title}) has no audio path, skipped", stop_index + 1)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub tracks: Vec<Track>,
    /// Source stop position of every track, parallel to `tracks`.
    pub stop_indices: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackList {
    pub intro: Track,
    pub playlists: BTreeMap<String, Playlist>,
}

fn has_audio(path: &Option<String>) -> Option<&str> {
    path.as_deref().map(str::trim).filter(|path| !path.is_empty())
}

impl TrackList {
    /// Builds the intro and the tour playlist for `lang`. Stops without an
    /// audio path are skipped and reported, never fatal.
    pub fn from_tour(tour: &TourData, lang: &str) -> Result<(Self, Vec<BuildWarning>), TourDataError> {
        let content = tour.content(lang)?;
        let mut warnings = Vec::new();

        let intro_url = match has_audio(&content.introduction.audio_path) {
            Some(url) => url.to_string(),
            None => {
                warnings.push(BuildWarning::MissingIntroAudio);
                String::new()
            }
        };
        let intro = Track {
            name: content
                .introduction
                .title
                .clone()
                .unwrap_or_else(|| content.title.clone()),
            artist: content.title.clone(),
            url: intro_url,
        };

        let mut playlist = Playlist {
            tracks: Vec::new(),
            stop_indices: Vec::new(),
        };
        for (stop_index, stop) in content.stops.iter().enumerate() {
            let Some(url) = has_audio(&stop.audio_path) else {
                warnings.push(BuildWarning::MissingStopAudio {
                    stop_index,
                    title: stop.title.clone(),
                });
                continue;
            };
            playlist.tracks.push(Track {
                name: stop.title.clone(),
                artist: content.title.clone(),
                url: url.to_string(),
            });
            playlist.stop_indices.push(stop_index);
        }

        let mut playlists = BTreeMap::new();
        playlists.insert(TOUR_PLAYLIST.to_string(), playlist);
        Ok((Self { intro, playlists }, warnings))
    }

    pub fn playlist(&self, name: &str) -> Option<&Playlist> {
        self.playlists.get(name)
    }

    /// Playlist position of the track narrating `stop_index`, if it has one.
    pub fn index_for_stop(&self, name: &str, stop_index: usize) -> Option<usize> {
        self.playlist(name)?
            .stop_indices
            .iter()
            .position(|index| *index == stop_index)
    }

    /// Flat song list: the intro first, then every playlist in name order.
    pub fn songs(&self) -> Vec<&Track> {
        std::iter::once(&self.intro)
            .chain(self.playlists.values().flat_map(|playlist| playlist.tracks.iter()))
            .collect()
    }

    pub fn urls(&self) -> Vec<String> {
        self.songs()
            .into_iter()
            .map(|track| track.url.clone())
            .filter(|url| !url.is_empty())
            .collect()
    }

    fn map_urls(&mut self, f: impl Fn(&str) -> String) {
        if !self.intro.url.is_empty() {
            self.intro.url = f(&self.intro.url);
        }
        for playlist in self.playlists.values_mut() {
            for track in &mut playlist.tracks {
                track.url = f(&track.url);
            }
        }
    }

    pub fn with_cache_token(&self, token: &str) -> Self {
        let mut busted = self.clone();
        busted.map_urls(|url| with_cache_token(url, token));
        busted
    }

    pub fn strip_cache_tokens(&mut self) {
        self.map_urls(strip_cache_token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tour::fixtures::tour;

    #[test]
    fn builds_intro_and_playlist() {
        let (tracks, warnings) = TrackList::from_tour(&tour(), "it").unwrap();
        assert!(warnings.is_empty());
        assert_eq!(tracks.intro.url, "audio/it/0_intro.mp3");
        assert_eq!(tracks.intro.artist, "Centro Storico");

        let playlist = tracks.playlist(TOUR_PLAYLIST).unwrap();
        let urls: Vec<&str> = playlist.tracks.iter().map(|t| t.url.as_str()).collect();
        assert_eq!(urls, vec!["audio/it/1.mp3", "audio/it/2.mp3"]);
        assert_eq!(tracks.songs().len(), 3);
    }

    #[test]
    fn stops_without_audio_are_skipped_with_warning() {
        let mut tour = tour();
        if let Some(content) = tour.content.get_mut("it") {
            content.stops[0].audio_path = Some("  ".to_string());
        }
        let (tracks, warnings) = TrackList::from_tour(&tour, "it").unwrap();
        assert_eq!(
            warnings,
            vec![BuildWarning::MissingStopAudio {
                stop_index: 0,
                title: "Piazza".to_string()
            }]
        );
        assert_eq!(tracks.index_for_stop(TOUR_PLAYLIST, 0), None);
        assert_eq!(tracks.index_for_stop(TOUR_PLAYLIST, 1), Some(0));
    }

    #[test]
    fn unknown_language_is_rejected() {
        assert!(TrackList::from_tour(&tour(), "de").is_err());
    }

    #[test]
    fn cache_tokens_round_trip_across_the_list() {
        let (original, _) = TrackList::from_tour(&tour(), "en").unwrap();
        let mut busted = original.with_cache_token("tok");
        assert!(busted.urls().iter().all(|url| url.ends_with("?v=tok")));
        busted.strip_cache_tokens();
        assert_eq!(busted, original);
    }
}
