// Control identities and click bindings.
//
// A control is identified structurally (intro, or playlist + index). Each key
// is assigned one opaque `PlayerId` for the life of the page, so identity
// survives language-driven re-renders. Bindings carry a generation; handles
// from an older binding are stale and must be ignored.
use std::collections::{BTreeMap, HashMap};
use std::fmt;

pub const INTRO_PLAYER_ID: &str = "main-player";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ControlKey {
    Intro,
    Playlist { playlist: String, index: usize },
}

impl ControlKey {
    pub fn playlist(name: &str, index: usize) -> Self {
        Self::Playlist {
            playlist: name.to_string(),
            index,
        }
    }

    pub fn playlist_name(&self) -> Option<&str> {
        match self {
            Self::Intro => None,
            Self::Playlist { playlist, .. } => Some(playlist),
        }
    }

    pub fn track_index(&self) -> Option<usize> {
        match self {
            Self::Intro => None,
            Self::Playlist { index, .. } => Some(*index),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(String);

impl PlayerId {
    fn derive(key: &ControlKey) -> Self {
        match key {
            ControlKey::Intro => Self(INTRO_PLAYER_ID.to_string()),
            ControlKey::Playlist { playlist, index } => {
                Self(format!("playlist-{playlist}-song-{index}"))
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Default, Clone)]
pub struct IdentityMap {
    by_key: HashMap<ControlKey, PlayerId>,
    by_id: HashMap<PlayerId, ControlKey>,
}

impl IdentityMap {
    /// Returns the key's identity, assigning it on first use.
    pub fn assign(&mut self, key: &ControlKey) -> PlayerId {
        if let Some(id) = self.by_key.get(key) {
            return id.clone();
        }
        let id = PlayerId::derive(key);
        self.by_key.insert(key.clone(), id.clone());
        self.by_id.insert(id.clone(), key.clone());
        id
    }

    pub fn id_for(&self, key: &ControlKey) -> Option<&PlayerId> {
        self.by_key.get(key)
    }

    pub fn key_for(&self, id: &PlayerId) -> Option<&ControlKey> {
        self.by_id.get(id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlVisual {
    Playing,
    Paused,
}

/// What a bound control holds on to; handed back on click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickHandle {
    pub id: PlayerId,
    generation: u64,
}

#[derive(Debug, Clone)]
struct Binding {
    generation: u64,
    visual: ControlVisual,
}

#[derive(Debug, Default, Clone)]
pub struct ControlRegistry {
    bindings: BTreeMap<PlayerId, Binding>,
    next_generation: u64,
}

impl ControlRegistry {
    /// Replaces any existing binding for `id` (so a control never has two
    /// live handlers) and puts it in the paused visual state.
    pub fn bind(&mut self, id: &PlayerId) -> ClickHandle {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.bindings.insert(
            id.clone(),
            Binding {
                generation,
                visual: ControlVisual::Paused,
            },
        );
        ClickHandle {
            id: id.clone(),
            generation,
        }
    }

    pub fn retain(&mut self, keep: impl Fn(&PlayerId) -> bool) {
        self.bindings.retain(|id, _| keep(id));
    }

    pub fn is_current(&self, handle: &ClickHandle) -> bool {
        self.bindings
            .get(&handle.id)
            .map(|binding| binding.generation == handle.generation)
            .unwrap_or(false)
    }

    pub fn handle(&self, id: &PlayerId) -> Option<ClickHandle> {
        self.bindings.get(id).map(|binding| ClickHandle {
            id: id.clone(),
            generation: binding.generation,
        })
    }

    pub fn visual(&self, id: &PlayerId) -> Option<ControlVisual> {
        self.bindings.get(id).map(|binding| binding.visual)
    }

    pub fn set_visual(&mut self, id: &PlayerId, visual: ControlVisual) {
        if let Some(binding) = self.bindings.get_mut(id) {
            binding.visual = visual;
        }
    }

    pub fn mark_all_paused(&mut self) {
        for binding in self.bindings.values_mut() {
            binding.visual = ControlVisual::Paused;
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identities_are_stable() {
        let mut ids = IdentityMap::default();
        let intro = ids.assign(&ControlKey::Intro);
        let second = ids.assign(&ControlKey::playlist("episodi", 1));
        assert_eq!(intro.as_str(), "main-player");
        assert_eq!(second.as_str(), "playlist-episodi-song-1");

        assert_eq!(ids.assign(&ControlKey::playlist("episodi", 1)), second);
        assert_eq!(ids.len(), 2);
        assert_eq!(ids.key_for(&second), Some(&ControlKey::playlist("episodi", 1)));
    }

    #[test]
    fn rebinding_invalidates_old_handles() {
        let mut ids = IdentityMap::default();
        let mut registry = ControlRegistry::default();
        let id = ids.assign(&ControlKey::Intro);

        let first = registry.bind(&id);
        registry.set_visual(&id, ControlVisual::Playing);
        let second = registry.bind(&id);

        assert!(!registry.is_current(&first));
        assert!(registry.is_current(&second));
        assert_eq!(registry.visual(&id), Some(ControlVisual::Paused));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn retain_drops_bindings() {
        let mut ids = IdentityMap::default();
        let mut registry = ControlRegistry::default();
        let intro = ids.assign(&ControlKey::Intro);
        let stop = ids.assign(&ControlKey::playlist("episodi", 0));
        let handle = registry.bind(&stop);
        registry.bind(&intro);

        registry.retain(|id| *id == intro);
        assert!(!registry.is_current(&handle));
        assert_eq!(registry.handle(&stop), None);
    }
}
