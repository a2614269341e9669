// Per-container transcript state. A container fetches once, on its first
// expand; later toggles reuse the loaded transcript. Failed loads retry on
// the next expand.
use crate::api::{join_path, FetchError, Transcript};
use crate::config::PlaceholderTranscript;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    NotLoaded,
    Loading,
    Loaded(Transcript),
    /// Inline error naming the path that was attempted.
    Failed { path: String, message: String },
    Placeholder(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptEntry {
    pub expanded: bool,
    pub load: LoadState,
}

impl Default for TranscriptEntry {
    fn default() -> Self {
        Self {
            expanded: false,
            load: LoadState::NotLoaded,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Expanded,
    Collapsed,
    NeedsFetch(String),
}

pub fn transcript_path(base: &str, lang: &str, stop_id: &str) -> String {
    join_path(base, &[lang, &format!("{stop_id}.json")])
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptLoader {
    base: String,
    lang: String,
    placeholder: Option<PlaceholderTranscript>,
    entries: HashMap<String, TranscriptEntry>,
}

impl TranscriptLoader {
    pub fn new(base: &str, lang: &str, placeholder: Option<PlaceholderTranscript>) -> Self {
        Self {
            base: base.to_string(),
            lang: lang.to_string(),
            placeholder,
            entries: HashMap::new(),
        }
    }

    pub fn path_for(&self, id: &str) -> String {
        transcript_path(&self.base, &self.lang, id)
    }

    pub fn entry(&self, id: &str) -> Option<&TranscriptEntry> {
        self.entries.get(id)
    }

    pub fn toggle(&mut self, id: &str) -> ToggleOutcome {
        let path = self.path_for(id);
        let entry = self.entries.entry(id.to_string()).or_default();
        if entry.expanded {
            entry.expanded = false;
            return ToggleOutcome::Collapsed;
        }

        entry.expanded = true;
        if matches!(entry.load, LoadState::NotLoaded | LoadState::Failed { .. }) {
            entry.load = LoadState::Loading;
            ToggleOutcome::NeedsFetch(path)
        } else {
            ToggleOutcome::Expanded
        }
    }

    pub fn finish_load(&mut self, id: &str, result: Result<Transcript, FetchError>) {
        let path = self.path_for(id);
        let placeholder = self
            .placeholder
            .as_ref()
            .filter(|placeholder| placeholder.stop_id == id)
            .map(|placeholder| placeholder.text.clone());
        let entry = self.entries.entry(id.to_string()).or_default();

        entry.load = match (result, placeholder) {
            (Ok(transcript), _) => LoadState::Loaded(transcript),
            (Err(_), Some(text)) => LoadState::Placeholder(text),
            (Err(err), None) => LoadState::Failed {
                path,
                message: err.to_string(),
            },
        };
    }

    /// Transcript paths are per language: drop everything loaded so far.
    pub fn reset_language(&mut self, lang: &str) {
        self.lang = lang.to_string();
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader() -> TranscriptLoader {
        TranscriptLoader::new(
            "data/transcripts",
            "it",
            Some(PlaceholderTranscript {
                stop_id: "intro".into(),
                text: "In arrivo".into(),
            }),
        )
    }

    fn transcript() -> Transcript {
        serde_json::from_str(r#"{ "paragraphs": ["Uno", "Due"], "metadata": { "title": "Piazza" } }"#)
            .unwrap()
    }

    fn not_found(path: &str) -> FetchError {
        FetchError::Status {
            url: path.to_string(),
            status: 404,
        }
    }

    #[test]
    fn fetches_only_on_first_expand() {
        let mut loader = loader();
        assert_eq!(
            loader.toggle("piazza"),
            ToggleOutcome::NeedsFetch("data/transcripts/it/piazza.json".into())
        );
        loader.finish_load("piazza", Ok(transcript()));

        assert_eq!(loader.toggle("piazza"), ToggleOutcome::Collapsed);
        assert_eq!(loader.toggle("piazza"), ToggleOutcome::Expanded);
        assert!(matches!(
            loader.entry("piazza").map(|entry| &entry.load),
            Some(LoadState::Loaded(t)) if t.paragraphs.len() == 2
        ));
    }

    #[test]
    fn failure_names_the_path_and_retries() {
        let mut loader = loader();
        loader.toggle("duomo");
        loader.finish_load("duomo", Err(not_found("data/transcripts/it/duomo.json")));

        match &loader.entry("duomo").unwrap().load {
            LoadState::Failed { path, .. } => assert_eq!(path, "data/transcripts/it/duomo.json"),
            other => panic!("unexpected state {other:?}"),
        }
        loader.toggle("duomo");
        assert!(matches!(loader.toggle("duomo"), ToggleOutcome::NeedsFetch(_)));
    }

    #[test]
    fn placeholder_stop_gets_literal_text() {
        let mut loader = loader();
        loader.toggle("intro");
        loader.finish_load("intro", Err(not_found("x")));
        assert_eq!(
            loader.entry("intro").unwrap().load,
            LoadState::Placeholder("In arrivo".into())
        );
    }

    #[test]
    fn language_reset_clears_cache() {
        let mut loader = loader();
        loader.toggle("piazza");
        loader.finish_load("piazza", Ok(transcript()));
        loader.reset_language("en");

        assert!(!loader.entry("piazza").is_some_and(|entry| entry.expanded));
        assert_eq!(
            loader.toggle("piazza"),
            ToggleOutcome::NeedsFetch("data/transcripts/en/piazza.json".into())
        );
    }
}
