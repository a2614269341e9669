//! Language registry: the supported set, the active (persisted) language and
//! the change fan-out.

mod strings;

pub use strings::{language_label, tr};
use strings::has_table;

use crate::api::TourData;
use crate::config::SiteConfig;
use crate::db::{PreferenceStore, PREFERRED_LANGUAGE_KEY};
use crate::events::{EventBus, TourEvent};
use dioxus::logger::tracing::{info, warn};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LanguageError {
    #[error("language `{0}` is not supported")]
    Unsupported(String),
}

pub struct LanguageRegistry {
    supported: Vec<String>,
    current: String,
    store: Box<dyn PreferenceStore>,
    bus: EventBus,
}

impl LanguageRegistry {
    /// Reads `preferredLanguage`; absent or unsupported values fall back to
    /// the configured default.
    pub fn load(store: Box<dyn PreferenceStore>, config: &SiteConfig, bus: EventBus) -> Self {
        let supported = config.supported_languages.clone();
        let default = config.default_language.clone();
        for code in supported.iter().filter(|code| !has_table(code)) {
            warn!("no UI strings for `{code}`, labels fall back to `{}`", strings::FALLBACK_LANGUAGE);
        }

        let stored = match store.get(PREFERRED_LANGUAGE_KEY) {
            Ok(value) => value,
            Err(err) => {
                warn!("could not read preferred language: {err}");
                None
            }
        };

        let current = match stored.map(|code| normalize_code(&code)) {
            Some(code) if supported.contains(&code) => code,
            Some(code) => {
                warn!("stored language `{code}` is not supported, using `{default}`");
                default
            }
            None => default,
        };

        Self {
            supported,
            current,
            store,
            bus,
        }
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn supported(&self) -> &[String] {
        &self.supported
    }

    pub fn is_supported(&self, code: &str) -> bool {
        self.supported.iter().any(|supported| supported == code)
    }

    /// Activates `code`, persists it and notifies listeners. Returns
    /// `Ok(false)` when `code` is already active.
    pub fn set_language(&mut self, code: &str, tour: Rc<TourData>) -> Result<bool, LanguageError> {
        let code = normalize_code(code);
        if !self.is_supported(&code) {
            return Err(LanguageError::Unsupported(code));
        }
        if code == self.current {
            return Ok(false);
        }

        if let Err(err) = self.store.set(PREFERRED_LANGUAGE_KEY, &code) {
            warn!("could not persist preferred language: {err}");
        }
        info!("language changed {} -> {code}", self.current);
        self.current = code.clone();

        self.bus.publish(TourEvent::LanguageChanged { code, tour });
        Ok(true)
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryPreferenceStore;
    use std::cell::RefCell;

    fn registry_with(stored: Option<&str>) -> (LanguageRegistry, EventBus) {
        let store = match stored {
            Some(code) => MemoryPreferenceStore::with(PREFERRED_LANGUAGE_KEY, code),
            None => MemoryPreferenceStore::default(),
        };
        let bus = EventBus::new();
        let registry = LanguageRegistry::load(Box::new(store), &SiteConfig::default(), bus.clone());
        (registry, bus)
    }

    #[test]
    fn defaults_when_nothing_stored() {
        let (registry, _) = registry_with(None);
        assert_eq!(registry.current(), "it");
    }

    #[test]
    fn restores_stored_language() {
        let (registry, _) = registry_with(Some("EN"));
        assert_eq!(registry.current(), "en");
        assert_eq!(tr(registry.current(), "nav.map"), "Map");
    }

    #[test]
    fn unsupported_stored_language_falls_back() {
        let (registry, _) = registry_with(Some("zz"));
        assert_eq!(registry.current(), "it");
    }

    #[test]
    fn change_persists_and_publishes() {
        let (mut registry, bus) = registry_with(None);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        bus.subscribe(move |event| {
            if let TourEvent::LanguageChanged { code, .. } = event {
                log.borrow_mut().push(code.clone());
            }
        });

        let tour = Rc::new(TourData::default());
        assert_eq!(registry.set_language("en", tour.clone()), Ok(true));
        assert_eq!(registry.set_language("en", tour.clone()), Ok(false));
        assert_eq!(
            registry.set_language("de", tour),
            Err(LanguageError::Unsupported("de".to_string()))
        );

        assert_eq!(registry.current(), "en");
        assert_eq!(*seen.borrow(), vec!["en".to_string()]);
        assert_eq!(
            registry.store.get(PREFERRED_LANGUAGE_KEY).unwrap().as_deref(),
            Some("en")
        );
    }
}
