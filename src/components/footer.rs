// Footer fragment. Injected once per page; every text node is keyed so a
// language change can retranslate it in place.
use crate::api::TourData;
use crate::i18n::tr;
use chrono::Datelike;
use dioxus::prelude::*;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FooterSlot {
    TourTitle,
    Credits,
    Copyright,
    Contact,
}

const TEMPLATE: [FooterSlot; 4] = [
    FooterSlot::TourTitle,
    FooterSlot::Credits,
    FooterSlot::Copyright,
    FooterSlot::Contact,
];

#[derive(Debug, Clone, PartialEq)]
pub struct FooterText {
    pub slot: FooterSlot,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FooterError {
    #[error("footer already injected on this page")]
    AlreadyInjected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FooterInjector {
    lang: String,
    year: i32,
    titles: BTreeMap<String, String>,
    nodes: Vec<FooterText>,
    injected: bool,
}

pub fn current_year() -> i32 {
    chrono::Utc::now().year()
}

impl FooterInjector {
    pub fn new(lang: &str, year: i32) -> Self {
        Self {
            lang: lang.to_string(),
            year,
            titles: BTreeMap::new(),
            nodes: Vec::new(),
            injected: false,
        }
    }

    pub fn set_titles(&mut self, tour: &TourData) {
        self.titles = tour
            .content
            .iter()
            .map(|(code, content)| (code.clone(), content.title.clone()))
            .collect();
        if self.injected {
            self.render();
        }
    }

    fn text_for(&self, slot: FooterSlot) -> String {
        match slot {
            FooterSlot::TourTitle => self.titles.get(&self.lang).cloned().unwrap_or_default(),
            FooterSlot::Credits => tr(&self.lang, "footer.credits").to_string(),
            FooterSlot::Copyright => {
                format!("© {} · {}", self.year, tr(&self.lang, "footer.rights"))
            }
            FooterSlot::Contact => tr(&self.lang, "footer.contact").to_string(),
        }
    }

    fn render(&mut self) {
        self.nodes = TEMPLATE
            .iter()
            .map(|&slot| FooterText {
                slot,
                text: self.text_for(slot),
            })
            .collect();
    }

    pub fn inject(&mut self) -> Result<&[FooterText], FooterError> {
        if self.injected {
            return Err(FooterError::AlreadyInjected);
        }
        self.injected = true;
        self.render();
        Ok(&self.nodes)
    }

    pub fn is_injected(&self) -> bool {
        self.injected
    }

    pub fn nodes(&self) -> &[FooterText] {
        &self.nodes
    }

    pub fn refresh_language(&mut self, code: &str) {
        self.lang = code.to_string();
        if self.injected {
            for index in 0..self.nodes.len() {
                let text = self.text_for(self.nodes[index].slot);
                self.nodes[index].text = text;
            }
        }
    }
}

#[component]
pub fn Footer() -> Element {
    let footer = use_context::<Signal<FooterInjector>>();
    let footer = footer.read();
    if !footer.is_injected() {
        return rsx! {};
    }

    rsx! {
        footer { class: "tour-footer",
            for node in footer.nodes().iter().filter(|node| !node.text.is_empty()) {
                span {
                    class: "tour-footer-item",
                    "data-footer-slot": "{node.slot:?}",
                    "{node.text}"
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tour::fixtures::tour;

    fn text(footer: &FooterInjector, slot: FooterSlot) -> &str {
        footer
            .nodes()
            .iter()
            .find(|node| node.slot == slot)
            .map(|node| node.text.as_str())
            .unwrap_or_default()
    }

    #[test]
    fn injects_once() {
        let mut footer = FooterInjector::new("it", 2026);
        footer.set_titles(&tour());
        assert_eq!(footer.inject().map(|nodes| nodes.len()), Ok(4));
        assert_eq!(footer.inject(), Err(FooterError::AlreadyInjected));
        assert_eq!(text(&footer, FooterSlot::TourTitle), "Centro Storico");
        assert!(text(&footer, FooterSlot::Copyright).starts_with("© 2026"));
    }

    #[test]
    fn refresh_retranslates_nodes() {
        let mut footer = FooterInjector::new("it", 2026);
        footer.set_titles(&tour());
        footer.inject().unwrap();
        footer.refresh_language("en");

        assert_eq!(text(&footer, FooterSlot::TourTitle), "Old Town");
        assert_eq!(text(&footer, FooterSlot::Contact), "Contact");
        assert_eq!(text(&footer, FooterSlot::Copyright), "© 2026 · All rights reserved");
    }

    #[test]
    fn refresh_before_inject_only_records_language() {
        let mut footer = FooterInjector::new("it", 2026);
        footer.refresh_language("fr");
        assert!(footer.nodes().is_empty());
        footer.inject().unwrap();
        assert_eq!(text(&footer, FooterSlot::Credits), "Audioguide réalisé par le comité de quartier");
    }
}
