//! Defines the shared application view state.

use crate::i18n::tr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TourView {
    Home,
    Map,
}

impl TourView {
    pub const ALL: [TourView; 2] = [TourView::Home, TourView::Map];

    pub fn icon(self) -> &'static str {
        match self {
            TourView::Home => "home",
            TourView::Map => "map",
        }
    }

    fn label_key(self) -> &'static str {
        match self {
            TourView::Home => "nav.home",
            TourView::Map => "nav.map",
        }
    }

    pub fn label(self, lang: &str) -> String {
        tr(lang, self.label_key())
    }
}
