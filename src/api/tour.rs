use super::fetch::{fetch_json, FetchError};
use super::models::*;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TourDataError {
    #[error("tour data unavailable: {0}")]
    Fetch(#[from] FetchError),

    #[error("language `{0}` is not present in the tour data")]
    MissingLanguage(String),
}

impl TourData {
    pub fn content(&self, lang: &str) -> Result<&LanguageContent, TourDataError> {
        self.content
            .get(lang)
            .ok_or_else(|| TourDataError::MissingLanguage(lang.to_string()))
    }

    pub fn languages(&self) -> Vec<String> {
        self.content.keys().cloned().collect()
    }

    pub fn has_language(&self, lang: &str) -> bool {
        self.content.contains_key(lang)
    }

    /// Localized stops joined with static data by position.
    pub fn stops(&self, lang: &str) -> Result<Vec<StopView<'_>>, TourDataError> {
        let content = self.content(lang)?;
        let mut located: Vec<&StaticStop> = self.static_data.stops.iter().collect();
        located.sort_by_key(|stop| stop.order);

        Ok(content
            .stops
            .iter()
            .enumerate()
            .map(|(index, stop)| StopView {
                index,
                content: stop,
                location: located.get(index).copied(),
            })
            .collect())
    }
}

pub async fn load_tour(path: &str, host_base: &str) -> Result<TourData, TourDataError> {
    let document: TourDocument = fetch_json(path, host_base).await?;
    Ok(document.tour)
}

pub async fn load_transcript(path: &str, host_base: &str) -> Result<Transcript, FetchError> {
    fetch_json(path, host_base).await
}
