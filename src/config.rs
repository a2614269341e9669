//! Site configuration, read from `site-config.json` next to the page.
//! Every field has a default, so partial files and a missing file both work.

use crate::api::{fetch_json, Coordinates};
use dioxus::logger::tracing::info;
use serde::{Deserialize, Serialize};

pub const SITE_CONFIG_PATH: &str = "site-config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub tour_data_path: String,
    pub transcript_base: String,
    pub default_language: String,
    pub supported_languages: Vec<String>,
    pub settling_delay_ms: u32,
    pub precheck_audio: bool,
    pub map: MapConfig,
    pub placeholder_transcript: Option<PlaceholderTranscript>,
    /// Base URL for fetches outside the browser.
    pub host_base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            tour_data_path: "data/tour.json".to_string(),
            transcript_base: "data/transcripts".to_string(),
            default_language: "it".to_string(),
            supported_languages: vec!["it".to_string(), "en".to_string(), "fr".to_string()],
            settling_delay_ms: 500,
            precheck_audio: true,
            map: MapConfig::default(),
            placeholder_transcript: Some(PlaceholderTranscript::default()),
            host_base_url: "http://localhost:8080/".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub default_center: Coordinates,
    pub default_zoom: u8,
    pub highlight_zoom: u8,
    pub tile_url: String,
    pub attribution: String,
    /// Marker labels are always shown in this language.
    pub label_language: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_center: Coordinates {
                latitude: 45.4642,
                longitude: 9.19,
            },
            default_zoom: 15,
            highlight_zoom: 17,
            tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "&copy; OpenStreetMap contributors".to_string(),
            label_language: "it".to_string(),
        }
    }
}

/// Stop whose transcript falls back to literal text when it cannot be fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderTranscript {
    pub stop_id: String,
    pub text: String,
}

impl Default for PlaceholderTranscript {
    fn default() -> Self {
        Self {
            stop_id: "intro".to_string(),
            text: "Trascrizione in arrivo.".to_string(),
        }
    }
}

impl SiteConfig {
    pub fn settling_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(u64::from(self.settling_delay_ms))
    }

    /// Keeps supported languages unique and guarantees the default is in the set.
    pub fn normalized(mut self) -> Self {
        let mut seen = Vec::new();
        for code in self.supported_languages.drain(..) {
            let code = code.trim().to_ascii_lowercase();
            if !code.is_empty() && !seen.contains(&code) {
                seen.push(code);
            }
        }
        self.default_language = self.default_language.trim().to_ascii_lowercase();
        if self.default_language.is_empty() {
            self.default_language = SiteConfig::default().default_language;
        }
        if !seen.contains(&self.default_language) {
            seen.insert(0, self.default_language.clone());
        }
        self.supported_languages = seen;
        self
    }
}

pub async fn load_site_config() -> SiteConfig {
    let defaults = SiteConfig::default();
    match fetch_json::<SiteConfig>(SITE_CONFIG_PATH, &defaults.host_base_url).await {
        Ok(config) => config.normalized(),
        Err(err) => {
            info!("using default site config: {err}");
            defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: SiteConfig =
            serde_json::from_str(r#"{ "default_language": "en", "map": { "default_zoom": 12 } }"#)
                .unwrap();
        assert_eq!(config.default_language, "en");
        assert_eq!(config.map.default_zoom, 12);
        assert_eq!(config.map.highlight_zoom, 17);
        assert_eq!(config.tour_data_path, "data/tour.json");
        assert_eq!(config.settling_delay().as_millis(), 500);
    }

    #[test]
    fn normalized_adds_default_language() {
        let config = SiteConfig {
            default_language: " DE ".to_string(),
            supported_languages: vec!["it".into(), "EN".into(), "it".into(), "".into()],
            ..SiteConfig::default()
        }
        .normalized();
        assert_eq!(config.default_language, "de");
        assert_eq!(config.supported_languages, vec!["de", "it", "en"]);
    }
}
