use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level tour document (`data/tour.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourDocument {
    pub tour: TourData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TourData {
    #[serde(default)]
    pub content: BTreeMap<String, LanguageContent>,
    #[serde(default, alias = "staticData")]
    pub static_data: StaticData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LanguageContent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub introduction: Introduction,
    #[serde(default)]
    pub stops: Vec<StopContent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Introduction {
    #[serde(default, alias = "audioPath")]
    pub audio_path: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StopContent {
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "audioPath")]
    pub audio_path: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: Option<StopDuration>,
}

/// Durations show up both as seconds and as preformatted text ("4:30").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StopDuration {
    Seconds(u32),
    Text(String),
}

impl StopDuration {
    pub fn label(&self) -> String {
        match self {
            Self::Seconds(seconds) => format_duration(*seconds),
            Self::Text(text) => text.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StaticData {
    #[serde(default)]
    pub stops: Vec<StaticStop>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticStop {
    pub id: String,
    pub coordinates: Coordinates,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub order: u32,
    #[serde(default, alias = "googleMapsUrl")]
    pub google_maps_url: Option<String>,
    #[serde(default, alias = "imagePath")]
    pub image_path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Localized stop joined with its static (language independent) data.
#[derive(Debug, Clone, PartialEq)]
pub struct StopView<'a> {
    pub index: usize,
    pub content: &'a StopContent,
    pub location: Option<&'a StaticStop>,
}

impl<'a> StopView<'a> {
    /// Container id used for transcripts and map markers. Falls back to the
    /// 1-based position when the static data has no entry for this stop.
    pub fn stop_id(&self) -> String {
        self.location
            .map(|stop| stop.id.clone())
            .unwrap_or_else(|| (self.index + 1).to_string())
    }
}

/// Per-stop transcript document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Transcript {
    #[serde(default)]
    pub paragraphs: Vec<String>,
    #[serde(default)]
    pub metadata: Option<TranscriptMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TranscriptMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub duration: Option<StopDuration>,
}

pub fn format_duration(seconds: u32) -> String {
    let mins = seconds / 60;
    let secs = seconds % 60;
    format!("{}:{:02}", mins, secs)
}
