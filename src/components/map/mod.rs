//! Map controller: markers for every tour stop, one highlighted stop at a
//! time, and the sidebar panel mirroring the selection. Tile rendering is
//! left to the map widget (see `widget`).

mod widget;

pub use widget::*;

use crate::api::{Coordinates, TourData};
use crate::config::MapConfig;
use dioxus::logger::tracing::warn;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MapError {
    #[error("no stop with id `{0}` on the map")]
    UnknownStop(String),

    #[error("map widget unavailable: {0}")]
    WidgetUnavailable(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub id: String,
    pub title: String,
    pub position: Coordinates,
    pub icon: Option<String>,
    pub order: u32,
    pub google_maps_url: Option<String>,
    pub image_path: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    fn extend(&mut self, point: Coordinates) {
        self.south = self.south.min(point.latitude);
        self.north = self.north.max(point.latitude);
        self.west = self.west.min(point.longitude);
        self.east = self.east.max(point.longitude);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewTarget {
    Focus { center: Coordinates, zoom: u8 },
    Fit { bounds: Bounds },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SidebarPanel {
    pub stop_id: String,
    pub order: u32,
    pub title: String,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub google_maps_url: Option<String>,
}

/// Everything the widget needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSnapshot {
    pub markers: Vec<MapMarker>,
    pub highlighted: Option<String>,
    pub target: ViewTarget,
    pub animate: bool,
    pub view_revision: u64,
    pub tile_url: String,
    pub attribution: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapController {
    config: MapConfig,
    markers: Vec<MapMarker>,
    highlighted: Option<String>,
    panel: Option<SidebarPanel>,
    target: ViewTarget,
    animate: bool,
    view_revision: u64,
}

impl MapController {
    pub fn new(config: MapConfig) -> Self {
        let target = ViewTarget::Focus {
            center: config.default_center,
            zoom: config.default_zoom,
        };
        Self {
            config,
            markers: Vec::new(),
            highlighted: None,
            panel: None,
            target,
            animate: false,
            view_revision: 0,
        }
    }

    /// Builds markers from the static stop data, labelled in the configured
    /// label language, then fits the view to them.
    pub fn render_markers(&mut self, tour: &TourData) -> usize {
        let label_lang = if tour.has_language(&self.config.label_language) {
            self.config.label_language.clone()
        } else {
            let fallback = tour.languages().into_iter().next().unwrap_or_default();
            warn!(
                "map label language `{}` missing, using `{fallback}`",
                self.config.label_language
            );
            fallback
        };

        let mut labels: HashMap<String, (String, Option<String>)> = HashMap::new();
        if let Ok(stops) = tour.stops(&label_lang) {
            for stop in stops {
                labels.insert(
                    stop.stop_id(),
                    (stop.content.title.clone(), stop.content.description.clone()),
                );
            }
        }

        let mut markers: Vec<MapMarker> = tour
            .static_data
            .stops
            .iter()
            .map(|stop| {
                let (title, description) = labels
                    .get(&stop.id)
                    .cloned()
                    .unwrap_or_else(|| (stop.id.clone(), None));
                MapMarker {
                    id: stop.id.clone(),
                    title,
                    position: stop.coordinates,
                    icon: stop.icon.clone(),
                    order: stop.order,
                    google_maps_url: stop.google_maps_url.clone(),
                    image_path: stop.image_path.clone(),
                    description,
                }
            })
            .collect();
        markers.sort_by_key(|marker| marker.order);

        self.markers = markers;
        self.animate = false;
        self.reset_view();
        self.markers.len()
    }

    pub fn markers(&self) -> &[MapMarker] {
        &self.markers
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.highlighted.as_deref()
    }

    pub fn panel(&self) -> Option<&SidebarPanel> {
        self.panel.as_ref()
    }

    #[cfg(test)]
    pub fn target(&self) -> &ViewTarget {
        &self.target
    }

    fn marker(&self, id: &str) -> Result<&MapMarker, MapError> {
        self.markers
            .iter()
            .find(|marker| marker.id == id)
            .ok_or_else(|| MapError::UnknownStop(id.to_string()))
    }

    fn panel_for(marker: &MapMarker) -> SidebarPanel {
        SidebarPanel {
            stop_id: marker.id.clone(),
            order: marker.order,
            title: marker.title.clone(),
            description: marker.description.clone(),
            image_path: marker.image_path.clone(),
            google_maps_url: marker.google_maps_url.clone(),
        }
    }

    /// Highlights a stop and centers on it.
    pub fn highlight_stop(&mut self, id: &str, animate: bool) -> Result<(), MapError> {
        let marker = self.marker(id)?;
        let center = marker.position;
        let panel = Self::panel_for(marker);

        self.highlighted = Some(id.to_string());
        self.panel = Some(panel);
        self.target = ViewTarget::Focus {
            center,
            zoom: self.config.highlight_zoom,
        };
        self.animate = animate;
        self.view_revision += 1;
        Ok(())
    }

    /// Marker click: highlight and mirror into the sidebar, view unchanged.
    pub fn select_marker(&mut self, id: &str) -> Result<&SidebarPanel, MapError> {
        let panel = Self::panel_for(self.marker(id)?);
        self.highlighted = Some(id.to_string());
        Ok(self.panel.insert(panel))
    }

    pub fn reset_view(&mut self) {
        self.highlighted = None;
        self.panel = None;
        self.target = match self.bounds() {
            Some(bounds) => ViewTarget::Fit { bounds },
            None => ViewTarget::Focus {
                center: self.config.default_center,
                zoom: self.config.default_zoom,
            },
        };
        self.view_revision += 1;
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let first = self.markers.first()?.position;
        let mut bounds = Bounds {
            south: first.latitude,
            north: first.latitude,
            west: first.longitude,
            east: first.longitude,
        };
        for marker in &self.markers[1..] {
            bounds.extend(marker.position);
        }
        Some(bounds)
    }

    pub fn snapshot(&self) -> MapSnapshot {
        MapSnapshot {
            markers: self.markers.clone(),
            highlighted: self.highlighted.clone(),
            target: self.target.clone(),
            animate: self.animate,
            view_revision: self.view_revision,
            tile_url: self.config.tile_url.clone(),
            attribution: self.config.attribution.clone(),
        }
    }
}
