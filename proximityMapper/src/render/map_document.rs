use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;
use tracing::info;

use crate::config::constants::{DEFAULT_ZOOM_START, ROUTE_OPACITY, ROUTE_WEIGHT, TILE_ATTRIBUTION, TILE_URL};
use crate::models::coordinate::Coordinate;
use crate::utils::logging::{self, FileIOType, OperationCategory};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Layer {
    Marker {
        location: Coordinate,
        tooltip: String,
        color: String,
        icon: String,
    },
    Circle {
        location: Coordinate,
        radius: f64,
        color: String,
        fill: bool,
        fill_opacity: f64,
        tooltip: String,
    },
    Polyline {
        points: Vec<Coordinate>,
        color: String,
        weight: f64,
        opacity: f64,
    },
}

/// A Leaflet map assembled layer by layer and written as one HTML file.
#[derive(Debug, Clone)]
pub struct MapDocument {
    center: Coordinate,
    zoom_start: u8,
    layers: Vec<Layer>,
}

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Proximity map</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
<link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/4.7.0/css/font-awesome.min.css">
<link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/Leaflet.awesome-markers/2.0.2/leaflet.awesome-markers.css">
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<script src="https://cdnjs.cloudflare.com/ajax/libs/Leaflet.awesome-markers/2.0.2/leaflet.awesome-markers.js"></script>
<style>html, body, #map { width: 100%; height: 100%; margin: 0; padding: 0; }</style>
</head>
<body>
<div id="map"></div>
<script>
var map = L.map("map").setView(__CENTER__, __ZOOM__);
L.tileLayer(__TILE_URL__, { attribution: __TILE_ATTRIBUTION__, subdomains: "abcd", maxZoom: 20 }).addTo(map);
var layers = __LAYERS__;
layers.forEach(function (layer) {
  if (layer.kind === "marker") {
    var icon = L.AwesomeMarkers.icon({ icon: layer.icon, prefix: "fa", markerColor: layer.color });
    L.marker(layer.location, { icon: icon }).bindTooltip(layer.tooltip).addTo(map);
  } else if (layer.kind === "circle") {
    L.circle(layer.location, {
      radius: layer.radius, color: layer.color, fill: layer.fill, fillOpacity: layer.fill_opacity
    }).bindTooltip(layer.tooltip).addTo(map);
  } else if (layer.kind === "polyline") {
    L.polyline(layer.points, { color: layer.color, weight: layer.weight, opacity: layer.opacity }).addTo(map);
  }
});
</script>
<!-- generated __GENERATED__ -->
</body>
</html>
"#;

/// JSON for inline `<script>`; `</` would otherwise be able to close the tag.
fn script_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

impl MapDocument {
    pub fn new(center: Coordinate) -> Self {
        Self::with_zoom(center, DEFAULT_ZOOM_START)
    }

    pub fn with_zoom(center: Coordinate, zoom_start: u8) -> Self {
        Self {
            center,
            zoom_start,
            layers: Vec::new(),
        }
    }

    pub fn center(&self) -> Coordinate {
        self.center
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn add_marker(&mut self, location: Coordinate, tooltip: String, color: &str, icon: &str) {
        self.layers.push(Layer::Marker {
            location,
            tooltip,
            color: color.to_string(),
            icon: icon.to_string(),
        });
    }

    pub fn add_proximity_circle(
        &mut self,
        location: Coordinate,
        radius: f64,
        color: &str,
        tooltip: String,
        fill_opacity: Option<f64>,
    ) {
        self.layers.push(Layer::Circle {
            location,
            radius,
            color: color.to_string(),
            fill: fill_opacity.is_some(),
            fill_opacity: fill_opacity.unwrap_or(0.0),
            tooltip,
        });
    }

    /// Paths with fewer than two points are skipped.
    pub fn add_route(&mut self, points: &[Coordinate], color: &str) {
        if points.len() > 1 {
            self.layers.push(Layer::Polyline {
                points: points.to_vec(),
                color: color.to_string(),
                weight: ROUTE_WEIGHT,
                opacity: ROUTE_OPACITY,
            });
        }
    }

    pub fn to_html(&self) -> serde_json::Result<String> {
        Ok(TEMPLATE
            .replace("__CENTER__", &script_json(&self.center)?)
            .replace("__ZOOM__", &self.zoom_start.to_string())
            .replace("__TILE_URL__", &script_json(TILE_URL)?)
            .replace("__TILE_ATTRIBUTION__", &script_json(TILE_ATTRIBUTION)?)
            .replace("__LAYERS__", &script_json(&self.layers)?)
            .replace("__GENERATED__", &Local::now().format("%Y-%m-%d %H:%M:%S").to_string()))
    }

    pub fn save(&self, result_dir: &Path, output_file: &str) -> io::Result<PathBuf> {
        let _timing = logging::start_timing("MapDocument::save",
            OperationCategory::FileIO { subcategory: FileIOType::MapSave });

        fs::create_dir_all(result_dir)?;
        let path = result_dir.join(output_file);
        let html = self.to_html().map_err(io::Error::from)?;
        fs::write(&path, html)?;

        info!(path = %path.display(), layers = self.layers.len(), "map written");
        Ok(path)
    }
}
