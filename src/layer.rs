use geojson::{Geometry, Value};
use serde::Serialize;

use crate::config_params::BaseLayerParams;
use crate::render::QuakeMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    /// Only one base layer is shown at a time.
    Base,
    Overlay,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLayer {
    pub style_id: String,
    pub url_template: String,
    pub access_token: String,
    pub attribution: String,
    pub tile_size: u32,
    pub max_zoom: u8,
}

impl TileLayer {
    pub fn from_params(params: &BaseLayerParams, access_token: &str) -> Self {
        TileLayer {
            style_id: params.style_id.clone(),
            url_template: params.url_template.clone(),
            access_token: access_token.to_string(),
            attribution: params.attribution.clone(),
            tile_size: params.tile_size,
            max_zoom: params.max_zoom,
        }
    }

    /// Zoom level to request tiles at for a map shown at `zoom`, or `None`
    /// when the provider has no tiles that deep. Tiles larger than 256px are
    /// requested one level lower per doubling to keep the overlays' scale.
    pub fn request_zoom(&self, zoom: u8) -> Option<u8> {
        let offset = (self.tile_size / 256).trailing_zeros() as u8;
        zoom.checked_sub(offset).filter(|&z| z <= self.max_zoom)
    }
}

/// Circle markers built from the earthquake feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EarthquakeLayer {
    pub markers: Vec<QuakeMarker>,
    /// Features dropped for lack of a point geometry.
    pub skipped: usize,
}

impl EarthquakeLayer {
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub weight: f64,
    /// CSS colour of the stroke.
    pub color: String,
    pub fill_opacity: f64,
}

impl Default for LineStyle {
    fn default() -> Self {
        LineStyle {
            weight: 2.0,
            color: String::from("orange"),
            fill_opacity: 0.0,
        }
    }
}

/// Plate boundaries, all drawn with the same style.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FaultLineLayer {
    pub geometries: Vec<Geometry>,
    pub style: LineStyle,
}

impl FaultLineLayer {
    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    /// Number of drawable line parts (rings and line strings) over all geometries.
    pub fn line_count(&self) -> usize {
        fn count(value: &Value) -> usize {
            match *value {
                Value::LineString(_) => 1,
                Value::MultiLineString(ref lines) | Value::Polygon(ref lines) => lines.len(),
                Value::MultiPolygon(ref polygons) => polygons.iter().map(|p| p.len()).sum(),
                Value::GeometryCollection(ref geometries) => {
                    geometries.iter().map(|g| count(&g.value)).sum()
                }
                Value::Point(_) | Value::MultiPoint(_) => 0,
            }
        }
        self.geometries.iter().map(|g| count(&g.value)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayerContent {
    Tiles(TileLayer),
    Earthquakes(EarthquakeLayer),
    FaultLines(FaultLineLayer),
}

/// A named group that the layer control can show or hide.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapLayer {
    pub name: String,
    pub kind: LayerKind,
    pub visible: bool,
    pub content: LayerContent,
}

impl MapLayer {
    pub fn base(name: &str, tiles: TileLayer, visible: bool) -> Self {
        MapLayer {
            name: name.to_string(),
            kind: LayerKind::Base,
            visible: visible,
            content: LayerContent::Tiles(tiles),
        }
    }

    pub fn overlay(name: &str, content: LayerContent, visible: bool) -> Self {
        MapLayer {
            name: name.to_string(),
            kind: LayerKind::Overlay,
            visible: visible,
            content: content,
        }
    }

    /// Id used for the layer's group in the SVG output.
    pub fn element_id(&self) -> String {
        let slug = self.name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
            .collect::<String>();
        match self.kind {
            LayerKind::Base => format!("base-{}", slug),
            LayerKind::Overlay => slug,
        }
    }
}
