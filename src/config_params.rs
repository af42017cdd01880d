//! Map configuration, read from a TOML file.
//!
//! Every key is optional. A missing file section falls back to the values of
//! the original web map: USGS "all day" feed, PB2002 plate boundaries, three
//! Mapbox styles and a view centred on the continental US at zoom 5.
//!
//! ```toml
//! [map]
//! width = 1280
//! height = 800
//! center = [37.09, -95.71]
//! zoom = 5
//! output = "earthquakes.svg"
//!
//! [feeds]
//! earthquakes = "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_week.geojson"
//!
//! [tiles]
//! access_token = "pk.xxx"
//!
//! [overlays]
//! show_fault_lines = true
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const EARTHQUAKES_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_day.geojson";
pub const PLATES_URL: &str =
    "https://raw.githubusercontent.com/fraxen/tectonicplates/master/GeoJSON/PB2002_plates.json";
pub const MAPBOX_TEMPLATE: &str =
    "https://api.mapbox.com/styles/v1/{id}/tiles/{z}/{x}/{y}?access_token={accessToken}";
pub const ACCESS_TOKEN_VAR: &str = "QUAKEMAP_ACCESS_TOKEN";

const MAPBOX_ATTRIBUTION: &str = "© Mapbox © OpenStreetMap contributors";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub map: MapParams,
    pub feeds: FeedParams,
    pub tiles: TileParams,
    pub overlays: OverlayParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapParams {
    pub width: u32,
    pub height: u32,
    /// Latitude, longitude.
    pub center: [f64; 2],
    pub zoom: u8,
    pub output: String,
    pub background: Option<String>,
    pub title: Option<String>,
}

impl Default for MapParams {
    fn default() -> Self {
        MapParams {
            width: 1280,
            height: 800,
            center: [37.09, -95.71],
            zoom: 5,
            output: String::from("earthquakes.svg"),
            background: Some(String::from("#ddd")),
            title: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedParams {
    pub earthquakes: String,
    pub plates: String,
    pub timeout_secs: Option<u64>,
}

impl Default for FeedParams {
    fn default() -> Self {
        FeedParams {
            earthquakes: String::from(EARTHQUAKES_URL),
            plates: String::from(PLATES_URL),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TileParams {
    pub access_token: Option<String>,
    /// Name of the base layer selected when the map opens.
    pub active: String,
    pub base: Vec<BaseLayerParams>,
}

impl Default for TileParams {
    fn default() -> Self {
        TileParams {
            access_token: None,
            active: String::from("Satellite"),
            base: vec![BaseLayerParams::mapbox("Satellite", "mapbox/satellite-streets-v11"),
                       BaseLayerParams::mapbox("Grayscale", "mapbox/light-v10"),
                       BaseLayerParams::mapbox("Outdoors", "mapbox/outdoors-v10")],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseLayerParams {
    pub name: String,
    pub style_id: String,
    #[serde(default = "default_template")]
    pub url_template: String,
    #[serde(default = "default_attribution")]
    pub attribution: String,
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,
    #[serde(default = "default_max_zoom")]
    pub max_zoom: u8,
}

fn default_template() -> String {
    String::from(MAPBOX_TEMPLATE)
}

fn default_attribution() -> String {
    String::from(MAPBOX_ATTRIBUTION)
}

fn default_tile_size() -> u32 {
    256
}

fn default_max_zoom() -> u8 {
    18
}

impl BaseLayerParams {
    fn mapbox(name: &str, style_id: &str) -> Self {
        BaseLayerParams {
            name: name.to_string(),
            style_id: style_id.to_string(),
            url_template: default_template(),
            attribution: default_attribution(),
            tile_size: default_tile_size(),
            max_zoom: default_max_zoom(),
        }
    }

    /// Zoom level the tile request is shifted down by: one per doubling of
    /// the tile size over 256px.
    fn zoom_offset(&self) -> u8 {
        (self.tile_size / 256).trailing_zeros() as u8
    }

    /// Highest map zoom at which this layer still has tiles to draw.
    pub fn max_view_zoom(&self) -> u8 {
        self.max_zoom.saturating_add(self.zoom_offset())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayParams {
    pub show_earthquakes: bool,
    pub show_fault_lines: bool,
    /// Any CSS colour.
    pub fault_line_color: String,
    pub fault_line_weight: f64,
}

impl Default for OverlayParams {
    fn default() -> Self {
        OverlayParams {
            show_earthquakes: true,
            show_fault_lines: false,
            fault_line_color: String::from("orange"),
            fault_line_weight: 2.0,
        }
    }
}

impl MapConfig {
    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: MapConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        Self::from_toml(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.map.width == 0 || self.map.height == 0 {
            return Err(Error::Config(String::from("map width and height must be positive")));
        }
        let [lat, lng] = self.map.center;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(Error::Config(format!("map center out of range: [{}, {}]", lat, lng)));
        }
        if self.map.zoom > 22 {
            return Err(Error::Config(format!("zoom {} is above 22", self.map.zoom)));
        }
        if self.tiles.base.is_empty() {
            return Err(Error::Config(String::from("at least one base layer is required")));
        }
        if !self.tiles.base.iter().any(|b| b.name == self.tiles.active) {
            return Err(Error::Config(format!("active base layer \"{}\" is not defined",
                                             self.tiles.active)));
        }
        if let Some(b) = self.tiles.base.iter().find(|b| b.tile_size < 256 || !b.tile_size.is_power_of_two()) {
            return Err(Error::Config(format!("tile_size {} of \"{}\" must be 256, 512 or a larger power of two",
                                             b.tile_size,
                                             b.name)));
        }
        let reachable = self.tiles
            .base
            .iter()
            .map(BaseLayerParams::max_view_zoom)
            .max()
            .unwrap_or(0);
        if self.map.zoom > reachable {
            return Err(Error::Config(format!("zoom {} is above the highest tile zoom {}",
                                             self.map.zoom,
                                             reachable)));
        }
        if self.overlays.fault_line_color.trim().is_empty() {
            return Err(Error::Config(String::from("fault_line_color must not be empty")));
        }
        Ok(())
    }

    /// Access token from the file, or from the environment when the file has none.
    pub fn access_token(&self) -> String {
        self.tiles
            .access_token
            .clone()
            .or_else(|| std::env::var(ACCESS_TOKEN_VAR).ok())
            .unwrap_or_default()
    }
}
