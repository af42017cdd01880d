//! Web Mercator placement of geographic coordinates into the output viewport,
//! and the slippy-map tiles needed to cover it.

use std::collections::HashMap;
use std::f64::consts::PI;

use serde::Serialize;

/// Latitudes beyond this are outside the square Web Mercator world.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        LatLng { lat: lat, lng: lng }
    }
}

/// One tile of a base layer, with its top-left corner in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePlacement {
    pub z: u8,
    /// Column wrapped into `0..2^z`, as the tile server expects it.
    pub x: u32,
    pub y: u32,
    pub left: f64,
    pub top: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub center: LatLng,
    pub zoom: u8,
    pub tile_size: u32,
    origin: (f64, f64),
}

impl Viewport {
    pub fn new(width: u32, height: u32, center: LatLng, zoom: u8, tile_size: u32) -> Self {
        let mut viewport = Viewport {
            width: width,
            height: height,
            center: center,
            zoom: zoom,
            tile_size: tile_size,
            origin: (0.0, 0.0),
        };
        let (cx, cy) = viewport.world_pixel(center);
        viewport.origin = (cx - width as f64 / 2.0, cy - height as f64 / 2.0);
        viewport
    }

    /// Side of the whole world in pixels at the current zoom.
    pub fn world_size(&self) -> f64 {
        self.tile_size as f64 * 2f64.powi(self.zoom as i32)
    }

    fn world_pixel(&self, point: LatLng) -> (f64, f64) {
        let size = self.world_size();
        let lat = point.lat.max(-MAX_LATITUDE).min(MAX_LATITUDE).to_radians();
        let x = (point.lng + 180.0) / 360.0 * size;
        let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
        (x, y)
    }

    /// Viewport pixel of a geographic point. Points outside the view get
    /// coordinates outside `0..width` / `0..height`.
    pub fn project(&self, point: LatLng) -> (f64, f64) {
        let (x, y) = self.world_pixel(point);
        (x - self.origin.0, y - self.origin.1)
    }

    /// Same as `project` for a GeoJSON `[lon, lat, ...]` position.
    pub fn project_position(&self, position: &[f64]) -> Option<(f64, f64)> {
        if position.len() < 2 {
            return None;
        }
        Some(self.project(LatLng::new(position[1], position[0])))
    }

    /// Tiles intersecting the viewport, row by row.
    pub fn visible_tiles(&self) -> Vec<TilePlacement> {
        let size = self.tile_size as f64;
        let n = 1i64 << self.zoom;
        let first_col = (self.origin.0 / size).floor() as i64;
        let last_col = ((self.origin.0 + self.width as f64) / size).ceil() as i64 - 1;
        let first_row = ((self.origin.1 / size).floor() as i64).max(0);
        let last_row = (((self.origin.1 + self.height as f64) / size).ceil() as i64 - 1).min(n - 1);

        let mut tiles = Vec::new();
        for row in first_row..=last_row {
            for col in first_col..=last_col {
                tiles.push(TilePlacement {
                    z: self.zoom,
                    x: col.rem_euclid(n) as u32,
                    y: row as u32,
                    left: col as f64 * size - self.origin.0,
                    top: row as f64 * size - self.origin.1,
                });
            }
        }
        tiles
    }
}

/// Substitute `{key}` placeholders of a tile URL template.
pub fn tile_url(template: &str, style_id: &str, access_token: &str, tile: &TilePlacement) -> String {
    let mut values: HashMap<&str, String> = HashMap::new();
    values.insert("id", style_id.to_string());
    values.insert("accessToken", access_token.to_string());
    values.insert("z", tile.z.to_string());
    values.insert("x", tile.x.to_string());
    values.insert("y", tile.y.to_string());
    values.insert("s", String::from("a"));
    values.insert("r", String::new());

    let mut url = template.to_string();
    for (key, value) in &values {
        url = url.replace(&format!("{{{}}}", key), value);
    }
    url
}
