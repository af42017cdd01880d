//! Earthquake records and the circle markers drawn for them.

use chrono::{DateTime, Utc};
use geojson::{Feature, JsonObject, Value};
use serde::Serialize;

use crate::classification::{color_for, ColorName};
use crate::viewport::LatLng;

pub const RADIUS_SCALE: f64 = 3.0;

const TIME_FORMAT: &str = "%a %b %d %Y %H:%M:%S UTC";
const UNKNOWN: &str = "unknown";

/// One record of the earthquake feed. Properties stay optional: the feed
/// does not guarantee them, and a missing one only degrades the popup.
#[derive(Debug, Clone, PartialEq)]
pub struct EarthquakeFeature {
    pub id: Option<String>,
    pub place: Option<String>,
    pub time: Option<i64>,
    pub mag: Option<f64>,
    pub longitude: f64,
    pub latitude: f64,
    pub depth: Option<f64>,
}

impl EarthquakeFeature {
    /// Returns `None` when the feature has no point geometry to place.
    pub fn from_feature(feature: &Feature) -> Option<Self> {
        let geometry = feature.geometry.as_ref()?;
        let coordinates = match geometry.value {
            Value::Point(ref point) if point.len() >= 2 => point,
            _ => return None,
        };
        let empty = JsonObject::new();
        let props = feature.properties.as_ref().unwrap_or(&empty);
        let id = match feature.id {
            Some(geojson::feature::Id::String(ref s)) => Some(s.clone()),
            Some(geojson::feature::Id::Number(ref n)) => Some(n.to_string()),
            None => props.get("ids").and_then(|v| v.as_str()).map(|s| s.trim_matches(',').to_string()),
        };
        Some(EarthquakeFeature {
            id: id,
            place: props.get("place").and_then(|v| v.as_str()).map(String::from),
            time: props.get("time").and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|t| t as i64))),
            mag: props.get("mag").and_then(|v| v.as_f64()),
            longitude: coordinates[0],
            latitude: coordinates[1],
            depth: coordinates.get(2).cloned(),
        })
    }

    pub fn magnitude(&self) -> f64 {
        self.mag.unwrap_or(f64::NAN)
    }
}

/// Text shown when a marker is hovered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub title: String,
    pub time: String,
    pub magnitude: String,
}

impl Popup {
    pub fn text(&self) -> String {
        format!("{}\n{}\nMagnitude: {}", self.title, self.time, self.magnitude)
    }

    pub fn html(&self) -> String {
        format!("<h3>{}</h3><hr><p>{}</p><hr><p>Magnitude: {}</p>",
                self.title,
                self.time,
                self.magnitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuakeMarker {
    pub id: Option<String>,
    pub position: LatLng,
    pub magnitude: f64,
    pub radius: f64,
    pub color: ColorName,
    pub fill_opacity: f64,
    /// Kilometres, when the feed gives a third coordinate.
    pub depth: Option<f64>,
    pub popup: Popup,
}

pub fn radius_for(magnitude: f64) -> f64 {
    magnitude * RADIUS_SCALE
}

pub fn format_time(millis: Option<i64>) -> String {
    millis.and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|t| t.format(TIME_FORMAT).to_string())
        .unwrap_or_else(|| String::from(UNKNOWN))
}

pub fn render_marker(quake: &EarthquakeFeature) -> QuakeMarker {
    let magnitude = quake.magnitude();
    QuakeMarker {
        id: quake.id.clone(),
        position: LatLng::new(quake.latitude, quake.longitude),
        magnitude: magnitude,
        radius: radius_for(magnitude),
        color: color_for(magnitude),
        fill_opacity: 1.0,
        depth: quake.depth,
        popup: Popup {
            title: quake.place.clone().unwrap_or_else(|| String::from(UNKNOWN)),
            time: format_time(quake.time),
            magnitude: quake.mag
                .map(|m| m.to_string())
                .unwrap_or_else(|| String::from(UNKNOWN)),
        },
    }
}
