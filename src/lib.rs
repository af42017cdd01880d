//! Recent earthquakes and tectonic plate boundaries on one map.
//!
//! Two GeoJSON feeds are fetched concurrently, earthquakes become circle
//! markers coloured by magnitude, plate boundaries become orange lines, and
//! both are composed with three base tile layers, a layer control and a
//! legend into a [`MapView`](compose::MapView) that can be written as an
//! interactive SVG or as JSON.

pub mod classification;
pub mod compose;
pub mod config_params;
pub mod document;
pub mod earthquakes;
pub mod error;
pub mod faults;
pub mod fetch;
pub mod layer;
pub mod legend;
pub mod render;
pub mod viewport;

use std::time::Duration;

use tracing::warn;

use crate::compose::{compose, MapView};
use crate::config_params::MapConfig;
use crate::earthquakes::EarthquakeLoader;
use crate::error::Result;
use crate::faults::FaultLineLoader;
use crate::fetch::FeedClient;
use crate::layer::{FaultLineLayer, LineStyle};

/// Fetches both feeds at once and composes the map when both are done.
///
/// A failed earthquake feed is an error. A failed plate feed only leaves the
/// fault line overlay empty.
pub async fn build_map(config: &MapConfig) -> Result<MapView> {
    let client = FeedClient::new(config.feeds.timeout_secs.map(Duration::from_secs))?;
    let style = LineStyle {
        weight: config.overlays.fault_line_weight,
        color: config.overlays.fault_line_color.clone(),
        fill_opacity: 0.0,
    };

    let (earthquakes, faults) = tokio::join!(
        EarthquakeLoader::load(&client, &config.feeds.earthquakes),
        FaultLineLoader::load(&client, &config.feeds.plates, style.clone())
    );

    let earthquakes = earthquakes?;
    let faults = faults.unwrap_or_else(|err| {
        warn!(source = %config.feeds.plates, "fault lines unavailable: {}", err);
        FaultLineLayer {
            geometries: Vec::new(),
            style: style,
        }
    });
    Ok(compose(earthquakes, faults, config))
}
