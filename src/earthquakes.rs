use geojson::GeoJson;
use tracing::{info, warn};

use crate::error::Result;
use crate::fetch::{into_features, FeedClient};
use crate::layer::EarthquakeLayer;
use crate::render::{render_marker, EarthquakeFeature};

pub struct EarthquakeLoader;

impl EarthquakeLoader {
    /// Fetches the feed and turns every earthquake into a marker.
    /// Fetch and decode errors are returned as-is.
    pub async fn load(client: &FeedClient, url: &str) -> Result<EarthquakeLayer> {
        let geojson = client.fetch(url).await?;
        let layer = Self::from_geojson(geojson);
        info!(markers = layer.len(), skipped = layer.skipped, "earthquake layer built");
        Ok(layer)
    }

    pub fn from_geojson(geojson: GeoJson) -> EarthquakeLayer {
        let mut layer = EarthquakeLayer::default();
        for feature in into_features(geojson) {
            match EarthquakeFeature::from_feature(&feature) {
                Some(quake) => layer.markers.push(render_marker(&quake)),
                None => {
                    warn!(id = ?feature.id, "earthquake feature without a point geometry");
                    layer.skipped += 1;
                }
            }
        }
        layer
    }
}
