use geojson::GeoJson;
use tracing::info;

use crate::error::Result;
use crate::fetch::{into_features, FeedClient};
use crate::layer::{FaultLineLayer, LineStyle};

pub struct FaultLineLoader;

impl FaultLineLoader {
    pub async fn load(client: &FeedClient, url: &str, style: LineStyle) -> Result<FaultLineLayer> {
        let geojson = client.fetch(url).await?;
        let layer = Self::from_geojson(geojson, style);
        info!(geometries = layer.len(), lines = layer.line_count(), "fault line layer built");
        Ok(layer)
    }

    /// Every geometry gets the same style; points carry no boundary and are dropped.
    pub fn from_geojson(geojson: GeoJson, style: LineStyle) -> FaultLineLayer {
        let geometries = into_features(geojson)
            .into_iter()
            .filter_map(|feature| feature.geometry)
            .filter(|geometry| match geometry.value {
                geojson::Value::Point(_) | geojson::Value::MultiPoint(_) => false,
                _ => true,
            })
            .collect();
        FaultLineLayer {
            geometries: geometries,
            style: style,
        }
    }
}
