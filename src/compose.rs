use serde::Serialize;
use tracing::debug;

use crate::config_params::MapConfig;
use crate::layer::{EarthquakeLayer, FaultLineLayer, LayerContent, LayerKind, MapLayer, TileLayer};
use crate::legend::{Corner, Legend};
use crate::viewport::LatLng;

pub const HOST_ELEMENT_ID: &str = "map";
pub const EARTHQUAKES_NAME: &str = "Earthquakes";
pub const FAULT_LINES_NAME: &str = "Fault Lines";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerControl {
    pub collapsed: bool,
    pub position: Corner,
    /// Radio choices, in display order.
    pub base: Vec<String>,
    /// Checkboxes, in display order.
    pub overlays: Vec<String>,
}

/// Everything needed to draw the map, built once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub element_id: String,
    pub width: u32,
    pub height: u32,
    pub center: LatLng,
    pub zoom: u8,
    pub background: Option<String>,
    pub title: Option<String>,
    pub base_layers: Vec<MapLayer>,
    pub overlays: Vec<MapLayer>,
    pub control: LayerControl,
    pub legend: Legend,
}

impl MapView {
    pub fn active_base(&self) -> Option<&MapLayer> {
        self.base_layers.iter().find(|l| l.visible)
    }

    pub fn overlay(&self, name: &str) -> Option<&MapLayer> {
        self.overlays.iter().find(|l| l.name == name)
    }

    pub fn earthquakes(&self) -> Option<&EarthquakeLayer> {
        self.overlays.iter().filter_map(|l| match l.content {
            LayerContent::Earthquakes(ref layer) => Some(layer),
            _ => None,
        }).next()
    }

    pub fn fault_lines(&self) -> Option<&FaultLineLayer> {
        self.overlays.iter().filter_map(|l| match l.content {
            LayerContent::FaultLines(ref layer) => Some(layer),
            _ => None,
        }).next()
    }
}

pub fn compose(earthquakes: EarthquakeLayer, faults: FaultLineLayer, config: &MapConfig) -> MapView {
    let access_token = config.access_token();
    let base_layers: Vec<MapLayer> = config.tiles
        .base
        .iter()
        .map(|params| {
            MapLayer::base(&params.name,
                           TileLayer::from_params(params, &access_token),
                           params.name == config.tiles.active)
        })
        .collect();

    let overlays = vec![MapLayer::overlay(EARTHQUAKES_NAME,
                                          LayerContent::Earthquakes(earthquakes),
                                          config.overlays.show_earthquakes),
                        MapLayer::overlay(FAULT_LINES_NAME,
                                          LayerContent::FaultLines(faults),
                                          config.overlays.show_fault_lines)];

    let control = LayerControl {
        collapsed: false,
        position: Corner::TopRight,
        base: names_of(&base_layers, LayerKind::Base),
        overlays: names_of(&overlays, LayerKind::Overlay),
    };

    let view = MapView {
        element_id: String::from(HOST_ELEMENT_ID),
        width: config.map.width,
        height: config.map.height,
        center: LatLng::new(config.map.center[0], config.map.center[1]),
        zoom: config.map.zoom,
        background: config.map.background.clone(),
        title: config.map.title.clone(),
        base_layers: base_layers,
        overlays: overlays,
        control: control,
        legend: Legend::magnitudes(),
    };
    debug!(base = view.base_layers.len(),
           active = view.active_base().map(|l| l.name.as_str()).unwrap_or("none"),
           overlays = view.overlays.len(),
           "map view composed");
    view
}

fn names_of(layers: &[MapLayer], kind: LayerKind) -> Vec<String> {
    layers.iter().filter(|l| l.kind == kind).map(|l| l.name.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_composition() {
        let config = MapConfig::default();
        let view = compose(EarthquakeLayer::default(), FaultLineLayer::default(), &config);
        assert_eq!(view.element_id, "map");
        assert_eq!(view.center, LatLng::new(37.09, -95.71));
        assert_eq!(view.zoom, 5);
        assert_eq!(view.control.base, vec!["Satellite", "Grayscale", "Outdoors"]);
        assert_eq!(view.control.overlays, vec!["Earthquakes", "Fault Lines"]);
        assert!(!view.control.collapsed);
        assert_eq!(view.legend.entries.len(), 6);
    }

    #[test]
    fn one_active_base_layer() {
        let view = compose(EarthquakeLayer::default(), FaultLineLayer::default(), &MapConfig::default());
        assert_eq!(view.base_layers.iter().filter(|l| l.visible).count(), 1);
        assert_eq!(view.active_base().map(|l| l.name.as_str()), Some("Satellite"));
    }

    #[test]
    fn fault_lines_start_hidden_unless_configured() {
        let mut config = MapConfig::default();
        let view = compose(EarthquakeLayer::default(), FaultLineLayer::default(), &config);
        assert!(view.overlay(EARTHQUAKES_NAME).unwrap().visible);
        assert!(!view.overlay(FAULT_LINES_NAME).unwrap().visible);

        config.overlays.show_fault_lines = true;
        let view = compose(EarthquakeLayer::default(), FaultLineLayer::default(), &config);
        assert!(view.overlay(FAULT_LINES_NAME).unwrap().visible);
    }

    #[test]
    fn base_layers_share_the_token() {
        let mut config = MapConfig::default();
        config.tiles.access_token = Some(String::from("pk.test"));
        let view = compose(EarthquakeLayer::default(), FaultLineLayer::default(), &config);
        let styles: Vec<&str> = view.base_layers
            .iter()
            .map(|l| match l.content {
                LayerContent::Tiles(ref t) => {
                    assert_eq!(t.access_token, "pk.test");
                    t.style_id.as_str()
                }
                _ => panic!("base layer without tiles"),
            })
            .collect();
        assert_eq!(styles, vec!["mapbox/satellite-streets-v11", "mapbox/light-v10", "mapbox/outdoors-v10"]);
    }

    #[test]
    fn empty_layers_are_still_reachable() {
        let view = compose(EarthquakeLayer::default(), FaultLineLayer::default(), &MapConfig::default());
        assert_eq!(view.earthquakes().map(|l| l.len()), Some(0));
        assert_eq!(view.fault_lines().map(|l| l.len()), Some(0));
    }
}
