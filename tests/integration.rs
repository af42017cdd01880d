use std::fs;
use std::path::PathBuf;

use quakemap::classification::ColorName;
use quakemap::compose::{EARTHQUAKES_NAME, FAULT_LINES_NAME};
use quakemap::config_params::MapConfig;
use quakemap::document::{render_svg, write_view, OutputFormat};
use quakemap::error::Error;
use quakemap::viewport::LatLng;
use tempfile::tempdir;

fn data_path(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("data");
    path.push(name);
    path.to_str().expect("utf-8 path").to_string()
}

fn local_config() -> MapConfig {
    let mut config = MapConfig::default();
    config.feeds.earthquakes = data_path("earthquakes.geojson");
    config.feeds.plates = data_path("plates.json");
    config.tiles.access_token = Some(String::from("pk.integration"));
    config
}

#[tokio::test]
async fn builds_the_map_from_local_feeds() {
    let view = quakemap::build_map(&local_config()).await.expect("map");

    let quakes = view.earthquakes().expect("earthquake overlay");
    assert_eq!(quakes.len(), 5);
    let reference = &quakes.markers[0];
    assert_eq!(reference.color, ColorName::Orange);
    assert_eq!(reference.position, LatLng::new(36.0, -100.0));
    assert_eq!(quakes.markers[1].color, ColorName::Red);
    assert_eq!(quakes.markers[2].color, ColorName::GreenYellow);
    assert_eq!(quakes.markers[3].color, ColorName::Chartreuse);
    assert_eq!(quakes.markers[4].popup.title, "unknown");

    let faults = view.fault_lines().expect("fault line overlay");
    assert_eq!(faults.len(), 2);
    assert_eq!(faults.line_count(), 3);

    assert!(view.overlay(EARTHQUAKES_NAME).unwrap().visible);
    assert!(!view.overlay(FAULT_LINES_NAME).unwrap().visible);
    assert_eq!(view.legend.entries.len(), 6);
    assert_eq!(view.legend.entries[5].label, "5+");
}

#[tokio::test]
async fn missing_plate_feed_leaves_fault_lines_empty() {
    let mut config = local_config();
    config.feeds.plates = data_path("no-such-plates.json");
    let view = quakemap::build_map(&config).await.expect("map without plates");
    assert_eq!(view.earthquakes().map(|l| l.len()), Some(5));
    assert!(view.fault_lines().expect("fault line overlay").is_empty());
}

#[tokio::test]
async fn missing_earthquake_feed_is_an_error() {
    let mut config = local_config();
    config.feeds.earthquakes = data_path("no-such-quakes.geojson");
    let result = quakemap::build_map(&config).await;
    assert!(matches!(result, Err(Error::Io(_))));
}

#[tokio::test]
async fn empty_feed_still_composes() {
    let dir = tempdir().expect("temp dir");
    let empty = dir.path().join("empty.geojson");
    fs::write(&empty, r#"{"type": "FeatureCollection", "features": []}"#).expect("write feed");

    let mut config = local_config();
    config.feeds.earthquakes = empty.to_str().unwrap().to_string();
    let view = quakemap::build_map(&config).await.expect("map");
    assert_eq!(view.earthquakes().map(|l| l.len()), Some(0));

    let svg = render_svg(&view).to_string();
    assert_eq!(svg.matches(r#"class="quake""#).count(), 0);
    assert!(svg.contains(r#"id="earthquakes""#));
}

#[tokio::test]
async fn writes_svg_and_json() {
    let dir = tempdir().expect("temp dir");
    let view = quakemap::build_map(&local_config()).await.expect("map");

    let svg_path = dir.path().join("earthquakes.svg");
    write_view(&view, &svg_path, OutputFormat::from_path(&svg_path)).expect("svg written");
    let svg = fs::read_to_string(&svg_path).expect("svg read");
    assert_eq!(svg.matches(r#"class="quake""#).count(), 5);
    assert_eq!(svg.matches(r#"class="base-layer""#).count(), 3);
    assert!(svg.contains("access_token=pk.integration"));
    assert!(svg.contains("120 km SE of Kodiak, Alaska"));

    let json_path = dir.path().join("earthquakes.json");
    write_view(&view, &json_path, OutputFormat::Json).expect("json written");
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).expect("json read")).expect("json");
    assert_eq!(json["control"]["base"][0], "Satellite");
    assert_eq!(json["control"]["collapsed"], false);

    dir.close().expect("Failed to close temporary directory");
}

#[test]
fn config_file_round_trip() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("quakemap.toml");
    fs::write(&path,
              "[map]\nzoom = 3\ntitle = \"Past day\"\n\n[overlays]\nshow_fault_lines = true\n")
        .expect("write config");
    let config = MapConfig::load_from_path(&path).expect("config");
    assert_eq!(config.map.zoom, 3);
    assert_eq!(config.map.title.as_deref(), Some("Past day"));
    assert!(config.overlays.show_fault_lines);
    assert_eq!(config.tiles.base.len(), 3);
}
