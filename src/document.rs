//! Writing a composed `MapView` out, as an interactive SVG or as JSON.
//!
//! The SVG keeps every layer of the view: one group of `<image>` tiles per
//! base layer, one group per overlay, and the layer control and legend
//! drawn on top. A small script embedded in the document switches groups on
//! and off when a control entry is clicked, so the file works on its own in
//! a browser. Popups are `<title>` children of the markers.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use geojson::Value;
use svg::node::element::path::Data;
use svg::node::element::{Circle, Element, Group, Image, Line, Path as SvgPath, Rectangle};
use svg::node::Text as NodeText;
use svg::{Document, Node};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::layer::{EarthquakeLayer, FaultLineLayer, LayerContent, MapLayer, TileLayer};
use crate::compose::MapView;
use crate::legend::Corner;
use crate::viewport::{tile_url, Viewport};

const CONTROL_WIDTH: f64 = 160.0;
const CONTROL_ROW: f64 = 22.0;
const LEGEND_WIDTH: f64 = 90.0;
const LEGEND_ROW: f64 = 22.0;
const SWATCH: f64 = 18.0;
const PADDING: f64 = 10.0;
const MARKER_STROKE_WIDTH: f64 = 1.0;

const STYLE: &str = "\
text { font-family: Helvetica, Arial, sans-serif; font-size: 12px; fill: #333; }
.panel { fill: white; fill-opacity: 0.85; stroke: #999; stroke-width: 1; }
.control-item { cursor: pointer; }
#title { font-size: 22px; }
.attribution { font-size: 10px; }
";

const TOGGLE_SCRIPT: &str = "
function quakemapToggle(item) {
  var kind = item.getAttribute('data-kind');
  var target = document.getElementById(item.getAttribute('data-target'));
  if (kind === 'base') {
    var items = document.querySelectorAll('[data-kind=base]');
    Array.prototype.forEach.call(items, function (other) {
      var layer = document.getElementById(other.getAttribute('data-target'));
      var on = other === item;
      layer.setAttribute('display', on ? 'inline' : 'none');
      other.querySelector('.indicator').setAttribute('fill', on ? '#333' : 'white');
    });
  } else {
    var visible = target.getAttribute('display') !== 'none';
    target.setAttribute('display', visible ? 'none' : 'inline');
    item.querySelector('.indicator').setAttribute('fill', visible ? 'white' : '#333');
  }
}
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Json,
}

impl OutputFormat {
    /// Format implied by the output file extension, SVG unless it is `.json`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
            _ => OutputFormat::Svg,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = &'static str;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "svg" | "SVG" => Ok(OutputFormat::Svg),
            "json" | "JSON" => Ok(OutputFormat::Json),
            _ => Err("Invalid output format"),
        }
    }
}

pub fn write_view<P: AsRef<Path>>(view: &MapView, path: P, format: OutputFormat) -> Result<()> {
    let path = path.as_ref();
    match format {
        OutputFormat::Svg => svg::save(path, &render_svg(view))?,
        OutputFormat::Json => fs::write(path, to_json(view)?)?,
    }
    info!(path = %path.display(), format = ?format, "map written");
    Ok(())
}

pub fn to_json(view: &MapView) -> Result<String> {
    serde_json::to_string_pretty(view).map_err(Error::from)
}

pub fn render_svg(view: &MapView) -> Document {
    let mut map = Group::new().set("id", view.element_id.clone());

    if let Some(ref background) = view.background {
        map.append(Rectangle::new()
                       .set("fill", background.as_str())
                       .set("width", "100%")
                       .set("height", "100%"));
    }

    let mut bases = Group::new().set("id", "base-layers");
    for layer in &view.base_layers {
        if let LayerContent::Tiles(ref tiles) = layer.content {
            bases.append(draw_base_layer(view, layer, tiles));
        }
    }
    map.append(bases);

    // Fault lines under the markers.
    let converter = Converter::new(view, 256);
    let mut overlays = Group::new().set("id", "overlays");
    for layer in view.overlays.iter().rev() {
        let group = match layer.content {
            LayerContent::Earthquakes(ref quakes) => converter.draw_earthquakes(quakes),
            LayerContent::FaultLines(ref faults) => converter.draw_fault_lines(faults),
            LayerContent::Tiles(_) => continue,
        };
        overlays.append(group.set("id", layer.element_id())
                             .set("class", "overlay")
                             .set("display", display(layer.visible)));
    }
    map.append(overlays);

    if let Some(ref title) = view.title {
        let mut text = text_element("text", title);
        text.assign("id", "title");
        text.assign("text-anchor", "middle");
        text.assign("x", view.width as f64 / 2.0);
        text.assign("y", 32.0);
        map.append(text);
    }

    map.append(draw_layer_control(view));
    map.append(draw_legend(view));

    Document::new()
        .set("xmlns:xlink", "http://www.w3.org/1999/xlink")
        .set("width", view.width)
        .set("height", view.height)
        .set("viewBox", format!("0 0 {} {}", view.width, view.height))
        .add(text_element("style", STYLE))
        .add(map)
        .add(text_element("script", TOGGLE_SCRIPT))
}

struct Converter {
    viewport: Viewport,
}

impl Converter {
    fn new(view: &MapView, tile_size: u32) -> Self {
        Converter { viewport: Viewport::new(view.width, view.height, view.center, view.zoom, tile_size) }
    }

    fn draw_earthquakes(&self, layer: &EarthquakeLayer) -> Group {
        let mut group = Group::new();
        for marker in &layer.markers {
            let (x, y) = self.viewport.project(marker.position);
            let mut circle = Circle::new()
                .set("cx", round(x))
                .set("cy", round(y))
                .set("r", svg_radius(marker.radius))
                .set("stroke", marker.color.css())
                .set("stroke-width", MARKER_STROKE_WIDTH)
                .set("fill", marker.color.css())
                .set("fill-opacity", marker.fill_opacity)
                .set("class", "quake")
                .add(text_element("title", &marker.popup.text()));
            if let Some(ref id) = marker.id {
                circle = circle.set("data-id", id.as_str());
            }
            if let Some(depth) = marker.depth {
                circle = circle.set("data-depth", depth);
            }
            group.append(circle);
        }
        group
    }

    fn draw_fault_lines(&self, layer: &FaultLineLayer) -> Group {
        let mut data = Data::new();
        for geometry in &layer.geometries {
            data = self.draw_geometry(&geometry.value, data);
        }
        let mut group = Group::new();
        if !layer.is_empty() {
            group.append(SvgPath::new()
                             .set("fill", layer.style.color.as_str())
                             .set("fill-opacity", layer.style.fill_opacity)
                             .set("stroke", layer.style.color.as_str())
                             .set("stroke-width", layer.style.weight)
                             .set("stroke-linejoin", "round")
                             .set("d", data));
        }
        group
    }

    fn draw_geometry(&self, value: &Value, data: Data) -> Data {
        match *value {
            Value::LineString(ref positions) => self.draw_path(positions, data),
            Value::MultiLineString(ref lines) |
            Value::Polygon(ref lines) => {
                lines.iter().fold(data, |d, positions| self.draw_path(positions, d))
            }
            Value::MultiPolygon(ref polygons) => {
                polygons.iter()
                    .flat_map(|rings| rings.iter())
                    .fold(data, |d, positions| self.draw_path(positions, d))
            }
            Value::GeometryCollection(ref geometries) => {
                geometries.iter().fold(data, |d, g| self.draw_geometry(&g.value, d))
            }
            Value::Point(_) | Value::MultiPoint(_) => data,
        }
    }

    /// Appends one open sub-path, restarting it wherever a segment jumps
    /// across the antimeridian.
    fn draw_path(&self, positions: &[Vec<f64>], mut data: Data) -> Data {
        let mut previous: Option<f64> = None;
        for position in positions {
            let (x, y) = match self.viewport.project_position(position) {
                Some(p) => p,
                None => continue,
            };
            let lng = position[0];
            let point = (round(x), round(y));
            data = match previous {
                Some(prev) if (lng - prev).abs() <= 180.0 => data.line_to(point),
                _ => data.move_to(point),
            };
            previous = Some(lng);
        }
        data
    }
}

fn draw_base_layer(view: &MapView, layer: &MapLayer, tiles: &TileLayer) -> Group {
    let mut group = Group::new()
        .set("id", layer.element_id())
        .set("class", "base-layer")
        .set("display", display(layer.visible));
    match tiles.request_zoom(view.zoom) {
        Some(zoom) => {
            let viewport = Viewport::new(view.width, view.height, view.center, zoom, tiles.tile_size);
            for tile in viewport.visible_tiles() {
                let url = tile_url(&tiles.url_template, &tiles.style_id, &tiles.access_token, &tile);
                group.append(Image::new()
                                 .set("x", round(tile.left))
                                 .set("y", round(tile.top))
                                 .set("width", tiles.tile_size)
                                 .set("height", tiles.tile_size)
                                 .set("href", url.as_str())
                                 .set("xlink:href", url));
            }
        }
        None => warn!(layer = %layer.name, zoom = view.zoom, max_zoom = tiles.max_zoom, "no tiles at this zoom"),
    }
    let mut attribution = text_element("text", &tiles.attribution);
    attribution.assign("class", "attribution");
    attribution.assign("x", PADDING);
    attribution.assign("y", view.height as f64 - PADDING);
    group.append(attribution);
    group
}

fn draw_layer_control(view: &MapView) -> Group {
    let control = &view.control;
    let rows = control.base.len() + control.overlays.len();
    let height = rows as f64 * CONTROL_ROW + 2.0 * PADDING + PADDING;
    let (left, top) = corner_origin(view, control.position, CONTROL_WIDTH, height);
    let mut group = Group::new()
        .set("id", "layer-control")
        .set("transform", format!("translate({},{})", left, top))
        .add(Rectangle::new()
                 .set("class", "panel")
                 .set("rx", 4)
                 .set("width", CONTROL_WIDTH)
                 .set("height", height));

    let mut y = PADDING;
    for layer in &view.base_layers {
        group.append(control_item(layer, "base", y));
        y += CONTROL_ROW;
    }
    group.append(Line::new()
                     .set("x1", PADDING)
                     .set("x2", CONTROL_WIDTH - PADDING)
                     .set("y1", y + PADDING / 2.0)
                     .set("y2", y + PADDING / 2.0)
                     .set("stroke", "#ccc"));
    y += PADDING;
    for layer in &view.overlays {
        group.append(control_item(layer, "overlay", y));
        y += CONTROL_ROW;
    }
    group
}

fn control_item(layer: &MapLayer, kind: &str, y: f64) -> Group {
    let fill = if layer.visible { "#333" } else { "white" };
    let center = CONTROL_ROW / 2.0;
    let indicator: Box<dyn Node> = if kind == "base" {
        Box::new(Circle::new()
                     .set("class", "indicator")
                     .set("cx", PADDING + 5.0)
                     .set("cy", center)
                     .set("r", 5)
                     .set("stroke", "#333")
                     .set("fill", fill))
    } else {
        Box::new(Rectangle::new()
                     .set("class", "indicator")
                     .set("x", PADDING)
                     .set("y", center - 5.0)
                     .set("width", 10)
                     .set("height", 10)
                     .set("stroke", "#333")
                     .set("fill", fill))
    };
    let mut label = text_element("text", &layer.name);
    label.assign("x", PADDING + 18.0);
    label.assign("y", center + 4.0);
    Group::new()
        .set("class", "control-item")
        .set("data-kind", kind)
        .set("data-target", layer.element_id())
        .set("onclick", "quakemapToggle(this)")
        .set("transform", format!("translate(0,{})", y))
        .add(indicator)
        .add(label)
}

fn draw_legend(view: &MapView) -> Group {
    let entries = &view.legend.entries;
    let height = entries.len() as f64 * LEGEND_ROW + 2.0 * PADDING;
    let (left, top) = corner_origin(view, view.legend.position, LEGEND_WIDTH, height);
    let mut group = Group::new()
        .set("id", "legend")
        .set("class", "info legend")
        .set("transform", format!("translate({},{})", left, top))
        .add(Rectangle::new()
                 .set("class", "panel")
                 .set("rx", 4)
                 .set("width", LEGEND_WIDTH)
                 .set("height", height));
    for (i, entry) in entries.iter().enumerate() {
        let y = PADDING + i as f64 * LEGEND_ROW;
        group.append(Rectangle::new()
                         .set("class", "swatch")
                         .set("x", PADDING)
                         .set("y", y)
                         .set("width", SWATCH)
                         .set("height", SWATCH)
                         .set("fill", entry.color.css()));
        let mut label = text_element("text", &entry.label);
        label.assign("x", PADDING + SWATCH + 8.0);
        label.assign("y", y + SWATCH - 5.0);
        group.append(label);
    }
    group
}

/// Top-left corner of a panel docked in `corner`. The bottom panel leaves
/// room for the attribution line.
fn corner_origin(view: &MapView, corner: Corner, width: f64, height: f64) -> (f64, f64) {
    let right = view.width as f64 - width - PADDING;
    let bottom = view.height as f64 - height - 2.0 * PADDING;
    match corner {
        Corner::TopRight => (right, PADDING),
        Corner::BottomRight => (right, bottom),
    }
}

/// An element whose only child is escaped text.
fn text_element(name: &str, content: &str) -> Element {
    let mut element = Element::new(name);
    element.append(NodeText::new(content));
    element
}

fn display(visible: bool) -> &'static str {
    if visible { "inline" } else { "none" }
}

fn svg_radius(radius: f64) -> f64 {
    if radius.is_finite() && radius > 0.0 { radius } else { 0.0 }
}

fn round(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::compose;
    use crate::config_params::MapConfig;
    use crate::earthquakes::EarthquakeLoader;
    use crate::faults::FaultLineLoader;
    use crate::fetch::parse_geojson;
    use crate::layer::LineStyle;
    use crate::viewport::LatLng;

    const QUAKES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "id": "t1",
             "properties": {"place": "10km N of Test", "time": 1000000, "mag": 4.2},
             "geometry": {"type": "Point", "coordinates": [-100.0, 36.0, 12.5]}},
            {"type": "Feature", "id": "t2",
             "properties": {"place": "Far & away", "time": 2000000, "mag": -0.5},
             "geometry": {"type": "Point", "coordinates": [-90.0, 30.0]}}
        ]
    }"#;

    const PLATES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {},
             "geometry": {"type": "LineString",
                          "coordinates": [[170.0, 0.0], [179.0, 1.0], [-179.0, 2.0], [-170.0, 3.0]]}}
        ]
    }"#;

    fn pixel_of(view: &MapView, point: LatLng) -> (f64, f64) {
        let (x, y) = Converter::new(view, 256).viewport.project(point);
        (round(x), round(y))
    }

    fn single_base_view(tile_size: u32, max_zoom: u8, zoom: u8) -> MapView {
        let mut config = MapConfig::default();
        config.tiles.access_token = Some(String::from("pk.test"));
        config.tiles.base.truncate(1);
        config.tiles.base[0].tile_size = tile_size;
        config.tiles.base[0].max_zoom = max_zoom;
        config.map.zoom = zoom;
        compose(EarthquakeLayer::default(), FaultLineLayer::default(), &config)
    }

    fn sample_view() -> MapView {
        let quakes = EarthquakeLoader::from_geojson(parse_geojson(QUAKES, "quakes").unwrap());
        let faults = FaultLineLoader::from_geojson(parse_geojson(PLATES, "plates").unwrap(),
                                                   LineStyle::default());
        let mut config = MapConfig::default();
        config.tiles.access_token = Some(String::from("pk.test"));
        config.map.title = Some(String::from("Earthquakes"));
        compose(quakes, faults, &config)
    }

    #[test]
    fn output_format_from_extension() {
        assert_eq!(OutputFormat::from_path("map.json"), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path("map.svg"), OutputFormat::Svg);
        assert_eq!(OutputFormat::from_path("map"), OutputFormat::Svg);
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("png".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn svg_holds_every_layer() {
        let svg = render_svg(&sample_view()).to_string();
        assert!(svg.contains(r#"id="map""#));
        assert!(svg.contains(r#"id="base-satellite""#));
        assert!(svg.contains(r#"id="base-grayscale""#));
        assert!(svg.contains(r#"id="base-outdoors""#));
        assert!(svg.contains(r#"id="earthquakes""#));
        assert!(svg.contains(r#"id="fault-lines""#));
        assert!(svg.contains(r#"id="layer-control""#));
        assert!(svg.contains(r#"id="legend""#));
        assert_eq!(svg.matches(r#"class="quake""#).count(), 2);
        assert_eq!(svg.matches(r#"class="swatch""#).count(), 6);
        assert_eq!(svg.matches(r#"class="control-item""#).count(), 5);
    }

    #[test]
    fn tiles_use_the_token_and_style() {
        let svg = render_svg(&sample_view()).to_string();
        assert!(svg.contains("https://api.mapbox.com/styles/v1/mapbox/satellite-streets-v11/tiles/5/"));
        assert!(svg.contains("access_token=pk.test"));
    }

    #[test]
    fn large_tiles_are_requested_one_level_lower() {
        let svg = render_svg(&single_base_view(512, 18, 5)).to_string();
        assert!(svg.contains("/tiles/4/"));
        assert!(!svg.contains("/tiles/5/"));
        assert!(svg.contains(r#"width="512""#));
        assert!(svg.matches("<image").count() > 0);
    }

    #[test]
    fn no_tiles_above_max_zoom() {
        let view = single_base_view(256, 3, 5);
        let group = draw_base_layer(&view, &view.base_layers[0], match view.base_layers[0].content {
            LayerContent::Tiles(ref tiles) => tiles,
            _ => panic!("expected a tile layer"),
        });
        let svg = group.to_string();
        assert_eq!(svg.matches("<image").count(), 0);
        assert!(svg.contains(r#"class="attribution""#));
    }

    #[test]
    fn depth_is_kept_on_the_marker() {
        let svg = render_svg(&sample_view()).to_string();
        assert!(svg.contains(r#"data-depth="12.5""#));
    }

    #[test]
    fn popup_text_is_escaped() {
        let svg = render_svg(&sample_view()).to_string();
        assert!(svg.contains("10km N of Test"));
        assert!(svg.contains("Far &amp; away"));
    }

    #[test]
    fn marker_placement_matches_projection() {
        let view = sample_view();
        let (x, y) = pixel_of(&view, LatLng::new(36.0, -100.0));
        let svg = render_svg(&view).to_string();
        assert!(svg.contains(&format!(r#"cx="{}""#, x)));
        assert!(svg.contains(&format!(r#"cy="{}""#, y)));
    }

    #[test]
    fn negative_magnitude_draws_an_empty_circle() {
        assert_eq!(svg_radius(-1.5), 0.0);
        assert_eq!(svg_radius(f64::NAN), 0.0);
        assert_eq!(svg_radius(6.0), 6.0);
    }

    #[test]
    fn antimeridian_splits_the_path() {
        let view = sample_view();
        let converter = Converter::new(&view, 256);
        let faults = view.fault_lines().unwrap();
        let data = converter.draw_geometry(&faults.geometries[0].value, Data::new());
        let moves = data.iter()
            .filter(|c| matches!(c, svg::node::element::path::Command::Move(..)))
            .count();
        assert_eq!(moves, 2);
    }

    #[test]
    fn json_output() {
        let json = to_json(&sample_view()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["element_id"], "map");
        assert_eq!(value["legend"]["entries"].as_array().unwrap().len(), 6);
        assert_eq!(value["overlays"][0]["content"]["type"], "earthquakes");
        assert_eq!(value["overlays"][0]["content"]["markers"][0]["color"], "Orange");
    }

    #[test]
    fn writes_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        let svg_path = dir.path().join("map.svg");
        let json_path = dir.path().join("map.json");
        let view = sample_view();
        write_view(&view, &svg_path, OutputFormat::Svg).unwrap();
        write_view(&view, &json_path, OutputFormat::from_path(&json_path)).unwrap();
        let svg = fs::read_to_string(&svg_path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("quakemapToggle"));
        assert!(fs::read_to_string(&json_path).unwrap().starts_with('{'));
    }
}
