//! Reading the GeoJSON feeds, over HTTP or from a local file.

use std::time::Duration;

use geojson::{Feature, GeoJson};
use tracing::{debug, info};

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct FeedClient {
    client: reqwest::Client,
}

impl FeedClient {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(Error::Client)?;
        Ok(FeedClient { client: client })
    }

    /// Fetches and decodes one feed. Anything that is not an `http(s)://`
    /// URL is read as a path on disk.
    pub async fn fetch(&self, source: &str) -> Result<GeoJson> {
        let raw = if is_remote(source) {
            self.get(source).await?
        } else {
            debug!(path = source, "reading feed from disk");
            tokio::fs::read_to_string(source).await?
        };
        let geojson = parse_geojson(&raw, source)?;
        info!(source = source, bytes = raw.len(), "feed loaded");
        Ok(geojson)
    }

    async fn get(&self, url: &str) -> Result<String> {
        debug!(url = url, "GET");
        let response = self.client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Http { url: url.to_string(), source: e })?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status { url: url.to_string(), status: status });
        }
        response.text()
            .await
            .map_err(|e| Error::Http { url: url.to_string(), source: e })
    }
}

pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

pub fn parse_geojson(raw: &str, source: &str) -> Result<GeoJson> {
    raw.parse::<GeoJson>().map_err(|e| {
        Error::GeoJson {
            source_name: source.to_string(),
            message: e.to_string(),
        }
    })
}

/// The features of a decoded document: a collection yields its members, a
/// lone feature yields itself and a bare geometry is wrapped in a feature.
pub fn into_features(geojson: GeoJson) -> Vec<Feature> {
    match geojson {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(geometry) => {
            vec![Feature {
                     bbox: None,
                     geometry: Some(geometry),
                     id: None,
                     properties: None,
                     foreign_members: None,
                 }]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn remote_sources() {
        assert!(is_remote("https://earthquake.usgs.gov/feed.geojson"));
        assert!(is_remote("http://localhost:8000/plates.json"));
        assert!(!is_remote("tests/data/quakes.geojson"));
        assert!(!is_remote("/tmp/https.json"));
    }

    #[test]
    fn bad_json_is_a_geojson_error() {
        match parse_geojson("{ not json", "inline") {
            Err(Error::GeoJson { source_name, .. }) => assert_eq!(source_name, "inline"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn features_of_each_document_kind() {
        let collection = parse_geojson(r#"{"type": "FeatureCollection", "features": []}"#, "c").unwrap();
        assert!(into_features(collection).is_empty());

        let geometry = parse_geojson(r#"{"type": "Point", "coordinates": [1.0, 2.0]}"#, "g").unwrap();
        let features = into_features(geometry);
        assert_eq!(features.len(), 1);
        assert!(features[0].geometry.is_some());
    }

    #[tokio::test]
    async fn reads_local_files() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"type": "FeatureCollection", "features": []}}"#).expect("write");
        let client = FeedClient::new(None).unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let geojson = client.fetch(&path).await.unwrap();
        assert!(matches!(geojson, GeoJson::FeatureCollection(_)));
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let client = FeedClient::new(None).unwrap();
        let result = client.fetch("/definitely/not/here.geojson").await;
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
