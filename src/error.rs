use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unable to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("unable to decode GeoJSON from {source_name}: {message}")]
    GeoJson { source_name: String, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("unable to serialize map view: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_name_no_url() {
        let source = reqwest::Client::new().get("not a url").build().unwrap_err();
        let message = Error::Client(source).to_string();
        assert!(message.starts_with("unable to build HTTP client: "), "{}", message);
        assert!(!message.contains("request to"));
    }
}
