use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use desk_logging::desk_info;
use newsdesk_core::{
    load_directory_bytes, DirectorySnapshot, FeedIndex, FeedItem, Schema, FEED_INDEX_PATH,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::fetch::Fetcher;
use crate::{FailureKind, FetchError};

pub const COMMODITIES_PATH: &str = "data/commodities.json";
pub const RECENT_PATH: &str = "data/recent.json";
pub const MARKETS_PATH: &str = "data/markets.json";
pub const HEADLINES_PATH: &str = "data/news.json";

/// Where the bundled data documents live: a site root or a local checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataRoot {
    Url(url::Url),
    Dir(PathBuf),
}

impl DataRoot {
    /// `http(s)://` values are URLs, anything else is a directory.
    pub fn parse(raw: &str) -> Result<Self, FetchError> {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            // Joining keeps the last path segment only when the base ends in '/'.
            let with_slash = if raw.ends_with('/') {
                raw.to_string()
            } else {
                format!("{raw}/")
            };
            url::Url::parse(&with_slash)
                .map(DataRoot::Url)
                .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))
        } else {
            Ok(DataRoot::Dir(PathBuf::from(raw)))
        }
    }
}

/// One row of the commodities snapshot. Values are preformatted upstream
/// but may arrive as numbers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommodityRow {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub current: serde_json::Value,
    #[serde(default)]
    pub w: serde_json::Value,
    #[serde(default)]
    pub m: serde_json::Value,
}

/// One entry of the markets tape. `price` and `pct` arrive formatted;
/// `dir` carries the sign of the move.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarketTick {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub pct: String,
    #[serde(default)]
    pub dir: f64,
}

impl MarketTick {
    pub fn is_up(&self) -> bool {
        self.dir >= 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Headline {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
}

/// Prebuilt recent-work lists keyed by `name|organization|email`.
pub type RecentMap = HashMap<String, Vec<FeedItem>>;

/// Reads bundled documents relative to a [`DataRoot`].
#[derive(Clone)]
pub struct DataStore {
    root: DataRoot,
    fetcher: Arc<dyn Fetcher>,
}

impl DataStore {
    pub fn new(root: DataRoot, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { root, fetcher }
    }

    async fn read_bytes(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        match &self.root {
            DataRoot::Url(base) => {
                let url = base
                    .join(path)
                    .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
                let output = self.fetcher.fetch(url.as_str()).await?;
                Ok(output.bytes)
            }
            DataRoot::Dir(dir) => {
                let full = dir.join(path);
                let bytes = tokio::fs::read(&full).await.map_err(|err| {
                    FetchError::new(FailureKind::Io, format!("{}: {err}", full.display()))
                })?;
                Ok(bytes)
            }
        }
    }

    pub async fn read_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let bytes = self.read_bytes(path).await?;
        serde_json::from_slice(&bytes)
            .map_err(|err| FetchError::new(FailureKind::InvalidPayload, format!("{path}: {err}")))
    }

    pub async fn load_directory(&self, schema: Schema) -> Result<DirectorySnapshot, FetchError> {
        let path = schema.resource_path();
        let bytes = self.read_bytes(path).await?;
        let snapshot = load_directory_bytes(schema, &bytes)
            .map_err(|err| FetchError::new(FailureKind::Decode, format!("{path}: {err}")))?;
        desk_info!(
            "Loaded {} directory: {} records, {} organizations, {} topics",
            schema,
            snapshot.len(),
            snapshot.organizations.len(),
            snapshot.topics.len()
        );
        Ok(snapshot)
    }

    pub async fn load_feed_index(&self) -> Result<FeedIndex, FetchError> {
        let index: FeedIndex = self.read_json(FEED_INDEX_PATH).await?;
        desk_info!("Loaded feed index: {} feeds", index.feeds.len());
        Ok(index)
    }

    pub async fn load_commodities(&self) -> Result<Vec<CommodityRow>, FetchError> {
        self.read_json(COMMODITIES_PATH).await
    }

    pub async fn load_recent_map(&self) -> Result<RecentMap, FetchError> {
        self.read_json(RECENT_PATH).await
    }

    pub async fn load_markets(&self) -> Result<Vec<MarketTick>, FetchError> {
        self.read_json(MARKETS_PATH).await
    }

    pub async fn load_headlines(&self) -> Result<Vec<Headline>, FetchError> {
        self.read_json(HEADLINES_PATH).await
    }
}

/// Render a JSON scalar the way the snapshot table shows it.
pub(crate) fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_roots_gain_a_trailing_slash() {
        let DataRoot::Url(url) = DataRoot::parse("https://example.org/desk").unwrap() else {
            panic!("expected url root");
        };
        assert_eq!(
            url.join(FEED_INDEX_PATH).unwrap().as_str(),
            "https://example.org/desk/data/feeds.json"
        );
    }

    #[test]
    fn other_roots_are_directories() {
        assert_eq!(
            DataRoot::parse("./docs").unwrap(),
            DataRoot::Dir(PathBuf::from("./docs"))
        );
    }
}
