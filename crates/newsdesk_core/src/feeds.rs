use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Path of the feed index document, relative to the data root.
pub const FEED_INDEX_PATH: &str = "data/feeds.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedDescriptor {
    pub abbr: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
}

impl FeedDescriptor {
    pub fn new(abbr: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            abbr: abbr.into(),
            title: title.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawFeedItem")]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    #[serde(rename = "pubDate")]
    pub pub_date: String,
}

/// Bundles written by different scrapers disagree on the date key.
#[derive(Deserialize)]
struct RawFeedItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default, rename = "pubDate")]
    pub_date: Option<String>,
    #[serde(default)]
    pubdate: Option<String>,
    #[serde(default)]
    updated: Option<String>,
}

impl From<RawFeedItem> for FeedItem {
    fn from(raw: RawFeedItem) -> Self {
        let pub_date = [raw.pub_date, raw.pubdate, raw.updated]
            .into_iter()
            .flatten()
            .find(|d| !d.is_empty())
            .unwrap_or_default();
        Self {
            title: raw.title.unwrap_or_default(),
            link: raw.link.unwrap_or_default(),
            pub_date,
        }
    }
}

/// The feed bundle: descriptors in display order plus cached items per abbr.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeedIndex {
    #[serde(default)]
    pub feeds: Vec<FeedDescriptor>,
    #[serde(default)]
    pub data: HashMap<String, Vec<FeedItem>>,
}

impl FeedIndex {
    pub fn items(&self, abbr: &str) -> &[FeedItem] {
        self.data.get(abbr).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn descriptor(&self, abbr: &str) -> Option<&FeedDescriptor> {
        self.feeds.iter().find(|f| f.abbr == abbr)
    }
}
