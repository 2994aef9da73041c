use std::sync::Arc;

use newsdesk_core::{FeedDescriptor, FeedIndex, FeedItem};

use crate::fetch::{fetch_text, Fetcher};
use crate::rss::parse_feed;
use crate::{FailureKind, FetchError, ProviderError};

/// Items fetched live from a feed URL.
pub const LIVE_FEED_LIMIT: usize = 25;

/// A source of items for one feed. An empty list is a valid answer.
#[async_trait::async_trait]
pub trait FeedContent: Send + Sync {
    fn name(&self) -> &'static str;

    async fn items(
        &self,
        feed: &FeedDescriptor,
        index: &FeedIndex,
    ) -> Result<Vec<FeedItem>, ProviderError>;
}

/// Items cached in the prebuilt feed index.
pub struct BundleFeedContent;

#[async_trait::async_trait]
impl FeedContent for BundleFeedContent {
    fn name(&self) -> &'static str {
        "bundle"
    }

    async fn items(
        &self,
        feed: &FeedDescriptor,
        index: &FeedIndex,
    ) -> Result<Vec<FeedItem>, ProviderError> {
        Ok(index.items(&feed.abbr).to_vec())
    }
}

/// Reads the descriptor's RSS/Atom URL directly.
pub struct LiveRssFeedContent {
    fetcher: Arc<dyn Fetcher>,
}

impl LiveRssFeedContent {
    pub const NAME: &'static str = "live-rss";

    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait::async_trait]
impl FeedContent for LiveRssFeedContent {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn items(
        &self,
        feed: &FeedDescriptor,
        _index: &FeedIndex,
    ) -> Result<Vec<FeedItem>, ProviderError> {
        if feed.url.trim().is_empty() {
            return Err(ProviderError::Unavailable {
                provider: Self::NAME,
                message: format!("{} has no feed url", feed.abbr),
            });
        }
        let xml = fetch_text(self.fetcher.as_ref(), feed.url.trim())
            .await
            .map_err(|err| ProviderError::fetch(Self::NAME, err))?;
        parse_feed(&xml, LIVE_FEED_LIMIT).map_err(|err| {
            ProviderError::fetch(
                Self::NAME,
                FetchError::new(FailureKind::InvalidPayload, err.to_string()),
            )
        })
    }
}
