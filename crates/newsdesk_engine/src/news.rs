use std::sync::Arc;

use newsdesk_core::FeedItem;

use crate::fetch::{fetch_text, url_with_params, Fetcher};
use crate::rss::parse_feed;
use crate::{FailureKind, FetchError, ProviderError};

/// Items returned per search.
pub const SEARCH_LIMIT: usize = 10;

/// Generic keyword news search.
#[async_trait::async_trait]
pub trait NewsSearch: Send + Sync {
    fn name(&self) -> &'static str;

    /// Every item the provider returned for `query`, newest-first as served.
    async fn search(&self, query: &str) -> Result<Vec<FeedItem>, ProviderError>;
}

/// A search engine that answers queries with an RSS document.
pub struct RssNewsSearch {
    name: &'static str,
    base: String,
    query_param: &'static str,
    extra_params: Vec<(&'static str, &'static str)>,
    fetcher: Arc<dyn Fetcher>,
}

impl RssNewsSearch {
    pub fn google_news(fetcher: Arc<dyn Fetcher>) -> Self {
        Self::with_base(
            "google-news",
            "https://news.google.com/rss/search",
            fetcher,
        )
    }

    pub fn bing_news(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            name: "bing-news",
            base: "https://www.bing.com/news/search".to_string(),
            query_param: "q",
            extra_params: vec![("format", "rss")],
            fetcher,
        }
    }

    /// Google-News-compatible endpoint at another base URL.
    pub fn with_base(name: &'static str, base: impl Into<String>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            name,
            base: base.into(),
            query_param: "q",
            extra_params: vec![("hl", "en-US"), ("gl", "US"), ("ceid", "US:en")],
            fetcher,
        }
    }

    fn search_url(&self, query: &str) -> Result<String, FetchError> {
        let mut params = vec![(self.query_param, query)];
        params.extend(self.extra_params.iter().copied());
        url_with_params(&self.base, &params)
    }
}

#[async_trait::async_trait]
impl NewsSearch for RssNewsSearch {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn search(&self, query: &str) -> Result<Vec<FeedItem>, ProviderError> {
        let url = self
            .search_url(query)
            .map_err(|err| ProviderError::fetch(self.name, err))?;
        let xml = fetch_text(self.fetcher.as_ref(), &url)
            .await
            .map_err(|err| ProviderError::fetch(self.name, err))?;
        parse_feed(&xml, usize::MAX).map_err(|err| {
            ProviderError::fetch(
                self.name,
                FetchError::new(FailureKind::InvalidPayload, err.to_string()),
            )
        })
    }
}
