//! Newsdesk engine: data loading, provider chains and command dispatch.
mod config;
mod context;
mod data;
mod decode;
mod dispatch;
mod engine;
mod feed_content;
mod fetch;
mod news;
mod quotes;
mod rss;
mod types;

pub use config::{system_clock, Clock, EngineConfig};
pub use context::DispatchContext;
pub use data::{
    CommodityRow, DataRoot, DataStore, Headline, MarketTick, RecentMap, COMMODITIES_PATH,
    HEADLINES_PATH, MARKETS_PATH, RECENT_PATH,
};
pub use decode::{decode_text, DecodeError, DecodedText};
pub use dispatch::{
    Dispatcher, FT_TODAY_QUERY, LIVE_MAP_URL, NO_ITEMS, STOCK_FAILURE, STOCK_USAGE,
    TAPE_UNAVAILABLE,
};
pub use engine::EngineHandle;
pub use feed_content::{BundleFeedContent, FeedContent, LiveRssFeedContent, LIVE_FEED_LIMIT};
pub use fetch::{fetch_json, fetch_text, url_with_params, FetchSettings, Fetcher, ReqwestFetcher};
pub use news::{NewsSearch, RssNewsSearch, SEARCH_LIMIT};
pub use quotes::{
    as_percent, human_number, FinnhubProvider, NewsQuoteFallback, QuoteProvider, YahooProvider,
};
pub use rss::{parse_feed, FeedParseError};
pub use types::{EngineEvent, FailureKind, FetchError, FetchMetadata, FetchOutput, ProviderError};
