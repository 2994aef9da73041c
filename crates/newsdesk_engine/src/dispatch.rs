use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local};
use desk_logging::{desk_debug, desk_info, desk_warn};
use newsdesk_core::{
    resolve_index, resolve_search, BlockBuilder, ContactRecord, FeedDescriptor, FeedIndex,
    FeedItem, IndexTarget, Outcome, OutputBlock, Selection, Special, Widget,
};

use crate::config::{Clock, EngineConfig};
use crate::context::DispatchContext;
use crate::data::{display_value, DataStore, Headline, MarketTick};
use crate::feed_content::{BundleFeedContent, FeedContent, LiveRssFeedContent};
use crate::fetch::Fetcher;
use crate::news::{NewsSearch, RssNewsSearch, SEARCH_LIMIT};
use crate::quotes::{FinnhubProvider, NewsQuoteFallback, QuoteProvider, YahooProvider};
use crate::ProviderError;

pub const LIVE_MAP_URL: &str = "https://liveuamap.com";
pub const FT_TODAY_QUERY: &str = "site:ft.com";
pub const STOCK_USAGE: &str = "Usage: STOCK TICKER (e.g., STOCK AAPL)";
pub const STOCK_FAILURE: &str = "Failed to fetch stock data.";
pub const NO_ITEMS: &str = "No items found.";
pub const TAPE_UNAVAILABLE: &str = "Market and headline tapes are unavailable.";

/// Turns parsed selections into output. Every collaborator is a trait
/// object tried in order; the first useful answer wins.
pub struct Dispatcher {
    context: DispatchContext,
    feed_sources: Vec<Arc<dyn FeedContent>>,
    quotes: Vec<Arc<dyn QuoteProvider>>,
    news: Vec<Arc<dyn NewsSearch>>,
    clock: Clock,
}

impl Dispatcher {
    /// A dispatcher with no providers; add them with the `with_*` methods.
    pub fn new(context: DispatchContext, clock: Clock) -> Self {
        Self {
            context,
            feed_sources: Vec::new(),
            quotes: Vec::new(),
            news: Vec::new(),
            clock,
        }
    }

    /// The production provider chains.
    pub fn from_config(config: &EngineConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        let store = DataStore::new(config.data_root.clone(), fetcher.clone());
        let google: Arc<dyn NewsSearch> = Arc::new(RssNewsSearch::google_news(fetcher.clone()));
        let bing: Arc<dyn NewsSearch> = Arc::new(RssNewsSearch::bing_news(fetcher.clone()));

        let mut dispatcher = Self::new(DispatchContext::new(store), config.clock.clone())
            .with_feed_source(Arc::new(BundleFeedContent))
            .with_feed_source(Arc::new(LiveRssFeedContent::new(fetcher.clone())))
            .with_news_search(google.clone())
            .with_news_search(bing);

        match config.finnhub_api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            Some(key) => {
                dispatcher = dispatcher.with_quote_provider(Arc::new(FinnhubProvider::new(
                    config.finnhub_base.clone(),
                    key.trim(),
                    fetcher.clone(),
                    config.clock.clone(),
                )));
            }
            None => desk_info!("No Finnhub key configured; ticker lookups start at Yahoo"),
        }
        dispatcher
            .with_quote_provider(Arc::new(YahooProvider::new(
                config.yahoo_hosts.clone(),
                fetcher,
                Some(google.clone()),
            )))
            .with_quote_provider(Arc::new(NewsQuoteFallback::new(google)))
    }

    pub fn with_feed_source(mut self, source: Arc<dyn FeedContent>) -> Self {
        self.feed_sources.push(source);
        self
    }

    pub fn with_quote_provider(mut self, provider: Arc<dyn QuoteProvider>) -> Self {
        self.quotes.push(provider);
        self
    }

    pub fn with_news_search(mut self, search: Arc<dyn NewsSearch>) -> Self {
        self.news.push(search);
        self
    }

    pub fn context(&self) -> &DispatchContext {
        &self.context
    }

    pub async fn dispatch(&self, selection: &Selection) -> Outcome {
        desk_debug!("Dispatching {:?}", selection);
        match selection {
            Selection::Invalid => OutputBlock::invalid_selection().into(),
            Selection::FeedIndex(n) => {
                let index = self.feed_index_or_empty().await;
                match resolve_index(*n, &index.feeds) {
                    Some(IndexTarget::Feed(feed)) => self.show_feed(feed, &index).await,
                    Some(IndexTarget::Widget(widget)) => open_widget(widget),
                    None => OutputBlock::invalid_selection().into(),
                }
            }
            Selection::FeedSearch(text) => {
                let index = self.feed_index_or_empty().await;
                match resolve_search(text, &index.feeds) {
                    Some(feed) => self.show_feed(feed, &index).await,
                    None => OutputBlock::invalid_selection().into(),
                }
            }
            Selection::TickerLookup(symbol) => self.ticker(symbol).await.into(),
            Selection::NamedSpecial(special) => self.special(*special).await,
        }
    }

    async fn feed_index_or_empty(&self) -> Arc<FeedIndex> {
        match self.context.feed_index().await {
            Ok(index) => index,
            Err(err) => {
                desk_warn!("Feed index unavailable: {}", err);
                Arc::new(FeedIndex::default())
            }
        }
    }

    async fn special(&self, special: Special) -> Outcome {
        match special {
            Special::Guide => self.guide().await.into(),
            Special::LiveMap => Outcome::OpenUrl {
                url: LIVE_MAP_URL.to_string(),
                label: "LiveUAMap".to_string(),
            },
            Special::Commodities => self.commodities().await.into(),
            Special::FtToday => self.ft_today().await.into(),
        }
    }

    async fn show_feed(&self, feed: &FeedDescriptor, index: &FeedIndex) -> Outcome {
        // Some feed-list slots stand in for specials.
        match feed.abbr.to_ascii_uppercase().as_str() {
            "LM" => return self.special(Special::LiveMap).await,
            "CMDTY" => return self.special(Special::Commodities).await,
            "STOCK" => return OutputBlock::message(STOCK_USAGE).into(),
            _ => {}
        }

        let mut items = Vec::new();
        for source in &self.feed_sources {
            match source.items(feed, index).await {
                Ok(found) if !found.is_empty() => {
                    desk_debug!("{} served {} items for {}", source.name(), found.len(), feed.abbr);
                    items = found;
                    break;
                }
                Ok(_) => {}
                Err(err) => desk_warn!("Feed source failed for {}: {}", feed.abbr, err),
            }
        }
        if items.is_empty() {
            return OutputBlock::message(NO_ITEMS).into();
        }
        BlockBuilder::new()
            .heading(format!("Feed: {}", feed.abbr), 30)
            .feed_items(&items)
            .blank()
            .build()
            .into()
    }

    async fn ticker(&self, symbol: &str) -> OutputBlock {
        for provider in &self.quotes {
            match provider.lookup(symbol).await {
                Ok(block) => {
                    desk_info!("Ticker {} answered by {}", symbol, provider.name());
                    return block;
                }
                Err(err) => desk_warn!("Ticker stage {} failed: {}", provider.name(), err),
            }
        }
        OutputBlock::message(STOCK_FAILURE)
    }

    async fn guide(&self) -> OutputBlock {
        let index = self.feed_index_or_empty().await;
        let mut block = BlockBuilder::new().heading("News RSS Feeds", 18);
        for (idx, feed) in index.feeds.iter().enumerate() {
            block.push(format!("{:>2}. {:<6} {}", idx + 1, feed.abbr, feed.title));
        }
        let mut block = block.blank().heading("Trading Widgets", 18);
        for widget in Widget::ALL {
            block.push(format!("{:>2}. {}", widget.number(), widget.title()));
        }
        block
            .blank()
            .heading("Specials", 18)
            .line("STOCK TICKER   — Stock Lookup (price, fundamentals, news)")
            .line("CMDTY          — Commodities Snapshot (price, 1w, 1m change)")
            .line("LM             — LiveUAMap")
            .line("FT today       — All Financial Times articles published today")
            .blank()
            .line("Select a feed by number, abbreviation, or title.")
            .line(format!(
                "Usage: <n> TICKER on the STOCK slot or \"STOCK AAPL\". Specials: CMDTY, LM. Widgets: {}+",
                Widget::ALL[0].number()
            ))
            .blank()
            .build()
    }

    async fn commodities(&self) -> OutputBlock {
        let rows = match self.context.store().load_commodities().await {
            Ok(rows) => rows,
            Err(err) => return OutputBlock::message(format!("Failed to load commodities: {err}")),
        };
        let mut block = BlockBuilder::new().heading("Commodities Snapshot", 20);
        for row in &rows {
            block.push(format!(
                "{}: {}  |  1w {}  |  1m {}",
                row.name,
                display_value(&row.current),
                display_value(&row.w),
                display_value(&row.m)
            ));
        }
        block
            .blank()
            .line("Note: Yahoo continuous futures; 1w≈5 trading days, 1m≈21 trading days.")
            .build()
    }

    async fn ft_today(&self) -> OutputBlock {
        let today = (self.clock)().date_naive();
        let mut todays = Vec::new();
        let mut last_error: Option<ProviderError> = None;
        for search in &self.news {
            match search.search(FT_TODAY_QUERY).await {
                Ok(items) => {
                    todays = published_on(items, today);
                    if !todays.is_empty() {
                        break;
                    }
                }
                Err(err) => {
                    desk_warn!("FT today search failed: {}", err);
                    last_error = Some(err);
                }
            }
        }

        let mut block = BlockBuilder::new().heading(
            "FT today — Financial Times articles published today",
            50,
        );
        if todays.is_empty() {
            match last_error {
                Some(err) => block.push(format!("No FT items found. Last error: {err}")),
                None => block.push("No FT items found for today."),
            }
        }
        let items: Vec<FeedItem> = todays.into_iter().map(|(_, item)| item).collect();
        block.feed_items(&items).blank().build()
    }

    /// One line per tape: market moves, then headlines. Either document
    /// may be missing on its own; the other still shows.
    pub async fn tape(&self) -> OutputBlock {
        let store = self.context.store();
        let markets = match store.load_markets().await {
            Ok(ticks) => ticks,
            Err(err) => {
                desk_warn!("Markets tape unavailable: {}", err);
                Vec::new()
            }
        };
        let headlines = match store.load_headlines().await {
            Ok(items) => items,
            Err(err) => {
                desk_warn!("Headline tape unavailable: {}", err);
                Vec::new()
            }
        };

        let markets = markets_line(&markets);
        let headlines = headlines_line(&headlines);
        if markets.is_empty() && headlines.is_empty() {
            return OutputBlock::message(TAPE_UNAVAILABLE);
        }
        let mut block = BlockBuilder::new();
        if !markets.is_empty() {
            block = block.heading("Markets", 7).line(markets);
        }
        if !headlines.is_empty() {
            block = block.heading("Headlines", 9).line(headlines);
        }
        block.blank().build()
    }

    /// Recent articles by or about `contact`: the prebuilt map when it has
    /// an entry, a live news search otherwise.
    pub async fn recent_work(&self, contact: &ContactRecord) -> OutputBlock {
        let heading = format!("Recent work for {} — {}", contact.name, contact.organization)
            .trim()
            .to_string();

        match self.context.recent_map().await {
            Ok(map) => {
                if let Some(items) = map.get(&contact.recent_key()).filter(|i| !i.is_empty()) {
                    return recent_block(&heading, items);
                }
            }
            Err(err) => desk_debug!("No prebuilt recent work: {}", err),
        }

        let query = contact.recent_query();
        let mut last_error = None;
        for search in &self.news {
            match search.search(&query).await {
                Ok(items) if !items.is_empty() => return recent_block(&heading, &items),
                Ok(_) => return OutputBlock::message(format!("No recent work found for {}.", contact.name)),
                Err(err) => {
                    desk_warn!("Recent work search failed: {}", err);
                    last_error = Some(err);
                }
            }
        }
        match last_error {
            Some(err) => OutputBlock::message(format!(
                "Failed to fetch recent work for {}: {err}",
                contact.name
            )),
            None => OutputBlock::message(format!("No recent work found for {}.", contact.name)),
        }
    }
}

fn open_widget(widget: Widget) -> Outcome {
    Outcome::OpenUrl {
        url: widget.url().to_string(),
        label: widget.title().to_string(),
    }
}

fn markets_line(ticks: &[MarketTick]) -> String {
    ticks
        .iter()
        .map(|tick| {
            let arrow = if tick.is_up() { '▲' } else { '▼' };
            format!("{} {} {arrow} {}", tick.label, tick.price, tick.pct)
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("   |   ")
}

fn headlines_line(headlines: &[Headline]) -> String {
    headlines
        .iter()
        .map(|h| h.title.trim())
        .filter(|title| !title.is_empty())
        .collect::<Vec<_>>()
        .join("   •   ")
}

fn recent_block(heading: &str, items: &[FeedItem]) -> OutputBlock {
    let items = &items[..items.len().min(SEARCH_LIMIT)];
    BlockBuilder::new()
        .heading(heading, 40)
        .feed_items(items)
        .blank()
        .build()
}

/// Items whose publication date falls on `today` in local time, newest first.
fn published_on(
    items: Vec<FeedItem>,
    today: chrono::NaiveDate,
) -> Vec<(DateTime<Local>, FeedItem)> {
    let mut todays: Vec<_> = items
        .into_iter()
        .filter_map(|item| {
            let published = parse_pub_date(&item.pub_date)?.with_timezone(&Local);
            (published.date_naive() == today).then_some((published, item))
        })
        .collect();
    todays.sort_by(|a, b| b.0.cmp(&a.0));
    todays
}

fn parse_pub_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn item(title: &str, date: &str) -> FeedItem {
        FeedItem {
            title: title.to_string(),
            link: String::new(),
            pub_date: date.to_string(),
        }
    }

    #[test]
    fn market_ticks_show_direction_and_keep_tape_separators() {
        let tick = |label: &str, price: &str, pct: &str, dir: f64| MarketTick {
            label: label.to_string(),
            price: price.to_string(),
            pct: pct.to_string(),
            dir,
        };
        let line = markets_line(&[
            tick("S&P 500", "5100.25", "+0.42%", 0.42),
            tick("Gold", "n/a", "", 0.0),
            tick("USD/JPY", "151.10", "-0.10%", -0.1),
        ]);
        assert_eq!(
            line,
            "S&P 500 5100.25 ▲ +0.42%   |   Gold n/a ▲   |   USD/JPY 151.10 ▼ -0.10%"
        );
    }

    #[test]
    fn blank_headlines_are_skipped() {
        let headline = |title: &str| Headline {
            title: title.to_string(),
            link: String::new(),
        };
        assert_eq!(
            headlines_line(&[headline(" Senate votes "), headline(""), headline("Budget deal")]),
            "Senate votes   •   Budget deal"
        );
    }

    #[test]
    fn publication_dates_accept_rss_and_atom_forms() {
        assert!(parse_pub_date("Tue, 02 Jan 2024 08:00:00 GMT").is_some());
        assert!(parse_pub_date("2024-01-02T08:00:00Z").is_some());
        assert!(parse_pub_date("yesterday").is_none());
        assert!(parse_pub_date("").is_none());
    }

    #[test]
    fn only_todays_items_survive_newest_first() {
        let now = Local.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
        let items = vec![
            item("morning", &(now - Duration::hours(3)).to_rfc2822()),
            item("old", &(now - Duration::days(2)).to_rfc2822()),
            item("noon", &now.to_rfc2822()),
            item("undated", ""),
        ];
        let titles: Vec<_> = published_on(items, now.date_naive())
            .into_iter()
            .map(|(_, item)| item.title)
            .collect();
        assert_eq!(titles, vec!["noon", "morning"]);
    }
}
