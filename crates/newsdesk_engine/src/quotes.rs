use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration};
use desk_logging::desk_warn;
use newsdesk_core::{BlockBuilder, OutputBlock};
use serde::Deserialize;
use serde_json::Value;

use crate::config::Clock;
use crate::fetch::{fetch_json, url_with_params, Fetcher};
use crate::news::{NewsSearch, SEARCH_LIMIT};
use crate::ProviderError;

const COMPANY_NEWS_DAYS: i64 = 10;

/// One stage of the ticker lookup chain.
#[async_trait::async_trait]
pub trait QuoteProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn lookup(&self, symbol: &str) -> Result<OutputBlock, ProviderError>;
}

pub struct FinnhubProvider {
    base: String,
    api_key: String,
    fetcher: Arc<dyn Fetcher>,
    clock: Clock,
}

#[derive(Debug, Default, Deserialize)]
struct FinnhubQuote {
    c: Option<f64>,
    d: Option<f64>,
    dp: Option<f64>,
    h: Option<f64>,
    l: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinnhubProfile {
    name: Option<String>,
    ticker: Option<String>,
    currency: Option<String>,
    market_capitalization: Option<f64>,
    finnhub_industry: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FinnhubMetrics {
    #[serde(default)]
    metric: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct FinnhubNews {
    #[serde(default)]
    headline: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    source: String,
    datetime: Option<i64>,
}

impl FinnhubProvider {
    pub const NAME: &'static str = "finnhub";

    pub fn new(
        base: impl Into<String>,
        api_key: impl Into<String>,
        fetcher: Arc<dyn Fetcher>,
        clock: Clock,
    ) -> Self {
        Self {
            base: base.into(),
            api_key: api_key.into(),
            fetcher,
            clock,
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let mut all = params.to_vec();
        all.push(("token", self.api_key.as_str()));
        let url = url_with_params(&format!("{}{}", self.base, path), &all)
            .map_err(|err| ProviderError::fetch(Self::NAME, err))?;
        fetch_json(self.fetcher.as_ref(), &url)
            .await
            .map_err(|err| ProviderError::fetch(Self::NAME, err))
    }
}

#[async_trait::async_trait]
impl QuoteProvider for FinnhubProvider {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn lookup(&self, symbol: &str) -> Result<OutputBlock, ProviderError> {
        let quote: FinnhubQuote = self.get("/api/v1/quote", &[("symbol", symbol)]).await?;
        let profile: FinnhubProfile = self
            .get("/api/v1/stock/profile2", &[("symbol", symbol)])
            .await?;
        // Unknown symbols come back as an all-zero quote and an empty profile.
        if profile.name.is_none() && quote.c.unwrap_or_default() == 0.0 {
            return Err(ProviderError::empty(Self::NAME, symbol));
        }
        let metrics: FinnhubMetrics = self
            .get("/api/v1/stock/metric", &[("symbol", symbol), ("metric", "all")])
            .await
            .unwrap_or_else(|err| {
                desk_warn!("Fundamentals for {} unavailable: {}", symbol, err);
                FinnhubMetrics::default()
            });

        let to = (self.clock)().date_naive();
        let from = to - Duration::days(COMPANY_NEWS_DAYS);
        let (from, to) = (from.format("%Y-%m-%d").to_string(), to.format("%Y-%m-%d").to_string());
        let news: Vec<FinnhubNews> = self
            .get(
                "/api/v1/company-news",
                &[("symbol", symbol), ("from", from.as_str()), ("to", to.as_str())],
            )
            .await
            .unwrap_or_else(|err| {
                desk_warn!("Company news for {} unavailable: {}", symbol, err);
                Vec::new()
            });

        Ok(format_finnhub(symbol, &quote, &profile, &metrics.metric, &news))
    }
}

fn format_finnhub(
    symbol: &str,
    quote: &FinnhubQuote,
    profile: &FinnhubProfile,
    metrics: &HashMap<String, Value>,
    news: &[FinnhubNews],
) -> OutputBlock {
    let name = profile
        .name
        .as_deref()
        .or(profile.ticker.as_deref())
        .filter(|n| !n.is_empty())
        .unwrap_or(symbol);
    let currency = profile.currency.as_deref().unwrap_or_default();

    let mut block = BlockBuilder::new().line(format!("{name} ({symbol})"));
    if let Some(price) = quote.c {
        block.push(format!("Price: {price} {currency}").trim_end().to_string());
    }
    if let (Some(change), Some(pct)) = (quote.d, quote.dp) {
        block.push(format!("Change: {change} ({pct:.2}%)"));
    }
    if let Some(cap) = profile.market_capitalization {
        block.push(format!("Market Cap: {}", human_number(cap * 1e6)));
    }

    let mut block = block.blank().heading("Fundamentals", 12);
    if let (Some(low), Some(high)) = (quote.l, quote.h) {
        block.push(format!("Day Range: {low} - {high}"));
    }
    if let (Some(low), Some(high)) = (
        first_number(metrics, &["52WeekLow", "fiftyTwoWeekLow"]),
        first_number(metrics, &["52WeekHigh", "fiftyTwoWeekHigh"]),
    ) {
        block.push(format!("52W Range: {low} - {high}"));
    }
    if let Some(pe) = first_number(metrics, &["peBasicExclExtraTTM", "peNormalizedAnnual"]) {
        block.push(format!("PE (TTM): {pe:.2}"));
    }
    if let Some(eps) = first_number(metrics, &["epsExclExtraItemsTTM", "epsBasicExclExtraItemsTTM"]) {
        block.push(format!("EPS (TTM): {eps:.2}"));
    }
    if let Some(yield_pct) = dividend_yield(metrics, quote.c) {
        block.push(format!("Dividend Yield: {yield_pct:.2}%"));
    }
    for (label, key) in [
        ("Gross Margins", "grossMarginTTM"),
        ("Operating Margin", "operatingMarginTTM"),
        ("Profit Margin", "netProfitMarginTTM"),
    ] {
        if let Some(pct) = first_number(metrics, &[key]).map(as_percent) {
            block.push(format!("{label}: {pct}"));
        }
    }
    if let Some(industry) = profile.finnhub_industry.as_deref().filter(|i| !i.is_empty()) {
        block.push(format!("Sector/Industry: {industry}"));
    }

    let mut block = block.blank().heading("Latest News", 11);
    if news.is_empty() {
        block.push("No news found.");
    }
    for (idx, item) in news.iter().take(SEARCH_LIMIT).enumerate() {
        let date = item
            .datetime
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .map(|dt| dt.format("%a, %d %b %Y %H:%M:%S").to_string())
            .unwrap_or_default();
        let meta = [item.source.as_str(), date.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        block.numbered(idx + 1, &item.headline, &[meta.as_str(), item.url.as_str()]);
    }
    block.blank().build()
}

fn first_number(metrics: &HashMap<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|key| metrics.get(*key))
        .filter_map(Value::as_f64)
        .find(|v| *v != 0.0)
}

/// Yield from dividend-per-share over price, else from the reported yield
/// (a fraction or a percentage, accepted only within a sane range).
fn dividend_yield(metrics: &HashMap<String, Value>, price: Option<f64>) -> Option<f64> {
    let per_share = first_number(
        metrics,
        &[
            "dividendPerShareTTM",
            "dividendPerShareAnnual",
            "dividendTTM",
            "dividendPerShareTrailing12Months",
        ],
    );
    if let (Some(per_share), Some(price)) = (per_share, price.filter(|p| *p != 0.0)) {
        return Some(per_share / price * 100.0);
    }
    let raw = first_number(
        metrics,
        &[
            "dividendYieldTTM",
            "dividendYieldIndicatedAnnual",
            "dividendYieldAnnual",
        ],
    )?;
    if raw > 0.0 && raw <= 1.0 {
        Some(raw * 100.0)
    } else if raw > 1.0 && raw < 20.0 {
        Some(raw)
    } else {
        None
    }
}

/// `1234567.0` -> `1.23M`.
pub fn human_number(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    let abs = value.abs();
    for (scale, suffix) in [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")] {
        if abs >= scale {
            return format!("{:.2}{suffix}", value / scale);
        }
    }
    format!("{value:.2}")
}

/// Ratios up to 1 are fractions; larger values are already percentages.
pub fn as_percent(value: f64) -> String {
    let pct = if value.abs() <= 1.0 { value * 100.0 } else { value };
    format!("{pct:.2}%")
}

pub struct YahooProvider {
    hosts: Vec<String>,
    fetcher: Arc<dyn Fetcher>,
    news: Option<Arc<dyn NewsSearch>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooEnvelope {
    quote_response: Option<YahooResults>,
}

#[derive(Debug, Deserialize)]
struct YahooResults {
    #[serde(default)]
    result: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooQuote {
    short_name: Option<String>,
    long_name: Option<String>,
    regular_market_price: Option<f64>,
    regular_market_change: Option<f64>,
    regular_market_change_percent: Option<f64>,
}

impl YahooProvider {
    pub const NAME: &'static str = "yahoo";

    pub fn new(
        hosts: Vec<String>,
        fetcher: Arc<dyn Fetcher>,
        news: Option<Arc<dyn NewsSearch>>,
    ) -> Self {
        Self {
            hosts,
            fetcher,
            news,
        }
    }

    async fn quote(&self, symbol: &str) -> Result<YahooQuote, ProviderError> {
        let mut last_error = ProviderError::empty(Self::NAME, symbol);
        for host in &self.hosts {
            let url = url_with_params(&format!("{host}/v7/finance/quote"), &[("symbols", symbol)])
                .map_err(|err| ProviderError::fetch(Self::NAME, err))?;
            match fetch_json::<YahooEnvelope>(self.fetcher.as_ref(), &url).await {
                Ok(envelope) => {
                    let first = envelope
                        .quote_response
                        .and_then(|r| r.result.into_iter().next());
                    if let Some(quote) = first {
                        return Ok(quote);
                    }
                }
                Err(err) => last_error = ProviderError::fetch(Self::NAME, err),
            }
        }
        Err(last_error)
    }
}

#[async_trait::async_trait]
impl QuoteProvider for YahooProvider {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn lookup(&self, symbol: &str) -> Result<OutputBlock, ProviderError> {
        let quote = self.quote(symbol).await?;
        let name = quote
            .short_name
            .or(quote.long_name)
            .unwrap_or_else(|| symbol.to_string());

        let mut block = BlockBuilder::new().line(format!("{name} ({symbol})"));
        if let Some(price) = quote.regular_market_price {
            block.push(format!("Price: {price}"));
        }
        if let (Some(change), Some(pct)) = (
            quote.regular_market_change,
            quote.regular_market_change_percent,
        ) {
            block.push(format!("Change: {change} ({pct:.2}%)"));
        }

        let mut block = block.blank().heading("Latest News", 11);
        let mut items = Vec::new();
        let mut news_failed = false;
        if let Some(news) = &self.news {
            match news.search(&format!("\"{symbol}\"")).await {
                Ok(found) => items = found,
                Err(err) => {
                    desk_warn!("News for {} unavailable: {}", symbol, err);
                    block.push(format!("News unavailable: {err}"));
                    news_failed = true;
                }
            }
        }
        if items.is_empty() && !news_failed {
            block.push("No news found.");
        }
        let items = &items[..items.len().min(SEARCH_LIMIT)];
        Ok(block.feed_items(items).blank().build())
    }
}

/// Last resort: headlines about the symbol from a generic news search.
pub struct NewsQuoteFallback {
    news: Arc<dyn NewsSearch>,
}

impl NewsQuoteFallback {
    pub const NAME: &'static str = "news-search";

    pub fn new(news: Arc<dyn NewsSearch>) -> Self {
        Self { news }
    }
}

#[async_trait::async_trait]
impl QuoteProvider for NewsQuoteFallback {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn lookup(&self, symbol: &str) -> Result<OutputBlock, ProviderError> {
        let items = self.news.search(symbol).await?;
        if items.is_empty() {
            return Err(ProviderError::empty(self.news.name(), symbol));
        }
        let items = &items[..items.len().min(SEARCH_LIMIT)];
        Ok(BlockBuilder::new()
            .line(symbol)
            .line("Quote unavailable.")
            .blank()
            .heading("Latest News", 11)
            .feed_items(items)
            .blank()
            .build())
    }
}
