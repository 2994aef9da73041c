use std::sync::Arc;

use chrono::{Local, TimeZone};
use newsdesk_core::{FeedDescriptor, FeedIndex};
use newsdesk_engine::{
    FeedContent, FetchSettings, Fetcher, FinnhubProvider, LiveRssFeedContent, NewsQuoteFallback,
    NewsSearch, ProviderError, QuoteProvider, ReqwestFetcher, RssNewsSearch, YahooProvider,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RSS: &str = r#"<?xml version="1.0"?><rss version="2.0"><channel>
<item><title>Chipmaker beats estimates</title><link>https://news.example/a</link><pubDate>Tue, 05 Mar 2024 09:00:00 GMT</pubDate></item>
<item><title>Analysts react</title><link>https://news.example/b</link></item>
</channel></rss>"#;

fn fetcher() -> Arc<dyn Fetcher> {
    Arc::new(ReqwestFetcher::new(FetchSettings::default()))
}

async fn rss_server(query: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rss/search"))
        .and(query_param("q", query))
        .and(query_param("hl", "en-US"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(RSS, "application/rss+xml"))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn rss_search_sends_query_and_parses_items() {
    let server = rss_server("\"Ada Park\" site:washingtonpost.com").await;
    let search = RssNewsSearch::with_base("mock-news", format!("{}/rss/search", server.uri()), fetcher());

    let items = search
        .search("\"Ada Park\" site:washingtonpost.com")
        .await
        .expect("items");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].title, "Chipmaker beats estimates");
    assert_eq!(items[1].link, "https://news.example/b");
}

#[tokio::test]
async fn rss_search_failures_name_the_provider() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let search = RssNewsSearch::with_base("mock-news", format!("{}/rss/search", server.uri()), fetcher());

    let err = search.search("anything").await.unwrap_err();
    assert_eq!(err.provider(), "mock-news");
    assert!(matches!(err, ProviderError::Fetch { .. }));
}

#[tokio::test]
async fn live_feed_content_reads_descriptor_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(RSS, "text/xml"))
        .mount(&server)
        .await;
    let feed = FeedDescriptor::new("CHIP", "Chip News", format!("{}/feed.xml", server.uri()));

    let items = LiveRssFeedContent::new(fetcher())
        .items(&feed, &FeedIndex::default())
        .await
        .expect("items");
    assert_eq!(items.len(), 2);

    let no_url = FeedDescriptor::new("NONE", "No Url", "");
    let err = LiveRssFeedContent::new(fetcher())
        .items(&no_url, &FeedIndex::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Unavailable { .. }));
}

async fn finnhub_server() -> MockServer {
    let server = MockServer::start().await;
    let mounts = [
        (
            "/api/v1/quote",
            json!({"c": 180.5, "d": 2.5, "dp": 1.4045, "h": 181.0, "l": 177.25}),
        ),
        (
            "/api/v1/stock/profile2",
            json!({"name": "Apple Inc", "ticker": "AAPL", "currency": "USD",
                   "marketCapitalization": 2800000.0, "finnhubIndustry": "Technology"}),
        ),
        (
            "/api/v1/stock/metric",
            json!({"metric": {"52WeekLow": 164.08, "52WeekHigh": 199.62,
                              "peBasicExclExtraTTM": 29.456, "grossMarginTTM": 45.03,
                              "dividendPerShareTTM": 0.9025}}),
        ),
        (
            "/api/v1/company-news",
            json!([{"headline": "Apple ships", "url": "https://news.example/apple",
                    "source": "Wire", "datetime": 1709629200}]),
        ),
    ];
    for (route, body) in mounts {
        Mock::given(method("GET"))
            .and(path(route))
            .and(query_param("symbol", "AAPL"))
            .and(query_param("token", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
    }
    server
}

#[tokio::test]
async fn finnhub_formats_quote_fundamentals_and_news() {
    let server = finnhub_server().await;
    let now = Local.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
    let provider = FinnhubProvider::new(server.uri(), "test-key", fetcher(), Arc::new(move || now));

    let block = provider.lookup("AAPL").await.expect("quote");
    let lines: Vec<&str> = block.lines().iter().map(String::as_str).collect();
    assert_eq!(
        &lines[..5],
        &[
            "Apple Inc (AAPL)",
            "Price: 180.5 USD",
            "Change: 2.5 (1.40%)",
            "Market Cap: 2.80T",
            "",
        ]
    );
    assert!(lines.contains(&"Day Range: 177.25 - 181"));
    assert!(lines.contains(&"52W Range: 164.08 - 199.62"));
    assert!(lines.contains(&"PE (TTM): 29.46"));
    assert!(lines.contains(&"Dividend Yield: 0.50%"));
    assert!(lines.contains(&"Gross Margins: 45.03%"));
    assert!(lines.contains(&"Sector/Industry: Technology"));
    assert!(lines.contains(&" 1. Apple ships"));
    assert!(lines.contains(&"    Wire Tue, 05 Mar 2024 09:00:00"));
}

#[tokio::test]
async fn finnhub_unknown_symbol_is_an_empty_answer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/quote"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"c": 0, "d": null, "dp": null})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/stock/profile2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    let provider = FinnhubProvider::new(server.uri(), "k", fetcher(), Arc::new(Local::now));

    let err = provider.lookup("ZZZZ").await.unwrap_err();
    assert!(matches!(err, ProviderError::Empty { provider: "finnhub", .. }));
}

#[tokio::test]
async fn yahoo_tries_hosts_in_order() {
    let down = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&down)
        .await;
    let up = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v7/finance/quote"))
        .and(query_param("symbols", "MSFT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "quoteResponse": {"result": [{
                "shortName": "Microsoft", "regularMarketPrice": 410.2,
                "regularMarketChange": -1.5, "regularMarketChangePercent": -0.3644
            }]}
        })))
        .mount(&up)
        .await;

    let provider = YahooProvider::new(vec![down.uri(), up.uri()], fetcher(), None);
    let block = provider.lookup("MSFT").await.expect("quote");
    let lines: Vec<&str> = block.lines().iter().map(String::as_str).collect();
    assert_eq!(
        lines,
        vec![
            "Microsoft (MSFT)",
            "Price: 410.2",
            "Change: -1.5 (-0.36%)",
            "",
            "Latest News",
            "-----------",
            "No news found.",
            "",
        ]
    );
}

#[tokio::test]
async fn yahoo_reports_a_failed_news_search() {
    let quotes = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v7/finance/quote"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "quoteResponse": {"result": [{"shortName": "Apple", "regularMarketPrice": 190.1}]}
        })))
        .mount(&quotes)
        .await;
    let news_down = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&news_down)
        .await;
    let search: Arc<dyn NewsSearch> = Arc::new(RssNewsSearch::with_base(
        "mock-news",
        format!("{}/rss/search", news_down.uri()),
        fetcher(),
    ));

    let provider = YahooProvider::new(vec![quotes.uri()], fetcher(), Some(search));
    let block = provider.lookup("AAPL").await.expect("quote");
    let text = block.text();
    assert!(text.contains("News unavailable: mock-news: http status 503"), "{text}");
    assert!(!text.contains("No news found."), "{text}");
}

#[tokio::test]
async fn news_fallback_needs_at_least_one_headline() {
    let server = rss_server("NVDA").await;
    let search: Arc<dyn NewsSearch> = Arc::new(RssNewsSearch::with_base(
        "mock-news",
        format!("{}/rss/search", server.uri()),
        fetcher(),
    ));

    let block = NewsQuoteFallback::new(search).lookup("NVDA").await.expect("news");
    assert_eq!(block.lines()[0], "NVDA");
    assert!(block.text().contains(" 2. Analysts react"));

    let empty = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<rss><channel></channel></rss>", "text/xml"),
        )
        .mount(&empty)
        .await;
    let search: Arc<dyn NewsSearch> = Arc::new(RssNewsSearch::with_base(
        "mock-news",
        format!("{}/rss/search", empty.uri()),
        fetcher(),
    ));
    let err = NewsQuoteFallback::new(search).lookup("NVDA").await.unwrap_err();
    assert!(matches!(err, ProviderError::Empty { .. }));
}
