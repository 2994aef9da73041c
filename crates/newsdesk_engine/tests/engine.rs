use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use newsdesk_core::{Outcome, Schema, Selection, Special};
use newsdesk_engine::{
    system_clock, BundleFeedContent, DataRoot, DataStore, DispatchContext, Dispatcher,
    EngineEvent, EngineHandle, FetchSettings, ReqwestFetcher, TAPE_UNAVAILABLE,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WAIT: Duration = Duration::from_secs(5);

const FEEDS_JSON: &str = r#"{
  "feeds": [{"abbr": "FT", "title": "Financial Times", "url": ""},
            {"abbr": "STOCK", "title": "Stock Lookup", "url": ""}],
  "data": {"FT": [{"title": "Headline", "link": "https://ft.example/1", "pubDate": "Tue, 05 Mar 2024 09:00:00 GMT"}]}
}"#;

fn write_bundle(root: &Path) {
    std::fs::create_dir_all(root.join("data")).unwrap();
    std::fs::write(root.join("data/feeds.json"), FEEDS_JSON).unwrap();
    std::fs::write(
        root.join("data/dc_researchers_with_emails_CONSOLIDATED.csv"),
        "\u{feff}name,think_tank,topic,email\nAda,Brookings,Trade,ada@brookings.edu\nBen,CSIS,Defense,\n",
    )
    .unwrap();
}

fn handle_for(root: &Path) -> EngineHandle {
    let fetcher = Arc::new(ReqwestFetcher::new(FetchSettings::default()));
    let store = DataStore::new(DataRoot::Dir(root.to_path_buf()), fetcher);
    let dispatcher = Dispatcher::new(DispatchContext::new(store), system_clock())
        .with_feed_source(Arc::new(BundleFeedContent));
    EngineHandle::with_dispatcher(dispatcher).expect("runtime")
}

#[test]
fn engine_loads_directory_and_feeds_from_a_local_root() {
    let dir = tempfile::tempdir().unwrap();
    write_bundle(dir.path());
    let engine = handle_for(dir.path());

    engine.load_directory(Schema::Researchers);
    match engine.recv_timeout(WAIT) {
        Some(EngineEvent::DirectoryLoaded(snapshot)) => {
            assert_eq!(snapshot.len(), 2);
            assert_eq!(snapshot.organizations, vec!["Brookings", "CSIS"]);
            assert_eq!(snapshot.records[1].email, "");
        }
        other => panic!("unexpected event: {other:?}"),
    }

    engine.load_feeds();
    match engine.recv_timeout(WAIT) {
        Some(EngineEvent::FeedsLoaded(feeds)) => {
            let abbrs: Vec<_> = feeds.iter().map(|f| f.abbr.as_str()).collect();
            assert_eq!(abbrs, vec!["FT", "STOCK"]);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn missing_directory_file_is_reported_with_its_schema() {
    let dir = tempfile::tempdir().unwrap();
    let engine = handle_for(dir.path());

    engine.load_directory(Schema::Journalists);
    match engine.recv_timeout(WAIT) {
        Some(EngineEvent::DirectoryFailed { schema, message }) => {
            assert_eq!(schema, Schema::Journalists);
            assert!(message.contains("journalists_china_asia_FULL.csv"), "{message}");
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn executed_commands_carry_their_request_id() {
    let dir = tempfile::tempdir().unwrap();
    write_bundle(dir.path());
    let engine = handle_for(dir.path());

    engine.execute(7, Selection::FeedIndex(1));
    match engine.recv_timeout(WAIT) {
        Some(EngineEvent::CommandFinished { request_id, outcome }) => {
            assert_eq!(request_id, 7);
            let text = outcome.block().map(|b| b.text()).unwrap_or_default();
            assert!(text.starts_with("Feed: FT"), "{text}");
        }
        other => panic!("unexpected event: {other:?}"),
    }

    engine.execute(8, Selection::NamedSpecial(Special::LiveMap));
    match engine.recv_timeout(WAIT) {
        Some(EngineEvent::CommandFinished { request_id: 8, outcome: Outcome::OpenUrl { url, .. } }) => {
            assert_eq!(url, "https://liveuamap.com");
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn directory_that_is_not_utf8_fails_to_load() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("data")).unwrap();
    std::fs::write(
        dir.path().join("data/dc_researchers_with_emails_CONSOLIDATED.csv"),
        b"name,think_tank\nJos\xe9 \xff\xfe,CSIS\n",
    )
    .unwrap();
    let engine = handle_for(dir.path());

    engine.load_directory(Schema::Researchers);
    match engine.recv_timeout(WAIT) {
        Some(EngineEvent::DirectoryFailed { schema, message }) => {
            assert_eq!(schema, Schema::Researchers);
            assert!(message.contains("not valid UTF-8"), "{message}");
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn tape_combines_markets_and_headlines() {
    let dir = tempfile::tempdir().unwrap();
    write_bundle(dir.path());
    std::fs::write(
        dir.path().join("data/markets.json"),
        r#"[{"label": "S&P 500", "price": "5100.25", "pct": "+0.42%", "dir": 0.42},
            {"label": "WTI", "price": "78.10", "pct": "-1.05%", "dir": -1.05}]"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("data/news.json"),
        r#"[{"title": "Senate passes budget", "link": "https://politico.example/1"},
            {"title": "Governors meet"}]"#,
    )
    .unwrap();
    let engine = handle_for(dir.path());

    engine.tape(3);
    match engine.recv_timeout(WAIT) {
        Some(EngineEvent::CommandFinished { request_id, outcome }) => {
            assert_eq!(request_id, 3);
            let lines = outcome.block().map(|b| b.lines().to_vec()).unwrap_or_default();
            assert_eq!(
                lines,
                vec![
                    "Markets",
                    "-------",
                    "S&P 500 5100.25 ▲ +0.42%   |   WTI 78.10 ▼ -1.05%",
                    "Headlines",
                    "---------",
                    "Senate passes budget   •   Governors meet",
                    "",
                ]
            );
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn tape_survives_one_missing_document() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("data")).unwrap();
    std::fs::write(dir.path().join("data/news.json"), r#"[{"title": "Only headlines"}]"#).unwrap();
    let fetcher = Arc::new(ReqwestFetcher::new(FetchSettings::default()));
    let store = DataStore::new(DataRoot::Dir(dir.path().to_path_buf()), fetcher);
    let dispatcher = Dispatcher::new(DispatchContext::new(store), system_clock());

    assert_eq!(
        dispatcher.tape().await.text(),
        "Headlines\n---------\nOnly headlines\n"
    );

    std::fs::remove_file(dir.path().join("data/news.json")).unwrap();
    assert_eq!(dispatcher.tape().await.text(), TAPE_UNAVAILABLE);
}

#[tokio::test]
async fn data_store_reads_documents_under_a_url_root() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/desk/data/feeds.json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(FEEDS_JSON, "application/json"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/desk/data/journalists_china_asia_FULL.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "name,publication,beat,email\nLi Wei,Caixin,Markets,li@caixin.com\n",
            "text/csv; charset=utf-8",
        ))
        .mount(&server)
        .await;

    let root = DataRoot::parse(&format!("{}/desk", server.uri())).unwrap();
    let fetcher = Arc::new(ReqwestFetcher::new(FetchSettings::default()));
    let store = DataStore::new(root, fetcher);

    let index = store.load_feed_index().await.expect("feed index");
    assert_eq!(index.items("FT").len(), 1);
    assert_eq!(index.items("STOCK").len(), 0);

    let snapshot = store.load_directory(Schema::Journalists).await.expect("directory");
    assert_eq!(snapshot.records[0].organization, "Caixin");
    assert_eq!(snapshot.topics, vec!["Markets"]);
}
