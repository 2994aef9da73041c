use newsdesk_core::{FeedIndex, FeedItem};
use pretty_assertions::assert_eq;

#[test]
fn feed_index_reads_descriptors_and_items() {
    let json = r#"{
        "feeds": [
            {"abbr": "BBC", "title": "BBC World", "url": "https://feeds.bbci.co.uk/news/world/rss.xml"},
            {"abbr": "STOCK", "title": "Stock Lookup"}
        ],
        "data": {
            "BBC": [
                {"title": "One", "link": "https://bbc.co.uk/1", "pubDate": "Mon, 01 Jan 2024 10:00:00 GMT"},
                {"title": "Two", "link": null, "updated": "2024-01-01T09:00:00Z"},
                {"title": "Three", "pubdate": "", "updated": "fallback"}
            ]
        }
    }"#;

    let index: FeedIndex = serde_json::from_str(json).expect("valid index");
    assert_eq!(index.feeds.len(), 2);
    assert_eq!(index.feeds[1].url, "");
    assert_eq!(
        index.items("BBC"),
        [
            FeedItem {
                title: "One".into(),
                link: "https://bbc.co.uk/1".into(),
                pub_date: "Mon, 01 Jan 2024 10:00:00 GMT".into(),
            },
            FeedItem {
                title: "Two".into(),
                link: String::new(),
                pub_date: "2024-01-01T09:00:00Z".into(),
            },
            FeedItem {
                title: "Three".into(),
                link: String::new(),
                pub_date: "fallback".into(),
            },
        ]
    );
    assert!(index.items("STOCK").is_empty());
    assert_eq!(index.descriptor("BBC").map(|f| f.title.as_str()), Some("BBC World"));
}

#[test]
fn missing_sections_default_to_empty() {
    let index: FeedIndex = serde_json::from_str("{}").expect("empty index");
    assert!(index.feeds.is_empty());
    assert!(index.data.is_empty());
}
