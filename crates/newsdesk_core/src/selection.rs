//! Command-line grammar: `<index> [<ticker>] | <keyword> [<arg>] | <free text>`.
//!
//! Parsing is a pure function of the input and the known feed list. Resolving
//! a selection to a feed or widget is also pure; only the dispatcher does I/O.

use crate::feeds::FeedDescriptor;

/// Numbered entries after this value are widgets rather than feeds.
pub const WIDGET_BASE: usize = 41;

/// Abbreviation of the feed-list slot that turns `<index> <ticker>` into a
/// ticker lookup.
pub const TICKER_SLOT_ABBR: &str = "STOCK";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Special {
    Guide,
    LiveMap,
    Commodities,
    FtToday,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Invalid,
    FeedIndex(usize),
    FeedSearch(String),
    TickerLookup(String),
    NamedSpecial(Special),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arity {
    /// The keyword must be the whole input.
    Bare,
    /// The keyword is the first token; anything after it is ignored.
    Leading,
    /// The keyword takes exactly one following token as a ticker symbol.
    Symbol,
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Special(Special),
    Ticker,
}

struct Keyword {
    word: &'static str,
    arity: Arity,
    action: Action,
}

const KEYWORDS: &[Keyword] = &[
    Keyword { word: "guide", arity: Arity::Bare, action: Action::Special(Special::Guide) },
    Keyword { word: "help", arity: Arity::Bare, action: Action::Special(Special::Guide) },
    Keyword { word: "list", arity: Arity::Bare, action: Action::Special(Special::Guide) },
    Keyword { word: "options", arity: Arity::Bare, action: Action::Special(Special::Guide) },
    Keyword { word: "lm", arity: Arity::Leading, action: Action::Special(Special::LiveMap) },
    Keyword { word: "cmdty", arity: Arity::Leading, action: Action::Special(Special::Commodities) },
    Keyword { word: "fttoday", arity: Arity::Leading, action: Action::Special(Special::FtToday) },
    Keyword { word: "fttd", arity: Arity::Leading, action: Action::Special(Special::FtToday) },
    Keyword { word: "stock", arity: Arity::Symbol, action: Action::Ticker },
];

/// Multi-word inputs that name a special outright.
const PHRASES: &[(&str, Special)] = &[("ft today", Special::FtToday)];

/// Parse a raw command line against the known feeds.
pub fn parse_selection(input: &str, feeds: &[FeedDescriptor]) -> Selection {
    let text = input.trim();
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let Some(first) = tokens.first().copied() else {
        return Selection::Invalid;
    };

    if first.bytes().all(|b| b.is_ascii_digit()) {
        let Ok(index) = first.parse::<usize>() else {
            return Selection::Invalid;
        };
        if let Some(symbol) = tokens.get(1) {
            if is_ticker_slot(index, feeds) {
                return Selection::TickerLookup(symbol.to_uppercase());
            }
        }
        return Selection::FeedIndex(index);
    }

    if let Some(keyword) = KEYWORDS
        .iter()
        .find(|k| k.word.eq_ignore_ascii_case(first))
    {
        let matched = match keyword.arity {
            Arity::Bare => tokens.len() == 1,
            Arity::Leading => true,
            Arity::Symbol => {
                if tokens.len() < 2 {
                    return Selection::Invalid;
                }
                true
            }
        };
        if matched {
            return match keyword.action {
                Action::Special(special) => Selection::NamedSpecial(special),
                Action::Ticker => Selection::TickerLookup(tokens[1].to_uppercase()),
            };
        }
    }

    let normalized = tokens.join(" ").to_lowercase();
    if let Some((_, special)) = PHRASES.iter().find(|(phrase, _)| *phrase == normalized) {
        return Selection::NamedSpecial(*special);
    }

    Selection::FeedSearch(text.to_string())
}

fn is_ticker_slot(index: usize, feeds: &[FeedDescriptor]) -> bool {
    index
        .checked_sub(1)
        .and_then(|i| feeds.get(i))
        .is_some_and(|feed| feed.abbr.eq_ignore_ascii_case(TICKER_SLOT_ABBR))
}

/// Exact abbreviation match first, then title substring; first in list order.
/// Both comparisons ignore case.
pub fn resolve_search<'a>(text: &str, feeds: &'a [FeedDescriptor]) -> Option<&'a FeedDescriptor> {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    feeds
        .iter()
        .find(|f| f.abbr.to_lowercase() == needle)
        .or_else(|| feeds.iter().find(|f| f.title.to_lowercase().contains(&needle)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widget {
    AdvancedChart,
    StockHeatmap,
    Screener,
    FundamentalData,
    CompanyProfile,
    EconomicMap,
    EconomicCalendar,
    GeoBrowser,
}

impl Widget {
    pub const ALL: [Widget; 8] = [
        Widget::AdvancedChart,
        Widget::StockHeatmap,
        Widget::Screener,
        Widget::FundamentalData,
        Widget::CompanyProfile,
        Widget::EconomicMap,
        Widget::EconomicCalendar,
        Widget::GeoBrowser,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Widget::AdvancedChart => "Advanced Chart",
            Widget::StockHeatmap => "Stock Heatmap",
            Widget::Screener => "Screener",
            Widget::FundamentalData => "Fundamental Data",
            Widget::CompanyProfile => "Company Profile",
            Widget::EconomicMap => "Economic Map",
            Widget::EconomicCalendar => "Economic Calendar",
            Widget::GeoBrowser => "Geo Browser",
        }
    }

    /// External page opened for this widget.
    pub fn url(self) -> &'static str {
        match self {
            Widget::AdvancedChart => "https://www.tradingview.com/chart/?symbol=AAPL",
            Widget::StockHeatmap => "https://www.tradingview.com/heatmap/stock/",
            Widget::Screener => "https://www.tradingview.com/screener/",
            Widget::FundamentalData => {
                "https://www.tradingview.com/symbols/AAPL/financials-overview/"
            }
            Widget::CompanyProfile => "https://www.tradingview.com/symbols/AAPL/company-profile/",
            Widget::EconomicMap => "https://www.tradingview.com/economic-map/",
            Widget::EconomicCalendar => {
                "https://www.tradingview.com/markets/fx/economic-calendar/"
            }
            Widget::GeoBrowser => "https://www.openstreetmap.org/",
        }
    }

    /// 1-based command number shown in the guide.
    pub fn number(self) -> usize {
        let pos = Widget::ALL
            .iter()
            .position(|w| *w == self)
            .unwrap_or_default();
        WIDGET_BASE + pos + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexTarget<'a> {
    Feed(&'a FeedDescriptor),
    Widget(Widget),
}

/// Map a 1-based command number to a feed or widget slot.
pub fn resolve_index(index: usize, feeds: &[FeedDescriptor]) -> Option<IndexTarget<'_>> {
    if let Some(feed) = index.checked_sub(1).and_then(|i| feeds.get(i)) {
        return Some(IndexTarget::Feed(feed));
    }
    index
        .checked_sub(WIDGET_BASE + 1)
        .and_then(|i| Widget::ALL.get(i))
        .map(|w| IndexTarget::Widget(*w))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feeds(n: usize) -> Vec<FeedDescriptor> {
        (1..=n)
            .map(|i| FeedDescriptor::new(format!("F{i}"), format!("Feed {i}"), ""))
            .collect()
    }

    #[test]
    fn numeric_with_ticker_on_stock_slot() {
        let mut list = feeds(3);
        list.push(FeedDescriptor::new("STOCK", "Stock Lookup", ""));
        assert_eq!(
            parse_selection("4 msft", &list),
            Selection::TickerLookup("MSFT".into())
        );
        assert_eq!(parse_selection("4", &list), Selection::FeedIndex(4));
        assert_eq!(parse_selection("3 msft", &list), Selection::FeedIndex(3));
    }

    #[test]
    fn stock_keyword_requires_symbol() {
        assert_eq!(parse_selection("STOCK", &[]), Selection::Invalid);
        assert_eq!(
            parse_selection("Stock brk.b extra", &[]),
            Selection::TickerLookup("BRK.B".into())
        );
    }

    #[test]
    fn guide_words_must_stand_alone() {
        assert_eq!(
            parse_selection(" HELP ", &[]),
            Selection::NamedSpecial(Special::Guide)
        );
        assert_eq!(
            parse_selection("help wanted", &[]),
            Selection::FeedSearch("help wanted".into())
        );
    }

    #[test]
    fn ft_today_phrase_and_aliases() {
        for input in ["ft today", "FT   Today", "fttoday", "FTTD"] {
            assert_eq!(
                parse_selection(input, &[]),
                Selection::NamedSpecial(Special::FtToday),
                "{input}"
            );
        }
        assert_eq!(parse_selection("ft", &[]), Selection::FeedSearch("ft".into()));
    }

    #[test]
    fn oversized_index_is_invalid() {
        assert_eq!(
            parse_selection("99999999999999999999999", &[]),
            Selection::Invalid
        );
    }

    #[test]
    fn index_resolves_feeds_then_widgets() {
        let list = feeds(2);
        assert_eq!(resolve_index(2, &list), Some(IndexTarget::Feed(&list[1])));
        assert_eq!(resolve_index(0, &list), None);
        assert_eq!(resolve_index(3, &list), None);
        assert_eq!(
            resolve_index(42, &list),
            Some(IndexTarget::Widget(Widget::AdvancedChart))
        );
        assert_eq!(
            resolve_index(49, &list),
            Some(IndexTarget::Widget(Widget::GeoBrowser))
        );
        assert_eq!(resolve_index(50, &list), None);
        assert_eq!(Widget::EconomicCalendar.number(), 48);
    }

    #[test]
    fn search_falls_back_to_title_substring() {
        let list = vec![
            FeedDescriptor::new("BBC", "BBC World", ""),
            FeedDescriptor::new("NYT", "New York Times World", ""),
        ];
        assert_eq!(resolve_search("world", &list).map(|f| f.abbr.as_str()), Some("BBC"));
        assert_eq!(resolve_search("nyt", &list).map(|f| f.abbr.as_str()), Some("NYT"));
        assert_eq!(resolve_search("reuters", &list), None);
    }
}
