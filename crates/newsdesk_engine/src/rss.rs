use newsdesk_core::FeedItem;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("malformed feed xml at byte {position}: {message}")]
pub struct FeedParseError {
    pub position: u64,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Date,
}

#[derive(Default)]
struct Draft {
    title: String,
    link: String,
    dates: Vec<String>,
    /// Elements currently open below the `<item>`/`<entry>`.
    depth: usize,
    /// Field being collected and the depth of the element that opened it.
    field: Option<(Field, usize)>,
}

impl Draft {
    fn finish(self) -> FeedItem {
        FeedItem {
            title: self.title.trim().to_string(),
            link: self.link.trim().to_string(),
            pub_date: self
                .dates
                .into_iter()
                .map(|d| d.trim().to_string())
                .find(|d| !d.is_empty())
                .unwrap_or_default(),
        }
    }
}

/// Read RSS `<item>`s, or Atom `<entry>`s when the document has no items.
/// At most `limit` entries are returned. Broken markup after the first
/// complete entry truncates the result instead of failing it.
///
/// A field collects the text of every element nested inside it, so
/// `<title>Rates <b>rise</b></title>` reads as `Rates rise`.
pub fn parse_feed(xml: &str, limit: usize) -> Result<Vec<FeedItem>, FeedParseError> {
    let mut reader = Reader::from_str(xml);

    let mut items = Vec::new();
    let mut entries = Vec::new();
    let mut draft: Option<(bool, Draft)> = None;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(err) => {
                if items.is_empty() && entries.is_empty() {
                    return Err(FeedParseError {
                        position: reader.buffer_position() as u64,
                        message: err.to_string(),
                    });
                }
                break;
            }
        };

        match event {
            Event::Start(start) => {
                let name = start.local_name();
                let tag = name.as_ref();
                if let Some((is_rss, current)) = draft.as_mut() {
                    current.depth += 1;
                    if current.field.is_none() {
                        match field_for(tag) {
                            Some(Field::Link) if !*is_rss => take_atom_href(&start, current),
                            Some(field) => {
                                if field == Field::Date {
                                    current.dates.push(String::new());
                                }
                                current.field = Some((field, current.depth));
                            }
                            None => {}
                        }
                    }
                } else if tag == b"item" {
                    draft = Some((true, Draft::default()));
                } else if tag == b"entry" {
                    draft = Some((false, Draft::default()));
                }
            }
            Event::Empty(start) => {
                if let Some((false, current)) = draft.as_mut() {
                    if start.local_name().as_ref() == b"link" {
                        take_atom_href(&start, current);
                    }
                }
            }
            Event::Text(text) => {
                if let Some((_, current)) = draft.as_mut() {
                    let value = text.unescape().map(|t| t.into_owned()).unwrap_or_default();
                    append(current, &value);
                }
            }
            Event::CData(data) => {
                if let Some((_, current)) = draft.as_mut() {
                    let value = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    append(current, &value);
                }
            }
            Event::End(_) => {
                let closes_entry = matches!(&draft, Some((_, current)) if current.depth == 0);
                if closes_entry {
                    if let Some((is_rss, current)) = draft.take() {
                        let target = if is_rss { &mut items } else { &mut entries };
                        target.push(current.finish());
                    }
                } else if let Some((_, current)) = draft.as_mut() {
                    if matches!(current.field, Some((_, depth)) if depth == current.depth) {
                        current.field = None;
                    }
                    current.depth -= 1;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let mut chosen = if items.is_empty() { entries } else { items };
    chosen.truncate(limit);
    Ok(chosen)
}

fn field_for(tag: &[u8]) -> Option<Field> {
    match tag {
        b"title" => Some(Field::Title),
        b"link" => Some(Field::Link),
        b"pubDate" | b"updated" | b"published" | b"date" => Some(Field::Date),
        _ => None,
    }
}

fn append(draft: &mut Draft, value: &str) {
    match draft.field {
        Some((Field::Title, _)) => draft.title.push_str(value),
        Some((Field::Link, _)) => draft.link.push_str(value),
        Some((Field::Date, _)) => {
            if let Some(last) = draft.dates.last_mut() {
                last.push_str(value);
            }
        }
        None => {}
    }
}

fn take_atom_href(start: &BytesStart<'_>, draft: &mut Draft) {
    let mut href = None;
    let mut rel = None;
    for attr in start.attributes().flatten() {
        let value = attr
            .unescape_value()
            .map(|v| v.into_owned())
            .unwrap_or_default();
        match attr.key.local_name().as_ref() {
            b"href" => href = Some(value),
            b"rel" => rel = Some(value),
            _ => {}
        }
    }
    let alternate = rel.as_deref().map_or(true, |r| r == "alternate");
    if let Some(href) = href {
        if draft.link.is_empty() || alternate {
            draft.link = href;
        }
    }
}
