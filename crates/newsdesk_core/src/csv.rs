use std::collections::BTreeMap;

use thiserror::Error;

/// One data row keyed by (trimmed) header name.
pub type CsvRecord = BTreeMap<String, String>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("input is not valid UTF-8 (first bad byte at offset {offset})")]
    InvalidUtf8 { offset: usize },
}

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Decode raw bytes as UTF-8 and parse them. This is the only fallible entry
/// point: malformed quoting never fails, undecodable bytes do.
pub fn parse_csv_bytes(bytes: &[u8]) -> Result<Vec<CsvRecord>, ParseError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = std::str::from_utf8(bytes).map_err(|err| ParseError::InvalidUtf8 {
        offset: err.valid_up_to(),
    })?;
    Ok(parse_csv(text))
}

/// Parse delimited text with RFC4180-style quoting into header-keyed records.
///
/// - a leading byte-order mark is ignored
/// - `\n`, `\r\n` and a bare `\r` all end a row
/// - columns with an empty header are dropped
/// - rows whose fields are all blank are skipped
/// - values are trimmed
pub fn parse_csv(text: &str) -> Vec<CsvRecord> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut rows = split_rows(text).into_iter();

    let Some(header_row) = rows.next() else {
        return Vec::new();
    };
    let headers: Vec<String> = header_row.iter().map(|h| h.trim().to_string()).collect();

    rows.filter(|cols| cols.iter().any(|c| !c.trim().is_empty()))
        .map(|cols| {
            headers
                .iter()
                .enumerate()
                .filter(|(_, key)| !key.is_empty())
                .map(|(idx, key)| {
                    let value = cols.get(idx).map(|c| c.trim()).unwrap_or_default();
                    (key.clone(), value.to_string())
                })
                .collect()
        })
        .collect()
}

fn split_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(ch);
            }
            continue;
        }

        match ch {
            '"' => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\r' | '\n' => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            _ => field.push(ch),
        }
    }

    // A trailing newline leaves a lone empty field behind; it is not a row.
    row.push(field);
    if row.len() > 1 || !row[0].is_empty() {
        rows.push(row);
    }
    rows
}

/// Serialize rows with RFC4180 quoting. Fields containing a comma, quote or
/// line break are quoted, embedded quotes are doubled.
pub fn write_csv<H, R, F>(headers: &[H], rows: R) -> String
where
    H: AsRef<str>,
    R: IntoIterator,
    R::Item: IntoIterator<Item = F>,
    F: AsRef<str>,
{
    let mut out = String::new();
    write_row(&mut out, headers.iter().map(AsRef::as_ref));
    for row in rows {
        let fields: Vec<F> = row.into_iter().collect();
        write_row(&mut out, fields.iter().map(AsRef::as_ref));
    }
    out
}

fn write_row<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (idx, field) in fields.enumerate() {
        if idx > 0 {
            out.push(',');
        }
        if field.contains([',', '"', '\n', '\r']) {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out.push('\n');
}
