use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::csv::{parse_csv, parse_csv_bytes, CsvRecord, ParseError};

/// Which contact directory is loaded. Each schema owns a fixed column mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Schema {
    #[default]
    Researchers,
    Journalists,
}

/// Column fallback chains for one schema; the first non-empty column wins.
struct ColumnMap {
    name: &'static [&'static str],
    organization: &'static [&'static str],
    topic: &'static [&'static str],
    email: &'static [&'static str],
}

const RESEARCHER_COLUMNS: ColumnMap = ColumnMap {
    name: &["name"],
    organization: &["think_tank"],
    topic: &["consolidated_topic", "topic"],
    email: &["email"],
};

const JOURNALIST_COLUMNS: ColumnMap = ColumnMap {
    name: &["name"],
    organization: &["publication"],
    topic: &["beat"],
    email: &["email"],
};

impl Schema {
    pub const ALL: [Schema; 2] = [Schema::Researchers, Schema::Journalists];

    /// Path of the CSV resource, relative to the data root.
    pub fn resource_path(self) -> &'static str {
        match self {
            Schema::Researchers => "data/dc_researchers_with_emails_CONSOLIDATED.csv",
            Schema::Journalists => "data/journalists_china_asia_FULL.csv",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Schema::Researchers => "researchers",
            Schema::Journalists => "journalists",
        }
    }

    fn columns(self) -> &'static ColumnMap {
        match self {
            Schema::Researchers => &RESEARCHER_COLUMNS,
            Schema::Journalists => &JOURNALIST_COLUMNS,
        }
    }

    pub fn map_record(self, raw: &CsvRecord) -> ContactRecord {
        let columns = self.columns();
        ContactRecord {
            name: first_present(raw, columns.name),
            organization: first_present(raw, columns.organization),
            topic: first_present(raw, columns.topic),
            email: first_present(raw, columns.email),
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown directory '{0}' (expected researchers or journalists)")]
pub struct UnknownSchema(pub String);

impl FromStr for Schema {
    type Err = UnknownSchema;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Schema::ALL
            .into_iter()
            .find(|schema| schema.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownSchema(trimmed.to_string()))
    }
}

fn first_present(raw: &CsvRecord, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| raw.get(*key))
        .find(|value| !value.is_empty())
        .cloned()
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContactRecord {
    pub name: String,
    pub organization: String,
    pub topic: String,
    pub email: String,
}

/// Publishing domains that differ from the outlet's mail domain.
const MAIL_TO_SITE: &[(&str, &str)] = &[
    ("washpost.com", "washingtonpost.com"),
    ("bloomberg.net", "bloomberg.com"),
    ("thomsonreuters.com", "reuters.com"),
    ("ap.org", "apnews.com"),
];

impl ContactRecord {
    /// Key used by the prebuilt recent-work map.
    pub fn recent_key(&self) -> String {
        format!("{}|{}|{}", self.name, self.organization, self.email)
    }

    /// News search query for this person's recent work: the quoted name,
    /// narrowed by the outlet site (from the email domain) or the quoted
    /// organization.
    pub fn recent_query(&self) -> String {
        let mut query = format!("\"{}\"", self.name);
        if let Some((_, domain)) = self.email.split_once('@') {
            let domain = domain.to_ascii_lowercase();
            let site = MAIL_TO_SITE
                .iter()
                .find(|(mail, _)| *mail == domain)
                .map(|(_, site)| (*site).to_string())
                .unwrap_or(domain);
            if !site.is_empty() {
                query.push_str(&format!(" site:{site}"));
            }
        } else if !self.organization.is_empty() {
            query.push_str(&format!(" \"{}\"", self.organization));
        }
        query
    }

    /// Haystack for free-text filtering.
    pub(crate) fn search_text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.name, self.organization, self.topic, self.email
        )
        .to_lowercase()
    }
}

/// One loaded directory. Replaced wholesale on reload, never merged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DirectorySnapshot {
    pub schema: Schema,
    pub records: Vec<ContactRecord>,
    pub organizations: Vec<String>,
    pub topics: Vec<String>,
}

impl DirectorySnapshot {
    pub fn from_records(schema: Schema, records: Vec<ContactRecord>) -> Self {
        let organizations = facet(records.iter().map(|r| r.organization.as_str()));
        let topics = facet(records.iter().map(|r| r.topic.as_str()));
        Self {
            schema,
            records,
            organizations,
            topics,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parse `text` as the CSV for `schema` and derive its facets.
pub fn load_directory(schema: Schema, text: &str) -> DirectorySnapshot {
    from_csv_records(schema, &parse_csv(text))
}

/// Like [`load_directory`] for raw resource bytes, which must be UTF-8.
pub fn load_directory_bytes(schema: Schema, bytes: &[u8]) -> Result<DirectorySnapshot, ParseError> {
    Ok(from_csv_records(schema, &parse_csv_bytes(bytes)?))
}

fn from_csv_records(schema: Schema, raw: &[CsvRecord]) -> DirectorySnapshot {
    let records = raw.iter().map(|r| schema.map_record(r)).collect();
    DirectorySnapshot::from_records(schema, records)
}

fn facet<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(ToOwned::to_owned)
        .collect()
}
