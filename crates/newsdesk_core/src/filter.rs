use crate::directory::{ContactRecord, DirectorySnapshot};

/// Active predicates over a directory. `None` or blank values pass everything.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSpec {
    pub organization: Option<String>,
    pub topic: Option<String>,
    pub query: Option<String>,
}

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        active(&self.organization).is_none()
            && active(&self.topic).is_none()
            && active(&self.query).is_none()
    }

    pub fn matches(&self, record: &ContactRecord) -> bool {
        if let Some(org) = active(&self.organization) {
            if record.organization != org {
                return false;
            }
        }
        if let Some(topic) = active(&self.topic) {
            if record.topic != topic {
                return false;
            }
        }
        if let Some(query) = active(&self.query) {
            if !record.search_text().contains(&query.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Records matching every active predicate, in load order.
pub fn filter_records<'a>(
    snapshot: &'a DirectorySnapshot,
    spec: &FilterSpec,
) -> Vec<&'a ContactRecord> {
    snapshot
        .records
        .iter()
        .filter(|record| spec.matches(record))
        .collect()
}
