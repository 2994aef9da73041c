use crate::filter::{filter_records, FilterSpec};
use crate::view_model::{AppViewModel, ContactRowView};
use crate::{ContactRecord, DirectorySnapshot, FeedDescriptor, OutputBlock, OutputLog, Schema};

pub type RequestId = u64;

/// Directory panel status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectoryStatus {
    #[default]
    Empty,
    Loading,
    Ready,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    schema: Schema,
    directory: DirectorySnapshot,
    status: DirectoryStatus,
    filter: FilterSpec,
    selected: Option<usize>,
    feeds: Vec<FeedDescriptor>,
    output: OutputLog,
    last_request_id: RequestId,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema(&self) -> Schema {
        self.schema
    }

    pub fn feeds(&self) -> &[FeedDescriptor] {
        &self.feeds
    }

    pub fn output(&self) -> &OutputLog {
        &self.output
    }

    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    pub fn visible_records(&self) -> Vec<&ContactRecord> {
        filter_records(&self.directory, &self.filter)
    }

    pub fn selected_record(&self) -> Option<&ContactRecord> {
        self.selected
            .and_then(|pos| self.visible_records().get(pos).copied())
    }

    pub fn view(&self) -> AppViewModel {
        let rows = self
            .visible_records()
            .into_iter()
            .enumerate()
            .map(|(position, record)| ContactRowView {
                position,
                name: record.name.clone(),
                organization: record.organization.clone(),
                topic: record.topic.clone(),
                email: record.email.clone(),
                selected: self.selected == Some(position),
            })
            .collect();

        AppViewModel {
            schema: self.schema,
            status: self.status,
            total_records: self.directory.len(),
            rows,
            organizations: self.directory.organizations.clone(),
            topics: self.directory.topics.clone(),
            filter: self.filter.clone(),
            feed_count: self.feeds.len(),
            output: self.output.iter().cloned().collect(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn next_request_id(&mut self) -> RequestId {
        self.last_request_id += 1;
        self.last_request_id
    }

    /// Switch directories. The old snapshot is dropped immediately.
    pub(crate) fn begin_load(&mut self, schema: Schema) {
        self.schema = schema;
        self.directory = DirectorySnapshot {
            schema,
            ..DirectorySnapshot::default()
        };
        self.status = DirectoryStatus::Loading;
        self.filter = FilterSpec::default();
        self.selected = None;
        self.mark_dirty();
    }

    /// Install a snapshot if it belongs to the current schema. Returns false
    /// for stale loads.
    pub(crate) fn apply_directory(&mut self, snapshot: DirectorySnapshot) -> bool {
        if snapshot.schema != self.schema {
            return false;
        }
        self.directory = snapshot;
        self.status = DirectoryStatus::Ready;
        self.selected = None;
        self.mark_dirty();
        true
    }

    pub(crate) fn fail_directory(&mut self, schema: Schema) -> bool {
        if schema != self.schema {
            return false;
        }
        self.status = DirectoryStatus::Failed;
        self.mark_dirty();
        true
    }

    pub(crate) fn set_feeds(&mut self, feeds: Vec<FeedDescriptor>) {
        self.feeds = feeds;
        self.mark_dirty();
    }

    pub(crate) fn update_filter(&mut self, apply: impl FnOnce(&mut FilterSpec)) {
        let before = self.filter.clone();
        apply(&mut self.filter);
        if self.filter != before {
            self.selected = None;
            self.mark_dirty();
        }
    }

    pub(crate) fn select_row(&mut self, position: usize) -> bool {
        if position >= self.visible_records().len() {
            return false;
        }
        self.selected = Some(position);
        self.mark_dirty();
        true
    }

    pub(crate) fn push_output(&mut self, block: OutputBlock) {
        self.output.push(block);
        self.mark_dirty();
    }
}
