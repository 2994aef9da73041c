use crate::{DirectoryStatus, FilterSpec, OutputBlock, Schema};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub schema: Schema,
    pub status: DirectoryStatus,
    pub total_records: usize,
    pub rows: Vec<ContactRowView>,
    pub organizations: Vec<String>,
    pub topics: Vec<String>,
    pub filter: FilterSpec,
    pub feed_count: usize,
    /// Newest block first.
    pub output: Vec<OutputBlock>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRowView {
    pub position: usize,
    pub name: String,
    pub organization: String,
    pub topic: String,
    pub email: String,
    pub selected: bool,
}
