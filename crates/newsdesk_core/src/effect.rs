use crate::{ContactRecord, RequestId, Schema, Selection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadDirectory { schema: Schema },
    LoadFeeds,
    Execute { request_id: RequestId, selection: Selection },
    FetchRecentWork { request_id: RequestId, contact: ContactRecord },
    LoadTape { request_id: RequestId },
    OpenUrl { url: String },
    WriteCsv { path: String, contents: String },
}
