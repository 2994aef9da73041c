//! Newsdesk core: CSV directory ingestion, command grammar and the pure
//! state machine behind the console.
mod csv;
mod directory;
mod effect;
mod feeds;
mod filter;
mod msg;
mod output;
mod selection;
mod state;
mod update;
mod view_model;

pub use csv::{parse_csv, parse_csv_bytes, write_csv, CsvRecord, ParseError};
pub use directory::{
    load_directory, load_directory_bytes, ContactRecord, DirectorySnapshot, Schema, UnknownSchema,
};
pub use effect::Effect;
pub use feeds::{FeedDescriptor, FeedIndex, FeedItem, FEED_INDEX_PATH};
pub use filter::{filter_records, FilterSpec};
pub use msg::Msg;
pub use output::{BlockBuilder, Outcome, OutputBlock, OutputLog, INVALID_SELECTION};
pub use selection::{
    parse_selection, resolve_index, resolve_search, IndexTarget, Selection, Special, Widget,
    TICKER_SLOT_ABBR, WIDGET_BASE,
};
pub use state::{AppState, DirectoryStatus, RequestId};
pub use update::update;
pub use view_model::{AppViewModel, ContactRowView};
