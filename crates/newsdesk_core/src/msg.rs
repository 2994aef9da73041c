#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Console started: load the default directory, the feed list, the
    /// tapes and the guide.
    Started,
    /// User picked a directory; replaces the loaded snapshot once it arrives.
    ModeSelected(crate::Schema),
    /// Engine finished parsing a directory.
    DirectoryLoaded(crate::DirectorySnapshot),
    /// Engine could not fetch or decode a directory.
    DirectoryFailed { schema: crate::Schema, message: String },
    /// Feed descriptors arrived from the feed index.
    FeedsLoaded(Vec<crate::FeedDescriptor>),
    /// Organization facet chosen (`None` clears it).
    OrganizationChanged(Option<String>),
    /// Topic facet chosen (`None` clears it).
    TopicChanged(Option<String>),
    /// Free-text table search edited.
    QueryChanged(String),
    /// User selected a row (0-based position in the filtered table).
    RowSelected(usize),
    /// User asked for the selected person's recent work.
    RecentWorkRequested,
    /// User submitted a console command line.
    CommandSubmitted(String),
    /// Engine produced the result of a command or lookup.
    CommandFinished {
        request_id: crate::RequestId,
        outcome: crate::Outcome,
    },
    /// User asked for the market and headline tapes.
    TapeRequested,
    /// User asked to save the filtered table as CSV.
    ExportRequested { path: String },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
