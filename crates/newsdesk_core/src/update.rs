use crate::csv::write_csv;
use crate::{parse_selection, AppState, Effect, Msg, Outcome, OutputBlock, Selection, Special};

const SELECT_FIRST: &str = "Select a person first to show recent work.";
const EXPORT_HEADERS: [&str; 4] = ["name", "organization", "topic", "email"];

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Started => {
            let schema = state.schema();
            state.begin_load(schema);
            let tape_request = state.next_request_id();
            let guide_request = state.next_request_id();
            vec![
                Effect::LoadDirectory { schema },
                Effect::LoadFeeds,
                Effect::LoadTape {
                    request_id: tape_request,
                },
                Effect::Execute {
                    request_id: guide_request,
                    selection: Selection::NamedSpecial(Special::Guide),
                },
            ]
        }
        Msg::ModeSelected(schema) => {
            state.begin_load(schema);
            vec![Effect::LoadDirectory { schema }]
        }
        Msg::DirectoryLoaded(snapshot) => {
            // A load for a directory the user already switched away from is dropped.
            state.apply_directory(snapshot);
            Vec::new()
        }
        Msg::DirectoryFailed { schema, message } => {
            if state.fail_directory(schema) {
                state.push_output(OutputBlock::message(format!(
                    "Failed to load {schema} directory: {message}"
                )));
            }
            Vec::new()
        }
        Msg::FeedsLoaded(feeds) => {
            state.set_feeds(feeds);
            Vec::new()
        }
        Msg::OrganizationChanged(org) => {
            state.update_filter(|f| f.organization = org);
            Vec::new()
        }
        Msg::TopicChanged(topic) => {
            state.update_filter(|f| f.topic = topic);
            Vec::new()
        }
        Msg::QueryChanged(query) => {
            state.update_filter(|f| f.query = Some(query).filter(|q| !q.trim().is_empty()));
            Vec::new()
        }
        Msg::RowSelected(position) => {
            state.select_row(position);
            Vec::new()
        }
        Msg::RecentWorkRequested => match state.selected_record().cloned() {
            Some(contact) => {
                let request_id = state.next_request_id();
                vec![Effect::FetchRecentWork {
                    request_id,
                    contact,
                }]
            }
            None => {
                state.push_output(OutputBlock::message(SELECT_FIRST));
                Vec::new()
            }
        },
        Msg::CommandSubmitted(raw) => {
            let command = raw.trim();
            if command.is_empty() {
                return (state, Vec::new());
            }
            match parse_selection(command, state.feeds()) {
                Selection::Invalid => {
                    state.push_output(OutputBlock::invalid_selection());
                    Vec::new()
                }
                selection => {
                    let request_id = state.next_request_id();
                    vec![Effect::Execute {
                        request_id,
                        selection,
                    }]
                }
            }
        }
        Msg::CommandFinished { outcome, .. } => match outcome {
            Outcome::Block(block) => {
                state.push_output(block);
                Vec::new()
            }
            Outcome::OpenUrl { url, label } => {
                state.push_output(OutputBlock::message(format!("Opening {label}: {url}")));
                vec![Effect::OpenUrl { url }]
            }
        },
        Msg::TapeRequested => {
            let request_id = state.next_request_id();
            vec![Effect::LoadTape { request_id }]
        }
        Msg::ExportRequested { path } => {
            let path = path.trim().to_string();
            if path.is_empty() {
                return (state, Vec::new());
            }
            let contents = write_csv(
                &EXPORT_HEADERS,
                state.visible_records().into_iter().map(|r| {
                    [
                        r.name.as_str(),
                        r.organization.as_str(),
                        r.topic.as_str(),
                        r.email.as_str(),
                    ]
                }),
            );
            vec![Effect::WriteCsv { path, contents }]
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
