use std::fs;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

use desk_logging::{desk_error, desk_info, desk_warn};
use newsdesk_core::{Effect, Msg};
use newsdesk_engine::{EngineEvent, EngineHandle};

/// Executes effects from `update`: engine work is queued, local side
/// effects run inline and report back as notices.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn run(&self, effects: Vec<Effect>) -> Vec<String> {
        let mut notices = Vec::new();
        for effect in effects {
            match effect {
                Effect::LoadDirectory { schema } => {
                    desk_info!("LoadDirectory schema={}", schema);
                    self.engine.load_directory(schema);
                }
                Effect::LoadFeeds => self.engine.load_feeds(),
                Effect::Execute {
                    request_id,
                    selection,
                } => {
                    desk_info!("Execute request_id={} selection={:?}", request_id, selection);
                    self.engine.execute(request_id, selection);
                }
                Effect::FetchRecentWork {
                    request_id,
                    contact,
                } => {
                    desk_info!("FetchRecentWork request_id={} name={}", request_id, contact.name);
                    self.engine.recent_work(request_id, contact);
                }
                Effect::LoadTape { request_id } => self.engine.tape(request_id),
                Effect::OpenUrl { url } => {
                    if let Err(err) = open_url(&url) {
                        desk_warn!("Could not open {}: {}", url, err);
                        notices.push(format!("Could not open a browser; visit {url}"));
                    }
                }
                Effect::WriteCsv { path, contents } => match write_export(Path::new(&path), &contents) {
                    Ok(()) => {
                        desk_info!("Exported {} bytes to {}", contents.len(), path);
                        notices.push(format!("Exported to {path}"));
                    }
                    Err(err) => {
                        desk_error!("Export to {} failed: {}", path, err);
                        notices.push(format!("Export to {path} failed: {err}"));
                    }
                },
            }
        }
        notices
    }

    /// Engine events that arrived since the last poll, as messages.
    pub fn poll(&self) -> Vec<Msg> {
        std::iter::from_fn(|| self.engine.try_recv())
            .filter_map(event_to_msg)
            .collect()
    }
}

fn event_to_msg(event: EngineEvent) -> Option<Msg> {
    match event {
        EngineEvent::DirectoryLoaded(snapshot) => Some(Msg::DirectoryLoaded(snapshot)),
        EngineEvent::DirectoryFailed { schema, message } => {
            desk_warn!("Directory {} failed to load: {}", schema, message);
            Some(Msg::DirectoryFailed { schema, message })
        }
        EngineEvent::FeedsLoaded(feeds) => Some(Msg::FeedsLoaded(feeds)),
        EngineEvent::FeedsFailed { message } => {
            desk_warn!("Feed index failed to load: {}", message);
            None
        }
        EngineEvent::CommandFinished {
            request_id,
            outcome,
        } => Some(Msg::CommandFinished {
            request_id,
            outcome,
        }),
    }
}

/// Write the export, creating parent directories as needed.
pub fn write_export(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}

fn open_url(url: &str) -> io::Result<()> {
    let mut command = if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else if cfg!(target_os = "macos") {
        Command::new("open")
    } else {
        Command::new("xdg-open")
    };
    command
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
}
