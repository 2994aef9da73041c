use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use desk_logging::desk_error;
use newsdesk_core::{ContactRecord, RequestId, Schema, Selection};

use crate::config::EngineConfig;
use crate::dispatch::Dispatcher;
use crate::fetch::{Fetcher, ReqwestFetcher};
use crate::EngineEvent;

enum EngineCommand {
    LoadDirectory { schema: Schema },
    LoadFeeds,
    Execute { request_id: RequestId, selection: Selection },
    RecentWork { request_id: RequestId, contact: ContactRecord },
    Tape { request_id: RequestId },
}

/// Owns a background thread running a tokio runtime. Commands go in over one
/// channel, [`EngineEvent`]s come back over another.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> std::io::Result<Self> {
        let fetcher: Arc<dyn Fetcher> = Arc::new(ReqwestFetcher::new(config.fetch.clone()));
        Self::with_dispatcher(Dispatcher::from_config(&config, fetcher))
    }

    pub fn with_dispatcher(dispatcher: Dispatcher) -> std::io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let dispatcher = Arc::new(dispatcher);

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let dispatcher = dispatcher.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(&dispatcher, command, event_tx).await;
                });
            }
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn load_directory(&self, schema: Schema) {
        self.send(EngineCommand::LoadDirectory { schema });
    }

    pub fn load_feeds(&self) {
        self.send(EngineCommand::LoadFeeds);
    }

    pub fn execute(&self, request_id: RequestId, selection: Selection) {
        self.send(EngineCommand::Execute {
            request_id,
            selection,
        });
    }

    pub fn recent_work(&self, request_id: RequestId, contact: ContactRecord) {
        self.send(EngineCommand::RecentWork {
            request_id,
            contact,
        });
    }

    pub fn tape(&self, request_id: RequestId) {
        self.send(EngineCommand::Tape { request_id });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            desk_error!("Engine thread has stopped; command dropped");
        }
    }
}

async fn handle_command(
    dispatcher: &Dispatcher,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::LoadDirectory { schema } => {
            match dispatcher.context().store().load_directory(schema).await {
                Ok(snapshot) => EngineEvent::DirectoryLoaded(snapshot),
                Err(err) => EngineEvent::DirectoryFailed {
                    schema,
                    message: err.to_string(),
                },
            }
        }
        EngineCommand::LoadFeeds => match dispatcher.context().feed_index().await {
            Ok(index) => EngineEvent::FeedsLoaded(index.feeds.clone()),
            Err(err) => EngineEvent::FeedsFailed {
                message: err.to_string(),
            },
        },
        EngineCommand::Execute {
            request_id,
            selection,
        } => EngineEvent::CommandFinished {
            request_id,
            outcome: dispatcher.dispatch(&selection).await,
        },
        EngineCommand::RecentWork {
            request_id,
            contact,
        } => EngineEvent::CommandFinished {
            request_id,
            outcome: dispatcher.recent_work(&contact).await.into(),
        },
        EngineCommand::Tape { request_id } => EngineEvent::CommandFinished {
            request_id,
            outcome: dispatcher.tape().await.into(),
        },
    };
    let _ = event_tx.send(event);
}
