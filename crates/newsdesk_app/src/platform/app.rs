use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use desk_logging::desk_info;
use newsdesk_core::{update, AppState, Msg};
use newsdesk_engine::EngineHandle;

use super::config::AppConfig;
use super::console::{parse_line, ConsoleInput, HELP};
use super::effects::EffectRunner;
use super::render::{facet_list, Renderer};

/// How often engine results are polled while waiting for input.
const TICK: Duration = Duration::from_millis(75);

pub fn run_app() -> anyhow::Result<()> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref())?;
    desk_logging::initialize(config.log.destination(), config.log.level());
    desk_info!("newsdesk starting with {:?}", config_path);

    let engine = EngineHandle::new(config.engine_config()?).context("starting engine runtime")?;
    let mut session = Session::new(EffectRunner::new(engine));

    let (input_tx, input_rx) = mpsc::channel::<ConsoleInput>();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let input = match line {
                Ok(line) => parse_line(&line),
                Err(_) => ConsoleInput::Quit,
            };
            let quit = input == ConsoleInput::Quit;
            if input_tx.send(input).is_err() || quit {
                return;
            }
        }
        let _ = input_tx.send(ConsoleInput::Quit);
    });

    println!("newsdesk: type a desk command, or :help for console commands.");
    session.dispatch(Msg::Started);

    loop {
        match input_rx.recv_timeout(TICK) {
            Ok(ConsoleInput::Quit) | Err(RecvTimeoutError::Disconnected) => break,
            Ok(ConsoleInput::Send(msg)) => session.dispatch(msg),
            Ok(ConsoleInput::ShowTable) => session.show_table(),
            Ok(ConsoleInput::ShowFacet(facet)) => {
                session.print(&facet_list(&session.state.view(), facet))
            }
            Ok(ConsoleInput::ShowHelp) => session.print(&format!("{HELP}\n")),
            Ok(ConsoleInput::Error(message)) => session.print(&format!("{message}\n")),
            Ok(ConsoleInput::Nothing) | Err(RecvTimeoutError::Timeout) => {}
        }
        for msg in session.runner.poll() {
            session.dispatch(msg);
        }
    }

    desk_info!("newsdesk exiting");
    Ok(())
}

struct Session {
    state: AppState,
    renderer: Renderer,
    runner: EffectRunner,
}

impl Session {
    fn new(runner: EffectRunner) -> Self {
        Self {
            state: AppState::new(),
            renderer: Renderer::default(),
            runner,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        let view = was_dirty.then(|| state.view());
        self.state = state;

        let notices = self.runner.run(effects);
        if let Some(view) = view {
            let text = self.renderer.render(&view);
            self.print(&text);
        }
        for notice in notices {
            self.print(&format!("{notice}\n"));
        }
    }

    fn show_table(&mut self) {
        self.renderer.invalidate_table();
        let text = self.renderer.render(&self.state.view());
        self.print(&text);
    }

    fn print(&self, text: &str) {
        if text.is_empty() {
            return;
        }
        let mut stdout = io::stdout().lock();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }
}
