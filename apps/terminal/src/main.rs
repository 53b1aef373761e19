mod commands;
mod view;

use std::io::{self, Write};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use commands::{Command, HELP_TEXT};
use tubeplay_core::config::AppConfig;
use tubeplay_core::playback::PauseOutcome;
use tubeplay_core::session::{PlayerEvent, PlayerEvents, SessionManager};
use tubeplay_core::telemetry::init_tracing;
use view::{Output, PlayerView};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    let _guard = init_tracing(&config.telemetry)?;

    info!(target: "terminal", "tubeplay starting");
    let (manager, events) = SessionManager::new(config);
    let outcome = run(&manager, events).await;

    manager.shutdown().await;
    info!(target: "terminal", "tubeplay exited");
    outcome
}

enum Flow {
    Continue,
    Quit,
}

async fn run(manager: &SessionManager, mut events: PlayerEvents) -> Result<()> {
    let mut console = Console::new();
    let mut view = PlayerView::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    console.write(&Output::Line(view::IDLE_LABEL.to_string()))?;
    console.write(&Output::Line("type `help` for commands".to_string()))?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read from stdin")? else {
                    info!(target: "terminal", "stdin closed");
                    break;
                };
                if let Flow::Quit = handle_line(manager, &mut view, &mut console, &line).await? {
                    break;
                }
            }
            Some(event) = events.recv() => {
                match event {
                    PlayerEvent::Search(event) => {
                        for output in view.apply_search(event) {
                            console.write(&output)?;
                        }
                    }
                    PlayerEvent::Playback(update) => {
                        if let Some(output) = view.apply_update(&update) {
                            console.write(&output)?;
                        }
                    }
                }
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(err) = signal {
                    warn!(target: "terminal", %err, "failed to listen for ctrl-c");
                }
                info!(target: "terminal", "interrupted");
                break;
            }
        }
    }

    console.write(&Output::Line("bye".to_string()))?;
    Ok(())
}

async fn handle_line(
    manager: &SessionManager,
    view: &mut PlayerView,
    console: &mut Console,
    line: &str,
) -> Result<Flow> {
    let command = match Command::parse(line) {
        Ok(command) => command,
        Err(commands::CommandError::Empty) => return Ok(Flow::Continue),
        Err(err) => {
            console.write(&Output::Line(err.to_string()))?;
            return Ok(Flow::Continue);
        }
    };

    match command {
        Command::Search(query) => {
            let request_id = manager.search(&query);
            console.write(&view.search_dispatched(request_id, &query))?;
        }
        Command::Play(number) => {
            let Some(result) = view.result(number).cloned() else {
                console.write(&Output::Line(format!(
                    "no result {number}; search first or pick 1-{}",
                    view.results().len().max(1)
                )))?;
                return Ok(Flow::Continue);
            };
            match manager.play(&result).await {
                Ok(session_id) => view.play_started(session_id, &result.title),
                Err(err) => console.write(&view.play_failed(&err.to_string()))?,
            }
        }
        Command::Pause => {
            if !view.pause_enabled() {
                console.write(&Output::Line("nothing is streaming".to_string()))?;
            } else if manager.pause_toggle().await == PauseOutcome::Inactive {
                console.write(&Output::Line("playback already ended".to_string()))?;
            }
        }
        Command::Stop => {
            if !manager.stop().await {
                console.write(&Output::Line("nothing to stop".to_string()))?;
            }
        }
        Command::Status => {
            let status = manager.status().await;
            for output in view.describe(&status) {
                console.write(&output)?;
            }
        }
        Command::Help => console.write(&Output::Line(HELP_TEXT.to_string()))?,
        Command::Quit => return Ok(Flow::Quit),
    }

    Ok(Flow::Continue)
}

/// 状态行原地刷新，其它输出各占一行。
struct Console {
    stdout: io::Stdout,
    status_open: bool,
}

impl Console {
    fn new() -> Self {
        Self {
            stdout: io::stdout(),
            status_open: false,
        }
    }

    fn write(&mut self, output: &Output) -> io::Result<()> {
        let mut out = self.stdout.lock();
        if self.status_open {
            write!(out, "\r\x1b[2K")?;
        }
        match output {
            Output::Status(text) => {
                write!(out, "{text}")?;
                self.status_open = true;
            }
            Output::Line(text) => {
                writeln!(out, "{text}")?;
                self.status_open = false;
            }
            Output::Alert(text) => {
                writeln!(out, "\x1b[1;31m!! {text}\x1b[0m")?;
                self.status_open = false;
            }
        }
        out.flush()
    }
}
