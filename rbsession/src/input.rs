//! User-input collaborator contracts and the default terminal implementation

use async_trait::async_trait;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::time::Duration;
use tokio::task;
use tracing::warn;

/// Input collaborator: bounded-wait keystrokes plus line-based prompts
#[async_trait]
pub trait InputSource: Send {
    /// Wait up to `timeout` for a single command keystroke.
    ///
    /// This doubles as the session loop's pacing mechanism: when nothing is
    /// typed the call returns `None` after the timeout.
    async fn read_key(&mut self, timeout: Duration) -> Option<char>;

    /// Read a full input line; `None` on end-of-input
    async fn read_line(&mut self) -> Option<String>;

    /// Read a line without echoing it (passwords); `None` on end-of-input
    async fn read_secret(&mut self) -> Option<String>;
}

/// OS-level hotkey collaborator, polled when no regular input arrived
pub trait HotkeyPoller: Send {
    fn poll(&mut self) -> Option<char>;
}

/// Default hotkey poller: no OS hotkeys registered
pub struct NoopHotkeys;

impl HotkeyPoller for NoopHotkeys {
    fn poll(&mut self) -> Option<char> {
        None
    }
}

/// Terminal input via crossterm events
pub struct CrosstermInput;

#[async_trait]
impl InputSource for CrosstermInput {
    async fn read_key(&mut self, timeout: Duration) -> Option<char> {
        let key = task::spawn_blocking(move || -> Option<char> {
            if !event::poll(timeout).ok()? {
                return None;
            }
            match event::read().ok()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char(c) => Some(c),
                    _ => None,
                },
                _ => None,
            }
        })
        .await;
        key.unwrap_or_else(|e| {
            warn!(error = %e, "input task failed");
            None
        })
    }

    async fn read_line(&mut self) -> Option<String> {
        task::spawn_blocking(|| {
            let mut line = String::new();
            match std::io::stdin().read_line(&mut line) {
                Ok(0) | Err(_) => None,
                Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            }
        })
        .await
        .ok()
        .flatten()
    }

    async fn read_secret(&mut self) -> Option<String> {
        task::spawn_blocking(|| {
            // collect keystrokes in raw mode so nothing is echoed
            enable_raw_mode().ok()?;
            let mut line = String::new();
            let entered = loop {
                match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => match key.code {
                        KeyCode::Enter => break true,
                        KeyCode::Backspace => {
                            line.pop();
                        }
                        KeyCode::Char(c) => line.push(c),
                        KeyCode::Esc => break false,
                        _ => {}
                    },
                    Ok(_) => {}
                    Err(_) => break false,
                }
            };
            let _ = disable_raw_mode();
            println!();
            entered.then_some(line)
        })
        .await
        .ok()
        .flatten()
    }
}
