//! External-player shim driving one mpv process per song
//!
//! The audio engine is out of the session core's hands: this shim spawns the
//! configured player command for each stream URL and derives the playback
//! state from the child process. Elapsed time is wall clock; the stream
//! duration is left unknown (the session falls back to the catalog length).
//! Pause is not available without an IPC channel to the player, so the
//! toggle reports that limitation instead of silently doing nothing.

use rbsession::Player;
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use std::time::Instant;
use tracing::{debug, warn};

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Playing,
    Ended,
}

struct Inner {
    pending_url: Option<String>,
    gain_db: f32,
    child: Option<Child>,
    started_at: Option<Instant>,
    state: State,
}

pub struct MpvPlayer {
    command: String,
    // the session polls state through &self, the child is mutated on poll
    inner: Mutex<Inner>,
}

impl MpvPlayer {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            inner: Mutex::new(Inner {
                pending_url: None,
                gain_db: 0.0,
                child: None,
                started_at: None,
                state: State::Idle,
            }),
        }
    }

    /// Replay gain in dB as an mpv volume percentage
    fn volume(gain_db: f32) -> u32 {
        (100.0 * 10f32.powf(gain_db / 20.0)).round().clamp(0.0, 1000.0) as u32
    }

    /// Current state, folding a finished child process in first
    fn polled_state(&self) -> State {
        let mut inner = self.inner.lock().unwrap();
        if inner.state == State::Playing {
            if let Some(child) = inner.child.as_mut() {
                match child.try_wait() {
                    Ok(Some(status)) => {
                        debug!(%status, "player process exited");
                        inner.state = State::Ended;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!(error = %e, "lost track of the player process");
                        inner.state = State::Ended;
                    }
                }
            }
        }
        inner.state
    }
}

impl Player for MpvPlayer {
    fn open(&mut self, url: &str) {
        self.inner.lock().unwrap().pending_url = Some(url.to_string());
    }

    fn set_gain(&mut self, gain_db: f32) {
        self.inner.lock().unwrap().gain_db = gain_db;
    }

    fn play(&mut self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let Some(url) = inner.pending_url.take() else {
            return false;
        };
        let spawned = Command::new(&self.command)
            .arg("--no-video")
            .arg("--really-quiet")
            .arg(format!("--volume={}", Self::volume(inner.gain_db)))
            .arg(&url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(child) => {
                inner.child = Some(child);
                inner.started_at = Some(Instant::now());
                inner.state = State::Playing;
                true
            }
            Err(e) => {
                warn!(command = %self.command, error = %e, "failed to start player");
                // a failed start still needs its cleanup pass
                inner.state = State::Ended;
                false
            }
        }
    }

    fn toggle_pause(&mut self) {
        warn!("pause is not supported by the external player shim");
    }

    fn stop(&mut self) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(child) = inner.child.as_mut() {
            let _ = child.kill();
        }
        if inner.state == State::Playing {
            inner.state = State::Ended;
        }
    }

    fn is_stopped(&self) -> bool {
        self.polled_state() == State::Ended
    }

    fn is_finished(&self) -> bool {
        self.polled_state() == State::Idle
    }

    fn is_playing(&self) -> bool {
        self.polled_state() == State::Playing
    }

    fn is_paused(&self) -> bool {
        false
    }

    fn elapsed_secs(&self) -> f64 {
        self.inner
            .lock()
            .unwrap()
            .started_at
            .map(|at| at.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration_secs(&self) -> f64 {
        0.0
    }

    fn finish(&mut self) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(mut child) = inner.child.take() {
            // reap the process; it already exited or was killed
            let _ = child.kill();
            let _ = child.wait();
        }
        inner.started_at = None;
        inner.state = State::Idle;
    }
}
