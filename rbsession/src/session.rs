//! The session state machine
//!
//! One [`Session`] owns the whole client lifecycle:
//!
//! ```text
//! credentials -> login -> station list -> initial station
//!     -> loop { cleanup | advance/fetch/start | input | time } until quit
//! ```
//!
//! Every loop step runs sequentially on one task; the bounded-wait input
//! read doubles as the loop's pacing. No failure inside the loop terminates
//! the session: remote errors clear `next_station` (stop autoplay) and the
//! user decides what happens next.

use crate::error::{Error, Result};
use crate::input::{HotkeyPoller, InputSource};
use crate::persist::SessionState;
use crate::player::Player;
use crate::ui::{MsgKind, Ui};
use rbconfig::Config;
use rbevents::{
    EventDispatcher, EVENT_GET_STATIONS, EVENT_LOGIN, EVENT_SONG_FINISH, EVENT_SONG_START,
    EVENT_STATION_FETCH_PLAYLIST,
};
use rbplaylist::{History, Playlist};
use rbproto::{find_station_by_id, AudioQuality, Operation, RequestExecutor, Station};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Bounded wait for one keystroke per loop iteration
const INPUT_TIMEOUT: Duration = Duration::from_millis(1000);

/// The top-level session controller
pub struct Session {
    config: Arc<Config>,
    executor: RequestExecutor,
    dispatcher: EventDispatcher,
    pub(crate) player: Box<dyn Player>,
    pub(crate) input: Box<dyn InputSource>,
    hotkeys: Box<dyn HotkeyPoller>,
    pub(crate) ui: Ui,

    pub(crate) stations: Vec<Station>,
    pub(crate) cur_station: Option<Station>,
    pub(crate) next_station: Option<Station>,
    pub(crate) playlist: Playlist,
    pub(crate) history: History,
    retries: u32,
    pub(crate) quit: bool,

    username: String,
    password: String,
    pub(crate) autoselect: bool,
    quality: AudioQuality,
    gain_mul: f32,
    max_player_errors: u32,
    autostart: Option<String>,
}

impl Session {
    /// Assemble a session from its collaborators (leaves constructed first)
    pub fn new(
        config: Arc<Config>,
        executor: RequestExecutor,
        dispatcher: EventDispatcher,
        player: Box<dyn Player>,
        input: Box<dyn InputSource>,
        hotkeys: Box<dyn HotkeyPoller>,
    ) -> Self {
        let quality = AudioQuality::from_config(&config.get_audio_quality()).unwrap_or_else(|| {
            warn!(
                value = %config.get_audio_quality(),
                "unknown audio quality, falling back to default"
            );
            AudioQuality::default()
        });
        Self {
            ui: Ui::from_config(&config),
            history: History::new(config.get_history_size()),
            autoselect: config.get_autoselect(),
            gain_mul: config.get_gain_multiplier() as f32,
            max_player_errors: config.get_max_player_errors() as u32,
            autostart: config.get_autostart_station(),
            quality,
            config,
            executor,
            dispatcher,
            player,
            input,
            hotkeys,
            stations: Vec::new(),
            cur_station: None,
            next_station: None,
            playlist: Playlist::new(),
            retries: 0,
            quit: false,
            username: String::new(),
            password: String::new(),
        }
    }

    /// Seed the session from a previous run's state file
    pub fn preload_state(&mut self, state: SessionState) {
        if self.autostart.is_none() {
            self.autostart = state.station_id;
        }
        self.history.preload(state.history);
    }

    /// Station selected to play next; `None` means "stop after the current
    /// song"
    pub fn next_station(&self) -> Option<&Station> {
        self.next_station.as_ref()
    }

    /// Consecutive playback-start failures on the current station
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Drain the session for shutdown persistence
    pub fn snapshot_state(&mut self) -> SessionState {
        SessionState {
            station_id: self.cur_station.as_ref().map(|s| s.id.clone()),
            station_name: self.cur_station.as_ref().map(|s| s.name.clone()),
            playlist: self.playlist.take_all(),
            history: self.history.take_all(),
            saved_at: chrono::Utc::now(),
        }
    }

    /// Run the session to completion: initial handshake, then the main loop
    /// until `quit`
    pub async fn run(&mut self) -> Result<()> {
        self.ensure_credentials().await?;
        self.login().await?;
        self.fetch_stations().await?;
        self.select_initial_station().await;

        while !self.quit {
            // song finished playing, clean up
            if self.player.is_stopped() {
                self.player_cleanup();
            }

            // check whether the player is idle and start the next song
            if self.player.is_finished() && self.next_station.is_some() {
                if let Some(song) = self.playlist.pop_front() {
                    self.history.prepend(song);
                }
                if self.playlist.is_empty() && self.next_station.is_some() && !self.quit {
                    let changed = match (&self.next_station, &self.cur_station) {
                        (Some(next), Some(cur)) => next.id != cur.id,
                        (Some(_), None) => true,
                        _ => false,
                    };
                    if changed {
                        if let Some(next) = &self.next_station {
                            self.ui.print_station(next);
                        }
                    }
                    self.fetch_playlist().await;
                }
                // song ready to play
                if self.playlist.front().is_some() {
                    self.start_playback();
                }
            }

            self.handle_input().await;

            // show time
            if self.player.is_playing() || self.player.is_paused() {
                self.print_time();
            }
        }
        Ok(())
    }

    /// Collect credentials from config, helper command or interactive prompt
    async fn ensure_credentials(&mut self) -> Result<()> {
        let (mut username, mut password) = self.config.get_credentials();
        let username_from_config = username.is_some();

        if username.is_none() {
            self.ui.msg(MsgKind::Question, "Email: ");
            username = self.input.read_line().await.filter(|s| !s.is_empty());
        }

        if password.is_none() && username.is_some() {
            if let Some(helper) = self.config.get_password_command() {
                self.ui
                    .msg(MsgKind::Info, "Requesting password from external helper... ");
                match run_password_helper(&helper).await {
                    Ok(output) if !output.is_empty() => {
                        self.ui.msg(MsgKind::None, "Ok.\n");
                        password = Some(output);
                    }
                    Ok(_) => self.ui.msg(MsgKind::None, "Error: empty output.\n"),
                    Err(e) => self.ui.msg(MsgKind::None, &format!("Error: {e}\n")),
                }
            } else {
                if username_from_config {
                    self.ui.msg(
                        MsgKind::Question,
                        &format!("Email: {}\n", username.as_deref().unwrap_or("")),
                    );
                }
                self.ui.msg(MsgKind::Question, "Password: ");
                password = self.input.read_secret().await.filter(|s| !s.is_empty());
            }
        }

        match (username, password) {
            (Some(username), Some(password)) => {
                self.executor.set_credentials(&username, &password);
                self.username = username;
                self.password = password;
                Ok(())
            }
            _ => Err(Error::MissingCredentials),
        }
    }

    /// Execute one remote operation, printing the outcome the way every
    /// remote exchange is reported to the user
    pub(crate) async fn remote_call(&mut self, op: &mut Operation) -> rbproto::Result<()> {
        let result = self.executor.execute(op).await;
        match &result {
            Ok(()) => self.ui.msg(MsgKind::None, "Ok.\n"),
            Err(e) => self.ui.msg(MsgKind::None, &format!("Error: {e}\n")),
        }
        result
    }

    async fn login(&mut self) -> Result<()> {
        self.ui.msg(MsgKind::Info, "Login... ");
        let mut op = Operation::login(&self.username, &self.password);
        let result = self.remote_call(&mut op).await;
        self.dispatcher
            .dispatch(EVENT_LOGIN, None, None, &outcome(&result));
        Ok(result?)
    }

    async fn fetch_stations(&mut self) -> Result<()> {
        self.ui.msg(MsgKind::Info, "Get stations... ");
        let mut op = Operation::get_stations();
        let result = self.remote_call(&mut op).await;
        if result.is_ok() {
            self.stations = op.take_stations();
        }
        self.dispatcher
            .dispatch(EVENT_GET_STATIONS, None, None, &outcome(&result));
        Ok(result?)
    }

    /// Autostart station if configured, interactive selection otherwise
    async fn select_initial_station(&mut self) {
        if let Some(id) = &self.autostart {
            match find_station_by_id(&self.stations, id) {
                Some(station) => self.next_station = Some(station.clone()),
                None => self
                    .ui
                    .msg(MsgKind::Err, "Error: Autostart station not found.\n"),
            }
        }
        // no autostart? ask the user
        if self.next_station.is_none() {
            self.next_station = self
                .ui
                .select_station(
                    self.input.as_mut(),
                    &self.stations,
                    "Select station: ",
                    self.autoselect,
                )
                .await;
        }
    }

    /// Fetch a new playlist for `next_station` and make it current.
    ///
    /// Any failure or an empty answer clears `next_station`: autoplay stops,
    /// the session keeps running.
    async fn fetch_playlist(&mut self) {
        let Some(next) = self.next_station.clone() else {
            return;
        };
        self.ui.msg(MsgKind::Info, "Receiving new playlist... ");
        let mut op = Operation::get_playlist(&next.id, self.quality);
        let result = self.remote_call(&mut op).await;
        match &result {
            Err(_) => self.next_station = None,
            Ok(()) => {
                self.playlist.replace(op.take_songs());
                if self.playlist.is_empty() {
                    self.ui.msg(MsgKind::Info, "No tracks left.\n");
                    self.next_station = None;
                }
            }
        }
        self.cur_station = self.next_station.clone();
        self.dispatcher.dispatch(
            EVENT_STATION_FETCH_PLAYLIST,
            self.cur_station.as_ref(),
            self.playlist.front(),
            &outcome(&result),
        );
    }

    /// Start playing the playlist head
    fn start_playback(&mut self) {
        let Some(song) = self.playlist.front() else {
            return;
        };

        // show the real station for quick-mix tracks
        let origin = self
            .cur_station
            .as_ref()
            .filter(|station| station.is_quick_mix)
            .and_then(|_| song.station_id.as_deref())
            .and_then(|id| find_station_by_id(&self.stations, id));
        self.ui.print_song(song, origin);

        // avoid playing local files
        if !is_remote_audio_url(&song.audio_url) {
            self.ui.msg(MsgKind::Err, "Invalid song url.\n");
            return;
        }

        let gain = song.file_gain * self.gain_mul;
        self.player.set_gain(gain);
        self.player.open(&song.audio_url);

        self.dispatcher.dispatch(
            EVENT_SONG_START,
            self.cur_station.as_ref(),
            self.playlist.front(),
            "ok",
        );

        if self.player.play() {
            self.retries = 0;
        } else {
            self.retries += 1;
            debug!(retries = self.retries, "playback start failed");
        }
    }

    /// The player is done with a song: fire the event, release resources and
    /// bail out of autoplay after too many consecutive start failures
    fn player_cleanup(&mut self) {
        self.dispatcher.dispatch(
            EVENT_SONG_FINISH,
            self.cur_station.as_ref(),
            self.playlist.front(),
            "ok",
        );

        self.player.finish();

        if self.retries >= self.max_player_errors {
            // don't continue playback if the player reports too many errors
            self.next_station = None;
            self.retries = 0;
        }
    }

    /// Bounded-wait keystroke read; an idle timeout polls the hotkey
    /// collaborator instead
    async fn handle_input(&mut self) {
        match self.input.read_key(INPUT_TIMEOUT).await {
            Some(key) => self.dispatch_command(key, true).await,
            None => {
                if let Some(key) = self.hotkeys.poll() {
                    self.dispatch_command(key, true).await;
                }
            }
        }
    }

    fn print_time(&self) {
        let duration = match self.player.duration_secs() {
            d if d > 0.0 => d,
            // the stream did not report a duration, use the catalog length
            _ => self
                .playlist
                .front()
                .map(|s| s.length_secs as f64)
                .unwrap_or(0.0),
        };
        self.ui.print_time(self.player.elapsed_secs(), duration);
    }
}

/// Render a remote-call result for event dispatch diagnostics
fn outcome(result: &rbproto::Result<()>) -> String {
    match result {
        Ok(()) => "ok".to_string(),
        Err(e) => e.to_string(),
    }
}

/// Only well-formed remote URLs reach the player
fn is_remote_audio_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Run the configured password helper and capture its trimmed stdout
async fn run_password_helper(command: &str) -> Result<String> {
    let output = tokio::process::Command::new("sh")
        .arg("-c")
        .arg(command)
        .output()
        .await?;
    if !output.status.success() {
        return Err(Error::PasswordHelper(format!(
            "exit status {}",
            output.status
        )));
    }
    let password = String::from_utf8_lossy(&output.stdout)
        .trim_end_matches('\n')
        .to_string();
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_urls_are_accepted() {
        assert!(is_remote_audio_url("http://audio.example.net/t1"));
        assert!(is_remote_audio_url("https://audio.example.net/t1?x=1"));
    }

    #[test]
    fn local_paths_are_rejected() {
        assert!(!is_remote_audio_url("file:///tmp/song.mp3"));
        assert!(!is_remote_audio_url("/tmp/song.mp3"));
        assert!(!is_remote_audio_url("C:\\songs\\song.mp3"));
        assert!(!is_remote_audio_url(""));
    }

    #[test]
    fn outcome_renders_ok_and_errors() {
        assert_eq!(outcome(&Ok(())), "ok");
        let err = rbproto::Error::api(13, "station removed");
        assert!(outcome(&Err(err)).contains("station removed"));
    }
}
