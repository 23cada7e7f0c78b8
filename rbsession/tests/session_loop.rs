//! Session loop behavior with player/input/protocol doubles

use async_trait::async_trait;
use rbconfig::Config;
use rbevents::{CommandLauncher, EventDispatcher};
use rbproto::{
    Operation, PhysicalRequest, ProtocolCodec, Rating, RequestExecutor, Song, Station, Status,
    Transport,
};
use rbsession::{InputSource, NoopHotkeys, Player, Session};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

// ── Player double ───────────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum State {
    Idle,
    Playing,
    Paused,
    Ended,
}

#[derive(Default)]
struct PlayerProbe {
    opened: Mutex<Vec<String>>,
    gains: Mutex<Vec<f32>>,
}

/// Simulated player: a started song "plays" for `song_ticks` polls of
/// `is_stopped` before it ends on its own
struct FakePlayer {
    probe: Arc<PlayerProbe>,
    state: Mutex<State>,
    ticks_left: Mutex<u32>,
    song_ticks: u32,
    play_ok: bool,
}

impl FakePlayer {
    fn new(probe: Arc<PlayerProbe>, song_ticks: u32, play_ok: bool) -> Self {
        Self {
            probe,
            state: Mutex::new(State::Idle),
            ticks_left: Mutex::new(0),
            song_ticks,
            play_ok,
        }
    }
}

impl Player for FakePlayer {
    fn open(&mut self, url: &str) {
        self.probe.opened.lock().unwrap().push(url.to_string());
    }

    fn set_gain(&mut self, gain_db: f32) {
        self.probe.gains.lock().unwrap().push(gain_db);
    }

    fn play(&mut self) -> bool {
        if self.play_ok {
            *self.state.lock().unwrap() = State::Playing;
            *self.ticks_left.lock().unwrap() = self.song_ticks;
            true
        } else {
            // a failed start still leaves a stopped player to clean up
            *self.state.lock().unwrap() = State::Ended;
            false
        }
    }

    fn toggle_pause(&mut self) {
        let mut state = self.state.lock().unwrap();
        *state = match *state {
            State::Playing => State::Paused,
            State::Paused => State::Playing,
            other => other,
        };
    }

    fn stop(&mut self) {
        let mut state = self.state.lock().unwrap();
        if matches!(*state, State::Playing | State::Paused) {
            *state = State::Ended;
        }
    }

    fn is_stopped(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        if *state == State::Playing {
            let mut ticks = self.ticks_left.lock().unwrap();
            if *ticks == 0 {
                *state = State::Ended;
            } else {
                *ticks -= 1;
            }
        }
        *state == State::Ended
    }

    fn is_finished(&self) -> bool {
        *self.state.lock().unwrap() == State::Idle
    }

    fn is_playing(&self) -> bool {
        *self.state.lock().unwrap() == State::Playing
    }

    fn is_paused(&self) -> bool {
        *self.state.lock().unwrap() == State::Paused
    }

    fn elapsed_secs(&self) -> f64 {
        0.0
    }

    fn duration_secs(&self) -> f64 {
        0.0
    }

    fn finish(&mut self) {
        *self.state.lock().unwrap() = State::Idle;
    }
}

// ── Input double ────────────────────────────────────────────────────────────

/// Scripted input; an exhausted key script quits so no test can hang
struct FakeInput {
    keys: VecDeque<Option<char>>,
    lines: VecDeque<String>,
}

impl FakeInput {
    fn new(keys: Vec<Option<char>>, lines: Vec<&str>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
            lines: lines.into_iter().map(String::from).collect(),
        }
    }
}

#[async_trait]
impl InputSource for FakeInput {
    async fn read_key(&mut self, _timeout: Duration) -> Option<char> {
        self.keys.pop_front().unwrap_or(Some('q'))
    }

    async fn read_line(&mut self) -> Option<String> {
        self.lines.pop_front()
    }

    async fn read_secret(&mut self) -> Option<String> {
        self.lines.pop_front()
    }
}

// ── Protocol doubles ────────────────────────────────────────────────────────

struct OkTransport;

#[async_trait]
impl Transport for OkTransport {
    async fn submit(&self, _request: &PhysicalRequest) -> rbproto::Result<String> {
        Ok(String::new())
    }
}

/// Codec double depositing canned results; playlists are served in order,
/// one batch per get-playlist call
struct CannedCodec {
    stations: Vec<Station>,
    playlists: Mutex<VecDeque<Vec<Song>>>,
    ops_seen: Arc<Mutex<Vec<String>>>,
    fail_login: bool,
}

impl ProtocolCodec for CannedCodec {
    fn serialize(&self, op: &Operation) -> rbproto::Result<PhysicalRequest> {
        Ok(PhysicalRequest {
            method: op.kind().into(),
            body: serde_json::Value::Null,
        })
    }

    fn interpret(&mut self, _body: &str, op: &mut Operation) -> rbproto::Result<Status> {
        self.ops_seen.lock().unwrap().push(op.kind().to_string());
        match op {
            Operation::Login(_) if self.fail_login => {
                return Err(rbproto::Error::api(1002, "wrong credentials"));
            }
            Operation::GetStations(data) => data.stations = self.stations.clone(),
            Operation::GetPlaylist(data) => {
                data.songs = self
                    .playlists
                    .lock()
                    .unwrap()
                    .pop_front()
                    .unwrap_or_default();
            }
            _ => {}
        }
        Ok(Status::Ok)
    }
}

/// Launcher double recording the substituted command lines
#[derive(Default)]
struct RecordingLauncher {
    commands: Arc<Mutex<Vec<String>>>,
}

impl CommandLauncher for RecordingLauncher {
    fn spawn(&self, command_line: &str) -> rbevents::Result<()> {
        self.commands.lock().unwrap().push(command_line.to_string());
        Ok(())
    }
}

// ── Fixtures ────────────────────────────────────────────────────────────────

fn station(id: &str, name: &str) -> Station {
    Station {
        id: id.into(),
        name: name.into(),
        is_quick_mix: false,
        use_quick_mix: false,
        is_creator: true,
    }
}

fn song(id: &str, url: &str) -> Song {
    Song {
        id: id.into(),
        title: format!("title-{id}"),
        artist: "artist".into(),
        album: "album".into(),
        station_id: None,
        rating: Rating::None,
        length_secs: 180,
        audio_url: url.into(),
        detail_url: String::new(),
        file_gain: 0.0,
    }
}

fn http_song(id: &str) -> Song {
    song(id, &format!("http://audio.example.net/{id}"))
}

fn test_config(dir: &TempDir) -> Arc<Config> {
    let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
    config.set_username("tester@example.net").unwrap();
    config
        .set_value(
            &["user", "password"],
            serde_yaml::Value::String("secret".into()),
        )
        .unwrap();
    config
        .set_value(
            &["station", "autostart"],
            serde_yaml::Value::String("10".into()),
        )
        .unwrap();
    Arc::new(config)
}

struct Handles {
    probe: Arc<PlayerProbe>,
    ops_seen: Arc<Mutex<Vec<String>>>,
    events: Arc<Mutex<Vec<String>>>,
}

fn build_session(
    config: Arc<Config>,
    stations: Vec<Station>,
    playlists: Vec<Vec<Song>>,
    keys: Vec<Option<char>>,
    lines: Vec<&str>,
    play_ok: bool,
    song_ticks: u32,
    fail_login: bool,
) -> (Session, Handles) {
    let ops_seen = Arc::new(Mutex::new(Vec::new()));
    let codec = CannedCodec {
        stations,
        playlists: Mutex::new(playlists.into_iter().collect()),
        ops_seen: ops_seen.clone(),
        fail_login,
    };
    let executor = RequestExecutor::new(Box::new(codec), Box::new(OkTransport));

    let launcher = RecordingLauncher::default();
    let events = launcher.commands.clone();
    let dispatcher = EventDispatcher::new(
        Some("$song".into()),
        "songfinish",
        Box::new(launcher),
    );

    let probe = Arc::new(PlayerProbe::default());
    let player = FakePlayer::new(probe.clone(), song_ticks, play_ok);

    let session = Session::new(
        config,
        executor,
        dispatcher,
        Box::new(player),
        Box::new(FakeInput::new(keys, lines)),
        Box::new(NoopHotkeys),
    );
    (
        session,
        Handles {
            probe,
            ops_seen,
            events,
        },
    )
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn plays_through_playlist_and_records_history() {
    let dir = TempDir::new().unwrap();
    let (mut session, handles) = build_session(
        test_config(&dir),
        vec![station("10", "Ambient")],
        vec![vec![http_song("a"), http_song("b")], vec![]],
        vec![None, None, None, Some('q')],
        vec![],
        true,
        0,
        false,
    );

    session.run().await.unwrap();

    let opened = handles.probe.opened.lock().unwrap().clone();
    assert_eq!(
        opened,
        vec!["http://audio.example.net/a", "http://audio.example.net/b"]
    );

    // both songs moved into history, most recent first
    let state = session.snapshot_state();
    let ids: Vec<_> = state.history.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a"]);
    assert!(state.playlist.is_empty());

    // the exhausted station cleared autoplay
    assert!(session.next_station().is_none());

    // songfinish automation fired once per song, in play order
    assert_eq!(*handles.events.lock().unwrap(), vec!["title-a", "title-b"]);

    let ops = handles.ops_seen.lock().unwrap().clone();
    assert_eq!(ops.iter().filter(|o| *o == "get-playlist").count(), 2);
    assert!(ops.starts_with(&["login".into(), "get-stations".into()]));
}

#[tokio::test]
async fn invalid_audio_url_never_reaches_player() {
    let dir = TempDir::new().unwrap();
    let (mut session, handles) = build_session(
        test_config(&dir),
        vec![station("10", "Ambient")],
        vec![
            vec![song("bad", "file:///tmp/local.mp3"), http_song("good")],
            vec![],
        ],
        vec![None, None, None, Some('q')],
        vec![],
        true,
        0,
        false,
    );

    session.run().await.unwrap();

    // only the remote URL was ever opened
    let opened = handles.probe.opened.lock().unwrap().clone();
    assert_eq!(opened, vec!["http://audio.example.net/good"]);
    assert_eq!(session.retries(), 0);
}

#[tokio::test]
async fn playback_failures_stop_autoplay() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    config.set_max_player_errors(2).unwrap();
    let (mut session, handles) = build_session(
        config,
        vec![station("10", "Ambient")],
        vec![vec![http_song("a"), http_song("b"), http_song("c")]],
        vec![None, None, None, Some('q')],
        vec![],
        false, // every play() fails
        0,
        false,
    );

    session.run().await.unwrap();

    assert!(session.next_station().is_none());
    assert_eq!(session.retries(), 0);

    // two start attempts happened before autoplay stopped
    assert_eq!(handles.probe.opened.lock().unwrap().len(), 2);
    let state = session.snapshot_state();
    let remaining: Vec<_> = state.playlist.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(remaining, vec!["b", "c"]);
}

#[tokio::test]
async fn ban_command_rates_and_skips() {
    let dir = TempDir::new().unwrap();
    let (mut session, handles) = build_session(
        test_config(&dir),
        vec![station("10", "Ambient")],
        vec![vec![http_song("a"), http_song("b")], vec![]],
        vec![None, Some('-'), None, None, Some('q')],
        vec![],
        true,
        100, // long songs, only the ban skips
        false,
    );

    session.run().await.unwrap();

    assert!(handles
        .ops_seen
        .lock()
        .unwrap()
        .iter()
        .any(|o| o == "rate-song"));

    // the banned song went to history with its new rating, the next started
    let state = session.snapshot_state();
    assert_eq!(state.history[0].id, "a");
    assert_eq!(state.history[0].rating, Rating::Banned);
    let opened = handles.probe.opened.lock().unwrap().clone();
    assert_eq!(opened.len(), 2);
}

#[tokio::test]
async fn station_change_drops_queued_remainder() {
    let dir = TempDir::new().unwrap();
    let (mut session, handles) = build_session(
        test_config(&dir),
        vec![station("10", "Ambient"), station("20", "Beats")],
        vec![
            vec![http_song("a"), http_song("b"), http_song("c")],
            vec![http_song("d")],
        ],
        vec![None, Some('s'), None, Some('q')],
        vec!["1"], // sorted order: 0) Ambient 1) Beats
        true,
        100,
        false,
    );

    session.run().await.unwrap();

    let opened = handles.probe.opened.lock().unwrap().clone();
    assert_eq!(
        opened,
        vec!["http://audio.example.net/a", "http://audio.example.net/d"]
    );

    let state = session.snapshot_state();
    assert_eq!(state.station_id.as_deref(), Some("20"));
    // the queued remainder of the old station never played
    let ids: Vec<_> = state.history.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["a"]);
}

#[tokio::test]
async fn login_failure_aborts_before_the_loop() {
    let dir = TempDir::new().unwrap();
    let (mut session, handles) = build_session(
        test_config(&dir),
        vec![station("10", "Ambient")],
        vec![],
        vec![],
        vec![],
        true,
        0,
        true, // login fails
    );

    let err = session.run().await.unwrap_err();
    assert!(matches!(err, rbsession::Error::Proto(_)));
    assert_eq!(*handles.ops_seen.lock().unwrap(), vec!["login"]);
}

#[tokio::test]
async fn missing_credentials_abort_the_session() {
    let dir = TempDir::new().unwrap();
    // config without credentials, prompt answered by end-of-input
    let config = Arc::new(Config::load_config(dir.path().to_str().unwrap()).unwrap());
    let (mut session, _handles) = build_session(
        config,
        vec![],
        vec![],
        vec![],
        vec![], // no line input available
        true,
        0,
        false,
    );

    let err = session.run().await.unwrap_err();
    assert!(matches!(err, rbsession::Error::MissingCredentials));
}
