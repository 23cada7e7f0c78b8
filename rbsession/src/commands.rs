//! Keystroke command dispatch
//!
//! A fully captured command character from the input step lands here with a
//! global-context flag (submenu contexts are reserved for future bindings).

use crate::session::Session;
use crate::ui::MsgKind;
use rbproto::{find_station_by_id, Operation, Rating};
use tracing::debug;

const BINDINGS: &[(char, &str)] = &[
    ('?', "print this help"),
    ('q', "quit"),
    ('p', "pause/resume playback"),
    ('n', "next song"),
    ('s', "change station"),
    ('u', "upcoming songs"),
    ('h', "song history"),
    ('i', "current song/station info"),
    ('+', "love song"),
    ('-', "ban song"),
    ('t', "tired of song, don't play it for a while"),
    ('c', "create new station from artist or song"),
];

impl Session {
    /// Handle one command keystroke; unknown keys are ignored
    pub(crate) async fn dispatch_command(&mut self, key: char, _global: bool) {
        debug!(key = %key, "dispatching command");
        match key {
            '?' => self.show_help(),
            'q' => self.quit = true,
            'p' => self.player.toggle_pause(),
            'n' => self.player.stop(),
            's' => self.change_station().await,
            'u' => self.show_upcoming(),
            'h' => self.show_history(),
            'i' => self.show_song_info(),
            '+' => self.rate_current(true).await,
            '-' => self.rate_current(false).await,
            't' => self.tired_of_current().await,
            'c' => self.create_station_flow().await,
            _ => {}
        }
    }

    fn show_help(&self) {
        for (key, description) in BINDINGS {
            self.ui
                .msg(MsgKind::List, &format!("{key}  {description}\n"));
        }
    }

    /// Pick a new station; the current song keeps playing, the queued
    /// remainder is dropped
    async fn change_station(&mut self) {
        let selected = self
            .ui
            .select_station(
                self.input.as_mut(),
                &self.stations,
                "Select station: ",
                self.autoselect,
            )
            .await;
        let Some(station) = selected else {
            return;
        };
        let changed = self
            .cur_station
            .as_ref()
            .map(|cur| cur.id != station.id)
            .unwrap_or(true);
        self.next_station = Some(station);
        if changed {
            self.playlist.truncate_to_front();
            self.player.stop();
        }
    }

    fn show_upcoming(&self) {
        if self.playlist.upcoming().next().is_none() {
            self.ui.msg(MsgKind::Info, "No upcoming songs.\n");
            return;
        }
        self.ui.list_songs(
            self.playlist.upcoming(),
            &self.stations,
            self.cur_station.as_ref(),
            "",
        );
    }

    fn show_history(&self) {
        if self.history.is_empty() {
            self.ui.msg(MsgKind::Info, "No history yet.\n");
            return;
        }
        self.ui.list_songs(
            self.history.iter(),
            &self.stations,
            self.cur_station.as_ref(),
            "",
        );
    }

    fn show_song_info(&self) {
        if let Some(station) = &self.cur_station {
            self.ui.print_station(station);
        }
        match self.playlist.front() {
            Some(song) => {
                let origin = song
                    .station_id
                    .as_deref()
                    .filter(|_| {
                        self.cur_station
                            .as_ref()
                            .map(|s| s.is_quick_mix)
                            .unwrap_or(false)
                    })
                    .and_then(|id| find_station_by_id(&self.stations, id));
                self.ui.print_song(song, origin);
            }
            None => self.ui.msg(MsgKind::Err, "No song playing.\n"),
        }
    }

    /// Love or ban the current song; banning skips it too
    async fn rate_current(&mut self, positive: bool) {
        let Some(song_id) = self.playlist.front().map(|s| s.id.clone()) else {
            self.ui.msg(MsgKind::Err, "No song playing.\n");
            return;
        };
        if positive {
            self.ui.msg(MsgKind::Info, "Loving song... ");
        } else {
            self.ui.msg(MsgKind::Info, "Banning song... ");
        }
        let mut op = Operation::rate_song(song_id, positive);
        if self.remote_call(&mut op).await.is_err() {
            return;
        }
        if let Some(song) = self.playlist.front_mut() {
            song.rating = if positive {
                Rating::Loved
            } else {
                Rating::Banned
            };
        }
        if !positive {
            // no point in listening to the rest of a banned song
            self.player.stop();
        }
    }

    /// Shelve the current song for a while and skip it
    async fn tired_of_current(&mut self) {
        let Some(song_id) = self.playlist.front().map(|s| s.id.clone()) else {
            self.ui.msg(MsgKind::Err, "No song playing.\n");
            return;
        };
        self.ui.msg(MsgKind::Info, "Putting song to sleep... ");
        let mut op = Operation::tired_song(song_id);
        if self.remote_call(&mut op).await.is_err() {
            return;
        }
        if let Some(song) = self.playlist.front_mut() {
            song.rating = Rating::Tired;
        }
        self.player.stop();
    }

    /// Search the catalog and create a station from the picked result
    async fn create_station_flow(&mut self) {
        self.ui
            .msg(MsgKind::Question, "Create station from artist or song: ");
        let Some(query) = self.input.read_line().await.filter(|q| !q.is_empty()) else {
            return;
        };

        self.ui.msg(MsgKind::Info, "Searching... ");
        let mut op = Operation::search(query);
        if self.remote_call(&mut op).await.is_err() {
            return;
        }
        let (artists, songs) = match op {
            Operation::Search(data) => (data.artists, data.songs),
            _ => unreachable!(),
        };
        if artists.is_empty() && songs.is_empty() {
            self.ui.msg(MsgKind::Info, "Nothing found...\n");
            return;
        }

        // artists first, then songs, one shared index space
        for (i, artist) in artists.iter().enumerate() {
            self.ui
                .msg(MsgKind::List, &format!("{i:2}) {}\n", artist.name));
        }
        for (i, song) in songs.iter().enumerate() {
            self.ui.msg(
                MsgKind::List,
                &format!("{:2}) {} - {}\n", artists.len() + i, song.artist, song.title),
            );
        }

        self.ui.msg(MsgKind::Question, "Select result: ");
        let Some(line) = self.input.read_line().await else {
            return;
        };
        let Ok(index) = line.parse::<usize>() else {
            return;
        };
        let music_token = if index < artists.len() {
            artists[index].music_token.clone()
        } else if index < artists.len() + songs.len() {
            songs[index - artists.len()].music_token.clone()
        } else {
            return;
        };

        self.ui.msg(MsgKind::Info, "Creating station... ");
        let mut op = Operation::create_station(music_token);
        if self.remote_call(&mut op).await.is_ok() {
            if let Some(station) = op.take_created_station() {
                self.ui.print_station(&station);
                self.stations.push(station);
            }
        }
    }
}
