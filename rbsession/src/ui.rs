//! Everything that talks to the user
//!
//! Output goes through [`Ui::msg`] with a message kind selecting the
//! configured prefix, mirroring the classic console-client look:
//!
//! ```text
//! (i) Receiving new playlist... Ok.
//! |>  "So What" by "Miles Davis" on "Kind of Blue"
//! #   -04:32/05:22
//! ```
//!
//! All user-visible strings are driven by `%x` format templates from the
//! configuration (see [`rbevents::custom_format`]); debug detail goes to
//! `tracing` instead and is never required for correct operation.

use crate::input::InputSource;
use rbconfig::Config;
use rbevents::custom_format;
use rbproto::{find_station_by_id, Rating, Song, Station};
use std::io::Write;
use tracing::debug;

/// Message kinds with their configured prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MsgKind {
    /// Continuation output, printed bare ("Ok.", selected index, ...)
    None,
    Info,
    Playing,
    Time,
    Err,
    Question,
    List,
}

/// Station list ordering for interactive selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    NameAz,
    NameZa,
    /// Quick-mix stations last, then by name
    QuickmixNameAz,
}

impl SortOrder {
    pub fn from_config(value: &str) -> Self {
        match value {
            "name-az" => SortOrder::NameAz,
            "name-za" => SortOrder::NameZa,
            _ => SortOrder::QuickmixNameAz,
        }
    }
}

/// Presentation collaborator: prefixes, format templates, icons
pub struct Ui {
    info_prefix: String,
    playing_prefix: String,
    time_prefix: String,
    error_prefix: String,
    question_prefix: String,
    list_prefix: String,
    np_song_format: String,
    np_station_format: String,
    list_song_format: String,
    time_format: String,
    love_icon: String,
    ban_icon: String,
    tired_icon: String,
    at_icon: String,
    sort_order: SortOrder,
}

impl Ui {
    pub fn from_config(config: &Config) -> Self {
        Self {
            info_prefix: config.get_msg_prefix("info"),
            playing_prefix: config.get_msg_prefix("playing"),
            time_prefix: config.get_msg_prefix("time"),
            error_prefix: config.get_msg_prefix("error"),
            question_prefix: config.get_msg_prefix("question"),
            list_prefix: config.get_msg_prefix("list"),
            np_song_format: config.get_nowplaying_song_format(),
            np_station_format: config.get_nowplaying_station_format(),
            list_song_format: config.get_list_song_format(),
            time_format: config.get_time_format(),
            love_icon: config.get_love_icon(),
            ban_icon: config.get_ban_icon(),
            tired_icon: config.get_tired_icon(),
            at_icon: config.get_at_icon(),
            sort_order: SortOrder::from_config(&config.get_sort_order()),
        }
    }

    /// Print one message with the kind's prefix and flush
    pub fn msg(&self, kind: MsgKind, text: &str) {
        let mut out = std::io::stdout().lock();
        let prefix = match kind {
            MsgKind::None => "",
            MsgKind::Info => &self.info_prefix,
            MsgKind::Playing => &self.playing_prefix,
            MsgKind::Time => &self.time_prefix,
            MsgKind::Err => &self.error_prefix,
            MsgKind::Question => &self.question_prefix,
            MsgKind::List => &self.list_prefix,
        };
        // clear the line first so the ticking time display never bleeds into
        // regular output
        let clear = if kind == MsgKind::None { "" } else { "\x1b[2K\r" };
        let _ = write!(out, "{clear}{prefix}{text}");
        let _ = out.flush();
    }

    fn rating_icon(&self, song: &Song) -> &str {
        match song.rating {
            Rating::Loved => &self.love_icon,
            Rating::Banned => &self.ban_icon,
            Rating::Tired => &self.tired_icon,
            Rating::None => "",
        }
    }

    /// Announce the (new) current station
    pub fn print_station(&self, station: &Station) {
        let out = custom_format(
            &self.np_station_format,
            "ni",
            &[&station.name, &station.id],
        );
        self.msg(MsgKind::Playing, &format!("{out}\n"));
    }

    /// Announce the song that is about to play.
    ///
    /// `origin` is the true originating station for quick-mix tracks.
    pub fn print_song(&self, song: &Song, origin: Option<&Station>) {
        let out = custom_format(
            &self.np_song_format,
            "talr@su",
            &[
                &song.title,
                &song.artist,
                &song.album,
                self.rating_icon(song),
                if origin.is_some() { &self.at_icon } else { "" },
                origin.map(|s| s.name.as_str()).unwrap_or(""),
                &song.detail_url,
            ],
        );
        self.msg(MsgKind::Playing, &format!("{out}\n"));
    }

    /// Print a numbered song list, filtered case-insensitively on artist or
    /// title; returns the number of rows printed
    pub fn list_songs<'a>(
        &self,
        songs: impl Iterator<Item = &'a Song>,
        stations: &[Station],
        cur_station: Option<&Station>,
        filter: &str,
    ) -> usize {
        let mut printed = 0;
        for (i, song) in songs.enumerate() {
            if !filter.is_empty()
                && !contains_ignore_case(&song.artist, filter)
                && !contains_ignore_case(&song.title, filter)
            {
                continue;
            }

            let station_name = match song.station_id.as_deref() {
                Some(id) => match find_station_by_id(stations, id) {
                    Some(station) if Some(&station.id) != cur_station.map(|c| &c.id) => {
                        station.name.as_str()
                    }
                    Some(_) => "",
                    None => "(deleted)",
                },
                None => "",
            };

            let duration = if song.length_secs > 0 {
                fmt_mmss(song.length_secs as f64)
            } else {
                "??:??".to_string()
            };

            let out = custom_format(
                &self.list_song_format,
                "iatrd@s",
                &[
                    &format!("{i:2}"),
                    &song.artist,
                    &song.title,
                    self.rating_icon(song),
                    &duration,
                    if station_name.is_empty() { "" } else { &self.at_icon },
                    station_name,
                ],
            );
            self.msg(MsgKind::List, &format!("{out}\n"));
            printed += 1;
        }
        printed
    }

    /// Elapsed/remaining/total time line, rewritten in place.
    ///
    /// Remaining is `|duration - played|`: '-' while the song has time left,
    /// '+' once playback overruns the reported duration.
    pub fn print_time(&self, played: f64, duration: f64) {
        let (sign, remaining) = if played <= duration {
            ("-", duration - played)
        } else {
            // longer than expected
            ("+", played - duration)
        };
        let out = custom_format(
            &self.time_format,
            "tres",
            &[
                &fmt_mmss(duration),
                &fmt_mmss(remaining),
                &fmt_mmss(played),
                sign,
            ],
        );
        self.msg(MsgKind::Time, &format!("{out}\r"));
    }

    /// Interactive station picker.
    ///
    /// Stations are listed in the configured sort order; numeric input picks
    /// by displayed index, anything else narrows the list as a
    /// case-insensitive name filter. With `autoselect`, a filter leaving a
    /// single station picks it immediately. Returns `None` when input ends.
    pub async fn select_station(
        &self,
        input: &mut dyn InputSource,
        stations: &[Station],
        prompt: &str,
        autoselect: bool,
    ) -> Option<Station> {
        if stations.is_empty() {
            self.msg(MsgKind::Err, "No station available.\n");
            return None;
        }

        let sorted = sorted_stations(stations, self.sort_order);
        let mut filter = String::new();

        loop {
            let mut display_count = 0;
            let mut last_displayed = 0;
            for (i, station) in sorted.iter().enumerate() {
                if contains_ignore_case(&station.name, &filter) {
                    self.msg(
                        MsgKind::List,
                        &format!(
                            "{i:2}) {}{}{} {}\n",
                            if station.use_quick_mix { 'q' } else { ' ' },
                            if station.is_quick_mix { 'Q' } else { ' ' },
                            if !station.is_creator { 'S' } else { ' ' },
                            station.name
                        ),
                    );
                    display_count += 1;
                    last_displayed = i;
                }
            }

            self.msg(MsgKind::Question, prompt);
            if autoselect && display_count == 1 && sorted.len() != 1 {
                // auto-select the last remaining station
                self.msg(MsgKind::None, &format!("{last_displayed}\n"));
                return Some(sorted[last_displayed].clone());
            }

            let line = input.read_line().await?;
            if line.is_empty() {
                debug!("station selection aborted");
                return None;
            }
            if let Ok(index) = line.parse::<usize>() {
                if index < sorted.len() {
                    return Some(sorted[index].clone());
                }
            }
            // not a station number: narrow the list instead
            filter = line;
        }
    }
}

/// Sort a station snapshot for display
pub fn sorted_stations(stations: &[Station], order: SortOrder) -> Vec<&Station> {
    let mut sorted: Vec<&Station> = stations.iter().collect();
    match order {
        SortOrder::NameAz => sorted.sort_by(|a, b| name_cmp(a, b)),
        SortOrder::NameZa => sorted.sort_by(|a, b| name_cmp(b, a)),
        SortOrder::QuickmixNameAz => sorted.sort_by(|a, b| {
            a.is_quick_mix
                .cmp(&b.is_quick_mix)
                .then_with(|| name_cmp(a, b))
        }),
    }
    sorted
}

fn name_cmp(a: &Station, b: &Station) -> std::cmp::Ordering {
    a.name.to_lowercase().cmp(&b.name.to_lowercase())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// mm:ss with zero padding
fn fmt_mmss(secs: f64) -> String {
    let secs = secs.max(0.0) as u64;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
