//! Logical operations against the tuner service
//!
//! Each operation pairs its inputs with the slot the codec deposits results
//! into: the caller builds the operation, hands it to the executor, and reads
//! the deposited data back out afterwards.

use crate::models::{ArtistMatch, AudioQuality, Song, SongMatch, Station};

/// Credential/handshake state for the login operation.
///
/// Login is a two-round exchange (partner handshake, then user login); `step`
/// is the carried-over continuation state between rounds.
#[derive(Debug, Clone)]
pub struct LoginData {
    pub username: String,
    pub password: String,
    pub step: u8,
}

/// Station-list operation; `stations` is filled by the codec
#[derive(Debug, Default)]
pub struct GetStationsData {
    pub stations: Vec<Station>,
}

/// Playlist fetch for one station; `songs` is filled by the codec
#[derive(Debug)]
pub struct GetPlaylistData {
    pub station_id: String,
    pub quality: AudioQuality,
    pub songs: Vec<Song>,
}

/// Catalog search; match lists are filled by the codec
#[derive(Debug, Default)]
pub struct SearchData {
    pub query: String,
    pub artists: Vec<ArtistMatch>,
    pub songs: Vec<SongMatch>,
}

/// Station creation from a search result token; `station` is filled by the
/// codec
#[derive(Debug)]
pub struct CreateStationData {
    pub music_token: String,
    pub station: Option<Station>,
}

/// Positive/negative feedback for one song
#[derive(Debug)]
pub struct RateSongData {
    pub song_id: String,
    pub positive: bool,
}

/// "Don't play this for a while" feedback
#[derive(Debug)]
pub struct TiredSongData {
    pub song_id: String,
}

/// One logical remote operation with its payload
#[derive(Debug)]
pub enum Operation {
    Login(LoginData),
    GetStations(GetStationsData),
    GetPlaylist(GetPlaylistData),
    Search(SearchData),
    CreateStation(CreateStationData),
    RateSong(RateSongData),
    TiredSong(TiredSongData),
}

impl Operation {
    pub fn login(username: impl Into<String>, password: impl Into<String>) -> Self {
        Operation::Login(LoginData {
            username: username.into(),
            password: password.into(),
            step: 0,
        })
    }

    pub fn get_stations() -> Self {
        Operation::GetStations(GetStationsData::default())
    }

    pub fn get_playlist(station_id: impl Into<String>, quality: AudioQuality) -> Self {
        Operation::GetPlaylist(GetPlaylistData {
            station_id: station_id.into(),
            quality,
            songs: Vec::new(),
        })
    }

    pub fn search(query: impl Into<String>) -> Self {
        Operation::Search(SearchData {
            query: query.into(),
            ..SearchData::default()
        })
    }

    pub fn create_station(music_token: impl Into<String>) -> Self {
        Operation::CreateStation(CreateStationData {
            music_token: music_token.into(),
            station: None,
        })
    }

    pub fn rate_song(song_id: impl Into<String>, positive: bool) -> Self {
        Operation::RateSong(RateSongData {
            song_id: song_id.into(),
            positive,
        })
    }

    pub fn tired_song(song_id: impl Into<String>) -> Self {
        Operation::TiredSong(TiredSongData {
            song_id: song_id.into(),
        })
    }

    /// Short name used for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Login(_) => "login",
            Operation::GetStations(_) => "get-stations",
            Operation::GetPlaylist(_) => "get-playlist",
            Operation::Search(_) => "search",
            Operation::CreateStation(_) => "create-station",
            Operation::RateSong(_) => "rate-song",
            Operation::TiredSong(_) => "tired-song",
        }
    }

    /// Login never re-authenticates against itself; the executor checks this
    /// before starting an embedded re-login
    pub fn is_login(&self) -> bool {
        matches!(self, Operation::Login(_))
    }

    /// Deposited station list (empty slice for other operations)
    pub fn stations(&self) -> &[Station] {
        match self {
            Operation::GetStations(data) => &data.stations,
            _ => &[],
        }
    }

    /// Move the deposited station list out of a completed operation
    pub fn take_stations(&mut self) -> Vec<Station> {
        match self {
            Operation::GetStations(data) => std::mem::take(&mut data.stations),
            _ => Vec::new(),
        }
    }

    /// Move the deposited playlist out of a completed operation
    pub fn take_songs(&mut self) -> Vec<Song> {
        match self {
            Operation::GetPlaylist(data) => std::mem::take(&mut data.songs),
            _ => Vec::new(),
        }
    }

    /// Move the deposited station out of a completed create-station operation
    pub fn take_created_station(&mut self) -> Option<Station> {
        match self {
            Operation::CreateStation(data) => data.station.take(),
            _ => None,
        }
    }
}
