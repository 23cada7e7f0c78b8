//! Shutdown state file
//!
//! At teardown the session hands its final station, remaining playlist and
//! song history to this writer. On the next startup the history is reloaded
//! and the last station seeds autostart; the playlist remainder is persisted
//! for inspection only, since its stream URLs expire server-side.

use crate::error::Result;
use chrono::{DateTime, Utc};
use rbproto::Song;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Session snapshot written at shutdown
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionState {
    pub station_id: Option<String>,
    pub station_name: Option<String>,
    #[serde(default)]
    pub playlist: Vec<Song>,
    #[serde(default)]
    pub history: Vec<Song>,
    pub saved_at: DateTime<Utc>,
}

/// Write the state file, replacing any previous one
pub fn write_state(path: &Path, state: &SessionState) -> Result<()> {
    let yaml = serde_yaml::to_string(state)?;
    fs::write(path, yaml)?;
    debug!(path = %path.display(), "state file written");
    Ok(())
}

/// Load the previous run's state; a missing or unreadable file is not an
/// error, just a fresh start
pub fn read_state(path: &Path) -> Option<SessionState> {
    let data = fs::read_to_string(path).ok()?;
    match serde_yaml::from_str(&data) {
        Ok(state) => Some(state),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable state file");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rbproto::Rating;
    use tempfile::TempDir;

    fn song(id: &str) -> Song {
        Song {
            id: id.into(),
            title: "title".into(),
            artist: "artist".into(),
            album: "album".into(),
            station_id: Some("10".into()),
            rating: Rating::Loved,
            length_secs: 300,
            audio_url: "http://audio.example.net/t".into(),
            detail_url: String::new(),
            file_gain: -1.5,
        }
    }

    #[test]
    fn state_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.yaml");
        let state = SessionState {
            station_id: Some("10".into()),
            station_name: Some("Ambient".into()),
            playlist: vec![song("a")],
            history: vec![song("b"), song("c")],
            saved_at: Utc::now(),
        };
        write_state(&path, &state).unwrap();

        let reloaded = read_state(&path).unwrap();
        assert_eq!(reloaded.station_id.as_deref(), Some("10"));
        assert_eq!(reloaded.playlist.len(), 1);
        assert_eq!(reloaded.history.len(), 2);
        assert_eq!(reloaded.history[0].rating, Rating::Loved);
    }

    #[test]
    fn missing_or_garbled_files_are_ignored() {
        let dir = TempDir::new().unwrap();
        assert!(read_state(&dir.path().join("absent.yaml")).is_none());

        let path = dir.path().join("garbled.yaml");
        fs::write(&path, ":: not yaml ::").unwrap();
        assert!(read_state(&path).is_none());
    }
}
