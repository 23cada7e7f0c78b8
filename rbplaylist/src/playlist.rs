//! FIFO of not-yet-finished songs for the current station

use rbproto::Song;
use std::collections::VecDeque;

/// Ordered song queue owned by the session.
///
/// The head is the song currently queued or playing; the playlist is empty
/// exactly when the station has no more fetched tracks or the session is
/// stopping.
#[derive(Debug, Default)]
pub struct Playlist {
    songs: VecDeque<Song>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole queue with a freshly fetched batch
    pub fn replace(&mut self, songs: Vec<Song>) {
        self.songs = songs.into();
    }

    /// Remove and return the head; the returned song is a standalone value,
    /// ready to move into the history
    pub fn pop_front(&mut self) -> Option<Song> {
        self.songs.pop_front()
    }

    /// Song currently queued or playing
    pub fn front(&self) -> Option<&Song> {
        self.songs.front()
    }

    pub fn front_mut(&mut self) -> Option<&mut Song> {
        self.songs.front_mut()
    }

    /// Drop everything except the currently playing head (station change)
    pub fn truncate_to_front(&mut self) {
        self.songs.truncate(1);
    }

    pub fn clear(&mut self) {
        self.songs.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    /// Head-to-tail iteration (head = currently playing)
    pub fn iter(&self) -> impl Iterator<Item = &Song> {
        self.songs.iter()
    }

    /// Upcoming songs, i.e. everything behind the playing head
    pub fn upcoming(&self) -> impl Iterator<Item = &Song> {
        self.songs.iter().skip(1)
    }

    /// Drain the queue for shutdown persistence
    pub fn take_all(&mut self) -> Vec<Song> {
        std::mem::take(&mut self.songs).into()
    }
}

impl From<Vec<Song>> for Playlist {
    fn from(songs: Vec<Song>) -> Self {
        Self {
            songs: songs.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(id: &str) -> Song {
        Song {
            id: id.into(),
            title: format!("title-{id}"),
            artist: "artist".into(),
            album: "album".into(),
            station_id: None,
            rating: Default::default(),
            length_secs: 0,
            audio_url: "http://audio.example.net/x".into(),
            detail_url: String::new(),
            file_gain: 0.0,
        }
    }

    #[test]
    fn pop_advances_head() {
        let mut playlist = Playlist::from(vec![song("a"), song("b")]);
        assert_eq!(playlist.pop_front().unwrap().id, "a");
        assert_eq!(playlist.front().unwrap().id, "b");
        assert_eq!(playlist.len(), 1);
    }

    #[test]
    fn truncate_keeps_only_playing_head() {
        let mut playlist = Playlist::from(vec![song("a"), song("b"), song("c")]);
        playlist.truncate_to_front();
        assert_eq!(playlist.len(), 1);
        assert_eq!(playlist.front().unwrap().id, "a");

        let mut empty = Playlist::new();
        empty.truncate_to_front();
        assert!(empty.is_empty());
    }

    #[test]
    fn upcoming_skips_the_head() {
        let playlist = Playlist::from(vec![song("a"), song("b"), song("c")]);
        let upcoming: Vec<_> = playlist.upcoming().map(|s| s.id.as_str()).collect();
        assert_eq!(upcoming, vec!["b", "c"]);
    }
}
