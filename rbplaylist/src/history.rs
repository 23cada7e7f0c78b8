//! Bounded most-recent-first list of finished songs

use rbproto::Song;
use std::collections::VecDeque;
use tracing::debug;

/// Recently finished songs, most recent first.
///
/// The length is bounded to `max_len` after every [`prepend`]; a maximum of
/// zero disables the history entirely (prepended songs are dropped on the
/// spot). Songs reloaded from a previous run are accepted as-is and trimmed
/// down on the first prepend, which covers a configured maximum that shrank
/// between runs.
///
/// [`prepend`]: History::prepend
#[derive(Debug)]
pub struct History {
    songs: VecDeque<Song>,
    max_len: usize,
}

impl History {
    pub fn new(max_len: usize) -> Self {
        Self {
            songs: VecDeque::new(),
            max_len,
        }
    }

    /// Seed the history from a previous run's state file
    pub fn preload(&mut self, songs: Vec<Song>) {
        self.songs = songs.into();
    }

    /// Insert a finished song at the head and evict from the tail while over
    /// the bound
    pub fn prepend(&mut self, song: Song) {
        if self.max_len == 0 {
            debug!(song = %song.id, "history disabled, dropping song");
            return;
        }
        self.songs.push_front(song);
        while self.songs.len() > self.max_len {
            self.songs.pop_back();
        }
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Most-recent-first iteration
    pub fn iter(&self) -> impl Iterator<Item = &Song> {
        self.songs.iter()
    }

    /// Drain the list for shutdown persistence
    pub fn take_all(&mut self) -> Vec<Song> {
        std::mem::take(&mut self.songs).into()
    }
}
