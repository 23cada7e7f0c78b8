//! # rbplaylist - Song containers for the RadioBar session
//!
//! Two owning containers built on the same principle: a [`Song`] value lives
//! in exactly one of them at any time.
//!
//! - [`Playlist`]: the FIFO of not-yet-finished songs for the current
//!   station; the head is the song being played. Advancing pops the head,
//!   which *moves* into the history.
//! - [`History`]: recently finished songs, most recent first, bounded to a
//!   configured maximum.
//!
//! [`Song`]: rbproto::Song

mod history;
mod playlist;

pub use history::History;
pub use playlist::Playlist;
