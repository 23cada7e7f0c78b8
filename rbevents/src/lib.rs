//! # rbevents - Lifecycle-event automation for RadioBar
//!
//! When the session hits a named lifecycle point (`userlogin`,
//! `usergetstations`, `stationfetchplaylist`, `songstart`, `songfinish`) the
//! [`EventDispatcher`] checks the user's comma-separated subscription list,
//! substitutes live song/station fields into the configured command template
//! and fires the result as a detached external process.
//!
//! The crate also hosts the single-character [`custom_format`] engine used
//! for all user-configurable display strings.

mod dispatcher;
mod error;
mod format;
mod launcher;

pub use dispatcher::EventDispatcher;
pub use error::{Error, Result};
pub use format::custom_format;
pub use launcher::{CommandLauncher, ShellLauncher};

/// Lifecycle event names fired by the session core
pub const EVENT_LOGIN: &str = "userlogin";
pub const EVENT_GET_STATIONS: &str = "usergetstations";
pub const EVENT_STATION_FETCH_PLAYLIST: &str = "stationfetchplaylist";
pub const EVENT_SONG_START: &str = "songstart";
pub const EVENT_SONG_FINISH: &str = "songfinish";
