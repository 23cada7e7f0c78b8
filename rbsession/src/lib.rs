//! # rbsession - Session orchestration for RadioBar
//!
//! The [`Session`] owns the whole client lifecycle: log in, load stations,
//! fetch playlists, drive the external player one song at a time, react to
//! keystrokes, and fire lifecycle events. Everything with environment access
//! sits behind a collaborator trait ([`Player`], [`InputSource`],
//! [`HotkeyPoller`]) so the state machine is testable with doubles.
//!
//! Construction follows the dependency order: configuration and the protocol
//! executor are built first, the session last; teardown hands the final
//! station/playlist/history to the state-file writer (see [`persist`]).

mod commands;
mod error;
mod input;
pub mod persist;
mod player;
mod session;
mod ui;

pub use error::{Error, Result};
pub use input::{CrosstermInput, HotkeyPoller, InputSource, NoopHotkeys};
pub use persist::SessionState;
pub use player::Player;
pub use session::Session;
pub use ui::{MsgKind, SortOrder, Ui};
