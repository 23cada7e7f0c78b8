//! Player collaborator contract
//!
//! The audio engine is external; the session only configures it, starts it
//! and polls its state. Lifecycle as seen through the queries:
//!
//! ```text
//! Idle --open+play--> Playing <--toggle_pause--> Paused
//!   ^                    |
//!   |                    | end of stream / stop() / failed start
//!   +----- finish() -- Ended
//! ```
//!
//! `is_finished` is true in `Idle` (ready for the next song); `is_stopped`
//! is true in `Ended` (playback over, cleanup still pending). The session
//! calls [`finish`] exactly once per ended song to release its resources.
//!
//! [`finish`]: Player::finish
pub trait Player: Send {
    /// Queue a media stream for the next [`play`](Player::play)
    fn open(&mut self, url: &str);

    /// Replay gain in dB for the queued stream
    fn set_gain(&mut self, gain_db: f32);

    /// Start playback; false when the stream could not be started
    fn play(&mut self) -> bool;

    /// Pause or resume a running stream
    fn toggle_pause(&mut self);

    /// Request the end of the current stream (skip)
    fn stop(&mut self);

    /// Playback over, cleanup pending
    fn is_stopped(&self) -> bool;

    /// Idle and ready for the next song
    fn is_finished(&self) -> bool;

    fn is_playing(&self) -> bool;

    fn is_paused(&self) -> bool;

    /// Seconds played so far
    fn elapsed_secs(&self) -> f64;

    /// Stream duration in seconds, 0 when unknown
    fn duration_secs(&self) -> f64;

    /// Release the resources of an ended stream
    fn finish(&mut self);
}
