//! Event-automation dispatcher

use crate::launcher::CommandLauncher;
use rbproto::{Song, Station};
use tracing::{debug, warn};

/// Fires the configured automation command on subscribed lifecycle events.
///
/// The subscription list is a comma-separated set of event names; membership
/// is exact, case-sensitive string equality. The command template may
/// reference `$song`, `$artist`, `$album` and `$station`; substitution is
/// literal substring replacement, with empty strings standing in for absent
/// objects.
pub struct EventDispatcher {
    command: Option<String>,
    subscriptions: String,
    launcher: Box<dyn CommandLauncher>,
}

impl EventDispatcher {
    pub fn new(
        command: Option<String>,
        subscriptions: impl Into<String>,
        launcher: Box<dyn CommandLauncher>,
    ) -> Self {
        Self {
            command: command.filter(|c| !c.is_empty()),
            subscriptions: subscriptions.into(),
            launcher,
        }
    }

    /// Fire `event` if an automation command is configured and subscribed.
    ///
    /// `outcome` is the result of the operation that produced the event,
    /// carried for diagnostics only. Spawn failures are reported and
    /// swallowed; they never abort the session.
    pub fn dispatch(
        &self,
        event: &str,
        station: Option<&Station>,
        song: Option<&Song>,
        outcome: &str,
    ) {
        let Some(template) = &self.command else {
            return;
        };

        if !self.subscriptions.split(',').any(|name| name == event) {
            debug!(event, "not subscribed, skipping event command");
            return;
        }
        debug!(event, outcome, "firing event command");

        let command_line = substitute(template, station, song);
        if let Err(e) = self.launcher.spawn(&command_line) {
            warn!(event, error = %e, "event command failed to start");
        }
    }
}

fn substitute(template: &str, station: Option<&Station>, song: Option<&Song>) -> String {
    template
        .replace("$song", song.map(|s| s.title.as_str()).unwrap_or(""))
        .replace("$artist", song.map(|s| s.artist.as_str()).unwrap_or(""))
        .replace("$album", song.map(|s| s.album.as_str()).unwrap_or(""))
        .replace("$station", station.map(|s| s.name.as_str()).unwrap_or(""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitution_handles_absent_objects() {
        assert_eq!(substitute("$artist - $song", None, None), " - ");
    }

    #[test]
    fn substitution_handles_repeats_and_length_changes() {
        let song = Song {
            id: "t".into(),
            title: "La Femme d'Argent".into(),
            artist: "Air".into(),
            album: "Moon Safari".into(),
            station_id: None,
            rating: Default::default(),
            length_secs: 0,
            audio_url: String::new(),
            detail_url: String::new(),
            file_gain: 0.0,
        };
        let out = substitute("$artist $artist [$album] $song", None, Some(&song));
        assert_eq!(out, "Air Air [Moon Safari] La Femme d'Argent");
    }
}
