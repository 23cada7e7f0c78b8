//! Data models for the tuner API

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A station as returned by the station-list operation.
///
/// Stations are immutable snapshots; the session looks them up by [`id`].
/// Quick-mix stations aggregate songs from several real stations, so songs
/// surfaced through one keep a reference to their true originating station
/// (see [`Song::station_id`]).
///
/// [`id`]: Station::id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    #[serde(rename = "stationId")]
    pub id: String,
    #[serde(rename = "stationName")]
    pub name: String,
    #[serde(rename = "isQuickMix", default)]
    pub is_quick_mix: bool,
    #[serde(rename = "useQuickMix", default)]
    pub use_quick_mix: bool,
    #[serde(rename = "isCreator", default)]
    pub is_creator: bool,
}

/// User feedback attached to a song
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rating {
    #[default]
    None,
    Loved,
    Banned,
    Tired,
}

impl Rating {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Rating::Loved,
            2 => Rating::Banned,
            3 => Rating::Tired,
            _ => Rating::None,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Rating::None => 0,
            Rating::Loved => 1,
            Rating::Banned => 2,
            Rating::Tired => 3,
        }
    }
}

/// The tuner encodes ratings as small integers
fn deserialize_rating<'de, D>(deserializer: D) -> Result<Rating, D::Error>
where
    D: Deserializer<'de>,
{
    let value = u8::deserialize(deserializer)?;
    Ok(Rating::from_u8(value))
}

fn serialize_rating<S>(rating: &Rating, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u8(rating.as_u8())
}

/// A single playable song from a station playlist.
///
/// Songs arrive in ordered batches (a playlist) and are consumed one at a
/// time as playback advances; a song value is owned by exactly one container
/// (playlist or history) at any moment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    #[serde(rename = "trackToken")]
    pub id: String,
    #[serde(rename = "songName")]
    pub title: String,
    #[serde(rename = "artistName")]
    pub artist: String,
    #[serde(rename = "albumName")]
    pub album: String,
    /// True originating station for quick-mix tracks
    #[serde(rename = "stationId", default)]
    pub station_id: Option<String>,
    #[serde(
        rename = "songRating",
        default,
        deserialize_with = "deserialize_rating",
        serialize_with = "serialize_rating"
    )]
    pub rating: Rating,
    /// Track length in seconds (0 when the service does not report one)
    #[serde(rename = "trackLength", default)]
    pub length_secs: u32,
    #[serde(rename = "audioUrl")]
    pub audio_url: String,
    #[serde(rename = "detailUrl", default)]
    pub detail_url: String,
    /// Per-track replay gain in dB, scaled by the configured multiplier
    /// before being handed to the player
    #[serde(rename = "fileGain", default)]
    pub file_gain: f32,
}

/// Stream quality requested from the playlist operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioQuality {
    Low,
    Medium,
    #[default]
    High,
}

impl AudioQuality {
    /// Wire name of the quality level
    pub fn as_str(self) -> &'static str {
        match self {
            AudioQuality::Low => "lowQuality",
            AudioQuality::Medium => "mediumQuality",
            AudioQuality::High => "highQuality",
        }
    }

    /// Parse a configuration value ("low", "medium", "high")
    pub fn from_config(value: &str) -> Option<Self> {
        match value {
            "low" => Some(AudioQuality::Low),
            "medium" => Some(AudioQuality::Medium),
            "high" => Some(AudioQuality::High),
            _ => None,
        }
    }
}

/// An artist suggestion returned by the search operation
#[derive(Debug, Clone, Deserialize)]
pub struct ArtistMatch {
    #[serde(rename = "artistName")]
    pub name: String,
    #[serde(rename = "musicToken")]
    pub music_token: String,
}

/// A song suggestion returned by the search operation
#[derive(Debug, Clone, Deserialize)]
pub struct SongMatch {
    #[serde(rename = "songName")]
    pub title: String,
    #[serde(rename = "artistName")]
    pub artist: String,
    #[serde(rename = "musicToken")]
    pub music_token: String,
}

/// Look up a station by identifier in a station-collection snapshot
pub fn find_station_by_id<'a>(stations: &'a [Station], id: &str) -> Option<&'a Station> {
    stations.iter().find(|s| s.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_roundtrip() {
        for rating in [Rating::None, Rating::Loved, Rating::Banned, Rating::Tired] {
            assert_eq!(Rating::from_u8(rating.as_u8()), rating);
        }
        // unknown values degrade to None
        assert_eq!(Rating::from_u8(42), Rating::None);
    }

    #[test]
    fn station_lookup_by_id() {
        let stations = vec![
            Station {
                id: "10".into(),
                name: "Ambient".into(),
                is_quick_mix: false,
                use_quick_mix: true,
                is_creator: true,
            },
            Station {
                id: "11".into(),
                name: "QuickMix".into(),
                is_quick_mix: true,
                use_quick_mix: false,
                is_creator: false,
            },
        ];
        assert_eq!(find_station_by_id(&stations, "11").unwrap().name, "QuickMix");
        assert!(find_station_by_id(&stations, "12").is_none());
    }

    #[test]
    fn song_deserializes_wire_names() {
        let song: Song = serde_json::from_value(serde_json::json!({
            "trackToken": "t1",
            "songName": "So What",
            "artistName": "Miles Davis",
            "albumName": "Kind of Blue",
            "stationId": "10",
            "songRating": 1,
            "trackLength": 540,
            "audioUrl": "http://audio.example.net/t1",
            "detailUrl": "http://www.example.net/t1",
            "fileGain": -1.5
        }))
        .unwrap();
        assert_eq!(song.rating, Rating::Loved);
        assert_eq!(song.length_secs, 540);
        assert_eq!(song.station_id.as_deref(), Some("10"));
    }
}
