//! JSON/REST codec for the tuner service
//!
//! The wire protocol is a JSON-RPC flavored POST API: every call carries a
//! `method` plus a JSON body and answers with the envelope
//! `{"stat": "ok"|"fail", "code": n, "message": "...", "result": {...}}`.
//! Login is a two-round handshake: a partner (device) login yielding a
//! partner token, then the user login yielding the session token attached to
//! every subsequent call.

use crate::codec::{PhysicalRequest, ProtocolCodec, Status};
use crate::error::{Error, Result};
use crate::models::{ArtistMatch, Song, SongMatch, Station};
use crate::ops::Operation;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

/// Envelope status code meaning "session token expired"
const CODE_AUTH_EXPIRED: i32 = 1001;

/// Response envelope shared by all methods
#[derive(Debug, Deserialize)]
struct Envelope {
    stat: String,
    #[serde(default)]
    code: Option<i32>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    result: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct PartnerLoginResult {
    #[serde(rename = "partnerAuthToken")]
    partner_auth_token: String,
}

#[derive(Debug, Deserialize)]
struct UserLoginResult {
    #[serde(rename = "userAuthToken")]
    user_auth_token: String,
    #[serde(rename = "userId")]
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct StationListResult {
    stations: Vec<Station>,
}

#[derive(Debug, Deserialize)]
struct PlaylistResult {
    items: Vec<Song>,
}

#[derive(Debug, Deserialize, Default)]
struct SearchResult {
    #[serde(default)]
    artists: Vec<ArtistMatch>,
    #[serde(default)]
    songs: Vec<SongMatch>,
}

/// Codec holding the session-token state between calls
pub struct RestCodec {
    device: String,
    partner_auth_token: Option<String>,
    user_auth_token: Option<String>,
    user_id: Option<String>,
}

impl RestCodec {
    /// Create a codec for the given device identifier
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            partner_auth_token: None,
            user_auth_token: None,
            user_id: None,
        }
    }

    /// Session token, once the user login completed
    pub fn user_auth_token(&self) -> Option<&str> {
        self.user_auth_token.as_deref()
    }

    /// User identifier, once the user login completed
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Body skeleton for authenticated calls
    fn authed_body(&self) -> Result<Value> {
        let token = self
            .user_auth_token
            .as_deref()
            .ok_or_else(|| Error::InvalidRequest("not authenticated".into()))?;
        Ok(json!({
            "userAuthToken": token,
            "userId": self.user_id,
        }))
    }

    fn parse_envelope(body: &str) -> Result<Value> {
        let envelope: Envelope = serde_json::from_str(body)?;
        if envelope.stat != "ok" {
            let code = envelope.code.unwrap_or(-1);
            let message = envelope.message.unwrap_or_default();
            if code == CODE_AUTH_EXPIRED {
                // signalled to the caller through interpret()
                return Err(Error::AuthExpired);
            }
            return Err(Error::api(code, message));
        }
        Ok(envelope.result.unwrap_or(Value::Null))
    }
}

impl ProtocolCodec for RestCodec {
    fn serialize(&self, op: &Operation) -> Result<PhysicalRequest> {
        let request = match op {
            Operation::Login(data) => match data.step {
                0 => PhysicalRequest {
                    method: "auth.partnerLogin".into(),
                    body: json!({ "device": self.device }),
                },
                _ => {
                    let partner = self.partner_auth_token.as_deref().ok_or_else(|| {
                        Error::InvalidRequest("user login without partner token".into())
                    })?;
                    PhysicalRequest {
                        method: "auth.userLogin".into(),
                        body: json!({
                            "partnerAuthToken": partner,
                            "username": data.username,
                            "password": data.password,
                        }),
                    }
                }
            },
            Operation::GetStations(_) => PhysicalRequest {
                method: "user.getStationList".into(),
                body: self.authed_body()?,
            },
            Operation::GetPlaylist(data) => {
                let mut body = self.authed_body()?;
                body["stationToken"] = json!(data.station_id);
                body["audioQuality"] = json!(data.quality.as_str());
                PhysicalRequest {
                    method: "station.getPlaylist".into(),
                    body,
                }
            }
            Operation::Search(data) => {
                let mut body = self.authed_body()?;
                body["searchText"] = json!(data.query);
                PhysicalRequest {
                    method: "music.search".into(),
                    body,
                }
            }
            Operation::CreateStation(data) => {
                let mut body = self.authed_body()?;
                body["musicToken"] = json!(data.music_token);
                PhysicalRequest {
                    method: "station.createStation".into(),
                    body,
                }
            }
            Operation::RateSong(data) => {
                let mut body = self.authed_body()?;
                body["trackToken"] = json!(data.song_id);
                body["isPositive"] = json!(data.positive);
                PhysicalRequest {
                    method: "station.addFeedback".into(),
                    body,
                }
            }
            Operation::TiredSong(data) => {
                let mut body = self.authed_body()?;
                body["trackToken"] = json!(data.song_id);
                PhysicalRequest {
                    method: "user.sleepSong".into(),
                    body,
                }
            }
        };
        Ok(request)
    }

    fn interpret(&mut self, body: &str, op: &mut Operation) -> Result<Status> {
        let result = match Self::parse_envelope(body) {
            Ok(result) => result,
            Err(Error::AuthExpired) => {
                // the stored token is useless now
                self.user_auth_token = None;
                return Ok(Status::AuthExpired);
            }
            Err(e) => return Err(e),
        };

        match op {
            Operation::Login(data) => {
                if data.step == 0 {
                    let partner: PartnerLoginResult = serde_json::from_value(result)?;
                    self.partner_auth_token = Some(partner.partner_auth_token);
                    data.step = 1;
                    debug!("partner handshake complete");
                    return Ok(Status::Continue);
                }
                let user: UserLoginResult = serde_json::from_value(result)?;
                debug!(user_id = %user.user_id, "user login complete");
                self.user_auth_token = Some(user.user_auth_token);
                self.user_id = Some(user.user_id);
            }
            Operation::GetStations(data) => {
                let list: StationListResult = serde_json::from_value(result)?;
                debug!(count = list.stations.len(), "received station list");
                data.stations = list.stations;
            }
            Operation::GetPlaylist(data) => {
                let playlist: PlaylistResult = serde_json::from_value(result)?;
                debug!(
                    station = %data.station_id,
                    count = playlist.items.len(),
                    "received playlist"
                );
                data.songs = playlist.items;
            }
            Operation::Search(data) => {
                let matches: SearchResult = serde_json::from_value(result)?;
                data.artists = matches.artists;
                data.songs = matches.songs;
            }
            Operation::CreateStation(data) => {
                let station: Station = serde_json::from_value(result)?;
                data.station = Some(station);
            }
            // feedback calls return an empty result
            Operation::RateSong(_) | Operation::TiredSong(_) => {}
        }
        Ok(Status::Ok)
    }
}
