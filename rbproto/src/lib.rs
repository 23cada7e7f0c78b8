//! Remote-protocol layer for the RadioBar streaming-radio client
//!
//! This crate contains everything that talks to the tuner service:
//! - Data models ([`Station`], [`Song`], [`Rating`])
//! - Logical operations and their payloads ([`Operation`])
//! - The codec and transport collaborator traits ([`ProtocolCodec`],
//!   [`Transport`]) with concrete REST/HTTP implementations
//! - The resilient [`RequestExecutor`] that drives one logical operation
//!   through however many physical rounds it needs, retrying transport
//!   failures and transparently re-authenticating on an expired session
//!
//! # Example
//!
//! ```no_run
//! use rbproto::{HttpTransport, Operation, RequestExecutor, RestCodec};
//!
//! #[tokio::main]
//! async fn main() -> rbproto::Result<()> {
//!     let codec = RestCodec::new("console");
//!     let transport = HttpTransport::new("https://tuner.example.net/api/v1", 30)?;
//!     let mut executor = RequestExecutor::new(Box::new(codec), Box::new(transport));
//!     executor.set_credentials("user@example.com", "secret");
//!
//!     let mut login = Operation::login("user@example.com", "secret");
//!     executor.execute(&mut login).await?;
//!
//!     let mut op = Operation::get_stations();
//!     executor.execute(&mut op).await?;
//!     for station in op.stations() {
//!         println!("{} ({})", station.name, station.id);
//!     }
//!     Ok(())
//! }
//! ```

mod codec;
mod error;
mod executor;
mod models;
mod ops;
mod rest;
mod transport;

pub use codec::{PhysicalRequest, ProtocolCodec, Status};
pub use error::{Error, Result};
pub use executor::{RequestExecutor, NETWORK_ATTEMPTS};
pub use models::{
    find_station_by_id, ArtistMatch, AudioQuality, Rating, SongMatch, Song, Station,
};
pub use ops::{
    CreateStationData, GetPlaylistData, GetStationsData, LoginData, Operation, RateSongData,
    SearchData, TiredSongData,
};
pub use rest::RestCodec;
pub use transport::{HttpTransport, Transport};
