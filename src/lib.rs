//! # boltwire
//!
//! Client-side core of the Bolt protocol: chunked message framing, the
//! PackStream codec, temporal and spatial struct hydration, and per-session
//! bookmark tracking for causal consistency.
//!
//! Connection setup, handshake, routing and the query API are left to the
//! caller; this crate starts from a connected byte stream.
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use boltwire::{MessageStream, Value};
//! use tokio::net::TcpStream;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Handshake is done by the caller before wrapping the stream
//!     let stream = TcpStream::connect("localhost:7687").await?;
//!     let mut messages = MessageStream::new(stream);
//!
//!     messages.send(&Value::from("ping")).await?;
//!     let reply = messages.receive().await?;
//!     println!("{}", reply);
//!     Ok(())
//! }
//! ```
//!
//! ## Temporal Values
//!
//! ```rust
//! use boltwire::bolt::packstream::{decode_message, encode};
//! use boltwire::{Hydrator, TemporalValue, Value};
//! use chrono::TimeZone;
//!
//! let zone: chrono_tz::Tz = "Europe/Stockholm".parse().unwrap();
//! let dt = zone.with_ymd_and_hms(2022, 6, 14, 15, 21, 18).unwrap();
//! let value = Value::from(TemporalValue::ZonedDateTime(dt));
//!
//! let hydrator = Hydrator::default();
//! let bytes = encode(&hydrator.dehydrate(&value)).unwrap();
//! let back = hydrator.hydrate(decode_message(&bytes, 64).unwrap());
//! assert_eq!(back, value);
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use boltwire::{BoltConfig, DateTimeEncoding};
//!
//! let config = BoltConfig::builder()
//!     .with_max_chunk_size(8192)
//!     .with_date_time_encoding(DateTimeEncoding::Legacy)
//!     .build();
//! ```
//!
//! ## Modules
//!
//! - [`bolt`] - Framing, PackStream, hydration and the message stream
//! - [`driver`] - Session bookmarks and bookmark managers

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod bolt;
pub mod driver;

// Re-exports for convenience
pub use bolt::{
    BoltConfig, BoltConfigBuilder, BoltError, BoltResult, DateTimeEncoding, ErrorKind, Hydrator,
    MessageStream, PackStreamValue, TemporalValue, Value,
};

pub use driver::{
    BookmarkManager, BookmarkManagerConfig, BookmarkManagerError, DriverError, DriverResult,
    InMemoryBookmarkManager, SessionBookmarks,
};
