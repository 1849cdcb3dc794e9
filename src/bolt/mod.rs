//! # Bolt Wire Layer
//!
//! Client-side core of the Bolt protocol, below the level of request and
//! response messages.
//!
//! ## Overview
//!
//! Outgoing values pass through three layers, incoming bytes through the
//! same layers in reverse:
//!
//! - **Hydration** - Domain values (temporal, spatial) to tagged structs
//! - **PackStream** - Binary serialization format for all data types
//! - **Codec** - Chunked message framing over a byte stream
//!
//! [`connection::MessageStream`] ties them together over any
//! `AsyncRead + AsyncWrite` transport.
//!
//! ## Submodules
//!
//! - [`packstream`] - Binary serialization/deserialization
//! - [`hydration`] - Struct to domain value conversion
//! - [`codec`] - Chunk framing, with a Tokio codec for async I/O
//! - [`connection`] - Message stream over a transport
//! - [`config`] - Per-connection settings
//! - [`error`] - Wire-layer error types

pub mod codec;
pub mod config;
pub mod connection;
pub mod error;
pub mod hydration;
pub mod packstream;

pub use codec::{frame, ChunkCodec, END_MARKER};
pub use config::{BoltConfig, BoltConfigBuilder, DateTimeEncoding, MAX_CHUNK_SIZE};
pub use connection::MessageStream;
pub use error::{BoltError, BoltResult, ErrorKind};
pub use hydration::{
    Duration, HydrationError, Hydrator, OffsetTime, Point, Point2D, Point3D, Structure,
    TemporalValue, Unhydratable, Value, Zone,
};
pub use packstream::{
    PackStreamDecoder, PackStreamEncoder, PackStreamError, PackStreamStructure, PackStreamValue,
};
