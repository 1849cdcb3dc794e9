//! Bolt wire-layer error types.

use std::io;

use thiserror::Error;

use super::hydration::HydrationError;
use super::packstream::PackStreamError;

/// Result type for Bolt operations.
pub type BoltResult<T> = Result<T, BoltError>;

/// Bolt wire-layer errors.
#[derive(Debug, Error)]
pub enum BoltError {
    /// I/O error, including EOF in the middle of a chunk
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Peer closed the stream between messages
    #[error("Connection closed")]
    ConnectionClosed,

    /// Reassembled message exceeds the configured limit
    #[error("Message too large: {size} bytes (max: {max})")]
    MessageTooLarge { size: usize, max: usize },

    /// Chunk stream out of sync
    #[error("Framing error: {0}")]
    Framing(String),

    /// PackStream serialization error
    #[error("PackStream error: {0}")]
    PackStream(#[from] PackStreamError),

    /// Structure does not match the layout its tag promises
    #[error("Hydration error: {0}")]
    Hydration(#[from] HydrationError),
}

/// Coarse error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport failed or closed
    Transport,
    /// Chunk headers no longer line up with the stream
    Framing,
    /// Bytes do not form a valid value
    Codec,
    /// A struct could not be turned into a domain value
    Hydration,
}

impl BoltError {
    /// Taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BoltError::Io(_) | BoltError::ConnectionClosed => ErrorKind::Transport,
            BoltError::MessageTooLarge { .. } | BoltError::Framing(_) => ErrorKind::Framing,
            BoltError::PackStream(_) => ErrorKind::Codec,
            BoltError::Hydration(_) => ErrorKind::Hydration,
        }
    }

    /// Whether the connection must be discarded after this error.
    ///
    /// Everything except hydration leaves the byte stream unaligned.
    pub fn is_fatal(&self) -> bool {
        self.kind() != ErrorKind::Hydration
    }
}
