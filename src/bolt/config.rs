//! Wire-layer configuration.
//!
//! A [`BoltConfig`] is handed explicitly to whatever owns a connection; the
//! crate keeps no process-wide settings.

use super::packstream::DEFAULT_MAX_DEPTH;

/// Largest payload one chunk header can describe.
pub const MAX_CHUNK_SIZE: usize = u16::MAX as usize;

/// Default ceiling for a reassembled message (16MB).
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Which struct layout date-times are written with.
///
/// Readers accept both layouts regardless of this setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateTimeEncoding {
    /// Bolt 5.0+ (and 4.4 with the UTC patch): seconds are UTC epoch
    /// seconds, tags `I` and `i`.
    #[default]
    Utc,
    /// Pre-5.0 servers: seconds are wall-clock seconds in the value's own
    /// zone, tags `F` and `f`.
    Legacy,
}

/// Framing, codec and hydration settings for one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoltConfig {
    /// Largest chunk payload written; never above [`MAX_CHUNK_SIZE`]
    pub max_chunk_size: usize,
    /// Largest reassembled message accepted on read
    pub max_message_size: usize,
    /// Nesting limit while decoding
    pub max_decode_depth: usize,
    /// Date-time struct layout used when dehydrating
    pub date_time_encoding: DateTimeEncoding,
    /// Initial capacity of the read and write buffers
    pub buffer_capacity: usize,
}

impl BoltConfig {
    /// Default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a builder from the defaults.
    pub fn builder() -> BoltConfigBuilder {
        BoltConfigBuilder {
            config: Self::default(),
        }
    }
}

impl Default for BoltConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: MAX_CHUNK_SIZE,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_decode_depth: DEFAULT_MAX_DEPTH,
            date_time_encoding: DateTimeEncoding::default(),
            buffer_capacity: 8192,
        }
    }
}

/// Builder for [`BoltConfig`].
#[derive(Debug, Clone)]
pub struct BoltConfigBuilder {
    config: BoltConfig,
}

impl BoltConfigBuilder {
    /// Chunk payload size, clamped to `1..=65535`.
    pub fn with_max_chunk_size(mut self, size: usize) -> Self {
        self.config.max_chunk_size = size.clamp(1, MAX_CHUNK_SIZE);
        self
    }

    /// Largest accepted message.
    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.config.max_message_size = size;
        self
    }

    /// Decoder nesting limit.
    pub fn with_max_decode_depth(mut self, depth: usize) -> Self {
        self.config.max_decode_depth = depth;
        self
    }

    /// Date-time struct layout.
    pub fn with_date_time_encoding(mut self, encoding: DateTimeEncoding) -> Self {
        self.config.date_time_encoding = encoding;
        self
    }

    /// Initial buffer capacity.
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.config.buffer_capacity = capacity;
        self
    }

    /// Build.
    pub fn build(self) -> BoltConfig {
        self.config
    }
}
