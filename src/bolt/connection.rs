//! Message-level stream over any async transport.
//!
//! [`MessageStream`] chains the layers: domain values are dehydrated,
//! PackStream-encoded and chunk-framed on the way out, and the reverse on
//! the way in. Connecting, handshaking and TLS stay with the caller, which
//! hands over a ready byte stream.

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::trace;

use super::codec::ChunkCodec;
use super::config::BoltConfig;
use super::hydration::{Hydrator, Value};
use super::packstream::{decode_message, PackStreamEncoder, PackStreamValue};
use super::BoltResult;

/// A framed, hydrating message stream.
pub struct MessageStream<S> {
    /// Underlying transport
    stream: S,
    /// Chunk framer
    codec: ChunkCodec,
    /// Value converter
    hydrator: Hydrator,
    /// Payload encoder, reused across messages
    encoder: PackStreamEncoder,
    /// Bytes read but not yet framed into a message
    read_buffer: BytesMut,
    /// Outgoing chunk buffer
    write_buffer: BytesMut,
    /// Nesting limit while decoding
    max_decode_depth: usize,
}

impl<S: AsyncRead + AsyncWrite + Unpin> MessageStream<S> {
    /// Wrap a transport with default settings.
    pub fn new(stream: S) -> Self {
        Self::with_config(stream, &BoltConfig::default())
    }

    /// Wrap a transport.
    pub fn with_config(stream: S, config: &BoltConfig) -> Self {
        Self {
            stream,
            codec: ChunkCodec::from_config(config),
            hydrator: Hydrator::from_config(config),
            encoder: PackStreamEncoder::with_capacity(config.buffer_capacity),
            read_buffer: BytesMut::with_capacity(config.buffer_capacity),
            write_buffer: BytesMut::with_capacity(config.buffer_capacity),
            max_decode_depth: config.max_decode_depth,
        }
    }

    /// The hydrator used for both directions.
    pub fn hydrator(&self) -> &Hydrator {
        &self.hydrator
    }

    /// Send one domain value as a message.
    pub async fn send(&mut self, value: &Value) -> BoltResult<()> {
        let wire = self.hydrator.dehydrate(value);
        self.send_raw(&wire).await
    }

    /// Send one PackStream value as a message.
    pub async fn send_raw(&mut self, value: &PackStreamValue) -> BoltResult<()> {
        self.encoder.clear();
        self.encoder.encode(value)?;
        let payload = self.encoder.take();
        trace!(bytes = payload.len(), kind = value.type_name(), "Sending message");
        self.codec
            .write_message(&mut self.stream, &payload, &mut self.write_buffer)
            .await
    }

    /// Send an empty message, which peers treat as a keep-alive.
    pub async fn send_noop(&mut self) -> BoltResult<()> {
        self.codec
            .write_message(&mut self.stream, &[], &mut self.write_buffer)
            .await
    }

    /// Receive the next message as a domain value.
    ///
    /// Malformed known-tag structs come back as [`Value::Unhydratable`].
    pub async fn receive(&mut self) -> BoltResult<Value> {
        let wire = self.receive_raw().await?;
        Ok(self.hydrator.hydrate(wire))
    }

    /// Receive the next message, failing on a malformed known-tag struct.
    ///
    /// The message is fully consumed before hydration, so the stream stays
    /// usable after a hydration error.
    pub async fn receive_strict(&mut self) -> BoltResult<Value> {
        let wire = self.receive_raw().await?;
        Ok(self.hydrator.try_hydrate(wire)?)
    }

    /// Receive the next message as a PackStream value, skipping NOOPs.
    pub async fn receive_raw(&mut self) -> BoltResult<PackStreamValue> {
        loop {
            let payload = self
                .codec
                .read_message(&mut self.stream, &mut self.read_buffer)
                .await?;
            if payload.is_empty() {
                trace!("Skipping NOOP");
                continue;
            }
            let value = decode_message(&payload, self.max_decode_depth)?;
            trace!(bytes = payload.len(), kind = value.type_name(), "Received message");
            return Ok(value);
        }
    }

    /// Shut down the write half of the transport.
    pub async fn shutdown(&mut self) -> BoltResult<()> {
        self.stream.shutdown().await?;
        Ok(())
    }

    /// Get a reference to the transport.
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Return the transport. Buffered unread bytes are dropped.
    pub fn into_inner(self) -> S {
        self.stream
    }
}
