//! Chunked message framing.
//!
//! A logical message travels as a run of chunks, each a 2-byte big-endian
//! length followed by that many payload bytes, terminated by a zero-length
//! chunk (`00 00`). Chunk boundaries carry no meaning for the value layer and
//! may split a value anywhere.

use bytes::{Buf, BufMut, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::{Decoder, Encoder};

use super::config::{BoltConfig, DEFAULT_MAX_MESSAGE_SIZE, MAX_CHUNK_SIZE};
use super::{BoltError, BoltResult};

/// End of message marker (0x00 0x00)
pub const END_MARKER: [u8; 2] = [0x00, 0x00];

/// Size of a chunk header
pub const CHUNK_HEADER_SIZE: usize = 2;

/// Write `payload` as chunks of at most `max_chunk_size` bytes plus the
/// terminator. Returns the number of data chunks written.
///
/// An empty payload is written as the terminator alone: a zero-length data
/// chunk would read back as end-of-message.
pub fn frame(payload: &[u8], max_chunk_size: usize, dst: &mut BytesMut) -> usize {
    let max_chunk_size = max_chunk_size.clamp(1, MAX_CHUNK_SIZE);
    let chunk_count = payload.len().div_ceil(max_chunk_size);
    dst.reserve(payload.len() + (chunk_count + 1) * CHUNK_HEADER_SIZE);

    for chunk in payload.chunks(max_chunk_size) {
        dst.put_u16(chunk.len() as u16);
        dst.put_slice(chunk);
    }

    dst.put_slice(&END_MARKER);
    chunk_count
}

/// Chunk codec for `tokio_util` framing.
///
/// Decodes whole reassembled messages (`BytesMut`) and encodes raw message
/// payloads. The only state kept between messages is the reassembly buffer.
#[derive(Debug)]
pub struct ChunkCodec {
    /// Largest chunk payload written
    max_chunk_size: usize,
    /// Maximum message size
    max_message_size: usize,
    /// Buffer for accumulating chunks
    message_buffer: BytesMut,
}

impl ChunkCodec {
    /// Create a new codec with default settings.
    pub fn new() -> Self {
        Self::with_limits(MAX_CHUNK_SIZE, DEFAULT_MAX_MESSAGE_SIZE)
    }

    /// Create a codec from connection settings.
    pub fn from_config(config: &BoltConfig) -> Self {
        Self::with_limits(config.max_chunk_size, config.max_message_size)
    }

    /// Create a codec with explicit chunk and message limits.
    pub fn with_limits(max_chunk_size: usize, max_message_size: usize) -> Self {
        Self {
            max_chunk_size: max_chunk_size.clamp(1, MAX_CHUNK_SIZE),
            max_message_size,
            message_buffer: BytesMut::with_capacity(4096),
        }
    }

    /// Whether part of a message has been consumed but not yet terminated.
    pub fn is_mid_message(&self) -> bool {
        !self.message_buffer.is_empty()
    }

    /// Read one whole message from `reader`.
    ///
    /// `read_buffer` holds bytes read past the end of the returned message
    /// and must be passed back on the next call. Waits until the terminator
    /// arrives or the reader fails; EOF inside a message is reported as
    /// `UnexpectedEof`, EOF between messages as [`BoltError::ConnectionClosed`].
    pub async fn read_message<R>(
        &mut self,
        reader: &mut R,
        read_buffer: &mut BytesMut,
    ) -> BoltResult<BytesMut>
    where
        R: AsyncRead + Unpin,
    {
        loop {
            if let Some(message) = self.decode(read_buffer)? {
                return Ok(message);
            }

            let n = reader.read_buf(read_buffer).await?;
            if n == 0 {
                if read_buffer.is_empty() && !self.is_mid_message() {
                    return Err(BoltError::ConnectionClosed);
                }
                return Err(truncated());
            }
        }
    }

    /// Frame `payload` and write it to `writer`, flushing afterwards.
    ///
    /// `scratch` is cleared and reused as the outgoing buffer.
    pub async fn write_message<W>(
        &mut self,
        writer: &mut W,
        payload: &[u8],
        scratch: &mut BytesMut,
    ) -> BoltResult<()>
    where
        W: AsyncWrite + Unpin,
    {
        scratch.clear();
        self.encode(payload, scratch)?;
        writer.write_all(scratch).await?;
        writer.flush().await?;
        Ok(())
    }
}

impl Default for ChunkCodec {
    fn default() -> Self {
        Self::new()
    }
}

fn truncated() -> BoltError {
    BoltError::Io(std::io::Error::new(
        std::io::ErrorKind::UnexpectedEof,
        "stream ended inside a chunked message",
    ))
}

impl Decoder for ChunkCodec {
    type Item = BytesMut;
    type Error = BoltError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            // Need at least 2 bytes for chunk header
            if src.len() < CHUNK_HEADER_SIZE {
                return Ok(None);
            }

            let chunk_size = u16::from_be_bytes([src[0], src[1]]) as usize;

            if chunk_size == 0 {
                src.advance(CHUNK_HEADER_SIZE);
                let message = self.message_buffer.split();
                tracing::trace!(bytes = message.len(), "reassembled message");
                return Ok(Some(message));
            }

            if src.len() < CHUNK_HEADER_SIZE + chunk_size {
                src.reserve(CHUNK_HEADER_SIZE + chunk_size - src.len());
                return Ok(None);
            }

            let size = self.message_buffer.len() + chunk_size;
            if size > self.max_message_size {
                return Err(BoltError::MessageTooLarge {
                    size,
                    max: self.max_message_size,
                });
            }

            src.advance(CHUNK_HEADER_SIZE);
            self.message_buffer.extend_from_slice(&src[..chunk_size]);
            src.advance(chunk_size);
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(message) => Ok(Some(message)),
            None if src.is_empty() && !self.is_mid_message() => Ok(None),
            None => Err(truncated()),
        }
    }
}

impl Encoder<&[u8]> for ChunkCodec {
    type Error = BoltError;

    fn encode(&mut self, item: &[u8], dst: &mut BytesMut) -> Result<(), Self::Error> {
        let chunks = frame(item, self.max_chunk_size, dst);
        tracing::trace!(bytes = item.len(), chunks, "framed message");
        Ok(())
    }
}

impl Encoder<BytesMut> for ChunkCodec {
    type Error = BoltError;

    fn encode(&mut self, item: BytesMut, dst: &mut BytesMut) -> Result<(), Self::Error> {
        Encoder::<&[u8]>::encode(self, &item[..], dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn deframe_all(mut bytes: BytesMut) -> Vec<BytesMut> {
        let mut codec = ChunkCodec::new();
        let mut out = Vec::new();
        while let Some(message) = codec.decode(&mut bytes).unwrap() {
            out.push(message);
        }
        assert!(bytes.is_empty());
        out
    }

    #[test]
    fn test_frame_small_message() {
        let mut buf = BytesMut::new();
        assert_eq!(frame(&[0x01, 0x02, 0x03], MAX_CHUNK_SIZE, &mut buf), 1);
        assert_eq!(&buf[..], &[0x00, 0x03, 0x01, 0x02, 0x03, 0x00, 0x00]);
    }

    #[test]
    fn test_frame_empty_message_is_terminator_only() {
        let mut buf = BytesMut::new();
        assert_eq!(frame(&[], MAX_CHUNK_SIZE, &mut buf), 0);
        assert_eq!(&buf[..], &END_MARKER);

        let messages = deframe_all(buf);
        assert_eq!(messages.len(), 1);
        assert!(messages[0].is_empty());
    }

    #[test]
    fn test_frame_splits_at_chunk_size() {
        let payload = vec![0xAB; 10];
        let mut buf = BytesMut::new();
        assert_eq!(frame(&payload, 4, &mut buf), 3);
        assert_eq!(
            &buf[..],
            &[
                0x00, 0x04, 0xAB, 0xAB, 0xAB, 0xAB, //
                0x00, 0x04, 0xAB, 0xAB, 0xAB, 0xAB, //
                0x00, 0x02, 0xAB, 0xAB, //
                0x00, 0x00,
            ]
        );
    }

    #[test]
    fn test_exact_multiple_of_max_chunk() {
        let payload = vec![0x5A; MAX_CHUNK_SIZE * 2];
        let mut buf = BytesMut::new();
        assert_eq!(frame(&payload, MAX_CHUNK_SIZE, &mut buf), 2);
        assert_eq!(buf.len(), payload.len() + 3 * CHUNK_HEADER_SIZE);
        assert_eq!(&buf[..2], &[0xFF, 0xFF]);

        let messages = deframe_all(buf);
        assert_eq!(messages.len(), 1);
        assert_eq!(&messages[0][..], &payload[..]);
    }

    #[test]
    fn test_partial_chunk() {
        let mut full = BytesMut::new();
        frame(b"partial", MAX_CHUNK_SIZE, &mut full);

        let mut codec = ChunkCodec::new();
        let mut partial = BytesMut::from(&full[..1]);
        assert!(codec.decode(&mut partial).unwrap().is_none());

        let mut partial = BytesMut::from(&full[..5]);
        assert!(codec.decode(&mut partial).unwrap().is_none());
        assert!(!codec.is_mid_message());

        let mut complete = full;
        let message = codec.decode(&mut complete).unwrap().unwrap();
        assert_eq!(&message[..], b"partial");
    }

    #[test]
    fn test_chunk_boundary_mid_value() {
        // A packstream string split across two chunks
        let wire = [0x00, 0x02, 0x83, b'a', 0x00, 0x02, b'b', b'c', 0x00, 0x00];
        let messages = deframe_all(BytesMut::from(&wire[..]));
        assert_eq!(&messages[0][..], &[0x83, b'a', b'b', b'c']);
    }

    #[test]
    fn test_multiple_messages() {
        let mut buf = BytesMut::new();
        let mut codec = ChunkCodec::new();
        codec.encode(&b"one"[..], &mut buf).unwrap();
        codec.encode(&b""[..], &mut buf).unwrap();
        codec.encode(&b"three"[..], &mut buf).unwrap();

        let messages = deframe_all(buf);
        assert_eq!(messages.len(), 3);
        assert_eq!(&messages[0][..], b"one");
        assert!(messages[1].is_empty());
        assert_eq!(&messages[2][..], b"three");
    }

    #[test]
    fn test_message_too_large() {
        let mut codec = ChunkCodec::with_limits(MAX_CHUNK_SIZE, 100);
        let mut buf = BytesMut::new();
        buf.put_u16(200);
        buf.extend_from_slice(&[0u8; 200]);

        let result = codec.decode(&mut buf);
        assert!(matches!(result, Err(BoltError::MessageTooLarge { size: 200, max: 100 })));
    }

    #[test]
    fn test_decode_eof_mid_message() {
        let mut codec = ChunkCodec::new();
        let mut buf = BytesMut::from(&[0x00, 0x01, 0x01][..]);
        let err = codec.decode_eof(&mut buf).unwrap_err();
        assert!(
            matches!(err, BoltError::Io(ref e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
        );
    }

    #[tokio::test]
    async fn test_read_message_from_stream() {
        let mut wire = BytesMut::new();
        frame(b"first", 2, &mut wire);
        frame(b"second", 4, &mut wire);
        let mut reader: &[u8] = &wire[..];

        let mut codec = ChunkCodec::new();
        let mut read_buffer = BytesMut::new();
        let first = codec.read_message(&mut reader, &mut read_buffer).await.unwrap();
        let second = codec.read_message(&mut reader, &mut read_buffer).await.unwrap();
        assert_eq!(&first[..], b"first");
        assert_eq!(&second[..], b"second");

        let closed = codec.read_message(&mut reader, &mut read_buffer).await;
        assert!(matches!(closed, Err(BoltError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_read_message_truncated_header() {
        let mut reader: &[u8] = &[0x00];
        let mut codec = ChunkCodec::new();
        let mut read_buffer = BytesMut::new();
        let err = codec.read_message(&mut reader, &mut read_buffer).await.unwrap_err();
        assert!(
            matches!(err, BoltError::Io(ref e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
        );
    }

    #[tokio::test]
    async fn test_read_message_truncated_chunk() {
        // Header promises 5 bytes, only 2 arrive
        let mut reader: &[u8] = &[0x00, 0x05, 0x01, 0x02];
        let mut codec = ChunkCodec::new();
        let mut read_buffer = BytesMut::new();
        let err = codec.read_message(&mut reader, &mut read_buffer).await.unwrap_err();
        assert!(
            matches!(err, BoltError::Io(ref e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
        );
    }

    #[tokio::test]
    async fn test_write_then_read_ten_megabytes() {
        let payload: Vec<u8> = (0..10 * 1024 * 1024).map(|i| (i % 251) as u8).collect();
        let mut codec = ChunkCodec::new();
        let mut wire: Vec<u8> = Vec::new();
        let mut scratch = BytesMut::new();
        codec.write_message(&mut wire, &payload, &mut scratch).await.unwrap();

        let mut reader: &[u8] = &wire[..];
        let mut read_buffer = BytesMut::new();
        let message = codec.read_message(&mut reader, &mut read_buffer).await.unwrap();
        assert_eq!(message.len(), payload.len());
        assert!(message[..] == payload[..]);
    }

    proptest! {
        #[test]
        fn prop_chunk_roundtrip(
            payload in proptest::collection::vec(any::<u8>(), 0..200_000),
            chunk_size in 1usize..=MAX_CHUNK_SIZE,
        ) {
            let mut buf = BytesMut::new();
            frame(&payload, chunk_size, &mut buf);
            let mut codec = ChunkCodec::new();
            let message = codec.decode(&mut buf).unwrap().unwrap();
            prop_assert_eq!(&message[..], &payload[..]);
            prop_assert!(buf.is_empty());
        }
    }
}
