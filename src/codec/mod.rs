//! Binary wire format for whole chains
//!
//! A buffer is a sequence of frames followed by a CRC32 trailer:
//!
//! ```text
//! [frame]* [crc32: 4 bytes LE]
//! ```
//!
//! A chain-link frame is `0xA0`, the context as JSON text, then the caller's
//! file, function and line. A plain-error frame is `0xA1` followed by the
//! error's message. Strings are an 8-byte little-endian length followed by
//! UTF-8 bytes; integers are 8 bytes little-endian. The trailer covers every
//! preceding byte. The whole buffer may additionally be wrapped in a zlib
//! stream, which [`decode`] recognizes by its header byte.

mod decoder;
mod encoder;

use crate::chain::WrappedError;
use crate::errors::{WrapError, WrapResult};
use flate2::read::{ZlibDecoder, ZlibEncoder};
use std::io::Read;
use tracing::debug;

/// Delimiter of a chain-link frame
pub const FRAME_WRAPPED: u8 = 0xA0;

/// Delimiter of a plain-error frame
pub const FRAME_PLAIN: u8 = 0xA1;

/// Size of the CRC32 trailer
pub const CRC_LEN: usize = 4;

/// First byte of a zlib stream at any compression level
const ZLIB_HEADER: u8 = 0x78;

/// Envelope applied around an encoded buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    None,
    #[default]
    Zlib,
}

/// Encoder and decoder for chains
///
/// # Example
///
/// ```rust
/// use wrapped_error::codec::{Codec, Compression};
/// use wrapped_error::WrappedError;
///
/// let err = WrappedError::root("disk full");
/// let codec = Codec::new(Compression::None);
/// let bytes = codec.encode(&err).unwrap();
/// let decoded = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded.rendered_message(), "disk full");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Codec {
    compression: Compression,
    level: u32,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new(Compression::default())
    }
}

impl Codec {
    pub fn new(compression: Compression) -> Self {
        Self {
            compression,
            level: 6,
        }
    }

    /// Set the zlib level (0-9, higher values are clamped)
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level.min(9);
        self
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Encode `err` and every link below it
    ///
    /// # Errors
    ///
    /// Returns [`WrapError::Compression`] if the zlib envelope cannot be
    /// written. Uncompressed encoding cannot fail.
    pub fn encode(&self, err: &WrappedError) -> WrapResult<Vec<u8>> {
        let (mut buf, frames) = encoder::write_frames(err.as_link());

        let mut crc = flate2::Crc::new();
        crc.update(&buf);
        buf.extend_from_slice(&crc.sum().to_le_bytes());

        debug!(
            "encoded {} frames into {} bytes ({:?})",
            frames,
            buf.len(),
            self.compression
        );

        match self.compression {
            Compression::None => Ok(buf),
            Compression::Zlib => compress(&buf, self.level),
        }
    }

    /// Decode a buffer produced by [`encode`](Self::encode)
    ///
    /// Compressed and uncompressed buffers are both accepted whatever this
    /// codec's own compression setting is.
    ///
    /// # Errors
    ///
    /// Returns [`WrapError::Decoding`] for truncated, malformed or
    /// undecompressable input, or input holding no chain-link frame, and
    /// [`WrapError::Integrity`] when the frames parse but the CRC trailer does
    /// not match them.
    pub fn decode(&self, data: &[u8]) -> WrapResult<WrappedError> {
        let inflated;
        let data = if data.first() == Some(&ZLIB_HEADER) {
            inflated = decompress(data)?;
            inflated.as_slice()
        } else {
            data
        };

        if data.len() < CRC_LEN {
            return Err(WrapError::decoding(format!(
                "buffer of {} bytes is shorter than the CRC trailer",
                data.len()
            )));
        }

        let (payload, trailer) = data.split_at(data.len() - CRC_LEN);
        let frames = decoder::read_frames(payload)?;
        let count = frames.len();
        let head = decoder::link_frames(frames)?;

        let mut raw = [0u8; CRC_LEN];
        raw.copy_from_slice(trailer);
        let expected = u32::from_le_bytes(raw);
        let mut crc = flate2::Crc::new();
        crc.update(payload);
        let actual = crc.sum();
        if expected != actual {
            return Err(WrapError::integrity(expected, actual));
        }

        debug!("decoded {} frames from {} bytes", count, data.len());
        Ok(head)
    }
}

/// Encode `err` with the default codec (zlib)
pub fn encode(err: &WrappedError) -> WrapResult<Vec<u8>> {
    Codec::default().encode(err)
}

/// Decode a buffer, compressed or not
pub fn decode(data: &[u8]) -> WrapResult<WrappedError> {
    Codec::default().decode(data)
}

fn compress(data: &[u8], level: u32) -> WrapResult<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(data, flate2::Compression::new(level));
    let mut compressed = Vec::new();
    encoder
        .read_to_end(&mut compressed)
        .map_err(|e| WrapError::compression("zlib compression", e))?;
    Ok(compressed)
}

fn decompress(data: &[u8]) -> WrapResult<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| WrapError::decoding(format!("zlib decompression failed: {}", e)))?;
    Ok(decompressed)
}
