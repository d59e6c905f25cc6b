//! Strict minimal-header WAV parsing and serialization
//!
//! This codec only supports the canonical 44-byte RIFF/WAVE layout:
//! a "fmt " chunk of 16 bytes followed immediately by the "data" chunk.
//! There is no chunk skipping and no support for extension or padding
//! chunks - anything else is rejected as malformed. All fields are
//! decoded little-endian, field by field; the file's byte layout is
//! never assumed to match an in-memory struct.

use thiserror::Error;

use crate::types::BufferFormat;

/// Size of the canonical minimal WAV header
pub const HEADER_LEN: usize = 44;

/// RIFF format tag for linear PCM
pub const FORMAT_PCM: u16 = 1;

/// Errors produced by the WAV codec
#[derive(Error, Debug)]
pub enum WavError {
    /// Fewer bytes than a minimal header
    #[error("buffer too short for a WAV header: {0} bytes (need {HEADER_LEN})")]
    TooShort(usize),

    /// One of the four-character tags did not match its ASCII literal
    #[error("bad {field} tag: expected {expected:?}, found {found:?}")]
    BadTag {
        field: &'static str,
        expected: [u8; 4],
        found: [u8; 4],
    },

    /// The data chunk declares more bytes than the buffer holds
    #[error("data chunk truncated: header declares {declared} bytes, {available} available")]
    TruncatedData { declared: u32, available: usize },
}

/// The canonical minimal WAV header, one field per file field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub chunk_id: [u8; 4],
    pub chunk_size: u32,
    pub format: [u8; 4],
    pub sub_chunk_id: [u8; 4],
    pub sub_chunk_size: u32,
    pub audio_format: u16,
    pub num_channels: u16,
    pub sample_rate: u32,
    pub bytes_per_second: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub data_chunk_id: [u8; 4],
    pub data_size: u32,
}

impl WavHeader {
    /// Build the header for a payload of `len` bytes in the given format
    pub fn for_payload(len: u32, format: BufferFormat) -> Self {
        Self {
            chunk_id: *b"RIFF",
            // RIFF chunk size is total file length minus the 8-byte
            // chunk id + size pair
            chunk_size: HEADER_LEN as u32 + len - 8,
            format: *b"WAVE",
            sub_chunk_id: *b"fmt ",
            sub_chunk_size: 16,
            audio_format: FORMAT_PCM,
            num_channels: format.channels,
            sample_rate: format.sample_rate,
            bytes_per_second: format.byte_rate(),
            block_align: format.block_align(),
            bits_per_sample: format.bits_per_sample,
            data_chunk_id: *b"data",
            data_size: len,
        }
    }

    /// PCM format description carried by this header
    pub fn format(&self) -> BufferFormat {
        BufferFormat {
            channels: self.num_channels,
            sample_rate: self.sample_rate,
            bits_per_sample: self.bits_per_sample,
        }
    }
}

fn tag(bytes: &[u8], offset: usize) -> [u8; 4] {
    // Callers have already checked bounds
    bytes[offset..offset + 4].try_into().unwrap()
}

fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

fn u16_at(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap())
}

fn check_tag(bytes: &[u8], offset: usize, field: &'static str, expected: &[u8; 4]) -> Result<[u8; 4], WavError> {
    let found = tag(bytes, offset);
    if &found != expected {
        return Err(WavError::BadTag {
            field,
            expected: *expected,
            found,
        });
    }
    Ok(found)
}

/// Parse a WAV byte buffer into its header and PCM payload
///
/// The payload is exactly the `data_size` bytes immediately following
/// the header; trailing bytes beyond the declared size are ignored.
pub fn parse(bytes: &[u8]) -> Result<(WavHeader, Vec<u8>), WavError> {
    if bytes.len() < HEADER_LEN {
        return Err(WavError::TooShort(bytes.len()));
    }

    let header = WavHeader {
        chunk_id: check_tag(bytes, 0, "chunkId", b"RIFF")?,
        chunk_size: u32_at(bytes, 4),
        format: check_tag(bytes, 8, "format", b"WAVE")?,
        sub_chunk_id: check_tag(bytes, 12, "subChunkId", b"fmt ")?,
        sub_chunk_size: u32_at(bytes, 16),
        audio_format: u16_at(bytes, 20),
        num_channels: u16_at(bytes, 22),
        sample_rate: u32_at(bytes, 24),
        bytes_per_second: u32_at(bytes, 28),
        block_align: u16_at(bytes, 32),
        bits_per_sample: u16_at(bytes, 34),
        data_chunk_id: check_tag(bytes, 36, "dataChunkId", b"data")?,
        data_size: u32_at(bytes, 40),
    };

    let available = bytes.len() - HEADER_LEN;
    if (header.data_size as usize) > available {
        return Err(WavError::TruncatedData {
            declared: header.data_size,
            available,
        });
    }

    let payload = bytes[HEADER_LEN..HEADER_LEN + header.data_size as usize].to_vec();
    Ok((header, payload))
}

/// Serialize a PCM payload into a complete WAV byte buffer
///
/// Both size fields are computed up front from the payload length, so
/// the header never needs back-patching after the data is appended.
pub fn build(payload: &[u8], format: BufferFormat) -> Vec<u8> {
    let header = WavHeader::for_payload(payload.len() as u32, format);
    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());

    bytes.extend_from_slice(&header.chunk_id);
    bytes.extend_from_slice(&header.chunk_size.to_le_bytes());
    bytes.extend_from_slice(&header.format);
    bytes.extend_from_slice(&header.sub_chunk_id);
    bytes.extend_from_slice(&header.sub_chunk_size.to_le_bytes());
    bytes.extend_from_slice(&header.audio_format.to_le_bytes());
    bytes.extend_from_slice(&header.num_channels.to_le_bytes());
    bytes.extend_from_slice(&header.sample_rate.to_le_bytes());
    bytes.extend_from_slice(&header.bytes_per_second.to_le_bytes());
    bytes.extend_from_slice(&header.block_align.to_le_bytes());
    bytes.extend_from_slice(&header.bits_per_sample.to_le_bytes());
    bytes.extend_from_slice(&header.data_chunk_id);
    bytes.extend_from_slice(&header.data_size.to_le_bytes());
    bytes.extend_from_slice(payload);

    debug_assert_eq!(bytes.len(), HEADER_LEN + payload.len());
    bytes
}
