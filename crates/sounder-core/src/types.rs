//! Shared audio types and engine-wide constants

/// Engine sample rate in Hz (fixed - sample-rate conversion is out of scope)
pub const SAMPLE_RATE: u32 = 44100;

/// Stereo output
pub const NUM_CHANNELS: u16 = 2;

/// 16-bit integer PCM
pub const BITS_PER_SAMPLE: u16 = 16;

/// PCM format description for a decoded buffer
///
/// Carried alongside the raw payload so the playback backend can size
/// and interpret a device buffer without re-reading the WAV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferFormat {
    /// Number of interleaved channels (1 or 2)
    pub channels: u16,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Bits per sample (16 for this engine)
    pub bits_per_sample: u16,
}

impl BufferFormat {
    /// Bytes per sample frame across all channels
    pub fn block_align(&self) -> u16 {
        self.channels * (self.bits_per_sample / 8)
    }

    /// Average bytes per second of audio
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }
}

impl Default for BufferFormat {
    fn default() -> Self {
        Self {
            channels: NUM_CHANNELS,
            sample_rate: SAMPLE_RATE,
            bits_per_sample: BITS_PER_SAMPLE,
        }
    }
}
