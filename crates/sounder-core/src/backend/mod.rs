//! Playback backend abstraction
//!
//! The engine talks to the audio device through the [`PlaybackBackend`]
//! trait: buffer creation/upload, per-buffer playback controls, and the
//! effect chain. The in-tree implementation is [`device::DeviceBackend`]
//! (software mixing on CPAL); tests substitute their own.
//!
//! Control units are engine-native rather than device-native:
//! - volume: linear gain, 0.0 (silent) to 1.0 (full)
//! - pitch: playback-rate ratio, 1.0 = original speed
//! - pan: -1.0 (left) through 0.0 (center) to 1.0 (right)
//!
//! The engine passes these through unclamped; a backend may clamp or
//! reject out-of-range values.

pub mod device;
mod dsp;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::fx::{EffectKind, EffectParams};
use crate::types::BufferFormat;

/// Errors reported by a playback backend
#[derive(Error, Debug)]
pub enum BackendError {
    /// No audio output device available
    #[error("no audio output device found")]
    NoDevice,

    /// Failed to query or select a device configuration
    #[error("failed to get device config: {0}")]
    Config(String),

    /// Failed to build the output stream
    #[error("failed to build audio stream: {0}")]
    StreamBuild(String),

    /// Failed to start the output stream
    #[error("failed to start audio stream: {0}")]
    StreamStart(String),

    /// The backend refused the buffer format
    #[error("unsupported buffer format: {0}")]
    UnsupportedFormat(String),

    /// A control call referenced a released or unknown buffer
    #[error("unknown buffer handle {0}")]
    UnknownBuffer(BufferId),

    /// Parameters were pushed for a kind with no matching installed effect
    #[error("no {0} effect installed on buffer {1}")]
    EffectMismatch(EffectKind, BufferId),
}

/// Opaque identifier for a device-resident buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u64);

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Interface to the audio device that mixes and emits audio
///
/// One buffer per cached sound; every call runs to completion on the
/// caller's thread and either succeeds or fails immediately.
pub trait PlaybackBackend: Send + Sync {
    /// Create a device buffer in the given format and upload the PCM
    /// payload into it
    fn create_buffer(&self, format: BufferFormat, pcm: &[u8]) -> Result<BufferId, BackendError>;

    /// Release a device buffer; unknown ids are ignored
    fn release_buffer(&self, id: BufferId);

    /// Set the playback position in sample frames from the start
    fn set_position(&self, id: BufferId, frame: usize) -> Result<(), BackendError>;

    /// Set linear volume gain
    fn set_volume(&self, id: BufferId, volume: f32) -> Result<(), BackendError>;

    /// Set the playback-rate ratio (1.0 = original pitch)
    fn set_pitch(&self, id: BufferId, ratio: f32) -> Result<(), BackendError>;

    /// Set stereo pan (-1.0 left .. 1.0 right)
    fn set_pan(&self, id: BufferId, pan: f32) -> Result<(), BackendError>;

    /// Install a single-element effect chain of the given kind on the
    /// buffer. What happens to a previously installed effect is
    /// backend-defined; [`device::DeviceBackend`] replaces it.
    fn install_effect(&self, id: BufferId, kind: EffectKind) -> Result<(), BackendError>;

    /// Push a full parameter record onto the installed effect
    fn set_effect_params(&self, id: BufferId, params: &EffectParams) -> Result<(), BackendError>;

    /// Start playback from the current position
    fn play(&self, id: BufferId, looping: bool) -> Result<(), BackendError>;

    /// Stop playback, keeping the current position
    fn stop(&self, id: BufferId) -> Result<(), BackendError>;

    /// Whether the buffer is currently playing
    fn is_playing(&self, id: BufferId) -> bool;
}

/// Scoped-ownership handle to one device-resident buffer
///
/// Releases the device buffer when dropped, so no leak path exists even
/// on early-return failures.
pub struct SoundBuffer {
    backend: Arc<dyn PlaybackBackend>,
    id: BufferId,
}

impl SoundBuffer {
    pub fn new(backend: Arc<dyn PlaybackBackend>, id: BufferId) -> Self {
        Self { backend, id }
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn set_position(&self, frame: usize) -> Result<(), BackendError> {
        self.backend.set_position(self.id, frame)
    }

    pub fn set_volume(&self, volume: f32) -> Result<(), BackendError> {
        self.backend.set_volume(self.id, volume)
    }

    pub fn set_pitch(&self, ratio: f32) -> Result<(), BackendError> {
        self.backend.set_pitch(self.id, ratio)
    }

    pub fn set_pan(&self, pan: f32) -> Result<(), BackendError> {
        self.backend.set_pan(self.id, pan)
    }

    pub fn install_effect(&self, kind: EffectKind) -> Result<(), BackendError> {
        self.backend.install_effect(self.id, kind)
    }

    pub fn set_effect_params(&self, params: &EffectParams) -> Result<(), BackendError> {
        self.backend.set_effect_params(self.id, params)
    }

    pub fn play(&self, looping: bool) -> Result<(), BackendError> {
        self.backend.play(self.id, looping)
    }

    pub fn stop(&self) -> Result<(), BackendError> {
        self.backend.stop(self.id)
    }

    pub fn is_playing(&self) -> bool {
        self.backend.is_playing(self.id)
    }
}

impl fmt::Debug for SoundBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoundBuffer").field("id", &self.id).finish()
    }
}

impl Drop for SoundBuffer {
    fn drop(&mut self) {
        self.backend.release_buffer(self.id);
    }
}
