//! Software-mixing playback backend on the system's default CPAL output
//!
//! Each device buffer is a [`Voice`] held by the shared [`Mixer`]; the
//! CPAL callback walks all playing voices, resamples them to the device
//! rate with linear interpolation, runs the per-voice effect and sums
//! the result into the output.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{debug, info, warn};

use crate::fx::{EffectKind, EffectParams};
use crate::types::BufferFormat;

use super::dsp::EffectProcessor;
use super::{BackendError, BufferId, PlaybackBackend};

/// One decoded sound resident in the mixer
struct Voice {
    frames: Vec<(f32, f32)>,
    source_rate: f32,
    pos: f64,
    rate: f32,
    volume: f32,
    pan: f32,
    looping: bool,
    playing: bool,
    effect: Option<EffectProcessor>,
}

impl Voice {
    fn new(frames: Vec<(f32, f32)>, source_rate: f32) -> Self {
        Self {
            frames,
            source_rate,
            pos: 0.0,
            rate: 1.0,
            volume: 1.0,
            pan: 0.0,
            looping: false,
            playing: false,
            effect: None,
        }
    }

    /// Produce the next output frame, or `None` when silent
    fn next_frame(&mut self, output_rate: f32) -> Option<(f32, f32)> {
        if !self.playing || self.frames.is_empty() {
            return None;
        }

        let idx = self.pos as usize;
        let (mut l, mut r) = if idx + 1 < self.frames.len() {
            let frac = (self.pos - idx as f64) as f32;
            let a = self.frames[idx];
            let b = self.frames[idx + 1];
            (a.0 + (b.0 - a.0) * frac, a.1 + (b.1 - a.1) * frac)
        } else {
            self.frames[idx.min(self.frames.len() - 1)]
        };

        self.pos += self.source_rate as f64 / output_rate as f64 * self.rate.max(0.0) as f64;
        if self.pos >= self.frames.len() as f64 {
            if self.looping {
                self.pos %= self.frames.len() as f64;
            } else {
                self.playing = false;
                self.pos = 0.0;
            }
        }

        l *= self.volume;
        r *= self.volume;
        if let Some(effect) = &mut self.effect {
            (l, r) = effect.process(l, r);
        }

        // Constant-ish pan: attenuate the far channel only
        let pan = self.pan.clamp(-1.0, 1.0);
        Some((l * (1.0 - pan).min(1.0), r * (1.0 + pan).min(1.0)))
    }
}

struct Mixer {
    sample_rate: f32,
    voices: HashMap<u64, Voice>,
    next_id: u64,
}

impl Mixer {
    fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            voices: HashMap::new(),
            next_id: 0,
        }
    }

    /// Fill an interleaved output slice with the sum of all voices
    fn fill(&mut self, data: &mut [f32], channels: usize) {
        let output_rate = self.sample_rate;
        for frame in data.chunks_mut(channels) {
            let mut l = 0.0f32;
            let mut r = 0.0f32;
            for voice in self.voices.values_mut() {
                if let Some((vl, vr)) = voice.next_frame(output_rate) {
                    l += vl;
                    r += vr;
                }
            }
            frame[0] = l.clamp(-1.0, 1.0);
            if channels > 1 {
                frame[1] = r.clamp(-1.0, 1.0);
            }
            for extra in frame.iter_mut().skip(2) {
                *extra = 0.0;
            }
        }
    }
}

/// Decode 16-bit little-endian PCM into stereo float frames
fn decode_pcm(format: BufferFormat, pcm: &[u8]) -> Result<Vec<(f32, f32)>, BackendError> {
    if format.bits_per_sample != 16 {
        return Err(BackendError::UnsupportedFormat(format!(
            "{} bits per sample (only 16 supported)",
            format.bits_per_sample
        )));
    }
    match format.channels {
        1 => Ok(pcm
            .chunks_exact(2)
            .map(|c| {
                let s = i16::from_le_bytes([c[0], c[1]]) as f32 / 32768.0;
                (s, s)
            })
            .collect()),
        2 => Ok(pcm
            .chunks_exact(4)
            .map(|c| {
                (
                    i16::from_le_bytes([c[0], c[1]]) as f32 / 32768.0,
                    i16::from_le_bytes([c[2], c[3]]) as f32 / 32768.0,
                )
            })
            .collect()),
        n => Err(BackendError::UnsupportedFormat(format!("{n} channels"))),
    }
}

/// Keeps the CPAL output stream alive; dropping it stops audio output.
///
/// Split from [`DeviceBackend`] because the stream is not `Send`, while
/// the backend is shared across threads.
pub struct AudioHandle {
    _stream: cpal::Stream,
}

/// [`PlaybackBackend`] over the default output device
pub struct DeviceBackend {
    mixer: Arc<Mutex<Mixer>>,
}

impl DeviceBackend {
    /// Open the default output device and start the output stream
    pub fn start() -> Result<(Self, AudioHandle), BackendError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(BackendError::NoDevice)?;
        let config = device
            .default_output_config()
            .map_err(|e| BackendError::Config(e.to_string()))?;

        let name = device.name().unwrap_or_else(|_| "unknown".to_owned());
        info!(
            "audio output: {} ({} Hz, {} ch)",
            name,
            config.sample_rate().0,
            config.channels()
        );

        if config.sample_format() != cpal::SampleFormat::F32 {
            return Err(BackendError::Config(format!(
                "device sample format {} not supported",
                config.sample_format()
            )));
        }

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        let stream_config: cpal::StreamConfig = config.into();

        let mixer = Arc::new(Mutex::new(Mixer::new(sample_rate)));
        let callback_mixer = Arc::clone(&mixer);

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut mixer = match callback_mixer.lock() {
                        Ok(guard) => guard,
                        Err(poisoned) => poisoned.into_inner(),
                    };
                    mixer.fill(data, channels);
                },
                |err| warn!("audio stream error: {err}"),
                None,
            )
            .map_err(|e| BackendError::StreamBuild(e.to_string()))?;
        stream.play().map_err(|e| BackendError::StreamStart(e.to_string()))?;

        Ok((Self { mixer }, AudioHandle { _stream: stream }))
    }

    fn lock(&self) -> MutexGuard<'_, Mixer> {
        match self.mixer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn with_voice<T>(
        &self,
        id: BufferId,
        f: impl FnOnce(&mut Voice) -> T,
    ) -> Result<T, BackendError> {
        let mut mixer = self.lock();
        let voice = mixer
            .voices
            .get_mut(&id.0)
            .ok_or(BackendError::UnknownBuffer(id))?;
        Ok(f(voice))
    }
}

impl PlaybackBackend for DeviceBackend {
    fn create_buffer(&self, format: BufferFormat, pcm: &[u8]) -> Result<BufferId, BackendError> {
        let frames = decode_pcm(format, pcm)?;
        let mut mixer = self.lock();
        let id = mixer.next_id;
        mixer.next_id += 1;
        mixer
            .voices
            .insert(id, Voice::new(frames, format.sample_rate as f32));
        debug!(
            "buffer #{id}: {} frames at {} Hz",
            mixer.voices[&id].frames.len(),
            format.sample_rate
        );
        Ok(BufferId(id))
    }

    fn release_buffer(&self, id: BufferId) {
        if self.lock().voices.remove(&id.0).is_some() {
            debug!("released buffer {id}");
        }
    }

    fn set_position(&self, id: BufferId, frame: usize) -> Result<(), BackendError> {
        self.with_voice(id, |v| {
            v.pos = (frame as f64).min(v.frames.len() as f64);
        })
    }

    fn set_volume(&self, id: BufferId, volume: f32) -> Result<(), BackendError> {
        self.with_voice(id, |v| v.volume = volume.clamp(0.0, 1.0))
    }

    fn set_pitch(&self, id: BufferId, ratio: f32) -> Result<(), BackendError> {
        self.with_voice(id, |v| v.rate = ratio.clamp(0.05, 20.0))
    }

    fn set_pan(&self, id: BufferId, pan: f32) -> Result<(), BackendError> {
        self.with_voice(id, |v| v.pan = pan.clamp(-1.0, 1.0))
    }

    fn install_effect(&self, id: BufferId, kind: EffectKind) -> Result<(), BackendError> {
        let mut mixer = self.lock();
        let sample_rate = mixer.sample_rate;
        let voice = mixer
            .voices
            .get_mut(&id.0)
            .ok_or(BackendError::UnknownBuffer(id))?;
        voice.effect = Some(EffectProcessor::new(kind, sample_rate));
        debug!("installed {kind} on buffer {id}");
        Ok(())
    }

    fn set_effect_params(&self, id: BufferId, params: &EffectParams) -> Result<(), BackendError> {
        self.with_voice(id, |v| match &mut v.effect {
            Some(processor) => {
                if processor.set_params(params) {
                    Ok(())
                } else {
                    Err(BackendError::EffectMismatch(params.kind(), id))
                }
            }
            None => Err(BackendError::EffectMismatch(params.kind(), id)),
        })?
    }

    fn play(&self, id: BufferId, looping: bool) -> Result<(), BackendError> {
        self.with_voice(id, |v| {
            v.looping = looping;
            v.playing = true;
        })
    }

    fn stop(&self, id: BufferId) -> Result<(), BackendError> {
        self.with_voice(id, |v| v.playing = false)
    }

    fn is_playing(&self, id: BufferId) -> bool {
        self.with_voice(id, |v| v.playing).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SAMPLE_RATE;

    fn stereo_pcm(frames: &[(i16, i16)]) -> Vec<u8> {
        frames
            .iter()
            .flat_map(|(l, r)| {
                let mut bytes = l.to_le_bytes().to_vec();
                bytes.extend_from_slice(&r.to_le_bytes());
                bytes
            })
            .collect()
    }

    #[test]
    fn test_decode_stereo() {
        let pcm = stereo_pcm(&[(0, 16384), (-16384, 32767)]);
        let frames = decode_pcm(BufferFormat::default(), &pcm).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].0, 0.0);
        assert!((frames[0].1 - 0.5).abs() < 1e-4);
        assert!((frames[1].0 + 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_decode_mono_duplicates_channels() {
        let format = BufferFormat {
            channels: 1,
            sample_rate: SAMPLE_RATE,
            bits_per_sample: 16,
        };
        let pcm: Vec<u8> = 1000i16.to_le_bytes().to_vec();
        let frames = decode_pcm(format, &pcm).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].0, frames[0].1);
    }

    #[test]
    fn test_decode_rejects_odd_formats() {
        let eight_bit = BufferFormat {
            channels: 2,
            sample_rate: SAMPLE_RATE,
            bits_per_sample: 8,
        };
        assert!(matches!(
            decode_pcm(eight_bit, &[0; 8]),
            Err(BackendError::UnsupportedFormat(_))
        ));

        let quad = BufferFormat {
            channels: 4,
            sample_rate: SAMPLE_RATE,
            bits_per_sample: 16,
        };
        assert!(matches!(
            decode_pcm(quad, &[0; 16]),
            Err(BackendError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_voice_plays_to_completion() {
        let mut voice = Voice::new(vec![(0.5, -0.5); 10], 44100.0);
        voice.playing = true;

        let mut produced = 0;
        while voice.next_frame(44100.0).is_some() {
            produced += 1;
            assert!(produced <= 10, "voice did not stop at end of buffer");
        }
        assert_eq!(produced, 10);
        assert!(!voice.playing);
        assert_eq!(voice.pos, 0.0);
    }

    #[test]
    fn test_voice_loops() {
        let mut voice = Voice::new(vec![(0.1, 0.1); 4], 44100.0);
        voice.playing = true;
        voice.looping = true;

        for _ in 0..64 {
            assert!(voice.next_frame(44100.0).is_some());
        }
        assert!(voice.playing);
    }

    #[test]
    fn test_voice_half_rate_doubles_duration() {
        let mut voice = Voice::new(vec![(0.2, 0.2); 10], 44100.0);
        voice.playing = true;
        voice.rate = 0.5;

        let mut produced = 0;
        while voice.next_frame(44100.0).is_some() {
            produced += 1;
            assert!(produced <= 40);
        }
        assert_eq!(produced, 20);
    }

    #[test]
    fn test_voice_pan_attenuates_far_channel() {
        let mut voice = Voice::new(vec![(0.5, 0.5); 4], 44100.0);
        voice.playing = true;
        voice.pan = -1.0;

        let (l, r) = voice.next_frame(44100.0).unwrap();
        assert!((l - 0.5).abs() < 1e-6);
        assert_eq!(r, 0.0);
    }

    #[test]
    fn test_mixer_sums_and_clamps() {
        let mut mixer = Mixer::new(44100.0);
        for id in 0..3 {
            let mut voice = Voice::new(vec![(0.6, -0.6); 100], 44100.0);
            voice.playing = true;
            mixer.voices.insert(id, voice);
        }

        let mut data = vec![0.0f32; 8];
        mixer.fill(&mut data, 2);
        // Three voices at 0.6 sum to 1.8, clamped to the output range
        assert_eq!(data[0], 1.0);
        assert_eq!(data[1], -1.0);
    }

    #[test]
    fn test_mixer_silence_when_nothing_plays() {
        let mut mixer = Mixer::new(44100.0);
        let voice = Voice::new(vec![(0.5, 0.5); 100], 44100.0);
        mixer.voices.insert(0, voice);

        let mut data = vec![0.7f32; 8];
        mixer.fill(&mut data, 2);
        assert!(data.iter().all(|&s| s == 0.0));
    }
}
