//! Note synthesis - equal-temperament pitch math and envelope sine rendering
//!
//! A note name like "A#4" maps to a piano key number and from there to
//! a frequency anchored at A4 = 440 Hz (key 49). Rendering produces a
//! one-second stereo cross-fading sine tone: the left channel fades in
//! from silence while the right channel fades out. That is the intended
//! (simplistic) sound, not a natural instrument timbre.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::types::{BufferFormat, SAMPLE_RATE};
use crate::wav;

/// The 12 recognized pitch-class names, in this engine's table order.
///
/// The order starts at A because key numbers are derived from the
/// position in this table; see [`NoteSpec::key_number`].
pub const PITCH_CLASSES: [&str; 12] = [
    "A", "A#", "B", "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#",
];

/// Highest octave digit accepted in a note name
pub const MAX_OCTAVE: u8 = 8;

/// Peak sample amplitude of rendered notes ("volume")
pub const MAX_AMPLITUDE: f64 = 32760.0;

/// Duration of a rendered note in seconds
pub const NOTE_DURATION_SECS: f64 = 1.0;

/// Error for unparseable note strings
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid note name: {0:?} (expected pitch class A..G# followed by octave digit 0-8)")]
pub struct InvalidNote(pub String);

/// A parsed note name: pitch class plus octave digit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoteSpec {
    pitch_index: usize,
    octave: u8,
}

impl NoteSpec {
    /// Pitch class name from the 12-entry table
    pub fn pitch_class(&self) -> &'static str {
        PITCH_CLASSES[self.pitch_index]
    }

    /// Octave digit, 0-8
    pub fn octave(&self) -> u8 {
        self.octave
    }

    /// Piano key number for this note
    ///
    /// A, A# and B (table indices 0-2) count with their own octave
    /// number while the remaining pitch classes count with the octave
    /// below. This asymmetric boundary is the engine's deliberate
    /// naming convention: A4 is key 49 and C4 is key 40, so B4 sits
    /// *above* C4. It must be preserved exactly for compatibility with
    /// previously generated sound files.
    pub fn key_number(&self) -> i32 {
        let i = self.pitch_index as i32;
        let octave = self.octave as i32;
        if i < 3 {
            i + octave * 12 + 1
        } else {
            i + (octave - 1) * 12 + 1
        }
    }

    /// Frequency in Hz under 12-tone equal temperament, A4 = 440 Hz
    pub fn frequency(&self) -> f64 {
        440.0 * 2f64.powf((self.key_number() - 49) as f64 / 12.0)
    }
}

impl FromStr for NoteSpec {
    type Err = InvalidNote;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let last = chars.next_back().ok_or_else(|| InvalidNote(s.to_owned()))?;
        let octave = match last.to_digit(10) {
            Some(d) if d <= MAX_OCTAVE as u32 => d as u8,
            _ => return Err(InvalidNote(s.to_owned())),
        };

        let prefix = chars.as_str();
        let pitch_index = PITCH_CLASSES
            .iter()
            .position(|&p| p == prefix)
            .ok_or_else(|| InvalidNote(s.to_owned()))?;

        Ok(Self { pitch_index, octave })
    }
}

impl fmt::Display for NoteSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch_class(), self.octave)
    }
}

/// Convenience wrapper: parse a note name and return its frequency
pub fn frequency_for(note: &str) -> Result<f64, InvalidNote> {
    Ok(note.parse::<NoteSpec>()?.frequency())
}

/// Render a stereo cross-fading sine tone as raw 16-bit LE PCM
///
/// For sample `n` of `N`, the envelope is a linear ramp
/// `amp = n/N * MAX_AMPLITUDE`. The left channel carries `amp * sin`,
/// the right channel the complementary `(MAX_AMPLITUDE - amp) * sin`,
/// so the tone pans from right to left over its duration.
pub fn render_waveform(frequency: f64, duration: f64, sample_rate: u32) -> Vec<u8> {
    let total = (sample_rate as f64 * duration) as usize;
    let mut pcm = Vec::with_capacity(total * 4);

    for n in 0..total {
        let amplitude = n as f64 / total as f64 * MAX_AMPLITUDE;
        let value = (2.0 * PI * n as f64 * frequency / sample_rate as f64).sin();
        let left = (amplitude * value).round() as i16;
        let right = ((MAX_AMPLITUDE - amplitude) * value).round() as i16;
        pcm.extend_from_slice(&left.to_le_bytes());
        pcm.extend_from_slice(&right.to_le_bytes());
    }

    pcm
}

/// Render a complete WAV byte buffer for a note
pub fn note_wav(note: NoteSpec) -> Vec<u8> {
    let pcm = render_waveform(note.frequency(), NOTE_DURATION_SECS, SAMPLE_RATE);
    wav::build(&pcm, BufferFormat::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(note: &str) -> i32 {
        note.parse::<NoteSpec>().unwrap().key_number()
    }

    #[test]
    fn test_a4_is_exactly_440() {
        assert_eq!(key("A4"), 49);
        assert_eq!(frequency_for("A4").unwrap(), 440.0);
    }

    #[test]
    fn test_known_keys() {
        // The asymmetric octave boundary: C4 counts with the octave
        // below (piano key 40), A4 with its own (key 49).
        assert_eq!(key("C4"), 40);
        assert_eq!(key("A0"), 1);
        assert_eq!(key("B4"), 51);
        assert_eq!(key("C5"), 52);
        assert_eq!(key("G#4"), 48);
    }

    #[test]
    fn test_c4_is_middle_c() {
        let freq = frequency_for("C4").unwrap();
        assert!((freq - 261.626).abs() < 0.01, "expected ~261.63, got {freq}");
    }

    #[test]
    fn test_octave_boundary_quirk() {
        // Under this naming convention B4 is higher than C4: C..G#
        // belong to the octave below while A, A# and B do not.
        assert!(frequency_for("B4").unwrap() > frequency_for("C4").unwrap());
        // Keys are still contiguous at both seams of the A-A#-B block
        assert_eq!(key("A4") - key("G#4"), 1);
        assert_eq!(key("C5") - key("B4"), 1);
    }

    #[test]
    fn test_frequency_monotonic_in_key_order() {
        let mut notes: Vec<(i32, f64)> = Vec::new();
        for pc in PITCH_CLASSES {
            for octave in 0..=MAX_OCTAVE {
                let spec: NoteSpec = format!("{pc}{octave}").parse().unwrap();
                notes.push((spec.key_number(), spec.frequency()));
            }
        }
        notes.sort_by_key(|(k, _)| *k);
        for pair in notes.windows(2) {
            assert!(pair[1].0 > pair[0].0, "duplicate key number {}", pair[0].0);
            assert!(pair[1].1 > pair[0].1, "frequency not increasing at key {}", pair[1].0);
        }
    }

    #[test]
    fn test_invalid_notes_rejected() {
        for bad in ["", "4", "A", "H4", "A9", "Ab4", "A#", "C#x", "A44"] {
            assert!(bad.parse::<NoteSpec>().is_err(), "{bad:?} should be invalid");
        }
    }

    #[test]
    fn test_display_roundtrip() {
        for name in ["A0", "A#4", "G#8", "C3"] {
            let spec: NoteSpec = name.parse().unwrap();
            assert_eq!(spec.to_string(), name);
        }
    }

    #[test]
    fn test_render_length_and_envelope() {
        let pcm = render_waveform(440.0, 1.0, SAMPLE_RATE);
        // 44100 stereo sample pairs, 4 bytes each
        assert_eq!(pcm.len(), 176400);

        // First pair: envelope starts at zero on the left
        let first_left = i16::from_le_bytes([pcm[0], pcm[1]]);
        assert_eq!(first_left, 0);

        // Last pair: right channel has faded out to ~0
        let n = pcm.len();
        let last_right = i16::from_le_bytes([pcm[n - 2], pcm[n - 1]]);
        assert!(last_right.abs() <= 1, "right channel should end near silence, got {last_right}");
    }

    #[test]
    fn test_render_stays_within_amplitude() {
        let pcm = render_waveform(523.25, 0.1, SAMPLE_RATE);
        for frame in pcm.chunks_exact(2) {
            let s = i16::from_le_bytes([frame[0], frame[1]]);
            assert!((s as f64).abs() <= MAX_AMPLITUDE);
        }
    }

    #[test]
    fn test_note_wav_parses_back() {
        let spec: NoteSpec = "E2".parse().unwrap();
        let bytes = note_wav(spec);
        let (header, pcm) = crate::wav::parse(&bytes).unwrap();
        assert_eq!(header.format(), BufferFormat::default());
        assert_eq!(pcm.len(), 176400);
    }
}
