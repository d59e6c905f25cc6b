//! Effect kinds and parameter records
//!
//! One flat parameter struct per effect kind, with the valid range
//! documented per field. The `Default` impls carry the engine's
//! "musical" presets rather than the bland hardware defaults. Setters
//! replace the whole value struct and perform no range validation;
//! out-of-range values are passed through to the playback backend,
//! which may clamp or reject them.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The fixed set of effect kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Chorus,
    Compressor,
    Distortion,
    Echo,
    Flanger,
    Gargle,
    ParamEq,
    Reverb,
}

impl EffectKind {
    /// All effect kinds, in declaration order
    pub const ALL: [EffectKind; 8] = [
        EffectKind::Chorus,
        EffectKind::Compressor,
        EffectKind::Distortion,
        EffectKind::Echo,
        EffectKind::Flanger,
        EffectKind::Gargle,
        EffectKind::ParamEq,
        EffectKind::Reverb,
    ];

    /// Lower-case name as used on the command line
    pub fn name(&self) -> &'static str {
        match self {
            EffectKind::Chorus => "chorus",
            EffectKind::Compressor => "compressor",
            EffectKind::Distortion => "distortion",
            EffectKind::Echo => "echo",
            EffectKind::Flanger => "flanger",
            EffectKind::Gargle => "gargle",
            EffectKind::ParamEq => "parameq",
            EffectKind::Reverb => "reverb",
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for unrecognized effect names
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown effect kind: {0:?}")]
pub struct UnknownEffect(pub String);

impl FromStr for EffectKind {
    type Err = UnknownEffect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EffectKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s.to_ascii_lowercase())
            .ok_or_else(|| UnknownEffect(s.to_owned()))
    }
}

/// LFO waveform for chorus and flanger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModWaveform {
    Triangle,
    #[default]
    Sine,
}

/// LFO phase differential between left and right channels
///
/// Encoded 0-4 on the wire, where `Zero` (2) means no differential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LfoPhase {
    Neg180 = 0,
    Neg90 = 1,
    #[default]
    Zero = 2,
    Pos90 = 3,
    Pos180 = 4,
}

impl LfoPhase {
    /// Phase differential in degrees
    pub fn degrees(&self) -> f32 {
        match self {
            LfoPhase::Neg180 => -180.0,
            LfoPhase::Neg90 => -90.0,
            LfoPhase::Zero => 0.0,
            LfoPhase::Pos90 => 90.0,
            LfoPhase::Pos180 => 180.0,
        }
    }
}

/// Modulation shape for the gargle effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GargleShape {
    #[default]
    Triangle,
    Square,
}

/// Chorus parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChorusParams {
    /// Wet/dry mix percentage, 0-100
    pub wet_dry_mix: f32,
    /// Modulation depth, 0-1000
    pub depth: f32,
    /// Feedback percentage, 0-99
    pub feedback: f32,
    /// LFO frequency in Hz, 0-10
    pub frequency: f32,
    /// LFO waveform
    pub waveform: ModWaveform,
    /// Base delay in ms, 0-20
    pub delay: f32,
    /// Left/right LFO phase differential
    pub phase: LfoPhase,
}

impl Default for ChorusParams {
    fn default() -> Self {
        Self {
            wet_dry_mix: 50.0,
            depth: 50.0,
            feedback: 20.0,
            frequency: 1.5,
            waveform: ModWaveform::Sine,
            delay: 16.0,
            phase: LfoPhase::Zero,
        }
    }
}

/// Compressor parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressorParams {
    /// Output (makeup) gain in dB, -60 to 60
    pub gain: f32,
    /// Attack time in ms, 0.01-500
    pub attack: f32,
    /// Release time in ms, 50-3000
    pub release: f32,
    /// Threshold in dB, -60 to 0
    pub threshold: f32,
    /// Compression ratio, 1-100 (3 means 3:1)
    pub ratio: f32,
    /// Lookahead predelay in ms, 0-4
    pub predelay: f32,
}

impl Default for CompressorParams {
    fn default() -> Self {
        Self {
            gain: 10.0,
            attack: 10.0,
            release: 100.0,
            threshold: -50.0,
            ratio: 3.0,
            predelay: 4.0,
        }
    }
}

/// Distortion parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistortionParams {
    /// Output gain in dB, -60 to 0
    pub gain: f32,
    /// Intensity ("edge") percentage, 0-100
    pub edge: f32,
    /// Post-EQ center frequency in Hz, 100-8000
    pub post_eq_center_freq: f32,
    /// Post-EQ bandwidth in Hz, 100-8000
    pub post_eq_bandwidth: f32,
    /// Pre-distortion lowpass cutoff in Hz, 100-8000
    pub pre_lowpass_cutoff: f32,
}

impl Default for DistortionParams {
    fn default() -> Self {
        Self {
            gain: -15.0,
            edge: 33.0,
            post_eq_center_freq: 2400.0,
            post_eq_bandwidth: 1600.0,
            pre_lowpass_cutoff: 8000.0,
        }
    }
}

/// Echo parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EchoParams {
    /// Wet/dry mix percentage, 0-100
    pub wet_dry_mix: f32,
    /// Feedback percentage, 0-100
    pub feedback: f32,
    /// Left channel delay in ms, 1-2000
    pub left_delay: f32,
    /// Right channel delay in ms, 1-2000
    pub right_delay: f32,
    /// Swap left/right delays on each successive echo
    pub pan_delay: bool,
}

impl Default for EchoParams {
    fn default() -> Self {
        Self {
            wet_dry_mix: 67.0,
            feedback: 67.0,
            left_delay: 300.0,
            right_delay: 300.0,
            pan_delay: false,
        }
    }
}

/// Flanger parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlangerParams {
    /// Wet/dry mix percentage, 0-100
    pub wet_dry_mix: f32,
    /// Modulation depth, 0-100
    pub depth: f32,
    /// Feedback percentage, -99 to 99
    pub feedback: f32,
    /// LFO frequency in Hz, 0-10
    pub frequency: f32,
    /// LFO waveform
    pub waveform: ModWaveform,
    /// Base delay in ms, 0-4
    pub delay: f32,
    /// Left/right LFO phase differential
    pub phase: LfoPhase,
}

impl Default for FlangerParams {
    fn default() -> Self {
        Self {
            wet_dry_mix: 75.0,
            depth: 75.0,
            feedback: -99.0,
            frequency: 0.25,
            waveform: ModWaveform::Triangle,
            delay: 4.0,
            phase: LfoPhase::Zero,
        }
    }
}

/// Gargle (amplitude modulation) parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GargleParams {
    /// Modulation rate in Hz, 1-1000
    pub rate_hz: u32,
    /// Modulation shape
    pub wave_shape: GargleShape,
}

impl Default for GargleParams {
    fn default() -> Self {
        Self {
            rate_hz: 10,
            wave_shape: GargleShape::Triangle,
        }
    }
}

/// Parametric EQ parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamEqParams {
    /// Center frequency in Hz, 80-16000
    pub center: f32,
    /// Bandwidth in semitones, 1-36
    pub bandwidth: f32,
    /// Gain in dB, -15 to 15
    pub gain: f32,
}

impl Default for ParamEqParams {
    fn default() -> Self {
        Self {
            center: 800.0,
            bandwidth: 30.0,
            gain: -15.0,
        }
    }
}

/// Reverb parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbParams {
    /// Input gain in dB, -96 to 0
    pub in_gain: f32,
    /// Reverb mix in dB, -96 to 0 (0 is maximal reverb)
    pub reverb_mix: f32,
    /// Decay time in ms, 0.001-3000
    pub reverb_time: f32,
    /// High-frequency decay ratio, 0.001-0.999
    pub high_freq_rt_ratio: f32,
}

impl Default for ReverbParams {
    fn default() -> Self {
        Self {
            in_gain: -3.0,
            reverb_mix: 0.0,
            reverb_time: 1000.0,
            high_freq_rt_ratio: 0.5,
        }
    }
}

/// A snapshot of one effect's parameters, as pushed to the backend's
/// all-parameters call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectParams {
    Chorus(ChorusParams),
    Compressor(CompressorParams),
    Distortion(DistortionParams),
    Echo(EchoParams),
    Flanger(FlangerParams),
    Gargle(GargleParams),
    ParamEq(ParamEqParams),
    Reverb(ReverbParams),
}

impl EffectParams {
    /// Which effect kind this parameter record belongs to
    pub fn kind(&self) -> EffectKind {
        match self {
            EffectParams::Chorus(_) => EffectKind::Chorus,
            EffectParams::Compressor(_) => EffectKind::Compressor,
            EffectParams::Distortion(_) => EffectKind::Distortion,
            EffectParams::Echo(_) => EffectKind::Echo,
            EffectParams::Flanger(_) => EffectKind::Flanger,
            EffectParams::Gargle(_) => EffectKind::Gargle,
            EffectParams::ParamEq(_) => EffectKind::ParamEq,
            EffectParams::Reverb(_) => EffectKind::Reverb,
        }
    }
}

/// One current parameter record per effect kind
///
/// Seeded with the musical presets at construction, mutated only by the
/// per-kind setters and read as an immutable snapshot at apply time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectStore {
    chorus: ChorusParams,
    compressor: CompressorParams,
    distortion: DistortionParams,
    echo: EchoParams,
    flanger: FlangerParams,
    gargle: GargleParams,
    param_eq: ParamEqParams,
    reverb: ReverbParams,
}

impl EffectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_chorus(&mut self, params: ChorusParams) {
        self.chorus = params;
    }

    pub fn set_compressor(&mut self, params: CompressorParams) {
        self.compressor = params;
    }

    pub fn set_distortion(&mut self, params: DistortionParams) {
        self.distortion = params;
    }

    pub fn set_echo(&mut self, params: EchoParams) {
        self.echo = params;
    }

    pub fn set_flanger(&mut self, params: FlangerParams) {
        self.flanger = params;
    }

    pub fn set_gargle(&mut self, params: GargleParams) {
        self.gargle = params;
    }

    pub fn set_param_eq(&mut self, params: ParamEqParams) {
        self.param_eq = params;
    }

    pub fn set_reverb(&mut self, params: ReverbParams) {
        self.reverb = params;
    }

    /// Snapshot of the current record for the given kind
    pub fn params_for(&self, kind: EffectKind) -> EffectParams {
        match kind {
            EffectKind::Chorus => EffectParams::Chorus(self.chorus),
            EffectKind::Compressor => EffectParams::Compressor(self.compressor),
            EffectKind::Distortion => EffectParams::Distortion(self.distortion),
            EffectKind::Echo => EffectParams::Echo(self.echo),
            EffectKind::Flanger => EffectParams::Flanger(self.flanger),
            EffectKind::Gargle => EffectParams::Gargle(self.gargle),
            EffectKind::ParamEq => EffectParams::ParamEq(self.param_eq),
            EffectKind::Reverb => EffectParams::Reverb(self.reverb),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_values() {
        let store = EffectStore::new();

        match store.params_for(EffectKind::Chorus) {
            EffectParams::Chorus(p) => {
                assert_eq!(p.wet_dry_mix, 50.0);
                assert_eq!(p.frequency, 1.5);
                assert_eq!(p.waveform, ModWaveform::Sine);
                assert_eq!(p.delay, 16.0);
                assert_eq!(p.phase, LfoPhase::Zero);
            }
            other => panic!("wrong variant: {other:?}"),
        }

        match store.params_for(EffectKind::Flanger) {
            EffectParams::Flanger(p) => {
                assert_eq!(p.feedback, -99.0);
                assert_eq!(p.frequency, 0.25);
                assert_eq!(p.waveform, ModWaveform::Triangle);
            }
            other => panic!("wrong variant: {other:?}"),
        }

        match store.params_for(EffectKind::Reverb) {
            EffectParams::Reverb(p) => {
                assert_eq!(p.in_gain, -3.0);
                assert_eq!(p.reverb_time, 1000.0);
                assert_eq!(p.high_freq_rt_ratio, 0.5);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_setter_replaces_record() {
        let mut store = EffectStore::new();
        store.set_param_eq(ParamEqParams {
            center: 2000.0,
            bandwidth: 12.0,
            gain: 6.0,
        });

        match store.params_for(EffectKind::ParamEq) {
            EffectParams::ParamEq(p) => {
                assert_eq!(p.center, 2000.0);
                assert_eq!(p.gain, 6.0);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_setters_do_not_validate_ranges() {
        let mut store = EffectStore::new();
        // Way out of the documented 0-100 range; passed through as-is
        store.set_echo(EchoParams {
            wet_dry_mix: 400.0,
            ..EchoParams::default()
        });
        match store.params_for(EffectKind::Echo) {
            EffectParams::Echo(p) => assert_eq!(p.wet_dry_mix, 400.0),
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_snapshot_kind_matches() {
        let store = EffectStore::new();
        for kind in EffectKind::ALL {
            assert_eq!(store.params_for(kind).kind(), kind);
        }
    }

    #[test]
    fn test_kind_name_roundtrip() {
        for kind in EffectKind::ALL {
            let parsed: EffectKind = kind.name().parse().unwrap();
            assert_eq!(parsed, kind);
        }
        assert!("phaser".parse::<EffectKind>().is_err());
        assert_eq!("REVERB".parse::<EffectKind>().unwrap(), EffectKind::Reverb);
    }
}
