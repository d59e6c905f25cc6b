//! In-process effect DSP for the device backend
//!
//! One processor per effect kind, running per voice on one stereo frame
//! at a time. Parameters arrive in the wire units of [`crate::fx`]
//! (milliseconds, percent, dB, semitones) and are mapped to filter and
//! delay-line settings here.

use std::f32::consts::PI;

use crate::fx::{
    ChorusParams, CompressorParams, DistortionParams, EchoParams, EffectKind, EffectParams,
    FlangerParams, GargleParams, GargleShape, LfoPhase, ModWaveform, ParamEqParams, ReverbParams,
};

const TWO_PI: f32 = 2.0 * PI;

fn db_to_gain(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

fn ms_to_samples(ms: f32, sample_rate: f32) -> f32 {
    ms * sample_rate / 1000.0
}

/// Smoothing coefficient for a one-pole envelope with the given time
/// constant in milliseconds
fn envelope_coef(ms: f32, sample_rate: f32) -> f32 {
    if ms <= 0.0 {
        return 0.0;
    }
    (-1.0 / (ms * 0.001 * sample_rate)).exp()
}

/// LFO in [-1, 1] for a phase in radians
fn lfo(waveform: ModWaveform, phase: f32) -> f32 {
    let phase = phase.rem_euclid(TWO_PI);
    match waveform {
        ModWaveform::Sine => phase.sin(),
        ModWaveform::Triangle => {
            let t = phase / TWO_PI;
            if t < 0.5 {
                4.0 * t - 1.0
            } else {
                3.0 - 4.0 * t
            }
        }
    }
}

/// Ring buffer with interpolated read for delay-based effects
struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    fn new(max_delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; max_delay_samples.max(4)],
            write_pos: 0,
        }
    }

    fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Read `delay_samples` behind the most recent write, with linear
    /// interpolation (0.0 reads the sample just written)
    fn read_interpolated(&self, delay_samples: f32) -> f32 {
        let len = self.buffer.len();
        let delay = delay_samples.clamp(0.0, len as f32 - 2.0);
        let delay_int = delay.floor() as usize;
        let frac = delay - delay_int as f32;

        let pos1 = (self.write_pos + len - delay_int - 1) % len;
        let pos2 = (self.write_pos + len - delay_int - 2) % len;
        self.buffer[pos1] * (1.0 - frac) + self.buffer[pos2] * frac
    }
}

/// RBJ biquad, transposed direct form II
#[derive(Clone, Copy)]
struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    z1: f32,
    z2: f32,
}

impl Biquad {
    fn identity() -> Self {
        Self { b0: 1.0, b1: 0.0, b2: 0.0, a1: 0.0, a2: 0.0, z1: 0.0, z2: 0.0 }
    }

    /// Peaking EQ with bandwidth in octaves
    fn peaking(fc: f32, gain_db: f32, bw_octaves: f32, sample_rate: f32) -> Self {
        let fc = fc.clamp(20.0, sample_rate * 0.45);
        let w0 = TWO_PI * fc / sample_rate;
        let a = 10f32.powf(gain_db / 40.0);
        let alpha = w0.sin() * (2f32.ln() / 2.0 * bw_octaves * w0 / w0.sin()).sinh();

        let a0 = 1.0 + alpha / a;
        Self {
            b0: (1.0 + alpha * a) / a0,
            b1: (-2.0 * w0.cos()) / a0,
            b2: (1.0 - alpha * a) / a0,
            a1: (-2.0 * w0.cos()) / a0,
            a2: (1.0 - alpha / a) / a0,
            z1: 0.0,
            z2: 0.0,
        }
    }

    /// Constant-peak-gain bandpass
    fn bandpass(fc: f32, q: f32, sample_rate: f32) -> Self {
        let fc = fc.clamp(20.0, sample_rate * 0.45);
        let w0 = TWO_PI * fc / sample_rate;
        let alpha = w0.sin() / (2.0 * q.max(0.05));

        let a0 = 1.0 + alpha;
        Self {
            b0: alpha / a0,
            b1: 0.0,
            b2: -alpha / a0,
            a1: (-2.0 * w0.cos()) / a0,
            a2: (1.0 - alpha) / a0,
            z1: 0.0,
            z2: 0.0,
        }
    }

    fn process(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.z1;
        self.z1 = self.b1 * x - self.a1 * y + self.z2;
        self.z2 = self.b2 * x - self.a2 * y;
        y
    }
}

/// One-pole lowpass used as the distortion pre-filter
#[derive(Clone, Copy)]
struct OnePole {
    a: f32,
    y: f32,
}

impl OnePole {
    fn lowpass(fc: f32, sample_rate: f32) -> Self {
        let fc = fc.clamp(20.0, sample_rate * 0.45);
        Self {
            a: 1.0 - (-TWO_PI * fc / sample_rate).exp(),
            y: 0.0,
        }
    }

    fn process(&mut self, x: f32) -> f32 {
        self.y += self.a * (x - self.y);
        self.y
    }
}

/// Modulated delay shared by chorus and flanger
pub(crate) struct ModDelay {
    left: DelayLine,
    right: DelayLine,
    sample_rate: f32,
    lfo_phase: f32,
    wet: f32,
    depth: f32,
    feedback: f32,
    rate_hz: f32,
    waveform: ModWaveform,
    delay_ms: f32,
    phase_offset: f32,
    fb_l: f32,
    fb_r: f32,
}

impl ModDelay {
    fn new(sample_rate: f32, max_delay_ms: f32) -> Self {
        let capacity = ms_to_samples(max_delay_ms * 2.0, sample_rate) as usize + 4;
        Self {
            left: DelayLine::new(capacity),
            right: DelayLine::new(capacity),
            sample_rate,
            lfo_phase: 0.0,
            wet: 0.0,
            depth: 0.0,
            feedback: 0.0,
            rate_hz: 0.0,
            waveform: ModWaveform::Sine,
            delay_ms: 0.0,
            phase_offset: 0.0,
            fb_l: 0.0,
            fb_r: 0.0,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn configure(
        &mut self,
        wet_pct: f32,
        depth_pct: f32,
        feedback_pct: f32,
        rate_hz: f32,
        waveform: ModWaveform,
        delay_ms: f32,
        phase: LfoPhase,
    ) {
        self.wet = (wet_pct / 100.0).clamp(0.0, 1.0);
        self.depth = (depth_pct / 100.0).clamp(0.0, 1.0);
        self.feedback = (feedback_pct / 100.0).clamp(-0.99, 0.99);
        self.rate_hz = rate_hz.clamp(0.0, 20.0);
        self.waveform = waveform;
        self.delay_ms = delay_ms.max(0.1);
        self.phase_offset = phase.degrees().to_radians();
    }

    fn process(&mut self, l: f32, r: f32) -> (f32, f32) {
        self.left.write(l + self.fb_l * self.feedback);
        self.right.write(r + self.fb_r * self.feedback);

        let mod_l = lfo(self.waveform, self.lfo_phase);
        let mod_r = lfo(self.waveform, self.lfo_phase + self.phase_offset);
        self.lfo_phase = (self.lfo_phase + TWO_PI * self.rate_hz / self.sample_rate) % TWO_PI;

        let base = ms_to_samples(self.delay_ms, self.sample_rate);
        let wet_l = self.left.read_interpolated(base * (1.0 + self.depth * mod_l * 0.5));
        let wet_r = self.right.read_interpolated(base * (1.0 + self.depth * mod_r * 0.5));
        self.fb_l = wet_l;
        self.fb_r = wet_r;

        (
            l * (1.0 - self.wet) + wet_l * self.wet,
            r * (1.0 - self.wet) + wet_r * self.wet,
        )
    }
}

/// Stereo echo with optional delay swapping on each repeat
pub(crate) struct Echo {
    left: DelayLine,
    right: DelayLine,
    sample_rate: f32,
    wet: f32,
    feedback: f32,
    left_delay_ms: f32,
    right_delay_ms: f32,
    pan_delay: bool,
    fb_l: f32,
    fb_r: f32,
}

impl Echo {
    const MAX_DELAY_MS: f32 = 2000.0;

    fn new(sample_rate: f32) -> Self {
        let capacity = ms_to_samples(Self::MAX_DELAY_MS, sample_rate) as usize + 4;
        Self {
            left: DelayLine::new(capacity),
            right: DelayLine::new(capacity),
            sample_rate,
            wet: 0.0,
            feedback: 0.0,
            left_delay_ms: 1.0,
            right_delay_ms: 1.0,
            pan_delay: false,
            fb_l: 0.0,
            fb_r: 0.0,
        }
    }

    fn configure(&mut self, params: &EchoParams) {
        self.wet = (params.wet_dry_mix / 100.0).clamp(0.0, 1.0);
        self.feedback = (params.feedback / 100.0).clamp(0.0, 0.99);
        self.left_delay_ms = params.left_delay.clamp(1.0, Self::MAX_DELAY_MS);
        self.right_delay_ms = params.right_delay.clamp(1.0, Self::MAX_DELAY_MS);
        self.pan_delay = params.pan_delay;
    }

    fn process(&mut self, l: f32, r: f32) -> (f32, f32) {
        // With pan_delay each repeat crosses to the other channel
        let (fb_into_l, fb_into_r) = if self.pan_delay {
            (self.fb_r, self.fb_l)
        } else {
            (self.fb_l, self.fb_r)
        };
        self.left.write(l + fb_into_l * self.feedback);
        self.right.write(r + fb_into_r * self.feedback);

        let tap_l = self.left.read_interpolated(ms_to_samples(self.left_delay_ms, self.sample_rate));
        let tap_r = self.right.read_interpolated(ms_to_samples(self.right_delay_ms, self.sample_rate));
        self.fb_l = tap_l;
        self.fb_r = tap_r;

        (
            l * (1.0 - self.wet) + tap_l * self.wet,
            r * (1.0 - self.wet) + tap_r * self.wet,
        )
    }
}

/// Feed-forward compressor with lookahead predelay
pub(crate) struct Compressor {
    sample_rate: f32,
    envelope: f32,
    attack_coef: f32,
    release_coef: f32,
    threshold_db: f32,
    ratio: f32,
    makeup: f32,
    predelay_ms: f32,
    look_l: DelayLine,
    look_r: DelayLine,
}

impl Compressor {
    const MAX_PREDELAY_MS: f32 = 4.0;

    fn new(sample_rate: f32) -> Self {
        let capacity = ms_to_samples(Self::MAX_PREDELAY_MS, sample_rate) as usize + 4;
        Self {
            sample_rate,
            envelope: 0.0,
            attack_coef: 0.0,
            release_coef: 0.0,
            threshold_db: 0.0,
            ratio: 1.0,
            makeup: 1.0,
            predelay_ms: 0.0,
            look_l: DelayLine::new(capacity),
            look_r: DelayLine::new(capacity),
        }
    }

    fn configure(&mut self, params: &CompressorParams) {
        self.attack_coef = envelope_coef(params.attack, self.sample_rate);
        self.release_coef = envelope_coef(params.release, self.sample_rate);
        self.threshold_db = params.threshold;
        self.ratio = params.ratio.max(1.0);
        self.makeup = db_to_gain(params.gain);
        self.predelay_ms = params.predelay.clamp(0.0, Self::MAX_PREDELAY_MS);
    }

    fn process(&mut self, l: f32, r: f32) -> (f32, f32) {
        let peak = l.abs().max(r.abs());
        let coef = if peak > self.envelope {
            self.attack_coef
        } else {
            self.release_coef
        };
        self.envelope = coef * self.envelope + (1.0 - coef) * peak;

        let env_db = 20.0 * self.envelope.max(1e-6).log10();
        let over_db = (env_db - self.threshold_db).max(0.0);
        let reduction_db = over_db * (1.0 - 1.0 / self.ratio);
        let gain = self.makeup * db_to_gain(-reduction_db);

        // The detector sees the live signal while the audio is delayed
        // by the predelay, giving the attack a head start
        self.look_l.write(l);
        self.look_r.write(r);
        let delay = ms_to_samples(self.predelay_ms, self.sample_rate);
        (
            self.look_l.read_interpolated(delay) * gain,
            self.look_r.read_interpolated(delay) * gain,
        )
    }
}

/// Waveshaping distortion: pre-lowpass, tanh drive, post bandpass EQ
pub(crate) struct Distortion {
    pre_l: OnePole,
    pre_r: OnePole,
    post_l: Biquad,
    post_r: Biquad,
    drive: f32,
    out_gain: f32,
    sample_rate: f32,
}

impl Distortion {
    fn new(sample_rate: f32) -> Self {
        Self {
            pre_l: OnePole::lowpass(8000.0, sample_rate),
            pre_r: OnePole::lowpass(8000.0, sample_rate),
            post_l: Biquad::identity(),
            post_r: Biquad::identity(),
            drive: 1.0,
            out_gain: 1.0,
            sample_rate,
        }
    }

    fn configure(&mut self, params: &DistortionParams) {
        self.pre_l = OnePole::lowpass(params.pre_lowpass_cutoff, self.sample_rate);
        self.pre_r = OnePole::lowpass(params.pre_lowpass_cutoff, self.sample_rate);
        let q = params.post_eq_center_freq / params.post_eq_bandwidth.max(1.0);
        self.post_l = Biquad::bandpass(params.post_eq_center_freq, q, self.sample_rate);
        self.post_r = Biquad::bandpass(params.post_eq_center_freq, q, self.sample_rate);
        self.drive = 1.0 + (params.edge / 100.0).clamp(0.0, 1.0) * 30.0;
        self.out_gain = db_to_gain(params.gain.min(0.0));
    }

    fn process(&mut self, l: f32, r: f32) -> (f32, f32) {
        let shaped_l = (self.pre_l.process(l) * self.drive).tanh();
        let shaped_r = (self.pre_r.process(r) * self.drive).tanh();
        (
            self.post_l.process(shaped_l) * self.out_gain,
            self.post_r.process(shaped_r) * self.out_gain,
        )
    }
}

/// Amplitude modulation ("gargle")
pub(crate) struct Gargle {
    sample_rate: f32,
    phase: f32,
    rate_hz: f32,
    shape: GargleShape,
}

impl Gargle {
    fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            phase: 0.0,
            rate_hz: 10.0,
            shape: GargleShape::Triangle,
        }
    }

    fn configure(&mut self, params: &GargleParams) {
        self.rate_hz = (params.rate_hz.max(1) as f32).min(1000.0);
        self.shape = params.wave_shape;
    }

    fn process(&mut self, l: f32, r: f32) -> (f32, f32) {
        // Modulator runs 0..1 so the signal is gated, not inverted
        let m = match self.shape {
            GargleShape::Triangle => (lfo(ModWaveform::Triangle, self.phase) + 1.0) * 0.5,
            GargleShape::Square => {
                if self.phase < PI {
                    1.0
                } else {
                    0.0
                }
            }
        };
        self.phase = (self.phase + TWO_PI * self.rate_hz / self.sample_rate) % TWO_PI;
        (l * m, r * m)
    }
}

/// Single-band peaking parametric EQ
pub(crate) struct ParamEq {
    left: Biquad,
    right: Biquad,
    sample_rate: f32,
}

impl ParamEq {
    fn new(sample_rate: f32) -> Self {
        Self {
            left: Biquad::identity(),
            right: Biquad::identity(),
            sample_rate,
        }
    }

    fn configure(&mut self, params: &ParamEqParams) {
        // Bandwidth arrives in semitones
        let bw_octaves = (params.bandwidth / 12.0).clamp(1.0 / 12.0, 3.0);
        let filter = Biquad::peaking(params.center, params.gain, bw_octaves, self.sample_rate);
        self.left = filter;
        self.right = filter;
    }

    fn process(&mut self, l: f32, r: f32) -> (f32, f32) {
        (self.left.process(l), self.right.process(r))
    }
}

/// Lowpass-feedback comb filter (reverb building block)
struct Comb {
    buffer: Vec<f32>,
    pos: usize,
    feedback: f32,
    damp: f32,
    store: f32,
}

impl Comb {
    fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            pos: 0,
            feedback: 0.0,
            damp: 0.0,
            store: 0.0,
        }
    }

    fn process(&mut self, x: f32) -> f32 {
        let y = self.buffer[self.pos];
        self.store = y * (1.0 - self.damp) + self.store * self.damp;
        self.buffer[self.pos] = x + self.store * self.feedback;
        self.pos = (self.pos + 1) % self.buffer.len();
        y
    }
}

/// Allpass diffuser (reverb building block)
struct Allpass {
    buffer: Vec<f32>,
    pos: usize,
}

impl Allpass {
    const GAIN: f32 = 0.5;

    fn new(delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; delay_samples.max(1)],
            pos: 0,
        }
    }

    fn process(&mut self, x: f32) -> f32 {
        let delayed = self.buffer[self.pos];
        self.buffer[self.pos] = x + delayed * Self::GAIN;
        self.pos = (self.pos + 1) % self.buffer.len();
        delayed - x * Self::GAIN
    }
}

/// Schroeder reverb: parallel combs into serial allpasses, per channel
pub(crate) struct Reverb {
    combs_l: Vec<Comb>,
    combs_r: Vec<Comb>,
    aps_l: Vec<Allpass>,
    aps_r: Vec<Allpass>,
    comb_delays: Vec<usize>,
    sample_rate: f32,
    in_gain: f32,
    wet: f32,
}

impl Reverb {
    // Freeverb comb/allpass tunings at 44.1 kHz; the right channel is
    // detuned by a fixed offset for stereo width
    const COMB_TUNINGS: [usize; 4] = [1116, 1188, 1277, 1356];
    const ALLPASS_TUNINGS: [usize; 2] = [556, 441];
    const STEREO_SPREAD: usize = 23;

    fn new(sample_rate: f32) -> Self {
        let scale = sample_rate / 44100.0;
        let comb_delays: Vec<usize> = Self::COMB_TUNINGS
            .iter()
            .map(|&d| (d as f32 * scale) as usize)
            .collect();

        Self {
            combs_l: comb_delays.iter().map(|&d| Comb::new(d)).collect(),
            combs_r: comb_delays.iter().map(|&d| Comb::new(d + Self::STEREO_SPREAD)).collect(),
            aps_l: Self::ALLPASS_TUNINGS
                .iter()
                .map(|&d| Allpass::new((d as f32 * scale) as usize))
                .collect(),
            aps_r: Self::ALLPASS_TUNINGS
                .iter()
                .map(|&d| Allpass::new((d as f32 * scale) as usize + Self::STEREO_SPREAD))
                .collect(),
            comb_delays,
            sample_rate,
            in_gain: 1.0,
            wet: 1.0,
        }
    }

    fn configure(&mut self, params: &ReverbParams) {
        self.in_gain = db_to_gain(params.in_gain.min(0.0));
        self.wet = db_to_gain(params.reverb_mix.min(0.0));
        // Damping follows the high-frequency decay ratio: a low ratio
        // means highs die off faster than the broadband decay time
        let damp = (1.0 - params.high_freq_rt_ratio).clamp(0.0, 0.999);
        let rt_ms = params.reverb_time.max(1.0);

        for (i, &delay) in self.comb_delays.iter().enumerate() {
            let delay_ms = delay as f32 / self.sample_rate * 1000.0;
            // -60 dB after reverb_time: g = 10^(-3 * loop_ms / rt_ms)
            let feedback = 10f32.powf(-3.0 * delay_ms / rt_ms).min(0.98);
            self.combs_l[i].feedback = feedback;
            self.combs_l[i].damp = damp;
            self.combs_r[i].feedback = feedback;
            self.combs_r[i].damp = damp;
        }
    }

    fn process(&mut self, l: f32, r: f32) -> (f32, f32) {
        let input = (l + r) * 0.5 * self.in_gain;

        let mut rev_l = 0.0;
        let mut rev_r = 0.0;
        for comb in &mut self.combs_l {
            rev_l += comb.process(input);
        }
        for comb in &mut self.combs_r {
            rev_r += comb.process(input);
        }
        for ap in &mut self.aps_l {
            rev_l = ap.process(rev_l);
        }
        for ap in &mut self.aps_r {
            rev_r = ap.process(rev_r);
        }

        (l + rev_l * self.wet, r + rev_r * self.wet)
    }
}

/// A voice's installed effect
pub(crate) enum EffectProcessor {
    Chorus(ModDelay),
    Compressor(Compressor),
    Distortion(Distortion),
    Echo(Echo),
    Flanger(ModDelay),
    Gargle(Gargle),
    ParamEq(ParamEq),
    Reverb(Reverb),
}

impl EffectProcessor {
    /// Build a processor for the given kind, configured with the
    /// kind's default parameters until a parameter push arrives
    pub(crate) fn new(kind: EffectKind, sample_rate: f32) -> Self {
        let mut processor = match kind {
            // Chorus modulates around up to 20 ms, flanger up to 4 ms
            EffectKind::Chorus => EffectProcessor::Chorus(ModDelay::new(sample_rate, 20.0)),
            EffectKind::Flanger => EffectProcessor::Flanger(ModDelay::new(sample_rate, 4.0)),
            EffectKind::Compressor => EffectProcessor::Compressor(Compressor::new(sample_rate)),
            EffectKind::Distortion => EffectProcessor::Distortion(Distortion::new(sample_rate)),
            EffectKind::Echo => EffectProcessor::Echo(Echo::new(sample_rate)),
            EffectKind::Gargle => EffectProcessor::Gargle(Gargle::new(sample_rate)),
            EffectKind::ParamEq => EffectProcessor::ParamEq(ParamEq::new(sample_rate)),
            EffectKind::Reverb => EffectProcessor::Reverb(Reverb::new(sample_rate)),
        };
        processor.set_params(&default_params(kind));
        processor
    }

    /// Which kind this processor implements
    pub(crate) fn kind(&self) -> EffectKind {
        match self {
            EffectProcessor::Chorus(_) => EffectKind::Chorus,
            EffectProcessor::Compressor(_) => EffectKind::Compressor,
            EffectProcessor::Distortion(_) => EffectKind::Distortion,
            EffectProcessor::Echo(_) => EffectKind::Echo,
            EffectProcessor::Flanger(_) => EffectKind::Flanger,
            EffectProcessor::Gargle(_) => EffectKind::Gargle,
            EffectProcessor::ParamEq(_) => EffectKind::ParamEq,
            EffectProcessor::Reverb(_) => EffectKind::Reverb,
        }
    }

    /// Apply a full parameter record; returns false on a kind mismatch
    pub(crate) fn set_params(&mut self, params: &EffectParams) -> bool {
        match (self, params) {
            (EffectProcessor::Chorus(p), EffectParams::Chorus(c)) => {
                // Chorus depth is scaled 0-1000 on the wire
                p.configure(
                    c.wet_dry_mix,
                    c.depth / 10.0,
                    c.feedback,
                    c.frequency,
                    c.waveform,
                    c.delay,
                    c.phase,
                );
                true
            }
            (EffectProcessor::Flanger(p), EffectParams::Flanger(f)) => {
                p.configure(
                    f.wet_dry_mix,
                    f.depth,
                    f.feedback,
                    f.frequency,
                    f.waveform,
                    f.delay,
                    f.phase,
                );
                true
            }
            (EffectProcessor::Compressor(p), EffectParams::Compressor(c)) => {
                p.configure(c);
                true
            }
            (EffectProcessor::Distortion(p), EffectParams::Distortion(d)) => {
                p.configure(d);
                true
            }
            (EffectProcessor::Echo(p), EffectParams::Echo(e)) => {
                p.configure(e);
                true
            }
            (EffectProcessor::Gargle(p), EffectParams::Gargle(g)) => {
                p.configure(g);
                true
            }
            (EffectProcessor::ParamEq(p), EffectParams::ParamEq(e)) => {
                p.configure(e);
                true
            }
            (EffectProcessor::Reverb(p), EffectParams::Reverb(r)) => {
                p.configure(r);
                true
            }
            _ => false,
        }
    }

    /// Process one stereo frame
    pub(crate) fn process(&mut self, l: f32, r: f32) -> (f32, f32) {
        match self {
            EffectProcessor::Chorus(p) => p.process(l, r),
            EffectProcessor::Compressor(p) => p.process(l, r),
            EffectProcessor::Distortion(p) => p.process(l, r),
            EffectProcessor::Echo(p) => p.process(l, r),
            EffectProcessor::Flanger(p) => p.process(l, r),
            EffectProcessor::Gargle(p) => p.process(l, r),
            EffectProcessor::ParamEq(p) => p.process(l, r),
            EffectProcessor::Reverb(p) => p.process(l, r),
        }
    }
}

fn default_params(kind: EffectKind) -> EffectParams {
    match kind {
        EffectKind::Chorus => EffectParams::Chorus(ChorusParams::default()),
        EffectKind::Compressor => EffectParams::Compressor(CompressorParams::default()),
        EffectKind::Distortion => EffectParams::Distortion(DistortionParams::default()),
        EffectKind::Echo => EffectParams::Echo(EchoParams::default()),
        EffectKind::Flanger => EffectParams::Flanger(FlangerParams::default()),
        EffectKind::Gargle => EffectParams::Gargle(GargleParams::default()),
        EffectKind::ParamEq => EffectParams::ParamEq(ParamEqParams::default()),
        EffectKind::Reverb => EffectParams::Reverb(ReverbParams::default()),
    }
}
