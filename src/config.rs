//! Session configuration.
//!
//! `Configuration` is the single source of truth for every synthesis, effect,
//! arpeggiator and tempo parameter. Control handlers write it; synthesis code
//! only reads it. Units follow the control surface: times in milliseconds,
//! levels and amounts in percent, volumes as 0..1 gains.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{filter::FilterType, oscillator::Waveform},
    log_recovery,
    sequencing::{arpeggiator::ArpPattern, scale::Key, scale::Scale},
    voices::{DrumKit, DRUM_TYPES},
};

pub const DEFAULT_BPM: f32 = 120.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub bpm: f32,
    /// Swing amount in percent of the 50ms cap.
    pub swing: f32,
    pub scale: Scale,
    pub key: Key,
    /// Melody octave offset.
    pub transpose: i32,
    /// Sound profile for standard (non-FM) melody voices.
    pub waveform: Waveform,
    pub drum_kit: DrumKit,
    pub volumes: Volumes,
    pub synthesis: SynthesisConfig,
    pub effects: EffectsConfig,
    pub arpeggiator: ArpeggiatorConfig,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            swing: 0.0,
            scale: Scale::Major,
            key: Key::C,
            transpose: 0,
            waveform: Waveform::Sine,
            drum_kit: DrumKit::Default,
            volumes: Volumes::default(),
            synthesis: SynthesisConfig::default(),
            effects: EffectsConfig::default(),
            arpeggiator: ArpeggiatorConfig::default(),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct Volumes {
    pub master: f32,
    pub melody: f32,
    /// Indexed by `DrumType::index()`.
    pub drums: [f32; DRUM_TYPES],
}

impl Default for Volumes {
    fn default() -> Self {
        Self {
            master: 0.7,
            melody: 1.0,
            drums: [1.0; DRUM_TYPES],
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynthesisConfig {
    pub fm: FmConfig,
    pub envelope: EnvelopeConfig,
    pub filter: FilterConfig,
    pub lfo: LfoConfig,
    pub voice: VoiceConfig,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct FmConfig {
    pub enabled: bool,
    pub carrier: Waveform,
    pub modulator: Waveform,
    pub index: f32,
    pub ratio: f32,
}

impl Default for FmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            carrier: Waveform::Sine,
            modulator: Waveform::Sine,
            index: 0.0,
            ratio: 1.0,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeConfig {
    pub attack_ms: f32,
    pub decay_ms: f32,
    /// Sustain level in percent of peak.
    pub sustain: f32,
    pub release_ms: f32,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            attack_ms: 10.0,
            decay_ms: 50.0,
            sustain: 50.0,
            release_ms: 100.0,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    pub kind: FilterType,
    pub cutoff: f32,
    pub q: f32,
    /// Filter envelope depth in percent.
    pub envelope_amount: f32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            kind: FilterType::LowPass,
            cutoff: 1000.0,
            q: 1.0,
            envelope_amount: 0.0,
        }
    }
}

/// Where the LFO is routed. Exactly one route is live at a time.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LfoDestination {
    #[default]
    None,
    Pitch,
    Filter,
    Amplitude,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct LfoConfig {
    pub enabled: bool,
    pub waveform: Waveform,
    pub rate: f32,
    /// Depth in percent.
    pub amount: f32,
    pub destination: LfoDestination,
}

impl Default for LfoConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            waveform: Waveform::Sine,
            rate: 1.0,
            amount: 0.0,
            destination: LfoDestination::None,
        }
    }
}

impl LfoConfig {
    /// Depth gain applied to the raw LFO signal.
    pub fn depth(&self) -> f32 {
        self.amount / 100.0
    }

    /// The route that is actually live. `None` as destination disables the LFO.
    pub fn active_destination(&self) -> LfoDestination {
        if self.enabled {
            self.destination
        } else {
            LfoDestination::None
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceConfig {
    pub unison: usize,
    /// Unison spread in cents.
    pub detune: f32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            unison: 1,
            detune: 0.0,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectsConfig {
    pub delay: DelayConfig,
    pub distortion: DistortionConfig,
    pub reverb: ReverbConfig,
    pub compressor: CompressorConfig,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct DelayConfig {
    pub enabled: bool,
    pub time_ms: f32,
    pub feedback: f32,
    pub mix: f32,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            time_ms: 300.0,
            feedback: 40.0,
            mix: 30.0,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct DistortionConfig {
    pub enabled: bool,
    pub amount: f32,
}

impl Default for DistortionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            amount: 10.0,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct ReverbConfig {
    pub enabled: bool,
    pub size: f32,
    pub mix: f32,
}

impl Default for ReverbConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            size: 80.0,
            mix: 30.0,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct CompressorConfig {
    pub threshold_db: f32,
    pub knee_db: f32,
    pub ratio: f32,
    /// Seconds.
    pub attack: f32,
    /// Seconds.
    pub release: f32,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            threshold_db: -24.0,
            knee_db: 30.0,
            ratio: 12.0,
            attack: 0.003,
            release: 0.25,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct ArpeggiatorConfig {
    pub enabled: bool,
    pub pattern: ArpPattern,
    /// Notes per beat.
    pub rate: f32,
    pub octaves: usize,
}

impl Default for ArpeggiatorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            pattern: ArpPattern::Up,
            rate: 4.0,
            octaves: 1,
        }
    }
}

/// Replace an invalid value with its default, counting the fix.
fn repair(value: &mut f32, min: f32, max: f32, default: f32, name: &str, fixed: &mut usize) {
    if !value.is_finite() || *value < min || *value > max {
        log_recovery!("{name} = {value} is outside [{min}, {max}], using {default}");
        *value = default;
        *fixed += 1;
    }
}

fn repair_count(value: &mut usize, min: usize, max: usize, default: usize, name: &str, fixed: &mut usize) {
    if *value < min || *value > max {
        log_recovery!("{name} = {value} is outside [{min}, {max}], using {default}");
        *value = default;
        *fixed += 1;
    }
}

impl Configuration {
    /// Replace every non-finite or out-of-range field with its documented
    /// default. Returns the number of fields that were fixed.
    pub fn repair(&mut self) -> usize {
        let defaults = Configuration::default();
        let mut fixed = 0;
        let f = &mut fixed;

        repair(&mut self.bpm, 20.0, 300.0, defaults.bpm, "bpm", f);
        repair(&mut self.swing, 0.0, 100.0, defaults.swing, "swing", f);
        if !(-4..=4).contains(&self.transpose) {
            log_recovery!("transpose = {} is outside [-4, 4], using 0", self.transpose);
            self.transpose = 0;
            *f += 1;
        }

        let v = &mut self.volumes;
        repair(&mut v.master, 0.0, 1.0, defaults.volumes.master, "volumes.master", f);
        repair(&mut v.melody, 0.0, 1.0, defaults.volumes.melody, "volumes.melody", f);
        for drum in v.drums.iter_mut() {
            repair(drum, 0.0, 1.0, 1.0, "volumes.drums", f);
        }

        let s = &mut self.synthesis;
        let ds = &defaults.synthesis;
        repair(&mut s.fm.index, 0.0, 100.0, ds.fm.index, "fm.index", f);
        repair(&mut s.fm.ratio, 0.01, 16.0, ds.fm.ratio, "fm.ratio", f);
        repair(&mut s.envelope.attack_ms, 0.0, 5000.0, ds.envelope.attack_ms, "envelope.attack", f);
        repair(&mut s.envelope.decay_ms, 0.0, 5000.0, ds.envelope.decay_ms, "envelope.decay", f);
        repair(&mut s.envelope.sustain, 0.0, 100.0, ds.envelope.sustain, "envelope.sustain", f);
        repair(&mut s.envelope.release_ms, 0.0, 10_000.0, ds.envelope.release_ms, "envelope.release", f);
        repair(&mut s.filter.cutoff, 20.0, 20_000.0, ds.filter.cutoff, "filter.cutoff", f);
        repair(&mut s.filter.q, 0.0001, 30.0, ds.filter.q, "filter.q", f);
        repair(&mut s.filter.envelope_amount, 0.0, 100.0, ds.filter.envelope_amount, "filter.envelope_amount", f);
        repair(&mut s.lfo.rate, 0.01, 20.0, ds.lfo.rate, "lfo.rate", f);
        repair(&mut s.lfo.amount, 0.0, 100.0, ds.lfo.amount, "lfo.amount", f);
        // Choosing a destination is what switches the LFO on.
        s.lfo.enabled = s.lfo.destination != LfoDestination::None;
        repair_count(&mut s.voice.unison, 1, 8, ds.voice.unison, "voice.unison", f);
        repair(&mut s.voice.detune, 0.0, 100.0, ds.voice.detune, "voice.detune", f);

        let e = &mut self.effects;
        let de = &defaults.effects;
        repair(&mut e.delay.time_ms, 0.0, 2000.0, de.delay.time_ms, "delay.time", f);
        repair(&mut e.delay.feedback, 0.0, 100.0, de.delay.feedback, "delay.feedback", f);
        repair(&mut e.delay.mix, 0.0, 100.0, de.delay.mix, "delay.mix", f);
        repair(&mut e.distortion.amount, 0.0, 100.0, de.distortion.amount, "distortion.amount", f);
        repair(&mut e.reverb.size, 0.0, 100.0, de.reverb.size, "reverb.size", f);
        repair(&mut e.reverb.mix, 0.0, 100.0, de.reverb.mix, "reverb.mix", f);
        let c = &mut e.compressor;
        repair(&mut c.threshold_db, -100.0, 0.0, de.compressor.threshold_db, "compressor.threshold", f);
        repair(&mut c.knee_db, 0.0, 40.0, de.compressor.knee_db, "compressor.knee", f);
        repair(&mut c.ratio, 1.0, 20.0, de.compressor.ratio, "compressor.ratio", f);
        repair(&mut c.attack, 0.0, 1.0, de.compressor.attack, "compressor.attack", f);
        repair(&mut c.release, 0.0, 1.0, de.compressor.release, "compressor.release", f);

        let a = &mut self.arpeggiator;
        repair(&mut a.rate, 1.0, 16.0, defaults.arpeggiator.rate, "arpeggiator.rate", f);
        repair_count(&mut a.octaves, 1, 4, defaults.arpeggiator.octaves, "arpeggiator.octaves", f);

        fixed
    }
}
