use crate::dsp::{
    automation::AutomationParam,
    envelope::Breakpoint,
    lfo::{cents_to_ratio, Lfo},
    oscillator::{OscillatorBlock, Waveform},
};
use crate::graph::node::{GraphNode, RenderCtx};
use crate::MAX_BLOCK_SIZE;

/*
Scheduled Oscillator
====================

An oscillator node is one sounding oscillator with a fixed place on the audio
clock: it is silent before `start`, runs until `stop`, and never sounds again.
Everything it does in between is decided when the note is triggered:

  frequency   an automation timeline in Hz (constant, or a pitch sweep)
  detune      fixed offset in cents, used to spread unison copies
  fm          another oscillator node whose output, times `depth` Hz, is
              added to the frequency (frequency modulation)
  vibrato     a private LFO adding ±depth cents (pitch route)

The instantaneous frequency is

    f(t) = (freq(t) + depth · modulator(t)) · 2^((detune + vibrato(t)) / 1200)

Waveform Character:
-------------------

  Sine       fundamental only; kicks, 808s, FM carriers
  Triangle   weak odd harmonics; toms, soft snare body
  Square     strong odd harmonics; hi-hat and cymbal metal at 6-12 kHz
  Sawtooth   every harmonic; bright leads, digital snare

Example usage:
  // 150 Hz kick body that falls to 0.01 Hz over half a second
  let body = OscNode::sine(150.0)
      .with_frequency(&sweep(150.0, 0.01, 0.5, Curve::Exponential), now)
      .play(now, now + 0.5);

  // FM pair: modulator at 2× the carrier, depth 50 Hz
  let carrier = OscNode::sine(220.0)
      .with_fm(OscNode::sine(440.0).play(now, end), 50.0)
      .play(now, end);
*/

struct FmInput {
    modulator: Box<OscNode>,
    depth: f32,
    buffer: Vec<f32>,
}

struct Vibrato {
    lfo: Lfo,
    depth_cents: f32,
}

pub struct OscNode {
    osc: OscillatorBlock,
    frequency: AutomationParam,
    /// Detune in cents. 100 cents = 1 semitone.
    detune_cents: f32,
    fm: Option<FmInput>,
    vibrato: Option<Vibrato>,
    start: f64,
    stop: f64,
    finished: bool,
}

impl OscNode {
    pub fn new(waveform: Waveform, frequency: f32) -> Self {
        Self {
            osc: OscillatorBlock::new(waveform),
            frequency: AutomationParam::new(frequency),
            detune_cents: 0.0,
            fm: None,
            vibrato: None,
            start: 0.0,
            stop: f64::INFINITY,
            finished: false,
        }
    }

    pub fn sine(frequency: f32) -> Self {
        Self::new(Waveform::Sine, frequency)
    }

    pub fn square(frequency: f32) -> Self {
        Self::new(Waveform::Square, frequency)
    }

    pub fn sawtooth(frequency: f32) -> Self {
        Self::new(Waveform::Sawtooth, frequency)
    }

    pub fn triangle(frequency: f32) -> Self {
        Self::new(Waveform::Triangle, frequency)
    }

    /// Schedule a frequency timeline; breakpoint times are offsets from `start`.
    pub fn with_frequency(mut self, breakpoints: &[Breakpoint], start: f64) -> Self {
        self.frequency.apply(breakpoints, start);
        self
    }

    pub fn with_detune(mut self, cents: f32) -> Self {
        self.detune_cents = cents;
        self
    }

    /// Frequency-modulate this oscillator by `modulator × depth` Hz.
    pub fn with_fm(mut self, modulator: OscNode, depth: f32) -> Self {
        self.fm = Some(FmInput {
            modulator: Box::new(modulator),
            depth,
            buffer: vec![0.0; MAX_BLOCK_SIZE],
        });
        self
    }

    /// Add a private vibrato LFO of ±`depth_cents`.
    pub fn with_vibrato(mut self, waveform: Waveform, rate_hz: f32, depth_cents: f32) -> Self {
        self.vibrato = Some(Vibrato {
            lfo: Lfo::new(waveform, rate_hz),
            depth_cents,
        });
        self
    }

    /// Sound only within [start, stop).
    pub fn play(mut self, start: f64, stop: f64) -> Self {
        self.start = start;
        self.stop = stop;
        self
    }

    pub fn waveform(&self) -> Waveform {
        self.osc.waveform()
    }

    pub fn detune_cents(&self) -> f32 {
        self.detune_cents
    }

    pub fn stop_time(&self) -> f64 {
        self.stop
    }
}

impl GraphNode for OscNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let frames = out.len();
        let sr = ctx.sample_rate;

        if let Some(fm) = self.fm.as_mut() {
            let buffer = &mut fm.buffer[..frames];
            fm.modulator.render_block(buffer, ctx);
        }

        for (i, sample) in out.iter_mut().enumerate() {
            let t = ctx.sample_time(i);
            if t < self.start || t >= self.stop {
                *sample = 0.0;
                continue;
            }

            let mut frequency = self.frequency.value_at(t);
            if let Some(fm) = &self.fm {
                frequency += fm.buffer[i] * fm.depth;
            }

            let mut cents = self.detune_cents;
            if let Some(vibrato) = self.vibrato.as_mut() {
                cents += vibrato.lfo.advance(1, sr) * vibrato.depth_cents;
            }
            if cents != 0.0 {
                frequency *= cents_to_ratio(cents);
            }

            *sample = self.osc.next_sample(frequency, sr);
        }

        if ctx.block_end(frames) >= self.stop {
            self.finished = true;
        }
    }

    fn is_active(&self) -> bool {
        !self.finished
    }
}
