//! Procedural drum kits.
//!
//! Every hit is built from scratch at trigger time: oscillators, noise
//! bursts, filters and gain stages with their whole life scheduled against the
//! audio clock. Nothing is sample-based. A hit stops itself after at most
//! 1.2 seconds and only ever feeds the dry bus.
//!
//! Three kits share the same seven drum types:
//!
//! | Kit     | Tonal path                          | Character                        |
//! |---------|-------------------------------------|----------------------------------|
//! | default | osc → gain                          | plain exponential decays         |
//! | analog  | osc → filter → gain                 | resonant sweeps, wider noise     |
//! | digital | osc → shaper (k = 10) → gain        | linear multi-stage ramps, clip   |
//!
//! # Example
//!
//! ```
//! use rand::{rngs::StdRng, SeedableRng};
//! use synthograsizer::voices::{trigger_drum, DrumKit, DrumType};
//!
//! let mut rng = StdRng::seed_from_u64(1);
//! let kick = trigger_drum(DrumKit::Analog, DrumType::Kick, 1.0, 0.0, 48_000.0, &mut rng);
//! assert!(kick.lifetime() <= 1.2);
//! ```

mod bass;
mod cymbal;
mod hihat;
mod kick;
mod snare;
mod tom;

use std::sync::{Arc, OnceLock};

use rand::RngCore;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{
        automation::AutomationParam,
        distortion::{hard_clip_curve, shaping_curve, CURVE_SAMPLES},
        envelope::Breakpoint,
        noise::{noise_table, samples_for},
        oscillator::Waveform,
    },
    graph::{extensions::NodeExt, mix::Sum, noise::NoiseNode, oscillator::OscNode, GraphNode},
    synth::voice::Voice,
};

/// Rows in the drum grid, one per drum type.
pub const DRUM_TYPES: usize = 7;

/// Drive of the digital kit's shaping curve.
const DIGITAL_DRIVE: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrumType {
    Kick,
    Snare,
    ClosedHat,
    OpenHat,
    Tom,
    Cymbal,
    Bass808,
}

impl DrumType {
    /// Grid row order.
    pub const ALL: [DrumType; DRUM_TYPES] = [
        DrumType::Kick,
        DrumType::Snare,
        DrumType::ClosedHat,
        DrumType::OpenHat,
        DrumType::Tom,
        DrumType::Cymbal,
        DrumType::Bass808,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_row(row: usize) -> Option<Self> {
        Self::ALL.get(row).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            DrumType::Kick => "Kick",
            DrumType::Snare => "Snare",
            DrumType::ClosedHat => "Closed Hat",
            DrumType::OpenHat => "Open Hat",
            DrumType::Tom => "Tom",
            DrumType::Cymbal => "Cymbal",
            DrumType::Bass808 => "808",
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DrumKit {
    #[default]
    Default,
    Analog,
    Digital,
}

impl DrumKit {
    pub const ALL: [DrumKit; 3] = [DrumKit::Default, DrumKit::Analog, DrumKit::Digital];

    /// The kit after this one, wrapping around.
    pub fn next(self) -> Self {
        match self {
            DrumKit::Default => DrumKit::Analog,
            DrumKit::Analog => DrumKit::Digital,
            DrumKit::Digital => DrumKit::Default,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DrumKit::Default => "default",
            DrumKit::Analog => "analog",
            DrumKit::Digital => "digital",
        }
    }
}

/// Build one drum hit starting at `now` on the audio clock.
///
/// `volume` is the per-drum level; noise bursts are drawn from `rng`.
pub fn trigger_drum(
    kit: DrumKit,
    drum: DrumType,
    volume: f32,
    now: f64,
    sample_rate: f32,
    rng: &mut dyn RngCore,
) -> Voice {
    let volume = if volume.is_finite() { volume.max(0.0) } else { 1.0 };
    let mut hit = Strike {
        volume,
        now,
        sample_rate,
        rng,
    };

    match (kit, drum) {
        (DrumKit::Default, DrumType::Kick) => kick::default(&mut hit),
        (DrumKit::Analog, DrumType::Kick) => kick::analog(&mut hit),
        (DrumKit::Digital, DrumType::Kick) => kick::digital(&mut hit),
        (DrumKit::Default, DrumType::Snare) => snare::default(&mut hit),
        (DrumKit::Analog, DrumType::Snare) => snare::analog(&mut hit),
        (DrumKit::Digital, DrumType::Snare) => snare::digital(&mut hit),
        (DrumKit::Default, DrumType::ClosedHat) => hihat::default_closed(&mut hit),
        (DrumKit::Analog, DrumType::ClosedHat) => hihat::analog_closed(&mut hit),
        (DrumKit::Digital, DrumType::ClosedHat) => hihat::digital_closed(&mut hit),
        (DrumKit::Default, DrumType::OpenHat) => hihat::default_open(&mut hit),
        (DrumKit::Analog, DrumType::OpenHat) => hihat::analog_open(&mut hit),
        (DrumKit::Digital, DrumType::OpenHat) => hihat::digital_open(&mut hit),
        (DrumKit::Default, DrumType::Tom) => tom::default(&mut hit),
        (DrumKit::Analog, DrumType::Tom) => tom::analog(&mut hit),
        (DrumKit::Digital, DrumType::Tom) => tom::digital(&mut hit),
        (DrumKit::Default, DrumType::Cymbal) => cymbal::default(&mut hit),
        (DrumKit::Analog, DrumType::Cymbal) => cymbal::analog(&mut hit),
        (DrumKit::Digital, DrumType::Cymbal) => cymbal::digital(&mut hit),
        (DrumKit::Default, DrumType::Bass808) => bass::default(&mut hit),
        (DrumKit::Analog, DrumType::Bass808) => bass::analog(&mut hit),
        (DrumKit::Digital, DrumType::Bass808) => bass::digital(&mut hit),
    }
}

/// Everything a recipe needs to schedule its layers.
struct Strike<'a> {
    volume: f32,
    now: f64,
    sample_rate: f32,
    rng: &'a mut dyn RngCore,
}

impl Strike<'_> {
    /// Oscillator following a pitch timeline, silent after `stop` seconds.
    fn osc(&self, waveform: Waveform, pitch: &[Breakpoint], stop: f64) -> OscNode {
        let initial = pitch.first().map_or(0.0, |bp| bp.target);
        OscNode::new(waveform, initial)
            .with_frequency(pitch, self.now)
            .play(self.now, self.now + stop)
    }

    /// Oscillator at a fixed pitch.
    fn tone(&self, waveform: Waveform, frequency: f32, stop: f64) -> OscNode {
        OscNode::new(waveform, frequency).play(self.now, self.now + stop)
    }

    /// Fresh white-noise burst of `seconds`, starting `offset` after the hit.
    fn noise(&mut self, seconds: f32, offset: f64) -> NoiseNode {
        let table = noise_table(samples_for(seconds, self.sample_rate), &mut *self.rng);
        NoiseNode::new(table, self.now + offset)
    }

    fn gain(&self, breakpoints: &[Breakpoint]) -> AutomationParam {
        AutomationParam::from_breakpoints(breakpoints, self.now)
    }

    fn finish(&self, layers: Vec<Box<dyn GraphNode>>, lifetime: f64) -> Voice {
        Voice::new(Sum::new(layers).boxed(), self.now, self.now + lifetime)
    }
}

/// Shared curve for the digital kit's tonal path.
fn digital_curve() -> Arc<[f32]> {
    static CURVE: OnceLock<Arc<[f32]>> = OnceLock::new();
    CURVE
        .get_or_init(|| shaping_curve(DIGITAL_DRIVE, CURVE_SAMPLES).into())
        .clone()
}

/// Hard clip `clamp(3x, ±0.8)` for the digital snare's noise.
fn noise_clip_curve() -> Arc<[f32]> {
    static CURVE: OnceLock<Arc<[f32]>> = OnceLock::new();
    CURVE
        .get_or_init(|| hard_clip_curve(3.0, 0.8, CURVE_SAMPLES))
        .clone()
}
