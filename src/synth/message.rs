use std::sync::Arc;

use crate::{
    config::{CompressorConfig, LfoDestination},
    dsp::{oscillator::Waveform, reverb::Convolver},
    engine::effects::Effect,
    synth::voice::Voice,
};

/// Control-to-render messages carried over the command ring.
///
/// Anything that allocates (voices, curves, convolution kernels) is built on
/// the control thread and moved across whole, so the render side only swaps
/// pointers.
pub enum GraphCommand {
    Resume,
    Suspend,
    StartVoice(Box<Voice>),
    SetSendGain { effect: Effect, gain: f32 },
    /// Delay time in seconds, feedback as a 0..1 gain.
    SetDelay { time: f32, feedback: f32 },
    SetDistortionCurve(Arc<[f32]>),
    SetReverb(Box<Convolver>),
    SetCompressor(CompressorConfig),
    SetMasterGain(f32),
    SetLfo { waveform: Waveform, rate: f32, depth: f32 },
    RouteLfo(LfoDestination),
}

/// Render-to-control messages: whatever the bus lets go of is handed back
/// so its memory is freed off the audio thread.
pub enum Retired {
    Voice(Box<Voice>),
    Reverb(Box<Convolver>),
    Curve(Arc<[f32]>),
}

impl GraphCommand {
    /// Short name for log lines.
    pub fn name(&self) -> &'static str {
        match self {
            GraphCommand::Resume => "resume",
            GraphCommand::Suspend => "suspend",
            GraphCommand::StartVoice(_) => "start voice",
            GraphCommand::SetSendGain { .. } => "send gain",
            GraphCommand::SetDelay { .. } => "delay",
            GraphCommand::SetDistortionCurve(_) => "distortion curve",
            GraphCommand::SetReverb(_) => "reverb",
            GraphCommand::SetCompressor(_) => "compressor",
            GraphCommand::SetMasterGain(_) => "master gain",
            GraphCommand::SetLfo { .. } => "lfo",
            GraphCommand::RouteLfo(_) => "lfo route",
        }
    }
}
