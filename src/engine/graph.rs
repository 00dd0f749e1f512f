//! Control side of the audio graph.
//!
//! `AudioGraph` is the handle the engine holds; `MixBus` is its render-side
//! twin. They are created together by [`audio_graph`] and talk only through
//! two wait-free rings and a shared output window:
//!
//! - a command ring (control → render) carrying [`GraphCommand`]s,
//! - a retire ring (render → control) returning finished voices and replaced
//!   rooms and curves, so they are freed on this side,
//! - a [`SampleTap`] holding the newest output for the spectrum analyzer.
//!
//! The audio clock is a frame counter shared between the two. It only moves
//! while the bus is running, so `now()` freezes while suspended.
//!
//! Parameter changes never rebuild the graph. Effects keep running when they
//! are disabled; only their return gain drops to zero. The graph keeps a
//! mirror of every return gain so callers can read it back without asking the
//! render thread.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use rand::{rngs::StdRng, SeedableRng};
use rtrb::{Consumer, Producer, PushError, RingBuffer};

use crate::{
    config::{CompressorConfig, Configuration, EffectsConfig, LfoConfig, LfoDestination},
    dsp::{
        analyzer::{SampleTap, SpectrumAnalyzer},
        distortion::distortion_curve,
        reverb::{reverb_impulse, Convolver},
    },
    engine::{
        bus::MixBus,
        effects::{Effect, DISTORTION_RETURN},
    },
    log_recovery,
    synth::{
        message::{GraphCommand, Retired},
        voice::Voice,
    },
};

const COMMAND_CAPACITY: usize = 1024;
const RETIRE_CAPACITY: usize = 1024;

/// Build the control/render pair for a session.
pub fn audio_graph(sample_rate: f32, config: &Configuration) -> (AudioGraph, MixBus) {
    let (commands, command_rx) = RingBuffer::new(COMMAND_CAPACITY);
    let (retire_tx, retired) = RingBuffer::new(RETIRE_CAPACITY);
    let tap = SampleTap::new();
    let frames = Arc::new(AtomicU64::new(0));
    let mut rng = StdRng::from_entropy();

    let effects = &config.effects;
    let send_gains = Effect::ALL.map(|effect| return_level(effect, effects));
    let reverb = room(effects.reverb.size, sample_rate, &mut rng);

    let bus = MixBus::new(
        sample_rate,
        config,
        send_gains,
        reverb,
        command_rx,
        retire_tx,
        tap.clone(),
        frames.clone(),
    );
    let graph = AudioGraph {
        commands,
        retired,
        analyzer: SpectrumAnalyzer::new(tap),
        frames,
        sample_rate,
        running: false,
        send_gains,
        effects: effects.clone(),
        lfo: config.synthesis.lfo.clone(),
        master_volume: config.volumes.master,
        rng,
    };
    (graph, bus)
}

/// Return gain an effect should have under `effects`.
pub fn return_level(effect: Effect, effects: &EffectsConfig) -> f32 {
    match effect {
        Effect::Delay if effects.delay.enabled => effects.delay.mix / 100.0,
        Effect::Distortion if effects.distortion.enabled => DISTORTION_RETURN,
        Effect::Reverb if effects.reverb.enabled => effects.reverb.mix / 100.0,
        _ => 0.0,
    }
}

fn room(size: f32, sample_rate: f32, rng: &mut StdRng) -> Box<Convolver> {
    let impulse = reverb_impulse(size, sample_rate, rng);
    Box::new(Convolver::from_impulse(&impulse, sample_rate))
}

pub struct AudioGraph {
    commands: Producer<GraphCommand>,
    retired: Consumer<Retired>,
    analyzer: SpectrumAnalyzer,
    frames: Arc<AtomicU64>,
    sample_rate: f32,
    running: bool,
    send_gains: [f32; 3],
    /// Last effect settings pushed to the bus.
    effects: EffectsConfig,
    lfo: LfoConfig,
    master_volume: f32,
    rng: StdRng,
}

impl AudioGraph {
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Audio-clock time in seconds.
    pub fn now(&self) -> f64 {
        self.frames.load(Ordering::Acquire) as f64 / self.sample_rate as f64
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn resume(&mut self) {
        if !self.running {
            self.running = true;
            self.send(GraphCommand::Resume);
        }
    }

    pub fn suspend(&mut self) {
        if self.running {
            self.running = false;
            self.send(GraphCommand::Suspend);
        }
    }

    /// Hand a voice to the bus.
    pub fn start_voice(&mut self, voice: Voice) {
        self.send(GraphCommand::StartVoice(Box::new(voice)));
    }

    /// Reconfigure every effect in place. Curves and rooms are only rebuilt
    /// when the setting that shapes them changed.
    pub fn apply_effects(&mut self, effects: &EffectsConfig) {
        let previous = std::mem::replace(&mut self.effects, effects.clone());

        self.send(GraphCommand::SetDelay {
            time: effects.delay.time_ms / 1000.0,
            feedback: effects.delay.feedback / 100.0,
        });

        if effects.distortion.amount != previous.distortion.amount {
            self.send(GraphCommand::SetDistortionCurve(distortion_curve(effects.distortion.amount)));
        }

        if effects.reverb.size != previous.reverb.size {
            let convolver = room(effects.reverb.size, self.sample_rate, &mut self.rng);
            self.send(GraphCommand::SetReverb(convolver));
        }

        if effects.compressor != previous.compressor {
            self.set_compressor(&effects.compressor);
        }

        for effect in Effect::ALL {
            self.set_return(effect, return_level(effect, effects));
        }
    }

    /// Open or close one effect's return, keeping its mix level for later.
    pub fn set_effect_enabled(&mut self, effect: Effect, enabled: bool) {
        match effect {
            Effect::Delay => self.effects.delay.enabled = enabled,
            Effect::Distortion => self.effects.distortion.enabled = enabled,
            Effect::Reverb => self.effects.reverb.enabled = enabled,
        }
        self.set_return(effect, return_level(effect, &self.effects));
    }

    /// Current return gain of `effect` as last sent to the bus.
    pub fn send_gain(&self, effect: Effect) -> f32 {
        self.send_gains[effect.index()]
    }

    fn set_return(&mut self, effect: Effect, gain: f32) {
        self.send_gains[effect.index()] = gain;
        self.send(GraphCommand::SetSendGain { effect, gain });
    }

    /// Update LFO shape and depth, then re-route if the destination moved.
    pub fn apply_lfo(&mut self, lfo: &LfoConfig) {
        let previous = self.lfo.active_destination();
        self.lfo = lfo.clone();

        self.send(GraphCommand::SetLfo {
            waveform: lfo.waveform,
            rate: lfo.rate,
            depth: lfo.depth(),
        });

        let route = lfo.active_destination();
        if route != previous {
            self.send(GraphCommand::RouteLfo(route));
        }
    }

    pub fn lfo_destination(&self) -> LfoDestination {
        self.lfo.active_destination()
    }

    pub fn set_compressor(&mut self, compressor: &CompressorConfig) {
        self.effects.compressor = compressor.clone();
        self.send(GraphCommand::SetCompressor(compressor.clone()));
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume;
        self.send(GraphCommand::SetMasterGain(volume));
    }

    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    /// Free everything the bus has handed back. Returns how many items.
    pub fn collect_retired(&mut self) -> usize {
        let mut count = 0;
        while self.retired.pop().is_ok() {
            count += 1;
        }
        count
    }

    /// One byte per frequency bin, for display.
    pub fn frequency_data(&mut self) -> Vec<u8> {
        self.analyzer.frequency_data()
    }

    fn send(&mut self, command: GraphCommand) {
        if let Err(PushError::Full(command)) = self.commands.push(command) {
            log_recovery!("command ring full, dropping {}", command.name());
        }
    }
}
