/*
Mixing Bus
==========

The render side of the audio graph. It lives in the audio callback, owns
every sounding voice and the effect network, and never blocks or logs.

    commands ──→ [drain]
                    │
    voices ──→ dry ─┼─────────────────────────────┐
          └─→ sends → delay / distortion / reverb ┤ (+) → × master → compressor → clip → out
                                                  │                                      └→ analyzer tap

Per block:

  1. Apply every pending command from the control side.
  2. If suspended, output silence and leave the clock alone.
  3. Advance the bus LFO and turn it into a filter offset (octaves) or a
     master-gain offset, depending on the route.
  4. Render voices into the dry sum and their send buffers.
  5. Run the effects, add their returns, apply master gain, compress, clip.
  6. Retire voices whose stop time has passed; advance the clock.

Voices are kept in a pre-sized list. When it is full, a new voice replaces the
one that would have ended first.

Nothing is freed here. Finished voices, replaced rooms and old distortion
curves go back to the control thread over the retire ring. The output window
for the analyzer is overwritten in place, newest audio first.
*/

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use rtrb::{Consumer, Producer};

use crate::{
    config::{Configuration, LfoDestination},
    dsp::{
        analyzer::SampleTap,
        compressor::Compressor,
        distortion::distortion_curve,
        lfo::Lfo,
        mix::{apply_gain, clip, sum_in_place, sum_scaled},
        reverb::Convolver,
    },
    engine::effects::{DelayNetwork, DistortionStage, Effect, ReverbStage},
    graph::RenderCtx,
    synth::{
        message::{GraphCommand, Retired},
        voice::Voice,
    },
    MAX_BLOCK_SIZE,
};

/// Most voices the bus renders at once.
pub const MAX_VOICES: usize = 256;

pub struct MixBus {
    commands: Consumer<GraphCommand>,
    retired: Producer<Retired>,
    tap: Arc<SampleTap>,
    frames: Arc<AtomicU64>,
    sample_rate: f32,
    running: bool,

    // Boxed so retiring a voice moves a pointer.
    #[allow(clippy::vec_box)]
    voices: Vec<Box<Voice>>,
    master_gain: f32,
    send_gains: [f32; 3],
    delay: DelayNetwork,
    distortion: DistortionStage,
    reverb: ReverbStage,
    compressor: Compressor,
    lfo: Lfo,
    lfo_depth: f32,
    lfo_route: LfoDestination,

    mix_buffer: Vec<f32>,
    voice_buffer: Vec<f32>,
    send_buffers: [Vec<f32>; 3],
}

impl MixBus {
    pub(crate) fn new(
        sample_rate: f32,
        config: &Configuration,
        send_gains: [f32; 3],
        reverb: Box<Convolver>,
        commands: Consumer<GraphCommand>,
        retired: Producer<Retired>,
        tap: Arc<SampleTap>,
        frames: Arc<AtomicU64>,
    ) -> Self {
        let effects = &config.effects;
        let lfo = &config.synthesis.lfo;

        Self {
            commands,
            retired,
            tap,
            frames,
            sample_rate,
            running: false,
            voices: Vec::with_capacity(MAX_VOICES),
            master_gain: config.volumes.master,
            send_gains,
            delay: DelayNetwork::new(
                sample_rate,
                effects.delay.time_ms / 1000.0,
                effects.delay.feedback / 100.0,
            ),
            distortion: DistortionStage::new(distortion_curve(effects.distortion.amount)),
            reverb: ReverbStage::new(reverb),
            compressor: Compressor::new(&effects.compressor, sample_rate),
            lfo: Lfo::new(lfo.waveform, lfo.rate),
            lfo_depth: lfo.depth(),
            lfo_route: lfo.active_destination(),
            mix_buffer: vec![0.0; MAX_BLOCK_SIZE],
            voice_buffer: vec![0.0; MAX_BLOCK_SIZE],
            send_buffers: [
                vec![0.0; MAX_BLOCK_SIZE],
                vec![0.0; MAX_BLOCK_SIZE],
                vec![0.0; MAX_BLOCK_SIZE],
            ],
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    /// Audio-clock time in seconds.
    pub fn time(&self) -> f64 {
        self.frames.load(Ordering::Acquire) as f64 / self.sample_rate as f64
    }

    /// Render mono output of any length.
    pub fn render(&mut self, out: &mut [f32]) {
        for block in out.chunks_mut(MAX_BLOCK_SIZE) {
            self.render_block(block);
        }
    }

    fn render_block(&mut self, out: &mut [f32]) {
        self.drain_commands();

        if !self.running {
            out.fill(0.0);
            return;
        }

        let frames = out.len();
        let time = self.time();

        let lfo = self.lfo.advance(frames, self.sample_rate) * self.lfo_depth;
        let (filter_octaves, gain_offset) = match self.lfo_route {
            LfoDestination::Filter => (lfo, 0.0),
            LfoDestination::Amplitude => (0.0, lfo),
            LfoDestination::None | LfoDestination::Pitch => (0.0, 0.0),
        };
        let ctx = RenderCtx::new(self.sample_rate, time).with_filter_octaves(filter_octaves);

        let mix = &mut self.mix_buffer[..frames];
        mix.fill(0.0);
        for send in self.send_buffers.iter_mut() {
            send[..frames].fill(0.0);
        }

        for voice in self.voices.iter_mut() {
            let rendered = &mut self.voice_buffer[..frames];
            voice.render(rendered, &ctx);
            sum_in_place(mix, rendered);

            let sends = voice.sends();
            let routed = [sends.delay, sends.distortion, sends.reverb];
            for (send, _) in self.send_buffers.iter_mut().zip(routed).filter(|(_, on)| *on) {
                sum_in_place(&mut send[..frames], rendered);
            }
        }

        let [delay_send, distortion_send, reverb_send] = &mut self.send_buffers;
        self.delay.process(&mut delay_send[..frames]);
        self.distortion.process(&mut distortion_send[..frames]);
        self.reverb.process(&mut reverb_send[..frames]);
        sum_scaled(mix, &delay_send[..frames], self.send_gains[Effect::Delay.index()]);
        sum_scaled(mix, &distortion_send[..frames], self.send_gains[Effect::Distortion.index()]);
        sum_scaled(mix, &reverb_send[..frames], self.send_gains[Effect::Reverb.index()]);

        apply_gain(mix, (self.master_gain + gain_offset).max(0.0));
        self.compressor.render(mix);
        clip(mix);
        out.copy_from_slice(mix);
        self.tap.write(out);

        let block_end = ctx.block_end(frames);
        let mut i = 0;
        while i < self.voices.len() {
            if self.voices[i].is_finished(block_end) {
                let voice = self.voices.swap_remove(i);
                self.retire(Retired::Voice(voice));
            } else {
                i += 1;
            }
        }
        self.frames.fetch_add(frames as u64, Ordering::Release);
    }

    fn drain_commands(&mut self) {
        while let Ok(command) = self.commands.pop() {
            match command {
                GraphCommand::Resume => self.running = true,
                GraphCommand::Suspend => self.running = false,
                GraphCommand::StartVoice(voice) => self.start_voice(voice),
                GraphCommand::SetSendGain { effect, gain } => {
                    self.send_gains[effect.index()] = gain;
                }
                GraphCommand::SetDelay { time, feedback } => {
                    self.delay.set(time, feedback, self.sample_rate);
                }
                GraphCommand::SetDistortionCurve(curve) => {
                    let old = self.distortion.set_curve(curve);
                    self.retire(Retired::Curve(old));
                }
                GraphCommand::SetReverb(convolver) => {
                    let old = self.reverb.replace(convolver);
                    self.retire(Retired::Reverb(old));
                }
                GraphCommand::SetCompressor(config) => self.compressor.configure(&config),
                GraphCommand::SetMasterGain(gain) => self.master_gain = gain,
                GraphCommand::SetLfo { waveform, rate, depth } => {
                    self.lfo.set_waveform(waveform);
                    self.lfo.set_rate(rate);
                    self.lfo_depth = depth;
                }
                GraphCommand::RouteLfo(route) => self.lfo_route = route,
            }
        }
    }

    fn start_voice(&mut self, voice: Box<Voice>) {
        if self.voices.len() < MAX_VOICES {
            self.voices.push(voice);
            return;
        }
        let earliest = self
            .voices
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.stop_time().total_cmp(&b.1.stop_time()))
            .map(|(index, _)| index);
        if let Some(index) = earliest {
            let replaced = std::mem::replace(&mut self.voices[index], voice);
            self.retire(Retired::Voice(replaced));
        }
    }

    /// Hand something back to the control thread to be freed there. If the
    /// ring is full it is dropped here instead.
    fn retire(&mut self, item: Retired) {
        let _ = self.retired.push(item);
    }
}
