/*
Engine
======

The control-thread half of the synthesizer. It owns the grids, the
configuration, the saved patterns and the transport, and turns them into
voices for the render bus.

    Engine ──(voices, commands)──→ MixBus        (audio callback)
       ↑                              │
       └─────── spectrum tap ─────────┘

Timing
------

Nothing here sleeps. Ticks, swing-deferred steps and arpeggio notes are
one-shot tasks on a time-ordered queue, keyed by control-clock time:

    play()        schedule Tick at now + interval
    poll()        run everything due; a Tick reschedules itself
    tick()        one step of the loop, swing permitting

Ticks and deferred steps carry the transport generation they were created in.
After stop() they no longer match and are dropped when they fall due.
Arpeggio notes carry no generation and always play.

At most one swung step waits at a time. If the next tick lands before it
does (fast tempo, heavy swing), the waiting step plays first, then the tick's
own step, so no step is skipped or played twice.

Voice start times come from the audio clock at the moment of the trigger.
*/

pub mod bus;
pub mod clock;
pub mod effects;
pub mod graph;
pub mod scheduler;
pub mod transport;

use std::time::Duration;

use rand::{rngs::StdRng, SeedableRng};

pub use self::{
    bus::MixBus,
    clock::{ControlClock, ManualClock, SystemClock},
    effects::Effect,
    graph::{audio_graph, AudioGraph},
};
use self::{
    scheduler::Scheduler,
    transport::{swing_delay, tick_interval, Transport},
};
use crate::{
    config::{Configuration, DEFAULT_BPM},
    error::Result,
    log_recovery,
    sequencing::{
        arpeggiator::{expand, spacing},
        grid::{Grid, GridKind, DEFAULT_STEPS},
        pattern::{PatternSnapshot, PatternStore},
        scale::note_to_frequency,
    },
    synth::{melodic::trigger_fm_note, melodic::trigger_note},
    voices::{trigger_drum, DrumType},
};

const MELODY_DENSITY: f64 = 0.3;
const DRUM_DENSITY: f64 = 0.2;
const VARIATION_PROBABILITY: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    Tick { generation: u64 },
    Step { generation: u64 },
    ArpNote { note: i32 },
}

pub struct Engine<C: ControlClock = SystemClock> {
    config: Configuration,
    melody: Grid,
    drums: Grid,
    patterns: PatternStore,
    transport: Transport,
    scheduler: Scheduler<Task>,
    graph: AudioGraph,
    clock: C,
    rng: StdRng,
    /// A swung step is scheduled and has not played yet.
    swing_pending: bool,
}

impl Engine<SystemClock> {
    /// Default session on wall-clock time, plus the bus for the audio callback.
    pub fn new(sample_rate: f32) -> (Self, MixBus) {
        Self::with_clock(sample_rate, Configuration::default(), SystemClock::new())
    }
}

impl<C: ControlClock> Engine<C> {
    pub fn with_clock(sample_rate: f32, mut config: Configuration, clock: C) -> (Self, MixBus) {
        config.repair();
        let (graph, bus) = audio_graph(sample_rate, &config);
        let engine = Self {
            config,
            melody: Grid::new(GridKind::Melody, DEFAULT_STEPS),
            drums: Grid::new(GridKind::Drum, DEFAULT_STEPS),
            patterns: PatternStore::new(),
            transport: Transport::new(),
            scheduler: Scheduler::new(),
            graph,
            clock,
            rng: StdRng::from_entropy(),
            swing_pending: false,
        };
        (engine, bus)
    }

    /// Make noise, randomization and random arpeggios repeatable.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    // Transport

    pub fn play(&mut self) {
        if self.transport.is_playing() {
            return;
        }
        self.ensure_grids();
        if self.config.repair() > 0 {
            self.apply_config();
        }
        self.graph.resume();
        self.transport.play();

        let generation = self.transport.generation();
        let at = self.clock.now() + tick_interval(self.config.bpm);
        self.scheduler.schedule(at, Task::Tick { generation });
    }

    pub fn stop(&mut self) {
        self.transport.stop();
        self.swing_pending = false;
        let generation = self.transport.generation();
        self.scheduler.retain(|task| match *task {
            Task::Tick { generation: g } | Task::Step { generation: g } => g == generation,
            Task::ArpNote { .. } => true,
        });
    }

    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    pub fn current_step(&self) -> usize {
        self.transport.current_step()
    }

    /// Run one tick now. Odd steps may be deferred by swing.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        self.tick_at(now);
    }

    /// Run every task that has fallen due on the control clock.
    pub fn poll(&mut self) {
        self.graph.collect_retired();
        let now = self.clock.now();
        while let Some((at, task)) = self.scheduler.pop_due(now) {
            match task {
                Task::Tick { generation } if generation == self.transport.generation() => {
                    let next = at + tick_interval(self.config.bpm);
                    self.scheduler.schedule(next, Task::Tick { generation });
                    self.tick_at(at);
                }
                Task::Step { generation }
                    if generation == self.transport.generation() && self.swing_pending =>
                {
                    self.swing_pending = false;
                    self.run_step(at);
                }
                Task::ArpNote { note } => self.play_note(note),
                Task::Tick { .. } | Task::Step { .. } => {}
            }
        }
    }

    /// When the next deferred task falls due, if any.
    pub fn next_due(&self) -> Option<Duration> {
        self.scheduler.next_due()
    }

    pub fn set_bpm(&mut self, bpm: f32) {
        let bpm = if bpm.is_finite() && (20.0..=300.0).contains(&bpm) {
            bpm
        } else {
            log_recovery!("bpm = {bpm} is out of range, using {DEFAULT_BPM}");
            DEFAULT_BPM
        };
        self.config.bpm = bpm;
        self.restart_if_playing();
    }

    pub fn set_swing(&mut self, amount: f32) {
        self.config.swing = if amount.is_finite() { amount.clamp(0.0, 100.0) } else { 0.0 };
    }

    fn restart_if_playing(&mut self) {
        if self.transport.is_playing() {
            self.stop();
            self.play();
        }
    }

    fn tick_at(&mut self, at: Duration) {
        if !self.transport.is_playing() {
            return;
        }
        self.transport.sanitize(self.melody.steps());

        if self.swing_pending {
            self.swing_pending = false;
            self.run_step(at);
        }

        let delay = swing_delay(self.transport.current_step(), self.config.swing);
        if delay.is_zero() {
            self.run_step(at);
        } else {
            let generation = self.transport.generation();
            self.scheduler.schedule(at + delay, Task::Step { generation });
            self.swing_pending = true;
        }
    }

    fn run_step(&mut self, at: Duration) {
        let steps = self.melody.steps();
        self.transport.sanitize(steps);
        let step = self.transport.current_step();

        let melody_rows: Vec<usize> = self.melody.active_rows(step).collect();
        for row in melody_rows {
            let notes = expand(row as i32, &self.config.arpeggiator, &mut self.rng);
            let gap = spacing(self.config.bpm, self.config.arpeggiator.rate);
            for (i, note) in notes.into_iter().enumerate() {
                if i == 0 {
                    self.play_note(note);
                } else {
                    self.scheduler.schedule(at + gap * i as u32, Task::ArpNote { note });
                }
            }
        }

        let drum_rows: Vec<usize> = self.drums.active_rows(step).collect();
        for row in drum_rows {
            match DrumType::from_row(row) {
                Some(drum) => self.play_drum(drum),
                None => log_recovery!("drum row {row} has no instrument, skipping"),
            }
        }

        if self.transport.advance(steps) {
            if let Some(index) = self.patterns.next_in_chain() {
                if let Err(err) = self.load_sequence(index) {
                    log_recovery!("chained pattern {index} could not be loaded: {err}");
                }
            }
        }
    }

    fn play_note(&mut self, note: i32) {
        let config = &self.config;
        let frequency = note_to_frequency(note, config.scale, config.key, config.transpose);
        if !frequency.is_finite() || frequency <= 0.0 {
            log_recovery!("note {note} maps to {frequency} Hz, skipping");
            return;
        }
        let now = self.graph.now();
        let voice = if config.synthesis.fm.enabled {
            trigger_fm_note(config, frequency, now)
        } else {
            trigger_note(config, frequency, config.waveform, now)
        };
        self.graph.start_voice(voice);
    }

    fn play_drum(&mut self, drum: DrumType) {
        let volume = self.config.volumes.drums[drum.index()];
        let voice = trigger_drum(
            self.config.drum_kit,
            drum,
            volume,
            self.graph.now(),
            self.graph.sample_rate(),
            &mut self.rng,
        );
        self.graph.start_voice(voice);
    }

    fn ensure_grids(&mut self) {
        if !self.melody.is_well_formed() {
            log_recovery!("melody grid is malformed, resetting");
            self.melody = Grid::new(GridKind::Melody, self.melody.steps().max(1));
        }
        if !self.drums.is_well_formed() || self.drums.steps() != self.melody.steps() {
            log_recovery!("drum grid is malformed, resetting");
            self.drums = Grid::new(GridKind::Drum, self.melody.steps());
        }
    }

    // Grids

    pub fn melody(&self) -> &Grid {
        &self.melody
    }

    pub fn drums(&self) -> &Grid {
        &self.drums
    }

    fn grid_mut(&mut self, kind: GridKind) -> &mut Grid {
        match kind {
            GridKind::Melody => &mut self.melody,
            GridKind::Drum => &mut self.drums,
        }
    }

    /// Flip a cell and return its new state.
    pub fn toggle_cell(&mut self, kind: GridKind, row: usize, step: usize) -> Result<bool> {
        self.grid_mut(kind).toggle(row, step)
    }

    pub fn set_cell(&mut self, kind: GridKind, row: usize, step: usize, active: bool) -> Result<()> {
        self.grid_mut(kind).set(row, step, active)
    }

    pub fn pattern_length(&self) -> usize {
        self.melody.steps()
    }

    /// Grow with empty steps or cut trailing ones, on both grids.
    pub fn change_pattern_length(&mut self, steps: usize) -> Result<()> {
        self.melody.resize(steps)?;
        self.drums.resize(steps)?;
        self.transport.sanitize(steps);
        Ok(())
    }

    pub fn randomize(&mut self) {
        self.melody.randomize(MELODY_DENSITY, &mut self.rng);
        self.drums.randomize(DRUM_DENSITY, &mut self.rng);
    }

    pub fn variation(&mut self) {
        self.melody.vary(VARIATION_PROBABILITY, &mut self.rng);
        self.drums.vary(VARIATION_PROBABILITY, &mut self.rng);
    }

    pub fn quantize(&mut self, notes_per_bar: usize) -> Result<()> {
        self.melody.quantize(notes_per_bar)?;
        self.drums.quantize(notes_per_bar)
    }

    pub fn clear(&mut self, kind: GridKind) {
        self.grid_mut(kind).clear();
    }

    // Patterns

    /// Snapshot both grids and the configuration. Returns the new index.
    pub fn save_sequence(&mut self) -> Result<usize> {
        let snapshot = PatternSnapshot::capture(&self.melody, &self.drums, &self.config);
        self.patterns.save(snapshot)
    }

    /// Restore a saved pattern: length first, then cells, then every setting.
    pub fn load_sequence(&mut self, index: usize) -> Result<()> {
        let snapshot = self.patterns.get(index)?.clone();
        if snapshot.steps != self.melody.steps() {
            self.change_pattern_length(snapshot.steps)?;
        }
        self.melody.copy_overlap_from(&snapshot.melody_grid());
        self.drums.copy_overlap_from(&snapshot.drum_grid());
        self.config = snapshot.config;
        self.config.repair();
        self.apply_config();
        Ok(())
    }

    pub fn delete_sequence(&mut self, index: usize) -> Result<()> {
        self.patterns.delete(index).map(|_| ())
    }

    pub fn add_to_chain(&mut self, index: usize) -> Result<()> {
        self.patterns.add_to_chain(index)
    }

    pub fn clear_chain(&mut self) {
        self.patterns.clear_chain();
    }

    pub fn chain(&self) -> Vec<usize> {
        self.patterns.chain()
    }

    pub fn saved_patterns(&self) -> &[PatternSnapshot] {
        self.patterns.snapshots()
    }

    /// The current loop as JSON.
    #[cfg(feature = "serde")]
    pub fn export_current(&self) -> Result<String> {
        PatternSnapshot::capture(&self.melody, &self.drums, &self.config).to_json()
    }

    /// Parse a loop from JSON and add it to the saved patterns.
    #[cfg(feature = "serde")]
    pub fn import_pattern(&mut self, json: &str) -> Result<usize> {
        let snapshot = PatternSnapshot::from_json(json)?;
        self.patterns.save(snapshot)
    }

    // Configuration

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Edit the configuration in place, then push the result to the graph.
    pub fn update_config(&mut self, edit: impl FnOnce(&mut Configuration)) {
        let bpm = self.config.bpm;
        edit(&mut self.config);
        self.config.repair();
        self.apply_config();
        if self.config.bpm != bpm {
            self.restart_if_playing();
        }
    }

    pub fn set_config(&mut self, config: Configuration) {
        self.update_config(|current| *current = config);
    }

    pub fn set_effect_enabled(&mut self, effect: Effect, enabled: bool) {
        let effects = &mut self.config.effects;
        match effect {
            Effect::Delay => effects.delay.enabled = enabled,
            Effect::Distortion => effects.distortion.enabled = enabled,
            Effect::Reverb => effects.reverb.enabled = enabled,
        }
        self.graph.set_effect_enabled(effect, enabled);
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        let volume = if volume.is_finite() { volume.clamp(0.0, 1.0) } else { 0.7 };
        self.config.volumes.master = volume;
        self.graph.set_master_volume(volume);
    }

    fn apply_config(&mut self) {
        self.graph.apply_effects(&self.config.effects);
        self.graph.apply_lfo(&self.config.synthesis.lfo);
        self.graph.set_master_volume(self.config.volumes.master);
    }

    // Audio graph

    pub fn graph(&self) -> &AudioGraph {
        &self.graph
    }

    pub fn send_gain(&self, effect: Effect) -> f32 {
        self.graph.send_gain(effect)
    }

    pub fn frequency_data(&mut self) -> Vec<u8> {
        self.graph.frequency_data()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::EngineError, sequencing::MAX_SAVED_PATTERNS};

    const SAMPLE_RATE: f32 = 48_000.0;

    fn engine() -> (Engine<ManualClock>, MixBus, ManualClock) {
        let clock = ManualClock::new();
        let (engine, bus) = Engine::with_clock(SAMPLE_RATE, Configuration::default(), clock.clone());
        (engine.with_seed(7), bus, clock)
    }

    fn render(bus: &mut MixBus) {
        let mut out = vec![0.0; 64];
        bus.render(&mut out);
    }

    #[test]
    fn first_tick_fires_one_interval_after_play() {
        let (mut engine, _bus, clock) = engine();
        engine.play();
        clock.advance(Duration::from_millis(124));
        engine.poll();
        assert_eq!(engine.current_step(), 0);

        clock.advance(Duration::from_millis(1));
        engine.poll();
        assert_eq!(engine.current_step(), 1);

        clock.advance(Duration::from_millis(250));
        engine.poll();
        assert_eq!(engine.current_step(), 3);
    }

    #[test]
    fn play_twice_keeps_position() {
        let (mut engine, _bus, _clock) = engine();
        engine.play();
        engine.tick();
        engine.tick();
        engine.play();
        assert_eq!(engine.current_step(), 2);
    }

    #[test]
    fn stop_resets_and_cancels_ticks() {
        let (mut engine, _bus, clock) = engine();
        engine.play();
        engine.tick();
        engine.stop();
        assert_eq!(engine.current_step(), 0);

        clock.advance(Duration::from_secs(1));
        engine.poll();
        assert_eq!(engine.current_step(), 0);
        assert!(engine.next_due().is_none());
    }

    #[test]
    fn swing_defers_odd_steps() {
        let (mut engine, _bus, clock) = engine();
        engine.set_swing(100.0);
        engine.play();

        engine.tick();
        assert_eq!(engine.current_step(), 1);
        engine.tick();
        assert_eq!(engine.current_step(), 1, "odd step waits for the swing delay");

        clock.advance(Duration::from_millis(50));
        engine.poll();
        assert_eq!(engine.current_step(), 2);
    }

    #[test]
    fn stop_drops_swing_deferred_step() {
        let (mut engine, _bus, clock) = engine();
        engine.set_swing(100.0);
        engine.play();
        engine.tick();
        engine.tick();
        engine.stop();

        clock.advance(Duration::from_millis(50));
        engine.poll();
        assert_eq!(engine.current_step(), 0);
    }

    #[test]
    fn full_swing_at_top_tempo_keeps_every_step_once() {
        let (mut engine, _bus, clock) = engine();
        engine.set_bpm(300.0);
        engine.set_swing(100.0);
        engine.play();

        // The swing delay equals the tick interval, so each odd step lands
        // together with the even step after it.
        let mut steps = Vec::new();
        for _ in 0..8 {
            clock.advance(Duration::from_millis(50));
            engine.poll();
            steps.push(engine.current_step());
        }
        assert_eq!(steps, [1, 1, 3, 3, 5, 5, 7, 7]);
    }

    #[test]
    fn active_cells_start_voices() {
        let (mut engine, mut bus, _clock) = engine();
        engine.set_cell(GridKind::Melody, 0, 0, true).unwrap();
        engine.set_cell(GridKind::Melody, 4, 0, true).unwrap();
        engine.set_cell(GridKind::Drum, 0, 0, true).unwrap();
        engine.play();
        engine.tick();
        render(&mut bus);
        assert_eq!(bus.voice_count(), 3);
    }

    #[test]
    fn arpeggio_notes_follow_at_their_spacing() {
        let (mut engine, mut bus, clock) = engine();
        engine.update_config(|config| {
            config.arpeggiator.enabled = true;
            config.arpeggiator.octaves = 3;
        });
        engine.set_cell(GridKind::Melody, 0, 0, true).unwrap();
        engine.play();
        engine.tick();
        render(&mut bus);
        assert_eq!(bus.voice_count(), 1);

        // 120 bpm at 4 notes per beat
        clock.advance(Duration::from_millis(250));
        engine.poll();
        render(&mut bus);
        assert_eq!(bus.voice_count(), 3);
    }

    #[test]
    fn step_index_wraps_every_pattern_length() {
        let (mut engine, _bus, _clock) = engine();
        engine.change_pattern_length(5).unwrap();
        engine.play();
        let mut zeros = 0;
        for _ in 0..20 {
            engine.tick();
            assert!(engine.current_step() < 5);
            if engine.current_step() == 0 {
                zeros += 1;
            }
        }
        assert_eq!(zeros, 4);
    }

    #[test]
    fn shrinking_below_the_step_restarts_at_zero() {
        let (mut engine, _bus, _clock) = engine();
        engine.play();
        for _ in 0..10 {
            engine.tick();
        }
        engine.change_pattern_length(8).unwrap();
        assert_eq!(engine.current_step(), 0);
        assert!(engine.change_pattern_length(0).is_err());
        assert_eq!(engine.pattern_length(), 8);
    }

    #[test]
    fn ninth_save_is_rejected() {
        let (mut engine, _bus, _clock) = engine();
        for i in 0..MAX_SAVED_PATTERNS {
            assert_eq!(engine.save_sequence().unwrap(), i);
        }
        let err = engine.save_sequence().unwrap_err();
        assert!(matches!(err, EngineError::PatternLimit { max: 8 }));
        assert_eq!(engine.saved_patterns().len(), MAX_SAVED_PATTERNS);
    }

    #[test]
    fn load_restores_length_cells_and_settings() {
        let (mut engine, _bus, _clock) = engine();
        engine.change_pattern_length(12).unwrap();
        engine.set_cell(GridKind::Drum, 2, 11, true).unwrap();
        engine.update_config(|config| config.effects.reverb.enabled = true);
        let saved = engine.save_sequence().unwrap();

        engine.change_pattern_length(16).unwrap();
        engine.clear(GridKind::Drum);
        engine.set_effect_enabled(Effect::Reverb, false);

        engine.load_sequence(saved).unwrap();
        assert_eq!(engine.pattern_length(), 12);
        assert!(engine.drums().get(2, 11));
        assert!(engine.config().effects.reverb.enabled);
        assert!((engine.send_gain(Effect::Reverb) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn chain_loads_on_wraparound() {
        let (mut engine, _bus, _clock) = engine();
        engine.save_sequence().unwrap();
        engine.save_sequence().unwrap();
        engine.set_cell(GridKind::Melody, 3, 5, true).unwrap();
        engine.set_cell(GridKind::Drum, 0, 0, true).unwrap();
        engine.save_sequence().unwrap();
        let pattern = engine.saved_patterns()[2].clone();

        engine.clear(GridKind::Melody);
        engine.clear(GridKind::Drum);
        engine.add_to_chain(2).unwrap();
        engine.add_to_chain(0).unwrap();

        engine.play();
        for _ in 0..16 {
            engine.tick();
        }
        assert_eq!(engine.melody().cells(), &pattern.melody[..]);
        assert_eq!(engine.drums().cells(), &pattern.drums[..]);
        assert_eq!(engine.chain(), vec![0]);
    }

    #[test]
    fn unknown_chain_entry_is_rejected() {
        let (mut engine, _bus, _clock) = engine();
        assert!(matches!(
            engine.add_to_chain(0),
            Err(EngineError::UnknownPattern { index: 0, saved: 0 })
        ));
        assert!(engine.chain().is_empty());
    }

    #[test]
    fn invalid_bpm_falls_back_to_default() {
        let (mut engine, _bus, _clock) = engine();
        engine.set_bpm(f32::NAN);
        assert_eq!(engine.config().bpm, DEFAULT_BPM);
        engine.set_bpm(90.0);
        assert_eq!(engine.config().bpm, 90.0);
    }

    #[test]
    fn effect_toggle_restores_mix() {
        let (mut engine, _bus, _clock) = engine();
        engine.update_config(|config| {
            config.effects.delay.enabled = true;
            config.effects.delay.mix = 65.0;
        });
        engine.set_effect_enabled(Effect::Delay, false);
        assert_eq!(engine.send_gain(Effect::Delay), 0.0);
        engine.set_effect_enabled(Effect::Delay, true);
        assert!((engine.send_gain(Effect::Delay) - 0.65).abs() < 1e-6);
    }

    #[test]
    fn choosing_an_lfo_destination_routes_it() {
        use crate::config::LfoDestination;

        let (mut engine, _bus, _clock) = engine();
        engine.update_config(|config| {
            config.synthesis.lfo.destination = LfoDestination::Amplitude;
            config.synthesis.lfo.amount = 50.0;
        });
        assert!(engine.config().synthesis.lfo.enabled);
        assert_eq!(engine.graph().lfo_destination(), LfoDestination::Amplitude);

        engine.update_config(|config| config.synthesis.lfo.destination = LfoDestination::None);
        assert_eq!(engine.graph().lfo_destination(), LfoDestination::None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn exported_loop_imports_as_a_pattern() {
        let (mut engine, _bus, _clock) = engine();
        engine.set_cell(GridKind::Melody, 7, 15, true).unwrap();
        let json = engine.export_current().unwrap();
        let index = engine.import_pattern(&json).unwrap();
        assert!(engine.saved_patterns()[index].melody[7][15]);
    }
}
