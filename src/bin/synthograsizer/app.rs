//! Audio device setup and the control loop

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use synthograsizer::{recovery, Engine, MAX_BLOCK_SIZE};

use super::ui::UiApp;

/// Open the default output, hand the mixing bus to the audio callback and
/// run the UI on this thread until the user quits.
pub fn run() -> EyreResult<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;

    let (engine, mut bus) = Engine::new(sample_rate);
    let mut block = vec![0.0f32; MAX_BLOCK_SIZE];

    let stream = device
        .build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                for frames in data.chunks_mut(MAX_BLOCK_SIZE * channels) {
                    let len = frames.len() / channels;
                    let mono = &mut block[..len];
                    bus.render(mono);

                    // Mono to all channels
                    for (frame, &sample) in frames.chunks_mut(channels).zip(mono.iter()) {
                        frame.fill(sample);
                    }
                }
            },
            |err| eprintln!("Audio error: {err}"),
            None,
        )
        .wrap_err("failed to open output stream")?;
    stream.play().wrap_err("failed to start output stream")?;

    recovery::capture(true);
    let mut terminal = ratatui::init();
    let result = UiApp::new(engine, sample_rate).run(&mut terminal);
    ratatui::restore();
    recovery::capture(false);
    result
}
