//! synthograsizer - terminal step sequencer
//!
//! Run with: cargo run --release

mod app;
mod ui;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    app::run()
}
