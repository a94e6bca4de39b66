//! # Play Mix
//!
//! Load audio files (WAV, FLAC, MP3, Ogg) as tracks, unmute all of them, play the mix and print
//! visualizer statistics while it plays.
//!
//! **Concepts:** Batch loading, mute toggles, play/stop control, live frames
//!
//! ```bash
//! RUST_LOG=debug cargo run --example play_mix -- drums.wav bass.wav
//! cargo run --example play_mix --features cpal -- drums.wav bass.wav
//! ```

use mixdown::prelude::*;
use std::time::Duration;

/// Prints the track list and control label to stdout.
struct ConsolePanel;

impl DisplayPanel for ConsolePanel {
    fn refresh(&mut self, tracks: &[TrackView]) {
        for track in tracks {
            let mark = if track.muted { "muted" } else { "on" };
            println!("  [{}] {:<24} {mark}", track.index, track.label);
        }
    }

    fn show_control(&mut self, label: ControlLabel) {
        println!("control: {label}");
    }

    fn set_busy(&mut self, busy: bool) {
        if busy {
            println!("decoding...");
        }
    }

    fn show_error(&mut self, error: &mixdown::core::Error) {
        eprintln!("error: {error}");
    }
}

fn main() -> mixdown::Result<()> {
    env_logger::init();

    let files: Vec<PathFile> = std::env::args().skip(1).map(PathFile::new).collect();
    if files.is_empty() {
        eprintln!("usage: play_mix <audio file>...");
        return Ok(());
    }

    let builder = MixdownEngine::builder()
        .render_length(RenderLength::LongestTrack { max_seconds: 60.0 })
        .display(ConsolePanel);
    #[cfg(feature = "cpal")]
    let builder = builder.output(mixdown::CpalOutput::new());
    let mut engine = builder.build()?;

    engine.load(&files)?;
    for index in 1..engine.tracks().len() {
        engine.toggle_mute(index)?;
    }

    engine.press_control()?;
    if let Some(mix) = engine.mixed_buffer() {
        println!(
            "mix: {:.1}s, peak {:.3}{}",
            mix.duration_seconds(),
            mix.peak_level,
            if mix.is_clipping() { " (clipping)" } else { "" }
        );
    }

    while !engine.is_finished() {
        std::thread::sleep(Duration::from_millis(500));
        if let Some(visualizer) = engine.visualizer() {
            let waveform = visualizer.latest_waveform();
            let spectrum = visualizer.latest_spectrum();
            println!(
                "frames {:?}  amplitude {:5.1}px  tallest bar {:5.1}px",
                visualizer.ticks(),
                waveform.amplitude(),
                spectrum.peak_height()
            );
        }
    }

    engine.press_control()?;
    Ok(())
}
