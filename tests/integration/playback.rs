//! Playback state machine tests
//!
//! Play/stop transitions through the single control, output context
//! lifecycle, failure rollback and the live visualizer.

use crate::helpers::*;
use mixdown::core::{Error as CoreError, RenderError};
use mixdown::prelude::*;
use mixdown::render::OfflineContextFactory;
use mixdown::HeadlessOutput;
use std::time::{Duration, Instant};

fn loaded_engine() -> (MixdownEngine, RecordingOutput, RecordingDisplay) {
    let (mut engine, output, display) = test_engine();
    engine
        .load(&[
            tone_file("A.wav", 440.0, 0.5, 0.5).0,
            tone_file("B.wav", 660.0, 0.5, 0.5).0,
        ])
        .unwrap();
    display.clear();
    (engine, output, display)
}

fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    false
}

#[test]
fn test_control_toggles_between_play_and_stop() {
    let (mut engine, output, display) = loaded_engine();

    for _ in 0..3 {
        assert_eq!(engine.press_control().unwrap(), PlaybackState::Playing);
        assert_eq!(engine.control_label(), ControlLabel::Stop);
        assert_eq!(display.last_control(), Some(ControlLabel::Stop));
        assert!(engine.mixed_buffer().is_some());
        assert!(engine.visualizer().is_some());

        assert_eq!(engine.press_control().unwrap(), PlaybackState::Idle);
        assert_eq!(engine.control_label(), ControlLabel::Play);
        assert_eq!(display.last_control(), Some(ControlLabel::Play));
        assert!(engine.mixed_buffer().is_none());
        assert!(engine.visualizer().is_none());
    }
    assert_eq!(output.open_contexts(), 0);
}

#[test]
fn test_output_lifecycle() {
    let (mut engine, output, _display) = loaded_engine();

    engine.play().unwrap();
    assert_eq!(
        output.events(),
        vec![
            OutputEvent::Opened(TEST_SAMPLE_RATE),
            OutputEvent::Tapped,
            OutputEvent::Played(44100 * 60),
        ]
    );

    engine.stop().unwrap();
    assert_eq!(
        &output.events()[3..],
        &[OutputEvent::Stopped, OutputEvent::Closed]
    );
}

#[test]
fn test_invalid_transitions_are_rejected() {
    let (mut engine, output, display) = loaded_engine();

    let err = engine.stop().unwrap_err();
    assert!(matches!(
        err.as_core(),
        CoreError::InvalidTransition {
            state: PlaybackState::Idle,
            ..
        }
    ));
    assert!(output.events().is_empty());

    engine.play().unwrap();
    let err = engine.play().unwrap_err();
    assert!(matches!(
        err.as_core(),
        CoreError::InvalidTransition {
            state: PlaybackState::Playing,
            ..
        }
    ));
    assert_eq!(engine.state(), PlaybackState::Playing);
    assert_eq!(display.last_control(), Some(ControlLabel::Stop));
    assert_eq!(output.open_contexts(), 1);
}

#[test]
fn test_render_failure_stays_idle() {
    let output = RecordingOutput::default();
    let display = RecordingDisplay::default();
    let mut engine = MixdownEngine::builder()
        .channels(1)
        .render_factory(OfflineContextFactory::with_max_frames(44100))
        .output(output.clone())
        .display(display.clone())
        .build()
        .unwrap();
    engine.load(&[tone_file("A.wav", 440.0, 0.5, 0.5).0]).unwrap();
    display.clear();

    let err = engine.press_control().unwrap_err();

    assert!(matches!(
        err.as_core(),
        CoreError::Render(RenderError::LengthExceedsLimit {
            requested: 2_646_000,
            limit: 44100
        })
    ));
    assert_eq!(engine.state(), PlaybackState::Idle);
    assert!(engine.mixed_buffer().is_none());
    assert!(output.events().is_empty());
    assert_eq!(display.errors().len(), 1);
    assert_eq!(display.last_control(), Some(ControlLabel::Play));
}

#[test]
fn test_output_failure_rolls_back() {
    let output = RecordingOutput::failing_play();
    let mut engine = MixdownEngine::builder()
        .channels(1)
        .output(output.clone())
        .build()
        .unwrap();
    engine.load(&[tone_file("A.wav", 440.0, 0.5, 0.5).0]).unwrap();

    let err = engine.play().unwrap_err();

    assert!(matches!(err.as_core(), CoreError::Output(_)));
    assert_eq!(engine.state(), PlaybackState::Idle);
    assert_eq!(output.open_contexts(), 0);
    assert!(!output
        .events()
        .iter()
        .any(|e| matches!(e, OutputEvent::Played(_))));
}

#[test]
fn test_drop_while_playing_releases_output() {
    let (mut engine, output, _display) = loaded_engine();
    engine.play().unwrap();

    drop(engine);

    let events = output.events();
    assert_eq!(
        &events[events.len() - 2..],
        &[OutputEvent::Stopped, OutputEvent::Closed]
    );
    assert_eq!(output.open_contexts(), 0);
}

#[test]
fn test_visualizer_follows_output() {
    let (mut engine, _output, _display) = loaded_engine();
    engine.play().unwrap();

    let visualizer = engine.visualizer().unwrap();
    assert!(visualizer.is_running());
    assert!(wait_for(|| {
        visualizer.latest_waveform().amplitude() > 20.0
            && visualizer.latest_spectrum().peak_height() > 0.0
    }));

    let token = visualizer.token().clone();
    engine.stop().unwrap();
    assert!(token.is_cancelled());
}

#[test]
fn test_headless_output_reaches_end() {
    let mut engine = MixdownEngine::builder()
        .channels(1)
        .sample_rate(TEST_SAMPLE_RATE)
        .render_length(RenderLength::LongestTrack { max_seconds: 1.0 })
        .output(HeadlessOutput::unpaced())
        .build()
        .unwrap();
    engine.load(&[tone_file("A.wav", 440.0, 0.5, 0.25).0]).unwrap();

    engine.press_control().unwrap();
    assert!(wait_for(|| engine.is_finished()));

    // Reaching the end does not leave Playing by itself
    assert_eq!(engine.state(), PlaybackState::Playing);
    assert_eq!(engine.press_control().unwrap(), PlaybackState::Idle);
    assert!(!engine.is_finished());
}
