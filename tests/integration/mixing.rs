//! Mix content tests
//!
//! Two-tone session: A is a 2 s tone, B a 3 s tone, both mono at 44.1 kHz.

use crate::helpers::tolerances::{FLOAT_EPSILON, SILENCE_THRESHOLD};
use crate::helpers::*;
use approx::assert_abs_diff_eq;
use mixdown::prelude::*;

struct Session {
    files: Vec<MemoryFile>,
    a: Vec<f32>,
    b: Vec<f32>,
}

fn session() -> Session {
    let (file_a, a) = tone_file("A.wav", 440.0, 0.5, 2.0);
    let (file_b, b) = tone_file("B.wav", 660.0, 0.7, 3.0);
    Session {
        files: vec![file_a, file_b],
        a,
        b,
    }
}

fn assert_silent(samples: &[f32]) {
    let peak = samples.iter().fold(0.0f32, |p, s| p.max(s.abs()));
    assert!(peak < SILENCE_THRESHOLD, "expected silence, peak {peak}");
}

#[test]
fn test_only_first_track_plays_by_default() {
    let Session { files, a, .. } = session();
    let (mut engine, _output, _display) = test_engine();
    engine.load(&files).unwrap();

    engine.press_control().unwrap();
    let mix = engine.mixed_buffer().unwrap().buffer.clone();

    assert_eq!(mix.len(), 44100 * 60);
    assert_eq!(mix.sample_rate(), TEST_SAMPLE_RATE);
    let out = mix.channel(0);
    for (i, &expected) in a.iter().enumerate() {
        assert_abs_diff_eq!(out[i], expected, epsilon = FLOAT_EPSILON);
    }
    assert_eq!(out[a.len()..].iter().filter(|s| **s != 0.0).count(), 0);

    engine.press_control().unwrap();
    assert!(engine.mixed_buffer().is_none());
}

#[test]
fn test_unmuting_second_track_sums_both() {
    let Session { files, a, b } = session();
    let (mut engine, _output, _display) = test_engine();
    engine.load(&files).unwrap();

    engine.press_control().unwrap();
    engine.press_control().unwrap();
    engine.toggle_mute(1).unwrap();
    engine.press_control().unwrap();

    let mixed = engine.mixed_buffer().unwrap().clone();
    assert_eq!(mixed.track_count, 2);
    let out = mixed.buffer.channel(0);
    assert_eq!(out.len(), 44100 * 60);

    for i in 0..a.len() {
        assert_abs_diff_eq!(out[i], a[i] + b[i], epsilon = FLOAT_EPSILON);
    }
    for i in a.len()..b.len() {
        assert_abs_diff_eq!(out[i], b[i], epsilon = FLOAT_EPSILON);
    }
    assert_silent(&out[b.len()..]);

    // Raw headroom keeps the overshoot
    assert!(mixed.is_clipping());
    assert!(mixed.peak_level > 1.1);
}

#[test]
fn test_all_muted_renders_full_length_silence() {
    let Session { files, .. } = session();
    let (mut engine, _output, _display) = test_engine();
    engine.load(&files).unwrap();
    engine.toggle_mute(0).unwrap();

    engine.play().unwrap();
    let mixed = engine.mixed_buffer().unwrap();

    assert_eq!(mixed.track_count, 0);
    assert_eq!(mixed.buffer.len(), 44100 * 60);
    assert!(mixed.buffer.is_silent());
}

#[test]
fn test_mix_is_deterministic() {
    let Session { files, .. } = session();
    let (mut engine, _output, _display) = test_engine();
    engine.load(&files).unwrap();
    engine.toggle_mute(1).unwrap();

    engine.play().unwrap();
    let first = engine.mixed_buffer().unwrap().buffer.clone();
    engine.stop().unwrap();
    engine.play().unwrap();
    let second = engine.mixed_buffer().unwrap().buffer.clone();

    assert_eq!(first.channel(0), second.channel(0));
}

#[test]
fn test_clamp_headroom() {
    let Session { files, .. } = session();
    let (mut engine, _output, _display) =
        test_engine_with(MixdownEngine::builder().channels(1).headroom(Headroom::Clamp));
    engine.load(&files).unwrap();
    engine.toggle_mute(1).unwrap();

    engine.play().unwrap();
    let mixed = engine.mixed_buffer().unwrap();
    assert_eq!(mixed.peak_level, 1.0);
    assert!(!mixed.is_clipping());
}

#[test]
fn test_longest_track_length() {
    let Session { files, b, .. } = session();
    let (mut engine, _output, _display) = test_engine_with(
        MixdownEngine::builder()
            .channels(2)
            .render_length(RenderLength::LongestTrack { max_seconds: 60.0 }),
    );
    engine.load(&files).unwrap();
    engine.toggle_mute(1).unwrap();

    engine.play().unwrap();
    let buffer = &engine.mixed_buffer().unwrap().buffer;
    assert_eq!(buffer.len(), b.len());
    assert_eq!(buffer.channel_count(), 2);
    assert_eq!(buffer.channel(0), buffer.channel(1));
}

#[test]
fn test_flac_track_mixes_with_wav_track() {
    let (wav, a) = tone_file("A.wav", 440.0, 0.5, 1.0);
    let b = generate_sine(660.0, 0.25, TEST_SAMPLE_RATE, 22050);
    let flac = MemoryFile::new("B.flac", flac_bytes(&b, TEST_SAMPLE_RATE));
    let (mut engine, _output, _display) = test_engine_with(
        MixdownEngine::builder()
            .channels(1)
            .render_length(RenderLength::LongestTrack { max_seconds: 60.0 }),
    );
    engine.load(&[wav, flac]).unwrap();
    assert_eq!(engine.tracks()[1].audio().len(), b.len());

    engine.toggle_mute(1).unwrap();
    engine.play().unwrap();

    let out = engine.mixed_buffer().unwrap().buffer.channel(0).to_vec();
    assert_eq!(out.len(), a.len());
    // 16-bit quantization on the FLAC side
    for i in (0..b.len()).step_by(101) {
        assert_abs_diff_eq!(out[i], a[i] + b[i], epsilon = 1e-3);
    }
    for i in (b.len()..a.len()).step_by(101) {
        assert_abs_diff_eq!(out[i], a[i], epsilon = FLOAT_EPSILON);
    }
}
