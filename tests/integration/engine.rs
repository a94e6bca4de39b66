//! Engine integration tests
//!
//! Builder validation, batch loading and mute toggles, with the display
//! side effects each of them must (or must not) produce.

use crate::helpers::*;
use mixdown::core::Error as CoreError;
use mixdown::prelude::*;
use proptest::prelude::*;

fn two_tones() -> Vec<MemoryFile> {
    vec![
        tone_file("a.wav", 440.0, 0.5, 0.1).0,
        tone_file("b.wav", 660.0, 0.5, 0.2).0,
    ]
}

#[test]
fn test_builder_rejects_invalid_config() {
    let err = MixdownEngine::builder().channels(0).build().unwrap_err();
    assert!(matches!(err.as_core(), CoreError::InvalidConfig(_)));

    let err = MixdownEngine::builder().sample_rate(100).build().unwrap_err();
    assert!(matches!(err.as_core(), CoreError::InvalidConfig(_)));

    let err = MixdownEngine::builder()
        .visualizer(VisualizerConfig {
            fft_size: 1000,
            ..Default::default()
        })
        .build()
        .unwrap_err();
    assert!(matches!(err.as_core(), CoreError::InvalidConfig(_)));
}

#[test]
fn test_new_engine_shows_play() {
    let (engine, _output, display) = test_engine();

    assert_eq!(engine.state(), PlaybackState::Idle);
    assert_eq!(engine.control_label(), ControlLabel::Play);
    assert_eq!(display.events(), vec![DisplayEvent::Control(ControlLabel::Play)]);
    assert!(engine.tracks().is_empty());
}

#[test]
fn test_load_orders_tracks_and_mutes_all_but_first() {
    let (mut engine, _output, display) = test_engine();
    display.clear();

    engine.load(&two_tones()).unwrap();

    let views = engine.track_views();
    assert_eq!(
        views,
        vec![
            TrackView {
                index: 0,
                label: "a.wav".into(),
                muted: false
            },
            TrackView {
                index: 1,
                label: "b.wav".into(),
                muted: true
            },
        ]
    );
    assert_eq!(
        display.events(),
        vec![
            DisplayEvent::Busy(true),
            DisplayEvent::Busy(false),
            DisplayEvent::Refresh(views),
        ]
    );
}

#[test]
fn test_load_empty_batch_is_rejected_silently() {
    let (mut engine, _output, display) = test_engine();
    engine.load(&two_tones()).unwrap();
    display.clear();

    let err = engine.load::<MemoryFile>(&[]).unwrap_err();

    assert!(matches!(err.as_core(), CoreError::EmptyBatch));
    assert_eq!(engine.tracks().len(), 2);
    assert!(display.events().is_empty());
}

#[test]
fn test_failed_decode_keeps_previous_tracks() {
    let (mut engine, _output, display) = test_engine();
    engine.load(&two_tones()).unwrap();
    engine.toggle_mute(1).unwrap();
    let before = engine.track_views();
    display.clear();

    let mut batch = two_tones();
    batch.push(MemoryFile::new("notes.txt", b"not audio at all".to_vec()));
    let err = engine.load(&batch).unwrap_err();

    match err.as_core() {
        CoreError::Decode { source_name, .. } => assert_eq!(source_name, "notes.txt"),
        other => panic!("expected decode error, got {other:?}"),
    }
    assert_eq!(engine.track_views(), before);
    assert!(display.refreshes().is_empty());
    assert_eq!(display.errors().len(), 1);
    assert!(display.events().contains(&DisplayEvent::Busy(false)));
}

#[test]
fn test_load_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kick.wav");
    let samples = generate_sine(100.0, 0.8, TEST_SAMPLE_RATE, 4410);
    std::fs::write(&path, wav_bytes(&samples, TEST_SAMPLE_RATE)).unwrap();

    let (mut engine, _output, _display) = test_engine();
    engine.load(&[PathFile::new(&path)]).unwrap();

    assert_eq!(engine.tracks()[0].label(), "kick.wav");
    assert_eq!(engine.tracks()[0].audio().len(), 4410);

    let err = engine
        .load(&[PathFile::new(dir.path().join("missing.wav"))])
        .unwrap_err();
    assert!(matches!(err.as_core(), CoreError::Io { .. }));
    assert_eq!(engine.tracks()[0].label(), "kick.wav");
}

#[test]
fn test_decode_upmixes_to_engine_channels() {
    let (mut engine, _output, _display) = test_engine_with(MixdownEngine::builder().channels(2));
    engine.load(&two_tones()).unwrap();

    let audio = engine.tracks()[0].audio();
    assert_eq!(audio.channel_count(), 2);
    assert_eq!(audio.channel(0), audio.channel(1));
}

#[test]
fn test_toggle_mute_refreshes_display() {
    let (mut engine, _output, display) = test_engine();
    engine.load(&two_tones()).unwrap();
    display.clear();

    assert!(!engine.toggle_mute(1).unwrap());

    let refreshes = display.refreshes();
    assert_eq!(refreshes.len(), 1);
    assert!(refreshes[0].iter().all(|v| !v.muted));
}

#[test]
fn test_toggle_out_of_range() {
    let (mut engine, _output, display) = test_engine();
    engine.load(&two_tones()).unwrap();
    display.clear();

    let err = engine.toggle_mute(2).unwrap_err();

    assert!(matches!(
        err.as_core(),
        CoreError::Index { index: 2, len: 2 }
    ));
    assert!(display.refreshes().is_empty());
}

#[test]
fn test_apply_mute_states() {
    let (mut engine, _output, display) = test_engine();
    engine.load(&two_tones()).unwrap();
    display.clear();

    engine.apply_mute_states(&[true, false]).unwrap();
    let muted: Vec<bool> = engine.track_views().iter().map(|v| v.muted).collect();
    assert_eq!(muted, vec![true, false]);
    assert_eq!(display.refreshes().len(), 1);

    let err = engine.apply_mute_states(&[true]).unwrap_err();
    assert!(matches!(
        err.as_core(),
        CoreError::MuteStateMismatch {
            expected: 2,
            actual: 1
        }
    ));
    assert_eq!(display.refreshes().len(), 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_toggles_match_model(
        count in 1usize..6,
        toggles in proptest::collection::vec(0usize..6, 0..20),
    ) {
        let files: Vec<MemoryFile> = (0..count)
            .map(|i| MemoryFile::new(format!("{i}.wav"), wav_bytes(&[0.1; 64], TEST_SAMPLE_RATE)))
            .collect();
        let (mut engine, _output, _display) = test_engine();
        engine.load(&files).unwrap();

        let mut model: Vec<bool> = (0..count).map(|i| i != 0).collect();
        for index in toggles {
            let result = engine.toggle_mute(index);
            if index < count {
                model[index] = !model[index];
                prop_assert_eq!(result.unwrap(), model[index]);
            } else {
                prop_assert!(result.is_err());
            }
        }

        let muted: Vec<bool> = engine.track_views().iter().map(|v| v.muted).collect();
        prop_assert_eq!(muted, model);
    }
}
