//! Playback state machine.

use crate::ControlLabel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
}

impl PlaybackState {
    /// Label the single play/stop control shows in this state.
    pub fn control_label(&self) -> ControlLabel {
        match self {
            PlaybackState::Idle => ControlLabel::Play,
            PlaybackState::Playing => ControlLabel::Stop,
        }
    }

    /// Event the play/stop control fires in this state.
    pub fn control_event(&self) -> PlaybackEvent {
        match self {
            PlaybackState::Idle => PlaybackEvent::Play,
            PlaybackState::Playing => PlaybackEvent::Stop,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    Play,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionResult {
    /// The event does not apply to the current state.
    Rejected,
    StateChanged(PlaybackState),
}

/// `Idle --Play--> Playing --Stop--> Idle`. Nothing else.
#[derive(Debug, Default)]
pub struct PlaybackFsm {
    state: PlaybackState,
}

impl PlaybackFsm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Whether `event` would change state, without applying it.
    pub fn accepts(&self, event: PlaybackEvent) -> bool {
        matches!(
            (self.state, event),
            (PlaybackState::Idle, PlaybackEvent::Play) | (PlaybackState::Playing, PlaybackEvent::Stop)
        )
    }

    pub fn transition(&mut self, event: PlaybackEvent) -> TransitionResult {
        use PlaybackEvent::*;

        let next = match (self.state, event) {
            (PlaybackState::Idle, Play) => PlaybackState::Playing,
            (PlaybackState::Playing, Stop) => PlaybackState::Idle,
            (state, event) => {
                log::warn!("Rejected {event:?} while {state:?}");
                return TransitionResult::Rejected;
            }
        };

        log::debug!("Playback {:?} -> {next:?}", self.state);
        self.state = next;
        TransitionResult::StateChanged(next)
    }
}
