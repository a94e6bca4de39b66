//! Contracts with the host audio and display runtime.
//!
//! The mixer never talks to a device, a codec or a widget directly. It goes
//! through these traits:
//!
//! - [`Decoder`]: encoded bytes to a [`SampleBuffer`]
//! - [`RenderContextFactory`] / [`RenderContext`]: offline rendering into a fixed buffer
//! - [`LiveOutput`] / [`LiveContext`] / [`OutputHandle`]: real-time playback
//! - [`DisplayPanel`]: the track list and play/stop control

use crate::{DecodeError, Error, RenderError, SampleBuffer, SignalTap, TrackView};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Channel layout and rate a decoder should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeTarget {
    pub channel_count: usize,
    pub sample_rate: u32,
}

/// Turns encoded audio into linear PCM.
pub trait Decoder: Send + Sync {
    fn decode(
        &self,
        bytes: &[u8],
        target: DecodeTarget,
    ) -> core::result::Result<SampleBuffer, DecodeError>;
}

/// Creates offline render contexts.
pub trait RenderContextFactory: Send + Sync {
    fn create(
        &self,
        channel_count: usize,
        sample_rate: u32,
        length_frames: usize,
    ) -> core::result::Result<Box<dyn RenderContext>, RenderError>;
}

/// A fixed-length offline audio graph.
pub trait RenderContext: Send {
    /// Play `buffer` into the context starting at frame `start_offset`.
    fn schedule_buffer(
        &mut self,
        buffer: Arc<SampleBuffer>,
        start_offset: usize,
    ) -> core::result::Result<(), RenderError>;

    /// Run the graph to the end of its buffer.
    fn render_to_completion(self: Box<Self>) -> core::result::Result<SampleBuffer, RenderError>;
}

/// Opens real-time output contexts.
pub trait LiveOutput: Send + Sync {
    /// Open a context running at `sample_rate`. Buffers played through it
    /// are expected at that rate.
    fn open(&self, sample_rate: u32) -> crate::Result<Box<dyn LiveContext>>;
}

/// An open real-time output.
pub trait LiveContext: Send {
    /// Start playing `buffer` from its first frame.
    fn play_buffer(&mut self, buffer: Arc<SampleBuffer>) -> crate::Result<Box<dyn OutputHandle>>;

    /// Signal tap for visualization. Only one tap per context.
    fn tap_signal(&mut self) -> crate::Result<SignalTap>;

    /// Release the context and anything still playing through it.
    fn close(self: Box<Self>) -> crate::Result<()>;
}

/// A buffer currently playing through a [`LiveContext`].
pub trait OutputHandle: Send {
    fn stop(&mut self);

    /// Whether playback reached the end of the buffer on its own.
    fn is_finished(&self) -> bool;
}

/// Label on the single play/stop control. Always names the next action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlLabel {
    Play,
    Stop,
}

impl ControlLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlLabel::Play => "Play",
            ControlLabel::Stop => "Stop",
        }
    }
}

impl std::fmt::Display for ControlLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Track list and transport control shown to the user.
///
/// The panel only renders; mute clicks are forwarded by the host to
/// `MixdownEngine::toggle_mute` with the clicked position.
pub trait DisplayPanel: Send {
    /// Redraw the track list.
    fn refresh(&mut self, tracks: &[TrackView]);

    /// Update the play/stop control.
    fn show_control(&mut self, _label: ControlLabel) {}

    /// Show or hide the busy curtain while a batch decodes.
    fn set_busy(&mut self, _busy: bool) {}

    /// Tell the user an action failed.
    fn show_error(&mut self, _error: &Error) {}
}
