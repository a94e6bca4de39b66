//! # Mixdown Render
//!
//! Offline mixing for mixdown.
//!
//! - [`OfflineContextFactory`]: a software [`RenderContextFactory`](mixdown_core::RenderContextFactory)
//!   that sums scheduled buffers into a fixed-length output
//! - [`OfflineMixer`]: renders the unmuted tracks of a registry into one [`MixedBuffer`]
//!
//! ```ignore
//! use mixdown_render::render;
//!
//! let mix = render(registry.tracks(), 2, 44100, 60.0)?;
//! assert_eq!(mix.buffer.len(), 44100 * 60);
//! ```

mod context;
mod mixer;

pub use context::{OfflineContext, OfflineContextFactory, DEFAULT_MAX_FRAMES};
pub use mixdown_core::RenderError;
pub use mixer::{render, MixedBuffer, OfflineMixer};

/// Result type alias.
pub type Result<T> = core::result::Result<T, RenderError>;
