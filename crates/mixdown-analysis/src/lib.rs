//! # Mixdown Analysis
//!
//! Live visualization of the signal mixdown is playing:
//! - **Analyser**: time-domain and frequency-domain byte data over the most
//!   recent FFT window, with the scaling and smoothing a browser
//!   `AnalyserNode` uses
//! - **Frames**: waveform polylines and spectrum bars with kHz ticks
//! - **Visualizer**: two cancellable draw loops fed from one signal tap
//!
//! ## Example
//!
//! ```ignore
//! use mixdown_analysis::{OffscreenSink, Visualizer, VisualizerConfig};
//!
//! let visualizer = Visualizer::new(VisualizerConfig::default())?;
//! let session = visualizer.attach(
//!     tap,
//!     OffscreenSink::new(640.0, 120.0),
//!     OffscreenSink::new(640.0, 120.0),
//! )?;
//!
//! let frame = session.latest_spectrum();
//! session.stop();
//! ```

pub mod analyser;
mod config;
pub mod spectrum;
mod visualizer;
pub mod waveform;

pub use analyser::Analyser;
pub use config::VisualizerConfig;
pub use spectrum::{Bar, Label, SpectrumFrame};
pub use visualizer::{FrameSink, OffscreenSink, TickCounts, Visualizer, VisualizerSession};
pub use waveform::{Point, WaveformFrame};
