//! Builder for configuring and constructing a `MixdownEngine`.

use crate::playback::{offscreen_sinks, PlaybackController, SinkFactory};
use crate::{MixdownEngine, Result};
use mixdown_analysis::{
    FrameSink, SpectrumFrame, Visualizer, VisualizerConfig, WaveformFrame,
};
use mixdown_core::{
    Decoder, DisplayPanel, Headroom, HeadlessOutput, LiveOutput, MixConfig, RenderContextFactory,
    RenderLength, TrackLoader, TrackRegistry,
};
use mixdown_render::OfflineMixer;
use std::sync::Arc;

/// Size of the default off-screen visual sinks.
const DEFAULT_SINK_SIZE: (f32, f32) = (512.0, 128.0);

/// Every collaborator has a default: WAV decoding (with the `wav` feature),
/// the software offline context, a real-time headless output and off-screen
/// visual sinks. Hosts swap in their own through the setters.
///
/// # Example
///
/// ```ignore
/// use mixdown::prelude::*;
///
/// let mut engine = MixdownEngine::builder()
///     .sample_rate(48000)
///     .render_length(RenderLength::LongestTrack { max_seconds: 120.0 })
///     .build()?;
///
/// engine.load(&[PathFile::new("a.wav"), PathFile::new("b.wav")])?;
/// engine.press_control()?;
/// ```
pub struct MixdownEngineBuilder {
    config: MixConfig,
    visualizer: VisualizerConfig,
    decoder: Option<Arc<dyn Decoder>>,
    render_factory: Option<Arc<dyn RenderContextFactory>>,
    output: Option<Arc<dyn LiveOutput>>,
    display: Option<Box<dyn DisplayPanel>>,
    sinks: Option<SinkFactory>,
}

impl Default for MixdownEngineBuilder {
    fn default() -> Self {
        Self {
            config: MixConfig::default(),
            visualizer: VisualizerConfig::default(),
            decoder: None,
            render_factory: None,
            output: None,
            display: None,
            sinks: None,
        }
    }
}

impl MixdownEngineBuilder {
    /// Default: 2
    pub fn channels(mut self, count: usize) -> Self {
        self.config.channel_count = count;
        self
    }

    /// Default: 44100
    pub fn sample_rate(mut self, rate: u32) -> Self {
        self.config.sample_rate = rate;
        self
    }

    /// Default: fixed 60 seconds.
    pub fn render_length(mut self, length: RenderLength) -> Self {
        self.config.length = length;
        self
    }

    /// Default: [`Headroom::Raw`]
    pub fn headroom(mut self, headroom: Headroom) -> Self {
        self.config.headroom = headroom;
        self
    }

    /// Replace the whole mix configuration.
    pub fn config(mut self, config: MixConfig) -> Self {
        self.config = config;
        self
    }

    pub fn visualizer(mut self, config: VisualizerConfig) -> Self {
        self.visualizer = config;
        self
    }

    pub fn decoder(mut self, decoder: impl Decoder + 'static) -> Self {
        self.decoder = Some(Arc::new(decoder));
        self
    }

    pub fn render_factory(mut self, factory: impl RenderContextFactory + 'static) -> Self {
        self.render_factory = Some(Arc::new(factory));
        self
    }

    pub fn output(mut self, output: impl LiveOutput + 'static) -> Self {
        self.output = Some(Arc::new(output));
        self
    }

    pub fn display(mut self, display: impl DisplayPanel + 'static) -> Self {
        self.display = Some(Box::new(display));
        self
    }

    /// Sinks handed to the visualizer at every play.
    pub fn visual_sinks<W, S>(
        mut self,
        mut factory: impl FnMut() -> (W, S) + Send + 'static,
    ) -> Self
    where
        W: FrameSink<WaveformFrame> + 'static,
        S: FrameSink<SpectrumFrame> + 'static,
    {
        self.sinks = Some(Box::new(move || {
            let (waveform, spectrum) = factory();
            (
                Box::new(waveform) as Box<dyn FrameSink<WaveformFrame>>,
                Box::new(spectrum) as Box<dyn FrameSink<SpectrumFrame>>,
            )
        }));
        self
    }

    pub fn build(self) -> Result<MixdownEngine> {
        self.config.validate()?;
        let visualizer = Visualizer::new(self.visualizer)?;

        let decoder = match self.decoder {
            Some(decoder) => decoder,
            None => default_decoder()?,
        };
        let loader = TrackLoader::new(decoder, self.config.decode_target());

        let mixer = match self.render_factory {
            Some(factory) => OfflineMixer::with_factory(factory, self.config.clone()),
            None => OfflineMixer::new(self.config.clone()),
        };
        let output = self
            .output
            .unwrap_or_else(|| Arc::new(HeadlessOutput::new()));
        let sinks = self
            .sinks
            .unwrap_or_else(|| offscreen_sinks(DEFAULT_SINK_SIZE.0, DEFAULT_SINK_SIZE.1));

        log::debug!(
            "Building engine: {} ch @ {} Hz, {:?}, {:?}",
            self.config.channel_count,
            self.config.sample_rate,
            self.config.length,
            self.config.headroom
        );

        Ok(MixdownEngine::from_parts(
            TrackRegistry::new(),
            loader,
            PlaybackController::new(mixer, output, visualizer, sinks),
            self.display,
            self.config,
        ))
    }
}

#[cfg(feature = "compressed")]
fn default_decoder() -> Result<Arc<dyn Decoder>> {
    Ok(Arc::new(mixdown_core::SymphoniaDecoder::new()))
}

#[cfg(all(feature = "wav", not(feature = "compressed")))]
fn default_decoder() -> Result<Arc<dyn Decoder>> {
    Ok(Arc::new(mixdown_core::WavDecoder::new()))
}

#[cfg(not(any(feature = "wav", feature = "compressed")))]
fn default_decoder() -> Result<Arc<dyn Decoder>> {
    Err(mixdown_core::Error::InvalidConfig(
        "no decoder configured and both `wav` and `compressed` are disabled".into(),
    )
    .into())
}
