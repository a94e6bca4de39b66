//! CPAL device output.

use super::DEFAULT_TAP_CAPACITY;
use crate::lockfree::{AtomicCounter, AtomicFlag};
use crate::{
    signal_tap, Error, LiveContext, LiveOutput, OutputHandle, Result, SampleBuffer, SignalTap,
    TapWriter,
};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use parking_lot::Mutex;
use std::sync::Arc;

type TapSlot = Arc<Mutex<Option<TapWriter>>>;

/// Wrapper to hold a `cpal::Stream` in a `Send` context.
///
/// `cpal::Stream` is `!Send` on some platforms. The handle owning it is only
/// driven by the playback controller, which keeps it behind `&mut`.
struct StreamHandle(cpal::Stream);

// SAFETY: the stream is never shared; it is paused and dropped by whichever
// thread owns the `CpalHandle`.
unsafe impl Send for StreamHandle {}

/// Plays through a host output device.
#[derive(Debug, Clone)]
pub struct CpalOutput {
    device_index: Option<usize>,
    tap_capacity: usize,
}

impl Default for CpalOutput {
    fn default() -> Self {
        Self {
            device_index: None,
            tap_capacity: DEFAULT_TAP_CAPACITY,
        }
    }
}

impl CpalOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the output device at `index` instead of the host default.
    pub fn device(mut self, index: usize) -> Self {
        self.device_index = Some(index);
        self
    }

    pub fn tap_capacity(mut self, capacity: usize) -> Self {
        self.tap_capacity = capacity;
        self
    }

    /// `"index: name"` for every output device on the default host.
    pub fn list_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();
        host.output_devices()
            .map_err(output_error)?
            .enumerate()
            .map(|(idx, device)| Ok(format!("{}: {}", idx, device.name().map_err(output_error)?)))
            .collect()
    }

    fn device_handle(&self) -> Result<cpal::Device> {
        let host = cpal::default_host();
        match self.device_index {
            Some(idx) => {
                let devices: Vec<_> = host.output_devices().map_err(output_error)?.collect();
                let count = devices.len();
                devices.into_iter().nth(idx).ok_or_else(|| {
                    Error::Output(format!(
                        "output device index {idx} out of range (available: {count})"
                    ))
                })
            }
            None => host
                .default_output_device()
                .ok_or_else(|| Error::Output("no output device available".into())),
        }
    }
}

impl LiveOutput for CpalOutput {
    fn open(&self, sample_rate: u32) -> Result<Box<dyn LiveContext>> {
        let device = self.device_handle()?;
        let default = device.default_output_config().map_err(output_error)?;
        if default.sample_rate().0 != sample_rate {
            log::warn!(
                "Device default rate is {} Hz, requesting {sample_rate} Hz",
                default.sample_rate().0
            );
        }
        let config = cpal::StreamConfig {
            channels: default.channels(),
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };
        log::info!(
            "Opened output '{}' ({} ch @ {} Hz, {:?})",
            device.name().unwrap_or_else(|_| "unknown".into()),
            config.channels,
            sample_rate,
            default.sample_format()
        );

        Ok(Box::new(CpalContext {
            device,
            config,
            sample_format: default.sample_format(),
            tap_capacity: self.tap_capacity,
            tap: Arc::new(Mutex::new(None)),
            tapped: false,
        }))
    }
}

struct CpalContext {
    device: cpal::Device,
    config: cpal::StreamConfig,
    sample_format: cpal::SampleFormat,
    tap_capacity: usize,
    tap: TapSlot,
    tapped: bool,
}

// SAFETY: `cpal::Device` is only used from the thread that owns the context.
unsafe impl Send for CpalContext {}

impl CpalContext {
    fn build_stream<T>(&self, voice: Voice) -> Result<cpal::Stream>
    where
        T: cpal::SizedSample + cpal::FromSample<f32>,
    {
        let channels = self.config.channels as usize;

        self.device
            .build_output_stream(
                &self.config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                        voice.fill(data, channels)
                    }));

                    if result.is_err() {
                        // Panic in callback - output silence
                        for sample in data.iter_mut() {
                            *sample = T::from_sample(0.0);
                        }
                    }
                },
                |_err| {
                    // Stream error - cannot log from callback
                },
                None,
            )
            .map_err(output_error)
    }
}

impl LiveContext for CpalContext {
    fn play_buffer(&mut self, buffer: Arc<SampleBuffer>) -> Result<Box<dyn OutputHandle>> {
        let finished = Arc::new(AtomicFlag::new(false));
        let position = Arc::new(AtomicCounter::new(0));
        let voice = Voice {
            buffer,
            tap: self.tap.clone(),
            finished: finished.clone(),
            position: position.clone(),
            mono: Vec::new(),
        };

        let stream = match self.sample_format {
            cpal::SampleFormat::F32 => self.build_stream::<f32>(voice)?,
            cpal::SampleFormat::I16 => self.build_stream::<i16>(voice)?,
            cpal::SampleFormat::U16 => self.build_stream::<u16>(voice)?,
            format => {
                return Err(Error::Output(format!(
                    "unsupported sample format: {format:?}"
                )));
            }
        };
        stream.play().map_err(output_error)?;

        Ok(Box::new(CpalHandle {
            stream: Some(StreamHandle(stream)),
            finished,
            position,
        }))
    }

    fn tap_signal(&mut self) -> Result<SignalTap> {
        if self.tapped {
            return Err(Error::Output("signal already tapped".into()));
        }
        let (writer, tap) = signal_tap(self.tap_capacity, self.config.sample_rate.0);
        *self.tap.lock() = Some(writer);
        self.tapped = true;
        Ok(tap)
    }

    fn close(self: Box<Self>) -> Result<()> {
        self.tap.lock().take();
        Ok(())
    }
}

/// State moved into the device callback.
struct Voice {
    buffer: Arc<SampleBuffer>,
    tap: TapSlot,
    finished: Arc<AtomicFlag>,
    position: Arc<AtomicCounter>,
    mono: Vec<f32>,
}

impl Voice {
    fn fill<T>(&mut self, data: &mut [T], channels: usize)
    where
        T: cpal::SizedSample + cpal::FromSample<f32>,
    {
        let frames = data.len() / channels.max(1);
        let start = self.position.get() as usize;
        let len = self.buffer.len();
        let source_channels = self.buffer.channel_count();

        self.mono.clear();
        for (frame, out) in data.chunks_mut(channels.max(1)).enumerate() {
            let index = start + frame;
            if index >= len {
                for sample in out.iter_mut() {
                    *sample = T::from_sample(0.0);
                }
                continue;
            }
            for (ch, sample) in out.iter_mut().enumerate() {
                // Mono sources feed every device channel
                let value = if source_channels == 1 {
                    self.buffer.channel(0)[index]
                } else if ch < source_channels {
                    self.buffer.channel(ch)[index]
                } else {
                    0.0
                };
                *sample = T::from_sample(value);
            }
            self.mono.push(self.buffer.mono_frame(index));
        }

        // Never block the device thread on the tap
        if let Some(mut slot) = self.tap.try_lock() {
            if let Some(writer) = slot.as_mut() {
                writer.write_mono(&self.mono);
            }
        }

        let advanced = frames.min(len.saturating_sub(start));
        self.position.add(advanced as u64);
        if start + frames >= len {
            self.finished.set(true);
        }
    }
}

struct CpalHandle {
    stream: Option<StreamHandle>,
    finished: Arc<AtomicFlag>,
    position: Arc<AtomicCounter>,
}

impl OutputHandle for CpalHandle {
    fn stop(&mut self) {
        if let Some(StreamHandle(stream)) = self.stream.take() {
            if let Err(e) = stream.pause() {
                log::warn!("Failed to pause output stream: {e}");
            }
            log::debug!("Output stopped at frame {}", self.position.get());
        }
    }

    fn is_finished(&self) -> bool {
        self.finished.get()
    }
}

fn output_error(e: impl std::fmt::Display) -> Error {
    Error::Output(e.to_string())
}
