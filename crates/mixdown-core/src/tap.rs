//! Live signal tap from the output thread to the visualizer.
//!
//! The output side writes a mono downmix into an SPSC ring buffer, the
//! visualizer drains it. Writes never block: when the reader falls behind,
//! new samples are dropped.

use crate::lockfree::AtomicFlag;
use ringbuf::{
    traits::{Consumer, Observer, Producer, Split},
    HeapCons, HeapProd, HeapRb,
};
use std::sync::Arc;

/// Create a connected writer/reader pair holding up to `capacity` samples.
pub fn signal_tap(capacity: usize, sample_rate: u32) -> (TapWriter, SignalTap) {
    let (producer, consumer) = HeapRb::<f32>::new(capacity.max(1)).split();
    let open = Arc::new(AtomicFlag::new(true));
    (
        TapWriter {
            producer,
            open: open.clone(),
        },
        SignalTap {
            consumer,
            open,
            sample_rate,
        },
    )
}

/// Output-thread end of a tap.
pub struct TapWriter {
    producer: HeapProd<f32>,
    open: Arc<AtomicFlag>,
}

impl TapWriter {
    /// Push mono samples. Returns how many fit.
    #[inline]
    pub fn write_mono(&mut self, samples: &[f32]) -> usize {
        self.producer.push_slice(samples)
    }
}

impl Drop for TapWriter {
    fn drop(&mut self) {
        self.open.set(false);
    }
}

/// Visualizer end of a tap.
pub struct SignalTap {
    consumer: HeapCons<f32>,
    open: Arc<AtomicFlag>,
    sample_rate: u32,
}

impl SignalTap {
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// False once the output side has been torn down.
    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    /// Samples waiting to be read.
    pub fn available(&self) -> usize {
        self.consumer.occupied_len()
    }

    /// Drain up to `out.len()` samples, oldest first.
    pub fn read(&mut self, out: &mut [f32]) -> usize {
        self.consumer.pop_slice(out)
    }
}

impl std::fmt::Debug for SignalTap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalTap")
            .field("sample_rate", &self.sample_rate)
            .field("open", &self.is_open())
            .field("available", &self.available())
            .finish()
    }
}
