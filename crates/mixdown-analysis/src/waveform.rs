//! Waveform (oscilloscope) frames.
//!
//! A frame is the polyline a display draws for one tick: one point per
//! analysed sample, spread evenly across the surface width, finished with a
//! point at the right edge on the centre line.

use serde::{Deserialize, Serialize};

/// A point in surface coordinates, origin top left.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// One waveform polyline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WaveformFrame {
    pub width: f32,
    pub height: f32,
    pub points: Vec<Point>,
}

impl WaveformFrame {
    /// Build from time-domain bytes where `128` is the centre line.
    ///
    /// Sample `i` lands at `x = i * width / n`, `y = (v / 128) * height / 2`.
    pub fn from_time_domain(data: &[u8], width: f32, height: f32) -> Self {
        let mut points = Vec::with_capacity(data.len() + 1);
        if !data.is_empty() {
            let step = width / data.len() as f32;
            let mut x = 0.0;
            for &v in data {
                let level = v as f32 / 128.0;
                points.push(Point {
                    x,
                    y: level * height / 2.0,
                });
                x += step;
            }
        }
        points.push(Point {
            x: width,
            y: height / 2.0,
        });

        Self {
            width,
            height,
            points,
        }
    }

    /// Largest distance of any sample point from the centre line.
    pub fn amplitude(&self) -> f32 {
        let centre = self.height / 2.0;
        self.points
            .iter()
            .map(|p| (p.y - centre).abs())
            .fold(0.0f32, f32::max)
    }
}
