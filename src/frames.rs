//! Depth frames extracted from renderer output, and the bounded frame history
//! used to stack them into a vision observation.

use std::collections::VecDeque;

use crate::config::StackLayout;
use crate::core::{GymError, Result};

/// Channels kept per pixel: the blue byte and the alpha byte, which carries depth.
pub const CHANNELS: usize = 2;

/// One rendered frame: `width * height` pixels with [`CHANNELS`] values each,
/// stored pixel-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl Frame {
    /// Extract the depth-bearing channels from packed RGBA pixels
    /// (`r` in the lowest byte, `a` in the highest).
    pub fn from_rgba(width: usize, height: usize, pixels: &[u32]) -> Result<Self> {
        if width.checked_mul(height) != Some(pixels.len()) {
            return Err(GymError::RenderBuffer { width, height, len: pixels.len() });
        }
        let mut data = Vec::with_capacity(pixels.len() * CHANNELS);
        for &p in pixels {
            let [_, _, b, a] = p.to_le_bytes();
            data.push(b as f32);
            data.push(a as f32);
        }
        Ok(Self { width, height, data })
    }

    pub fn width(&self) -> usize { self.width }
    pub fn height(&self) -> usize { self.height }
    pub fn shape(&self) -> (usize, usize) { (self.width, self.height) }
    pub fn pixel_count(&self) -> usize { self.width * self.height }

    /// Flat `[pixel][channel]` values.
    pub fn data(&self) -> &[f32] { &self.data }
}

/// Bounded FIFO of past frames.
#[derive(Clone, Debug)]
pub struct FrameHistory {
    frames: VecDeque<Frame>,
    capacity: usize,
}

impl FrameHistory {
    pub fn new(capacity: usize) -> Self {
        Self { frames: VecDeque::with_capacity(capacity + 1), capacity }
    }

    pub fn capacity(&self) -> usize { self.capacity }
    pub fn len(&self) -> usize { self.frames.len() }
    pub fn is_empty(&self) -> bool { self.frames.is_empty() }
    pub fn is_primed(&self) -> bool { self.frames.len() >= self.capacity }

    pub fn clear(&mut self) { self.frames.clear(); }

    /// Replace the contents with `capacity` copies of `frame`.
    pub fn prime(&mut self, frame: &Frame) {
        self.frames.clear();
        self.frames.extend(std::iter::repeat(frame).take(self.capacity).cloned());
    }

    /// Append `frame`, evicting the oldest frames beyond capacity.
    pub fn push(&mut self, frame: Frame) {
        self.frames.push_back(frame);
        while self.frames.len() > self.capacity {
            self.frames.pop_front();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Frame> { self.frames.iter() }

    /// Flatten the history followed by `current` into one observation.
    /// Every frame must share `current`'s shape.
    pub fn stack_with(&self, current: &Frame, layout: StackLayout) -> Result<Vec<f32>> {
        let frames: Vec<&Frame> = self.frames.iter().chain(std::iter::once(current)).collect();
        stack_frames(&frames, layout)
    }
}

/// Flatten same-shaped frames into one vector using `layout`.
pub fn stack_frames(frames: &[&Frame], layout: StackLayout) -> Result<Vec<f32>> {
    let Some(first) = frames.first() else {
        return Ok(Vec::new());
    };
    if let Some(odd) = frames.iter().find(|f| f.shape() != first.shape()) {
        return Err(GymError::FrameShape { expected: first.shape(), actual: odd.shape() });
    }

    let pixels = first.pixel_count();
    let mut out = Vec::with_capacity(frames.len() * pixels * CHANNELS);
    match layout {
        StackLayout::FrameMajor => {
            for frame in frames {
                out.extend_from_slice(frame.data());
            }
        }
        StackLayout::PixelMajor => {
            for p in 0..pixels {
                let span = p * CHANNELS..(p + 1) * CHANNELS;
                for frame in frames {
                    out.extend_from_slice(&frame.data()[span.clone()]);
                }
            }
        }
    }
    Ok(out)
}

#[cfg(feature = "ndarray")]
pub mod ndarray_impl {
    use super::*;
    use ndarray::{Array2, Array3};

    impl Frame {
        /// The frame as a `[pixels, CHANNELS]` array.
        pub fn to_ndarray(&self) -> Array2<f32> {
            Array2::from_shape_fn((self.pixel_count(), CHANNELS), |(p, c)| self.data[p * CHANNELS + c])
        }
    }

    /// Stack frames along a new leading axis: `[frames, pixels, CHANNELS]`.
    pub fn stack_to_ndarray(frames: &[&Frame]) -> Result<Array3<f32>> {
        let flat = stack_frames(frames, StackLayout::FrameMajor)?;
        let pixels = frames.first().map_or(0, |f| f.pixel_count());
        Array3::from_shape_vec((frames.len(), pixels, CHANNELS), flat)
            .map_err(|e| GymError::Other(format!("ndarray shape error: {e}")))
    }
}
