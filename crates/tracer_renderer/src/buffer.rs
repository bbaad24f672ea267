//! Caller-side helpers for the accumulation buffer.
//!
//! The engine only ever adds linear radiance into the buffer. Turning the
//! running sum into something displayable (dividing by the number of passes,
//! clamping, gamma) is left to whoever presents the image.

use crate::Color;

/// Number of passes accumulated since the last clear.
///
/// Owned by the caller, next to the buffer it describes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameCounter(u32);

impl FrameCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// Record one more completed pass.
    pub fn advance(&mut self) {
        self.0 = self.0.saturating_add(1);
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }
}

/// Average an accumulation buffer over `frames` passes, clamped to [0, 1].
///
/// Zero frames resolve to black.
pub fn resolve(buffer: &[Color], frames: &FrameCounter) -> Vec<Color> {
    if frames.get() == 0 {
        return vec![Color::ZERO; buffer.len()];
    }

    let scale = 1.0 / frames.get() as f32;
    buffer
        .iter()
        .map(|sum| (*sum * scale).clamp(Color::ZERO, Color::ONE))
        .collect()
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    // Apply gamma correction and convert to 0-255
    let r = (255.0 * linear_to_gamma(color.x).clamp(0.0, 1.0)) as u8;
    let g = (255.0 * linear_to_gamma(color.y).clamp(0.0, 1.0)) as u8;
    let b = (255.0 * linear_to_gamma(color.z).clamp(0.0, 1.0)) as u8;
    [r, g, b, 255]
}

/// View a color buffer as packed `f32` triples, for blitting or upload.
pub fn as_f32_slice(buffer: &[Color]) -> &[f32] {
    bytemuck::cast_slice(buffer)
}
