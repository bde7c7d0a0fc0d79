//! Composite pass
//!
//! Combines the two background layers through the displacement field. The
//! top layer is offset twice as far as the bottom one, which gives the
//! parallax, and fades out where displacement is strong so the darkened
//! bottom layer shows through.

use glam::{Vec2, Vec4};
use image::{ImageEncoder, ImageError, RgbaImage};
use rayon::prelude::*;

use super::displacement::{pixel_center_uv, smoothstep, DisplacementField};
use super::layers::{EffectLayers, Layer};

/// How far the top layer is offset per unit of displacement
pub const DEFAULT_TOP_OFFSET: f32 = 0.1;

/// How far the bottom layer is offset per unit of displacement
pub const DEFAULT_BOTTOM_OFFSET: f32 = 0.05;

/// Multiplier applied to the bottom layer's colour
pub const DEFAULT_BOTTOM_DARKEN: f32 = 0.2;

/// Displacement magnitude at which the top layer is fully transparent
pub const DEFAULT_REVEAL_THRESHOLD: f32 = 0.1;

/// Renders the visible frame from a displacement field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositePass {
    pub top_offset: f32,
    pub bottom_offset: f32,
    pub bottom_darken: f32,
    pub reveal_threshold: f32,
}

impl Default for CompositePass {
    fn default() -> Self {
        CompositePass {
            top_offset: DEFAULT_TOP_OFFSET,
            bottom_offset: DEFAULT_BOTTOM_OFFSET,
            bottom_darken: DEFAULT_BOTTOM_DARKEN,
            reveal_threshold: DEFAULT_REVEAL_THRESHOLD,
        }
    }
}

impl CompositePass {
    /// Opacity of the top layer for a displacement vector
    pub fn top_opacity(&self, displacement: Vec2) -> f32 {
        1.0 - smoothstep(0.0, self.reveal_threshold, displacement.length())
    }

    /// Colour of one output pixel as straight RGBA in [0,1]
    pub fn shade(&self, uv: Vec2, displacement: Vec2, layers: &EffectLayers) -> Vec4 {
        let top = sample_or_clear(layers.top.as_deref(), uv + displacement * self.top_offset);
        let bottom = sample_or_clear(layers.bottom.as_deref(), uv + displacement * self.bottom_offset);
        let bottom = (bottom.truncate() * self.bottom_darken).extend(bottom.w);

        bottom.lerp(top, self.top_opacity(displacement))
    }

    /// Composite the whole surface
    ///
    /// The field is sampled in normalized coordinates, so it need not match
    /// the surface size.
    pub fn run(&self, field: &DisplacementField, layers: &EffectLayers, surface: &mut RgbaImage) {
        let (width, height) = surface.dimensions();
        if width == 0 || height == 0 {
            return;
        }

        let pixels: &mut [u8] = surface;
        pixels
            .par_chunks_mut(width as usize * 4)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, out) in row.chunks_exact_mut(4).enumerate() {
                    let uv = pixel_center_uv(x as u32, y as u32, width, height);
                    let color = self.shade(uv, field.sample(uv), layers);
                    out.copy_from_slice(&to_rgba8(color));
                }
            });
    }
}

fn sample_or_clear(layer: Option<&Layer>, uv: Vec2) -> Vec4 {
    layer.map(|layer| layer.sample(uv)).unwrap_or(Vec4::ZERO)
}

fn to_rgba8(color: Vec4) -> [u8; 4] {
    color
        .to_array()
        .map(|c| (c * 255.0).round().clamp(0.0, 255.0) as u8)
}

/// Encode a frame to PNG bytes (preserves RGBA transparency)
pub fn encode_png(frame: &RgbaImage) -> Result<Vec<u8>, ImageError> {
    let mut buffer = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buffer);
    encoder.write_image(
        frame.as_raw(),
        frame.width(),
        frame.height(),
        image::ColorType::Rgba8,
    )?;
    Ok(buffer)
}
