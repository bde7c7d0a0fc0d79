//! Offline preview renders of the effect
//!
//! Runs the simulation for a number of frames with a scripted pointer that
//! sweeps left to right across the vertical centre, then encodes the last
//! visible frame as PNG.

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, info};

use super::compositor::encode_png;
use super::layers::EffectLayers;
use super::simulation::{EffectParams, Simulation, SurfaceSize};

/// Upper bound on simulated frames per preview
pub const MAX_PREVIEW_FRAMES: u32 = 600;

/// Preview errors
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("Preview size must be non-zero, got {0}x{1}")]
    EmptySurface(u32, u32),
    #[error("Preview of {0} pixels exceeds the limit of {1}")]
    TooLarge(u64, u32),
    #[error("Frame count must be between 1 and {max}, got {0}", max = MAX_PREVIEW_FRAMES)]
    InvalidFrames(u32),
    #[error("Effect layers are not loaded")]
    LayersUnavailable,
    #[error("Failed to encode preview: {0}")]
    Encode(#[from] image::ImageError),
}

/// Request for a preview frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewRequest {
    pub width: u32,
    pub height: u32,
    pub frames: u32,
}

impl Default for PreviewRequest {
    fn default() -> Self {
        PreviewRequest {
            width: 320,
            height: 180,
            frames: 30,
        }
    }
}

impl PreviewRequest {
    /// Check the request against the pixel budget
    pub fn validate(&self, max_pixels: u32) -> Result<(), PreviewError> {
        if self.width == 0 || self.height == 0 {
            return Err(PreviewError::EmptySurface(self.width, self.height));
        }

        let pixels = self.width as u64 * self.height as u64;
        if pixels > max_pixels as u64 {
            return Err(PreviewError::TooLarge(pixels, max_pixels));
        }

        if self.frames == 0 || self.frames > MAX_PREVIEW_FRAMES {
            return Err(PreviewError::InvalidFrames(self.frames));
        }

        Ok(())
    }
}

/// Result of a preview render
pub struct PreviewResult {
    pub width: u32,
    pub height: u32,
    pub bytes: Bytes,
}

/// Render a preview frame
///
/// CPU bound; callers on an async runtime should run it on a blocking thread.
pub fn render_preview(
    request: &PreviewRequest,
    params: EffectParams,
    layers: EffectLayers,
    max_pixels: u32,
) -> Result<PreviewResult, PreviewError> {
    request.validate(max_pixels)?;
    if !layers.is_complete() {
        return Err(PreviewError::LayersUnavailable);
    }

    debug!(
        width = request.width,
        height = request.height,
        frames = request.frames,
        "Starting preview render"
    );

    let size = SurfaceSize::new(request.width, request.height);
    let mut simulation = Simulation::new(size, params, layers);

    let last = request.frames.saturating_sub(1).max(1) as f32;
    simulation.run_frames(request.frames, |index, pointer| {
        let x = index as f32 / last * size.width as f32;
        pointer.move_to(x, size.height as f32 / 2.0, (size.width, size.height));
    });

    let png = encode_png(simulation.surface())?;

    info!(
        width = request.width,
        height = request.height,
        frames = simulation.frame_count(),
        bytes = png.len(),
        "Preview render complete"
    );

    Ok(PreviewResult {
        width: request.width,
        height: request.height,
        bytes: Bytes::from(png),
    })
}
