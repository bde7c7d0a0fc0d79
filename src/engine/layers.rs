//! Background layers for the composite pass

use std::path::Path;
use std::sync::Arc;
use glam::{Vec2, Vec4};
use image::{DynamicImage, ImageError, Rgba, RgbaImage};
use thiserror::Error;
use tracing::{info, warn};

/// Layer-related errors
#[derive(Debug, Error)]
pub enum LayerError {
    #[error("Layer image not found: {0}")]
    NotFound(String),
    #[error("Failed to load layer image: {0}")]
    ImageLoad(#[from] ImageError),
}

/// An immutable background image sampled in normalized coordinates
#[derive(Debug, Clone)]
pub struct Layer {
    image: RgbaImage,
}

impl Layer {
    pub fn from_image(image: &DynamicImage) -> Self {
        Layer {
            image: image.to_rgba8(),
        }
    }

    pub fn from_rgba(image: RgbaImage) -> Self {
        Layer { image }
    }

    /// Load a layer from disk
    pub fn load(path: &Path) -> Result<Self, LayerError> {
        if !path.exists() {
            return Err(LayerError::NotFound(path.display().to_string()));
        }
        let image = image::open(path)?;
        Ok(Self::from_image(&image))
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Sample the layer at `uv` as straight RGBA in [0,1]
    ///
    /// The image is stretched over the unit square; coordinates outside it
    /// clamp to the edge.
    pub fn sample(&self, uv: Vec2) -> Vec4 {
        let (width, height) = self.image.dimensions();
        let x = (uv.x * width as f32 - 0.5).clamp(0.0, (width - 1) as f32);
        let y = (uv.y * height as f32 - 0.5).clamp(0.0, (height - 1) as f32);
        bilinear_sample(&self.image, x, y)
    }
}

/// Bilinear interpolation for smooth pixel sampling
fn bilinear_sample(image: &RgbaImage, x: f32, y: f32) -> Vec4 {
    let (width, height) = image.dimensions();

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);

    let dx = x - x0 as f32;
    let dy = y - y0 as f32;

    let texel = |px: u32, py: u32| Vec4::from_array(image.get_pixel(px, py).0.map(|c| c as f32 / 255.0));

    let top = texel(x0, y0).lerp(texel(x1, y0), dx);
    let bottom = texel(x0, y1).lerp(texel(x1, y1), dx);
    top.lerp(bottom, dy)
}

/// The pair of backgrounds the effect composites
///
/// Either layer may be missing, e.g. while still loading. Frames rendered
/// without a layer treat it as transparent black.
#[derive(Debug, Clone, Default)]
pub struct EffectLayers {
    pub top: Option<Arc<Layer>>,
    pub bottom: Option<Arc<Layer>>,
}

impl EffectLayers {
    pub fn new(top: Layer, bottom: Layer) -> Self {
        EffectLayers {
            top: Some(Arc::new(top)),
            bottom: Some(Arc::new(bottom)),
        }
    }

    /// Load both layers, logging and skipping any that fail
    pub fn load(top: Option<&Path>, bottom: Option<&Path>) -> Self {
        let layers = EffectLayers {
            top: top.and_then(|path| Self::load_one("top", path)),
            bottom: bottom.and_then(|path| Self::load_one("bottom", path)),
        };

        info!(
            top = layers.top.is_some(),
            bottom = layers.bottom.is_some(),
            "Effect layers loaded"
        );

        layers
    }

    fn load_one(role: &str, path: &Path) -> Option<Arc<Layer>> {
        match Layer::load(path) {
            Ok(layer) => {
                let (width, height) = layer.dimensions();
                info!(role = role, path = %path.display(), width = width, height = height, "Loaded layer");
                Some(Arc::new(layer))
            }
            Err(e) => {
                warn!(role = role, path = %path.display(), error = %e, "Failed to load layer");
                None
            }
        }
    }

    pub fn loaded_count(&self) -> usize {
        self.top.is_some() as usize + self.bottom.is_some() as usize
    }

    pub fn is_complete(&self) -> bool {
        self.loaded_count() == 2
    }
}

/// Make white and near-white pixels fully transparent
///
/// A pixel is cleared when all three colour channels exceed `threshold`;
/// cleared pixels become `(255, 255, 255, 0)`. Every other pixel is kept as is.
pub fn strip_white_background(image: &DynamicImage, threshold: u8) -> RgbaImage {
    let mut rgba = image.to_rgba8();

    for pixel in rgba.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        if r > threshold && g > threshold && b > threshold {
            *pixel = Rgba([255, 255, 255, 0]);
        }
    }

    rgba
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bilinear_sample_center() {
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(0, 0, Rgba([100, 100, 100, 255]));
        img.put_pixel(1, 0, Rgba([200, 200, 200, 255]));
        img.put_pixel(0, 1, Rgba([100, 100, 100, 255]));
        img.put_pixel(1, 1, Rgba([200, 200, 200, 255]));

        let result = bilinear_sample(&img, 0.5, 0.5);
        // Should be average of all 4 pixels = 150
        assert!((result.x * 255.0 - 150.0).abs() < 0.5);
        assert_eq!(result.w, 1.0);
    }

    #[test]
    fn test_sample_clamps_to_edge() {
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([255, 0, 0, 255]));
        let layer = Layer::from_rgba(img);

        assert_eq!(layer.sample(Vec2::new(-1.0, 0.5)).x, 0.0);
        assert_eq!(layer.sample(Vec2::new(2.0, 0.5)).x, 1.0);
    }

    #[test]
    fn test_strip_white_background() {
        let mut img = RgbaImage::from_pixel(2, 2, Rgba([250, 250, 250, 255]));
        img.put_pixel(1, 0, Rgba([201, 201, 200, 255]));
        img.put_pixel(0, 1, Rgba([10, 20, 30, 255]));

        let stripped = strip_white_background(&DynamicImage::ImageRgba8(img), 200);
        assert_eq!(stripped.get_pixel(0, 0).0, [255, 255, 255, 0]);
        assert_eq!(stripped.get_pixel(1, 0).0, [201, 201, 200, 255]);
        assert_eq!(stripped.get_pixel(0, 1).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_missing_layer_is_skipped() {
        let missing = std::env::temp_dir().join("blending-waves-missing-layer.png");
        let layers = EffectLayers::load(Some(&missing), None);
        assert_eq!(layers.loaded_count(), 0);
        assert!(!layers.is_complete());
    }
}
