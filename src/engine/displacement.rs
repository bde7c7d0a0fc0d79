//! Displacement field and the update pass
//!
//! The field stores one 2-D offset per pixel. Every frame the previous field
//! is decayed and a circular brush centred on the pointer injects the
//! pointer's velocity.

use glam::Vec2;
use rayon::prelude::*;

use super::pointer::PointerState;

/// Multiplicative decay applied to the field every frame
pub const DEFAULT_DECAY: f32 = 0.95;

/// Brush radius in normalized, aspect-corrected units
pub const DEFAULT_BRUSH_RADIUS: f32 = 0.2;

/// Hermite interpolation between two edges, as in GLSL
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Normalized coordinate of a pixel centre, origin top-left
pub fn pixel_center_uv(x: u32, y: u32, width: u32, height: u32) -> Vec2 {
    Vec2::new(
        (x as f32 + 0.5) / width as f32,
        (y as f32 + 0.5) / height as f32,
    )
}

/// A 2-D buffer of per-pixel displacement vectors
#[derive(Debug, Clone, PartialEq)]
pub struct DisplacementField {
    width: u32,
    height: u32,
    data: Vec<Vec2>,
}

impl DisplacementField {
    /// Create a zeroed field. Zero dimensions are clamped to 1.
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        DisplacementField {
            width,
            height,
            data: vec![Vec2::ZERO; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn get(&self, x: u32, y: u32) -> Vec2 {
        self.data[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, value: Vec2) {
        let index = self.index(x, y);
        self.data[index] = value;
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Set every vector to the same value
    pub fn fill(&mut self, value: Vec2) {
        self.data.fill(value);
    }

    /// Resize and reset to zero. Previous contents are discarded.
    pub fn resize(&mut self, width: u32, height: u32) {
        *self = DisplacementField::new(width, height);
    }

    /// Largest vector magnitude anywhere in the field
    pub fn max_magnitude(&self) -> f32 {
        self.data.iter().map(|v| v.length()).fold(0.0, f32::max)
    }

    /// Bilinear sample at a normalized coordinate with clamp-to-edge addressing
    pub fn sample(&self, uv: Vec2) -> Vec2 {
        let x = (uv.x * self.width as f32 - 0.5).clamp(0.0, (self.width - 1) as f32);
        let y = (uv.y * self.height as f32 - 0.5).clamp(0.0, (self.height - 1) as f32);

        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);

        let dx = x - x0 as f32;
        let dy = y - y0 as f32;

        let top = self.get(x0, y0).lerp(self.get(x1, y0), dx);
        let bottom = self.get(x0, y1).lerp(self.get(x1, y1), dx);
        top.lerp(bottom, dy)
    }

    fn rows_mut(&mut self) -> rayon::slice::ChunksMut<'_, Vec2> {
        self.data.par_chunks_mut(self.width as usize)
    }
}

/// Advances the displacement field by one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdatePass {
    pub decay: f32,
    pub brush_radius: f32,
}

impl Default for UpdatePass {
    fn default() -> Self {
        UpdatePass {
            decay: DEFAULT_DECAY,
            brush_radius: DEFAULT_BRUSH_RADIUS,
        }
    }
}

impl UpdatePass {
    pub fn new(decay: f32, brush_radius: f32) -> Self {
        UpdatePass { decay, brush_radius }
    }

    /// Brush strength at `uv` for a pointer at `pointer`.
    ///
    /// 1.0 under the pointer, falling smoothly to 0.0 at the brush radius.
    /// The horizontal distance is scaled by `aspect` (width / height) so the
    /// brush is circular on screen.
    pub fn falloff(&self, uv: Vec2, pointer: Vec2, aspect: f32) -> f32 {
        let distance = ((uv - pointer) * Vec2::new(aspect, 1.0)).length();
        1.0 - smoothstep(0.0, self.brush_radius, distance)
    }

    /// Decay `previous` into `next`, then add the brush contribution
    ///
    /// # Arguments
    /// * `previous` - Last frame's field, read only
    /// * `next` - Field written this frame; its dimensions define the resolution
    /// * `pointer` - Pointer position and per-frame velocity
    pub fn run(&self, previous: &DisplacementField, next: &mut DisplacementField, pointer: &PointerState) {
        let (width, height) = next.dimensions();
        let aspect = width as f32 / height as f32;
        let same_size = previous.dimensions() == (width, height);

        // Process rows in parallel using Rayon
        next.rows_mut().enumerate().for_each(|(y, row)| {
            let y = y as u32;
            for (x, out) in row.iter_mut().enumerate() {
                let x = x as u32;
                let uv = pixel_center_uv(x, y, width, height);

                let prior = if same_size {
                    previous.get(x, y)
                } else {
                    previous.sample(uv)
                };

                let decayed = prior * self.decay;
                *out = decayed + pointer.velocity * self.falloff(uv, pointer.position, aspect);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn still_pointer() -> PointerState {
        PointerState {
            position: Vec2::splat(0.5),
            previous: Vec2::splat(0.5),
            velocity: Vec2::ZERO,
        }
    }

    #[test]
    fn test_smoothstep_edges() {
        assert_eq!(smoothstep(0.0, 0.2, 0.0), 0.0);
        assert_eq!(smoothstep(0.0, 0.2, 0.2), 1.0);
        assert_eq!(smoothstep(0.0, 0.2, 0.5), 1.0);
        assert!((smoothstep(0.0, 0.2, 0.1) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_falloff_full_at_pointer_zero_at_radius() {
        let pass = UpdatePass::default();
        let pointer = Vec2::new(0.5, 0.5);

        assert_eq!(pass.falloff(pointer, pointer, 1.0), 1.0);
        assert_eq!(pass.falloff(pointer + Vec2::new(0.0, 0.2), pointer, 1.0), 0.0);
        assert_eq!(pass.falloff(pointer + Vec2::new(0.3, 0.0), pointer, 1.0), 0.0);

        let mid = pass.falloff(pointer + Vec2::new(0.0, 0.1), pointer, 1.0);
        assert!(mid > 0.0 && mid < 1.0);
    }

    #[test]
    fn test_falloff_is_aspect_corrected() {
        let pass = UpdatePass::default();
        let pointer = Vec2::new(0.5, 0.5);

        // On a 2:1 surface a horizontal uv step of 0.1 spans as many pixels
        // as a vertical step of 0.2, so it sits on the brush edge.
        assert_eq!(pass.falloff(pointer + Vec2::new(0.1, 0.0), pointer, 2.0), 0.0);
        assert!(pass.falloff(pointer + Vec2::new(0.0, 0.1), pointer, 2.0) > 0.0);
    }

    #[test]
    fn test_decay_applied_before_brush() {
        let pass = UpdatePass::default();
        let mut previous = DisplacementField::new(4, 4);
        previous.fill(Vec2::new(1.0, 0.0));
        let mut next = DisplacementField::new(4, 4);

        let pointer = PointerState {
            position: pixel_center_uv(1, 1, 4, 4),
            previous: Vec2::ZERO,
            velocity: Vec2::new(0.0, 0.5),
        };
        pass.run(&previous, &mut next, &pointer);

        assert_eq!(next.get(1, 1), Vec2::new(0.95, 0.5));
    }

    #[test]
    fn test_brush_outside_radius_adds_nothing() {
        let pass = UpdatePass::default();
        let previous = DisplacementField::new(10, 10);
        let mut next = DisplacementField::new(10, 10);

        let pointer = PointerState {
            position: pixel_center_uv(0, 0, 10, 10),
            previous: Vec2::ZERO,
            velocity: Vec2::new(0.3, -0.2),
        };
        pass.run(&previous, &mut next, &pointer);

        assert_eq!(next.get(0, 0), Vec2::new(0.3, -0.2));
        assert_eq!(next.get(9, 9), Vec2::ZERO);
        assert!(next.get(1, 0).length() < next.get(0, 0).length());
    }

    #[test]
    fn test_sample_at_pixel_centres_is_exact() {
        let mut field = DisplacementField::new(3, 2);
        field.set(2, 1, Vec2::new(0.25, -0.75));
        assert_eq!(field.sample(pixel_center_uv(2, 1, 3, 2)), Vec2::new(0.25, -0.75));
        assert_eq!(field.sample(Vec2::new(5.0, 5.0)), Vec2::new(0.25, -0.75));
    }

    #[test]
    fn test_index_does_not_wrap_in_u32() {
        // 70_000 * 70_000 overflows u32; the wide field must index past it
        let field = DisplacementField::new(70_000, 1);
        assert_eq!(field.index(69_999, 0), 69_999);
        assert_eq!(
            DisplacementField { width: 70_000, height: 70_000, data: Vec::new() }.index(1, 69_999),
            69_999 * 70_000 + 1
        );
    }

    #[test]
    fn test_resize_resets_to_zero() {
        let mut field = DisplacementField::new(2, 2);
        field.fill(Vec2::ONE);
        field.resize(0, 5);
        assert_eq!(field.dimensions(), (1, 5));
        assert_eq!(field.max_magnitude(), 0.0);
    }

    proptest! {
        #[test]
        fn prop_decay_only_strictly_decreases(
            x in -10.0f32..10.0,
            y in -10.0f32..10.0,
            frames in 1usize..200,
        ) {
            prop_assume!(Vec2::new(x, y).length() > 1e-3);

            let pass = UpdatePass::default();
            let mut previous = DisplacementField::new(3, 3);
            previous.fill(Vec2::new(x, y));
            let mut next = DisplacementField::new(3, 3);

            for _ in 0..frames {
                pass.run(&previous, &mut next, &still_pointer());
                prop_assert!(next.max_magnitude() < previous.max_magnitude());
                std::mem::swap(&mut previous, &mut next);
            }
        }

        #[test]
        fn prop_brush_at_pointer_beats_brush_beyond_radius(
            px in 0.0f32..1.0,
            py in 0.0f32..1.0,
            angle in 0.0f32..std::f32::consts::TAU,
            extra in 0.0f32..1.0,
            aspect in 0.25f32..4.0,
        ) {
            let pass = UpdatePass::default();
            let pointer = Vec2::new(px, py);
            let distance = pass.brush_radius + extra;
            let offset = Vec2::new(angle.cos() / aspect, angle.sin()) * distance;

            let near = pass.falloff(pointer, pointer, aspect);
            let far = pass.falloff(pointer + offset * 1.0001, pointer, aspect);

            prop_assert_eq!(near, 1.0);
            prop_assert_eq!(far, 0.0);
        }
    }
}
