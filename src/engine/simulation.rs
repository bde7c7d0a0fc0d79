//! Frame loop for the displacement effect
//!
//! One [`Simulation::frame`] call is one animation frame:
//! 1. sample the pointer and recompute its velocity
//! 2. run the update pass from the front buffer into the back buffer
//! 3. composite the freshly written back buffer onto the visible surface
//! 4. swap the buffers so the next frame reads what was just written

use image::RgbaImage;
use tracing::{debug, warn};

use super::compositor::CompositePass;
use super::displacement::{DisplacementField, UpdatePass};
use super::layers::EffectLayers;
use super::ping_pong::PingPong;
use super::pointer::{PointerInput, PointerState, PointerTracker};
use crate::config::EffectSettings;

/// Class applied to the page when the effect cannot run
pub const FALLBACK_CLASS: &str = "no-webgl";

/// Size of the drawable surface in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        SurfaceSize { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Tunables for both passes
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EffectParams {
    pub update: UpdatePass,
    pub composite: CompositePass,
}

impl From<&EffectSettings> for EffectParams {
    fn from(settings: &EffectSettings) -> Self {
        EffectParams {
            update: UpdatePass::new(settings.decay, settings.brush_radius),
            composite: CompositePass {
                top_offset: settings.top_offset,
                bottom_offset: settings.bottom_offset,
                bottom_darken: settings.bottom_darken,
                reveal_threshold: settings.reveal_threshold,
            },
        }
    }
}

/// The running effect: field buffers, pointer and visible surface
pub struct Simulation {
    params: EffectParams,
    layers: EffectLayers,
    fields: PingPong<DisplacementField>,
    pointer: PointerTracker,
    surface: RgbaImage,
    frames: u64,
}

impl Simulation {
    pub fn new(size: SurfaceSize, params: EffectParams, layers: EffectLayers) -> Self {
        let width = size.width.max(1);
        let height = size.height.max(1);

        Simulation {
            params,
            layers,
            fields: PingPong::new(
                DisplacementField::new(width, height),
                DisplacementField::new(width, height),
            ),
            pointer: PointerTracker::new(PointerInput::new()),
            surface: RgbaImage::new(width, height),
            frames: 0,
        }
    }

    /// Handle for pointer and touch event sources
    pub fn pointer_input(&self) -> PointerInput {
        self.pointer.input()
    }

    pub fn pointer_state(&self) -> PointerState {
        self.pointer.state()
    }

    pub fn size(&self) -> SurfaceSize {
        let (width, height) = self.surface.dimensions();
        SurfaceSize { width, height }
    }

    /// The visible surface as of the last frame
    pub fn surface(&self) -> &RgbaImage {
        &self.surface
    }

    /// The most recently written displacement field
    pub fn field(&self) -> &DisplacementField {
        self.fields.front()
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Advance one frame and return the visible surface
    pub fn frame(&mut self) -> &RgbaImage {
        let pointer = self.pointer.sample();

        let (previous, next) = self.fields.split();
        self.params.update.run(previous, next, &pointer);
        self.params.composite.run(next, &self.layers, &mut self.surface);

        self.fields.swap();
        self.frames += 1;

        &self.surface
    }

    /// Run `count` frames, calling `before_frame` with the frame index and the
    /// pointer handle ahead of each one
    pub fn run_frames(&mut self, count: u32, mut before_frame: impl FnMut(u32, &PointerInput)) {
        let input = self.pointer_input();
        for index in 0..count {
            before_frame(index, &input);
            self.frame();
        }
    }

    /// Resize the surface and both buffers; the field restarts from zero
    pub fn resize(&mut self, size: SurfaceSize) {
        let width = size.width.max(1);
        let height = size.height.max(1);

        self.fields.for_each_mut(|field| field.resize(width, height));
        self.surface = RgbaImage::new(width, height);

        debug!(width = width, height = height, "Resized effect surface");
    }
}

/// The effect as attached to a page: running, or the static fallback
pub enum Effect {
    Running(Simulation),
    Fallback,
}

impl Effect {
    /// Attach the effect to a surface
    ///
    /// A missing or zero-area surface is detected once here and produces the
    /// fallback state; nothing after this point reports errors.
    pub fn init(surface: Option<SurfaceSize>, params: EffectParams, layers: EffectLayers) -> Self {
        match surface {
            Some(size) if !size.is_empty() => Effect::Running(Simulation::new(size, params, layers)),
            _ => {
                warn!("No drawable surface for the displacement effect, using fallback");
                Effect::Fallback
            }
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Effect::Fallback)
    }

    /// Marker class for the page, present only in the fallback state
    pub fn marker_class(&self) -> Option<&'static str> {
        match self {
            Effect::Running(_) => None,
            Effect::Fallback => Some(FALLBACK_CLASS),
        }
    }

    /// Advance one frame; a no-op in the fallback state
    pub fn frame(&mut self) -> Option<&RgbaImage> {
        match self {
            Effect::Running(simulation) => Some(simulation.frame()),
            Effect::Fallback => None,
        }
    }

    pub fn resize(&mut self, size: SurfaceSize) {
        if let Effect::Running(simulation) = self {
            simulation.resize(size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use image::Rgba;

    use crate::engine::layers::Layer;

    fn solid_layers() -> EffectLayers {
        EffectLayers::new(
            Layer::from_rgba(RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255]))),
            Layer::from_rgba(RgbaImage::from_pixel(8, 8, Rgba([100, 100, 100, 255]))),
        )
    }

    #[test]
    fn test_still_pointer_shows_top_layer() {
        let mut sim = Simulation::new(SurfaceSize::new(8, 8), EffectParams::default(), solid_layers());
        let frame = sim.frame();
        assert!(frame.pixels().all(|p| p.0 == [255, 255, 255, 255]));
        assert_eq!(sim.frame_count(), 1);
    }

    #[test]
    fn test_frame_alternates_buffers() {
        let mut sim = Simulation::new(SurfaceSize::new(4, 4), EffectParams::default(), EffectLayers::default());
        let start = sim.fields.front_index();
        sim.frame();
        assert_ne!(sim.fields.front_index(), start);
        sim.frame();
        assert_eq!(sim.fields.front_index(), start);
    }

    #[test]
    fn test_pointer_motion_excites_field_then_decays() {
        let mut sim = Simulation::new(SurfaceSize::new(16, 16), EffectParams::default(), solid_layers());
        let input = sim.pointer_input();

        input.set_normalized(Vec2::new(0.3, 0.5));
        sim.frame();
        input.set_normalized(Vec2::new(0.7, 0.5));
        sim.frame();

        let excited = sim.field().max_magnitude();
        assert!(excited > 0.0);
        assert!((sim.pointer_state().velocity - Vec2::new(0.4, 0.0)).length() < 1e-6);

        // The pointer stops; the field relaxes towards zero
        let mut last = excited;
        for _ in 0..20 {
            sim.frame();
            let now = sim.field().max_magnitude();
            assert!(now < last);
            last = now;
        }
    }

    #[test]
    fn test_strong_motion_reveals_bottom_layer() {
        let mut sim = Simulation::new(SurfaceSize::new(16, 16), EffectParams::default(), solid_layers());
        sim.run_frames(3, |index, input| {
            input.set_normalized(Vec2::new(index as f32 * 0.4, 0.5));
        });

        // Under the pointer the field is far past the reveal threshold
        let centre = sim.surface().get_pixel(12, 8).0;
        assert_eq!(centre, [20, 20, 20, 255]);
    }

    #[test]
    fn test_resize_reinitializes_buffers() {
        let mut sim = Simulation::new(SurfaceSize::new(4, 4), EffectParams::default(), EffectLayers::default());
        sim.field_mut_for_test().fill(Vec2::ONE);

        sim.resize(SurfaceSize::new(10, 6));
        assert_eq!(sim.size(), SurfaceSize::new(10, 6));
        assert_eq!(sim.field().dimensions(), (10, 6));
        assert_eq!(sim.field().max_magnitude(), 0.0);
        assert_eq!(sim.fields.back().dimensions(), (10, 6));
    }

    #[test]
    fn test_missing_surface_falls_back() {
        let mut effect = Effect::init(None, EffectParams::default(), EffectLayers::default());
        assert!(effect.is_fallback());
        assert_eq!(effect.marker_class(), Some(FALLBACK_CLASS));
        assert!(effect.frame().is_none());

        let effect = Effect::init(Some(SurfaceSize::new(0, 100)), EffectParams::default(), EffectLayers::default());
        assert!(effect.is_fallback());
    }

    #[test]
    fn test_attached_effect_runs() {
        let mut effect = Effect::init(Some(SurfaceSize::new(4, 2)), EffectParams::default(), solid_layers());
        assert_eq!(effect.marker_class(), None);
        assert_eq!(effect.frame().map(|f| f.dimensions()), Some((4, 2)));
    }

    #[test]
    fn test_params_from_settings() {
        let settings = EffectSettings {
            decay: 0.5,
            ..EffectSettings::default()
        };
        let params = EffectParams::from(&settings);
        assert_eq!(params.update.decay, 0.5);
        assert_eq!(params.composite, CompositePass::default());
    }

    impl Simulation {
        fn field_mut_for_test(&mut self) -> &mut DisplacementField {
            self.fields.back_mut()
        }
    }
}
