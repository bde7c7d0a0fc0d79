//! Displacement effect engine
//!
//! This module contains the liquid displacement simulation:
//! - Displacement field and update pass
//! - Composite pass over two background layers
//! - Ping-pong buffering and the frame loop
//! - Preview renders for the server

mod displacement;
mod compositor;
mod layers;
mod ping_pong;
mod pointer;
mod simulation;
mod preview;

pub use displacement::{
    pixel_center_uv, smoothstep, DisplacementField, UpdatePass, DEFAULT_BRUSH_RADIUS, DEFAULT_DECAY,
};
pub use compositor::{
    encode_png, CompositePass, DEFAULT_BOTTOM_DARKEN, DEFAULT_BOTTOM_OFFSET, DEFAULT_REVEAL_THRESHOLD,
    DEFAULT_TOP_OFFSET,
};
pub use layers::{strip_white_background, EffectLayers, Layer, LayerError};
pub use ping_pong::PingPong;
pub use pointer::{PointerInput, PointerState, PointerTracker};
pub use simulation::{Effect, EffectParams, Simulation, SurfaceSize, FALLBACK_CLASS};
pub use preview::{render_preview, PreviewError, PreviewRequest, PreviewResult, MAX_PREVIEW_FRAMES};

#[cfg(test)]
mod tests {
    use super::*;

    /// The browser renders the same passes in WebGL
    const SCRIPT: &str = include_str!("../../main.js");

    #[test]
    fn test_script_uses_engine_constants() {
        for snippet in [
            format!("* {:.2}", DEFAULT_DECAY),
            format!("smoothstep(0.0, {:.1}, d)", DEFAULT_BRUSH_RADIUS),
            format!("d * {:.1}", DEFAULT_TOP_OFFSET),
            format!("d * {:.2}", DEFAULT_BOTTOM_OFFSET),
            format!("bottom.rgb *= {:.1}", DEFAULT_BOTTOM_DARKEN),
            format!("smoothstep(0.0, {:.1}, length(disp))", DEFAULT_REVEAL_THRESHOLD),
        ] {
            assert!(SCRIPT.contains(&snippet), "main.js is missing `{}`", snippet);
        }
    }

    #[test]
    fn test_script_flips_page_input_into_field_orientation() {
        // Field reads and writes share one unflipped coordinate
        assert!(SCRIPT.contains("vUv = aPosition * 0.5 + 0.5;"));
        assert!(!SCRIPT.contains("-aPosition.y"));

        // Pointer, velocity and image lookups cross from page space
        assert!(SCRIPT.contains("pointer.x, 1.0 - pointer.y"));
        assert!(SCRIPT.contains("-(pointer.y - pointer.py)"));
        assert!(SCRIPT.contains("vImageUv = vec2(vUv.x, 1.0 - vUv.y);"));
        assert!(SCRIPT.contains("vec2 d = vec2(disp.x, -disp.y);"));
    }

    #[test]
    fn test_script_falls_back_without_renderable_field_texture() {
        assert!(SCRIPT.contains("checkFramebufferStatus"));
        assert!(SCRIPT.contains("OES_texture_half_float"));
        assert!(SCRIPT.contains("if (!gl || !texelType)"));
    }
}
