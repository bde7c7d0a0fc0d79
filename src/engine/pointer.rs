//! Pointer input
//!
//! Input events write the latest pointer position through a cloneable
//! [`PointerInput`] handle from any thread. The frame loop owns a
//! [`PointerTracker`] that samples that position once per frame and derives
//! the velocity from the previous frame's sample. Events arriving between two
//! frames overwrite each other; only the most recent one is seen.

use std::sync::Arc;
use glam::Vec2;
use parking_lot::Mutex;

/// Pointer state as seen by one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    /// Normalized position in [0,1] x [0,1], origin top-left
    pub position: Vec2,
    pub previous: Vec2,
    /// `position - previous`, recomputed once per frame
    pub velocity: Vec2,
}

impl Default for PointerState {
    fn default() -> Self {
        PointerState {
            position: Vec2::splat(0.5),
            previous: Vec2::splat(0.5),
            velocity: Vec2::ZERO,
        }
    }
}

/// Writer side of the pointer, shared with event handlers
#[derive(Debug, Clone, Default)]
pub struct PointerInput {
    latest: Arc<Mutex<Option<Vec2>>>,
}

impl PointerInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a position already normalized to the surface
    pub fn set_normalized(&self, position: Vec2) {
        *self.latest.lock() = Some(position.clamp(Vec2::ZERO, Vec2::ONE));
    }

    /// Record a pointer or mouse position given in surface pixels
    pub fn move_to(&self, x: f32, y: f32, surface: (u32, u32)) {
        let (width, height) = surface;
        self.set_normalized(Vec2::new(
            x / width.max(1) as f32,
            y / height.max(1) as f32,
        ));
    }

    /// Record a touch event; the first touch point drives the pointer
    pub fn touch(&self, touches: &[(f32, f32)], surface: (u32, u32)) {
        if let Some(&(x, y)) = touches.first() {
            self.move_to(x, y, surface);
        }
    }

    fn latest(&self) -> Option<Vec2> {
        *self.latest.lock()
    }
}

/// Reader side of the pointer, owned by the frame loop
#[derive(Debug, Default)]
pub struct PointerTracker {
    input: PointerInput,
    state: PointerState,
    seeded: bool,
}

impl PointerTracker {
    pub fn new(input: PointerInput) -> Self {
        PointerTracker {
            input,
            state: PointerState::default(),
            seeded: false,
        }
    }

    /// Handle for event sources
    pub fn input(&self) -> PointerInput {
        self.input.clone()
    }

    /// Last sampled state without advancing
    pub fn state(&self) -> PointerState {
        self.state
    }

    /// Take this frame's sample and recompute the velocity
    ///
    /// The first observed position seeds both `position` and `previous`, so
    /// the pointer entering the surface does not produce a jump.
    pub fn sample(&mut self) -> PointerState {
        let current = match self.input.latest() {
            Some(position) if !self.seeded => {
                self.seeded = true;
                self.state.position = position;
                position
            }
            Some(position) => position,
            None => self.state.position,
        };

        self.state.previous = self.state.position;
        self.state.position = current;
        self.state.velocity = current - self.state.previous;
        self.state
    }
}
