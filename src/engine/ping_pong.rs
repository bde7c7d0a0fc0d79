//! Double buffering
//!
//! Two buffers with alternating roles: the front buffer holds last frame's
//! result and is only read, the back buffer is written this frame. `swap`
//! exchanges the roles.

/// Owner of a front/back buffer pair
#[derive(Debug, Clone)]
pub struct PingPong<T> {
    buffers: [T; 2],
    front: usize,
}

impl<T> PingPong<T> {
    /// `front` starts as the read buffer, `back` as the write buffer
    pub fn new(front: T, back: T) -> Self {
        PingPong {
            buffers: [front, back],
            front: 0,
        }
    }

    /// Index (0 or 1) of the buffer currently in the front role
    pub fn front_index(&self) -> usize {
        self.front
    }

    pub fn front(&self) -> &T {
        &self.buffers[self.front]
    }

    pub fn back(&self) -> &T {
        &self.buffers[1 - self.front]
    }

    pub fn back_mut(&mut self) -> &mut T {
        &mut self.buffers[1 - self.front]
    }

    /// Borrow the front buffer for reading and the back buffer for writing
    pub fn split(&mut self) -> (&T, &mut T) {
        let (first, second) = self.buffers.split_at_mut(1);
        if self.front == 0 {
            (&first[0], &mut second[0])
        } else {
            (&second[0], &mut first[0])
        }
    }

    pub fn swap(&mut self) {
        self.front = 1 - self.front;
    }

    /// Apply `f` to both buffers, e.g. on resize
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut T)) {
        self.buffers.iter_mut().for_each(|buffer| f(buffer));
    }
}
