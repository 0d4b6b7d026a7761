//! The render adapter seam.
//!
//! The simulation never draws anything itself. Once per frame the registry
//! walks its live particles and hands each [`VisualState`] to a
//! [`RenderAdapter`]. Adapters may also hand out per-particle resources
//! ([`RenderHandle`]) when particles are inserted. The registry gives each one
//! back exactly once, when the particle dies or the engine shuts down.
//!
//! Two adapters ship with the crate:
//! - [`GpuRenderer`](crate::gpu::GpuRenderer), instanced quads through wgpu
//! - [`HeadlessRenderer`], which only does bookkeeping (tests, benchmarks)

use crate::particle::VisualState;
use crate::space::Space;

/// Exclusive ownership of one backend drawable.
///
/// Deliberately neither `Clone` nor `Copy`: the only way to give it back is
/// [`RenderAdapter::release`], which consumes it.
#[derive(Debug, PartialEq, Eq)]
pub struct RenderHandle {
    slot: u32,
}

impl RenderHandle {
    /// Adapters mint handles. Nothing else should.
    pub fn new(slot: u32) -> Self {
        Self { slot }
    }

    /// Backend-specific slot index.
    pub fn slot(&self) -> u32 {
        self.slot
    }
}

/// Turns particle state into pixels.
///
/// Rendering is read-only with respect to particles: `draw` receives a copy of
/// the visual state, never the particle.
pub trait RenderAdapter<V: Space> {
    /// Allocate a drawable for a new particle. `None` means the adapter
    /// draws without per-particle resources.
    fn acquire(&mut self, state: &VisualState<V>) -> Option<RenderHandle> {
        let _ = state;
        None
    }

    /// Return a drawable. Called exactly once per handle.
    fn release(&mut self, handle: RenderHandle) {
        let _ = handle;
    }

    /// Start a frame. Adapters clear to opaque black here.
    fn begin_frame(&mut self) {}

    /// Draw one live particle.
    fn draw(&mut self, handle: Option<&RenderHandle>, state: &VisualState<V>);

    /// Finish and present the frame.
    fn end_frame(&mut self) {}
}

/// Counters kept by [`HeadlessRenderer`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    pub acquired: u64,
    pub released: u64,
    pub frames: u64,
    /// Draw calls in the most recent complete frame.
    pub last_frame_draws: usize,
}

impl RenderStats {
    /// Handles given out and not yet returned.
    pub fn outstanding(&self) -> u64 {
        self.acquired - self.released
    }
}

/// Free-list allocator for handle slots.
///
/// The most recently freed slot is reused first. The pool never shrinks, so
/// `high_water()` bounds every slot ever handed out.
#[derive(Debug, Default)]
pub struct SlotPool {
    in_use: Vec<bool>,
    free: Vec<u32>,
}

impl SlotPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&mut self) -> RenderHandle {
        let slot = match self.free.pop() {
            Some(slot) => slot,
            None => {
                self.in_use.push(false);
                (self.in_use.len() - 1) as u32
            }
        };
        self.in_use[slot as usize] = true;
        RenderHandle::new(slot)
    }

    /// Return a slot. `false` if it was not in use.
    pub fn release(&mut self, handle: RenderHandle) -> bool {
        match self.in_use.get_mut(handle.slot() as usize) {
            Some(live) if *live => {
                *live = false;
                self.free.push(handle.slot());
                true
            }
            _ => false,
        }
    }

    /// One past the largest slot ever handed out.
    pub fn high_water(&self) -> usize {
        self.in_use.len()
    }

    /// Slots currently handed out.
    pub fn live(&self) -> usize {
        self.in_use.len() - self.free.len()
    }
}

/// Bookkeeping-only adapter.
///
/// Hands out slot handles from a [`SlotPool`] like the GPU renderer does, and
/// panics on a double release so tests catch ownership bugs.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    slots: SlotPool,
    draws: usize,
    stats: RenderStats,
    allocate: bool,
}

impl HeadlessRenderer {
    /// Adapter that draws without handles.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adapter that gives every particle a handle.
    pub fn with_handles() -> Self {
        Self {
            allocate: true,
            ..Self::default()
        }
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }
}

impl<V: Space> RenderAdapter<V> for HeadlessRenderer {
    fn acquire(&mut self, _state: &VisualState<V>) -> Option<RenderHandle> {
        if !self.allocate {
            return None;
        }
        self.stats.acquired += 1;
        Some(self.slots.acquire())
    }

    fn release(&mut self, handle: RenderHandle) {
        let slot = handle.slot();
        assert!(self.slots.release(handle), "render handle {slot} released twice or never acquired");
        self.stats.released += 1;
    }

    fn begin_frame(&mut self) {
        self.draws = 0;
    }

    fn draw(&mut self, _handle: Option<&RenderHandle>, _state: &VisualState<V>) {
        self.draws += 1;
    }

    fn end_frame(&mut self) {
        self.stats.frames += 1;
        self.stats.last_frame_draws = self.draws;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use glam::Vec2;

    fn state() -> VisualState<Vec2> {
        VisualState {
            position: Vec2::ZERO,
            color: Color::WHITE,
            opacity: 1.0,
            scale: 1.0,
        }
    }

    #[test]
    fn test_headless_reuses_slots() {
        let mut r = HeadlessRenderer::with_handles();
        let a = RenderAdapter::<Vec2>::acquire(&mut r, &state()).unwrap();
        let b = RenderAdapter::<Vec2>::acquire(&mut r, &state()).unwrap();
        assert_ne!(a.slot(), b.slot());
        let freed = a.slot();
        RenderAdapter::<Vec2>::release(&mut r, a);
        let c = RenderAdapter::<Vec2>::acquire(&mut r, &state()).unwrap();
        assert_eq!(c.slot(), freed);
        assert_eq!(r.stats().outstanding(), 2);
    }

    #[test]
    #[should_panic(expected = "released twice")]
    fn test_headless_detects_double_release() {
        let mut r = HeadlessRenderer::with_handles();
        let a = RenderAdapter::<Vec2>::acquire(&mut r, &state()).unwrap();
        let forged = RenderHandle::new(a.slot());
        RenderAdapter::<Vec2>::release(&mut r, a);
        RenderAdapter::<Vec2>::release(&mut r, forged);
    }

    #[test]
    fn test_slot_pool_rejects_unknown_slots() {
        let mut pool = SlotPool::new();
        let a = pool.acquire();
        let _b = pool.acquire();
        assert_eq!(pool.live(), 2);
        assert!(pool.release(a));
        assert!(!pool.release(RenderHandle::new(0)));
        assert!(!pool.release(RenderHandle::new(99)));
        assert_eq!(pool.live(), 1);
        assert_eq!(pool.high_water(), 2);
    }

    #[test]
    fn test_headless_without_handles() {
        let mut r = HeadlessRenderer::new();
        assert!(RenderAdapter::<Vec2>::acquire(&mut r, &state()).is_none());
        RenderAdapter::<Vec2>::begin_frame(&mut r);
        RenderAdapter::<Vec2>::draw(&mut r, None, &state());
        RenderAdapter::<Vec2>::end_frame(&mut r);
        assert_eq!(r.stats().last_frame_draws, 1);
        assert_eq!(r.stats().frames, 1);
    }
}
