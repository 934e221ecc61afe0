//! CPU half of the frame loop: admission, slot rotation and animation.
//!
//! Nothing here touches wgpu. The renderer supplies a `poll` callback that
//! drives the device while the scheduler waits for a free slot.

use crate::scene::{FrameSlot, SceneAnimator, SceneConfig};

use super::fractal::FractalClock;
use super::gate::{FrameGate, FramePermit};
use super::ring::FrameRing;

/// Admitted frame. Owns the gate permit until it is handed to the GPU.
#[derive(Debug)]
#[must_use = "dropping a ticket releases its slot before the GPU is done with it"]
pub struct FrameTicket {
    /// Ring slot written for this frame.
    pub slot: usize,
    /// Fractal animation tick for this frame.
    pub tick: u32,
    /// Global animation angle for this frame.
    pub angle: f32,
    /// Monotonic frame number, starting at 1.
    pub frame: u64,
    permit: FramePermit,
}

impl FrameTicket {
    /// Takes the permit out so it can be released by a completion callback.
    pub fn into_permit(self) -> FramePermit {
        self.permit
    }
}

/// Gate + ring + animator + fractal clock, advanced together once per frame.
#[derive(Debug)]
pub struct FrameScheduler {
    gate: FrameGate,
    ring: FrameRing<FrameSlot>,
    animator: SceneAnimator,
    clock: FractalClock,
    frames: u64,
}

impl FrameScheduler {
    pub fn new(config: &SceneConfig) -> Self {
        let count = config.instance_count();
        Self {
            gate: FrameGate::new(config.ring_depth),
            ring: FrameRing::new(config.ring_depth, |_| FrameSlot::new(count)),
            animator: SceneAnimator::new(config),
            clock: FractalClock::new(),
            frames: 0,
        }
    }

    /// Waits for a free slot, then animates into it.
    ///
    /// `poll` is called repeatedly while every slot is in flight; it must
    /// make progress on outstanding completions.
    pub fn begin_frame(&mut self, poll: impl FnMut()) -> FrameTicket {
        let permit = self.gate.acquire_polling(poll);

        let slot = self.ring.acquire_slot();
        self.animator.animate(self.ring.slot_mut(slot));
        let tick = self.clock.advance();
        self.frames += 1;

        log::trace!(
            "frame {} -> slot {slot}, tick {tick}, in flight {}",
            self.frames,
            self.gate.in_flight()
        );

        FrameTicket {
            slot,
            tick,
            angle: self.animator.angle(),
            frame: self.frames,
            permit,
        }
    }

    #[inline]
    pub fn slot(&self, index: usize) -> &FrameSlot {
        self.ring.slot(index)
    }

    #[inline]
    pub fn gate(&self) -> &FrameGate {
        &self.gate
    }

    #[inline]
    pub fn ring_depth(&self) -> usize {
        self.ring.depth()
    }

    /// Frames begun so far.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::math::{
        perspective, rotate_x, rotate_y, rotate_z, scale, translate, Mat4, Vec3,
    };
    use crate::render::fractal::render_reference;
    use crate::scene::{GridDims, TextureSize};

    fn config(grid: GridDims, ring_depth: usize) -> SceneConfig {
        SceneConfig {
            grid,
            ring_depth,
            texture_size: TextureSize::square(1),
            ..SceneConfig::default()
        }
    }

    // ── single instance end to end ──

    #[test]
    fn single_instance_single_slot_frame() {
        let cfg = config(GridDims::new(1, 1, 1), 1);
        let mut scheduler = FrameScheduler::new(&cfg);

        let ticket = scheduler.begin_frame(|| {});
        assert_eq!(ticket.slot, 0);
        assert_eq!(ticket.tick, 0);
        assert_eq!(ticket.frame, 1);
        assert_eq!(ticket.angle, cfg.angle_step);

        let a = ticket.angle;
        let p = cfg.object_position;
        let object = translate(p) * rotate_y(-a) * rotate_x(a / 2.0) * translate(-p);
        let cell = p + Vec3::new(-0.5 * 0.4 + 0.2, -0.5 * 0.4 + 0.2, -0.5 * 0.4);
        // cos(0) = 1, sin(0) = 0 for the only cell.
        let expected = object
            * translate(cell)
            * rotate_y(a)
            * rotate_z(0.0)
            * scale(Vec3::splat(0.2));

        let slot = scheduler.slot(ticket.slot);
        assert_eq!(slot.instances.len(), 1);
        assert!(slot.instances[0].transform().max_abs_diff(&expected) < 1e-5);
        assert_eq!(slot.instances[0].color, [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(slot.camera.perspective, perspective(cfg.camera).cols);
        assert_eq!(slot.camera.world, Mat4::IDENTITY.cols);

        let texels = render_reference(cfg.texture_size, ticket.tick);
        assert_eq!(texels.len(), 1);
        assert_eq!(texels[0][3], 255);

        // Frame 2 waits on frame 1's release.
        assert!(scheduler.gate().try_acquire().is_none());
        ticket.into_permit().release();
        let next = scheduler.begin_frame(|| {});
        assert_eq!(next.slot, 0);
        assert_eq!(next.tick, 1);
    }

    // ── slot rotation ──

    #[test]
    fn slots_follow_ring_order_from_one() {
        let mut scheduler = FrameScheduler::new(&config(GridDims::new(2, 2, 2), 3));
        let slots: Vec<usize> = (0..6)
            .map(|_| scheduler.begin_frame(|| {}).slot)
            .collect();
        assert_eq!(slots, vec![1, 2, 0, 1, 2, 0]);
        assert_eq!(scheduler.frames(), 6);
    }

    #[test]
    fn in_flight_slots_are_never_overwritten() {
        let depth = 3;
        let mut scheduler = FrameScheduler::new(&config(GridDims::new(2, 3, 2), depth));

        // Completions in submission order, one per poll.
        let mut pending: VecDeque<(FrameTicket, InstanceSnapshot)> = VecDeque::new();

        for _ in 0..30 {
            let ticket = scheduler.begin_frame(|| {
                if let Some((done, _)) = pending.pop_front() {
                    done.into_permit().release();
                }
            });

            assert!(pending.len() < depth);
            for (other, snapshot) in &pending {
                assert_ne!(other.slot, ticket.slot);
                assert_eq!(&snapshot_of(&scheduler, other.slot), snapshot);
            }

            let snapshot = snapshot_of(&scheduler, ticket.slot);
            pending.push_back((ticket, snapshot));
        }

        drop(pending);
        assert_eq!(scheduler.gate().available(), depth);
    }

    type InstanceSnapshot = Vec<[[f32; 4]; 4]>;

    fn snapshot_of(scheduler: &FrameScheduler, slot: usize) -> InstanceSnapshot {
        scheduler
            .slot(slot)
            .instances
            .iter()
            .map(|i| i.transform)
            .collect()
    }

    #[test]
    fn angle_and_tick_advance_once_per_frame() {
        let cfg = config(GridDims::new(1, 1, 1), 2);
        let mut scheduler = FrameScheduler::new(&cfg);
        let mut held = Vec::new();
        for n in 1..=2u32 {
            let t = scheduler.begin_frame(|| {});
            assert_eq!(t.tick, n - 1);
            assert!((t.angle - cfg.angle_step * n as f32).abs() < 1e-7);
            held.push(t);
        }
    }
}
