//! Counting gate bounding the number of frames in flight.
//!
//! A permit is taken before the CPU touches a ring slot and handed to the
//! GPU completion callback of the submission that reads it. The permit is
//! returned exactly once: either explicitly or when it is dropped.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

/// How long a polling acquire sleeps between device polls.
const POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug)]
struct GateState {
    available: Mutex<usize>,
    released: Condvar,
    capacity: usize,
}

impl GateState {
    fn lock(&self) -> MutexGuard<'_, usize> {
        // Holders never panic while the lock is held; recover the count if one did.
        self.available.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn release(&self) {
        let mut available = self.lock();
        debug_assert!(*available < self.capacity, "frame gate over-released");
        *available = (*available + 1).min(self.capacity);
        drop(available);
        self.released.notify_one();
    }
}

/// Counting semaphore sized to the frame ring depth.
#[derive(Debug, Clone)]
pub struct FrameGate {
    state: Arc<GateState>,
}

impl FrameGate {
    /// Creates a gate admitting `capacity` frames at once.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "frame gate capacity must be non-zero");
        Self {
            state: Arc::new(GateState {
                available: Mutex::new(capacity),
                released: Condvar::new(),
                capacity,
            }),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.state.capacity
    }

    /// Permits currently available.
    pub fn available(&self) -> usize {
        *self.state.lock()
    }

    /// Frames admitted and not yet released.
    pub fn in_flight(&self) -> usize {
        self.capacity() - self.available()
    }

    /// Takes a permit if one is free.
    pub fn try_acquire(&self) -> Option<FramePermit> {
        let mut available = self.state.lock();
        if *available == 0 {
            return None;
        }
        *available -= 1;
        Some(self.permit())
    }

    /// Blocks until a permit is released by another thread.
    ///
    /// There is no deadline: a completion that never fires stalls the caller.
    pub fn acquire(&self) -> FramePermit {
        let mut available = self.state.lock();
        while *available == 0 {
            available = self
                .state
                .released
                .wait(available)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
        *available -= 1;
        self.permit()
    }

    /// Blocks until a permit is free, calling `poll` while waiting.
    ///
    /// GPU completion callbacks only run while the device is polled, so the
    /// submitting thread must drive the device itself while it waits.
    pub fn acquire_polling(&self, mut poll: impl FnMut()) -> FramePermit {
        loop {
            if let Some(permit) = self.try_acquire() {
                return permit;
            }

            poll();

            let available = self.state.lock();
            if *available == 0 {
                // Woken early by a release from another thread, or time out and poll again.
                let _ = self
                    .state
                    .released
                    .wait_timeout(available, POLL_INTERVAL)
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
            }
        }
    }

    fn permit(&self) -> FramePermit {
        FramePermit {
            state: Some(Arc::clone(&self.state)),
        }
    }
}

/// One admitted frame. Releases its gate slot when dropped.
#[derive(Debug)]
#[must_use = "dropping a permit immediately releases the frame slot"]
pub struct FramePermit {
    state: Option<Arc<GateState>>,
}

impl FramePermit {
    /// Returns the slot to the gate.
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if let Some(state) = self.state.take() {
            state.release();
        }
    }
}

impl Drop for FramePermit {
    fn drop(&mut self) {
        self.release_inner();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;

    #[test]
    fn admits_up_to_capacity() {
        let gate = FrameGate::new(3);
        let permits: Vec<_> = (0..3).map(|_| gate.try_acquire().unwrap()).collect();
        assert!(gate.try_acquire().is_none());
        assert_eq!(gate.in_flight(), 3);
        drop(permits);
        assert_eq!(gate.available(), 3);
    }

    #[test]
    fn release_is_exactly_once() {
        let gate = FrameGate::new(1);
        let permit = gate.acquire();
        assert_eq!(gate.available(), 0);
        permit.release();
        assert_eq!(gate.available(), 1);

        // Drop after explicit release must not double count.
        let p = gate.acquire();
        p.release();
        assert_eq!(gate.available(), 1);
    }

    #[test]
    fn acquire_blocks_until_completion_on_other_thread() {
        let gate = FrameGate::new(2);
        let (tx, rx) = mpsc::channel::<FramePermit>();

        // Simulated execution engine: completes submissions in order.
        let engine = thread::spawn(move || {
            for permit in rx {
                thread::sleep(Duration::from_millis(2));
                drop(permit);
            }
        });

        for _ in 0..20 {
            let permit = gate.acquire();
            assert!(gate.in_flight() <= 2);
            tx.send(permit).unwrap();
        }
        drop(tx);
        engine.join().unwrap();
        assert_eq!(gate.available(), 2);
    }

    #[test]
    fn polling_acquire_drives_completions() {
        // Completions only happen inside `poll`, like a device that needs polling.
        for depth in 1..=4 {
            let gate = FrameGate::new(depth);
            let mut pending: Vec<FramePermit> = Vec::new();

            for _ in 0..(depth * 5) {
                let permit = gate.acquire_polling(|| {
                    if !pending.is_empty() {
                        pending.remove(0);
                    }
                });
                pending.push(permit);
                assert!(pending.len() <= depth);
            }
        }
    }

    #[test]
    fn kth_release_unblocks_k_plus_n_acquire() {
        let n = 3;
        let gate = FrameGate::new(n);
        let mut held: Vec<FramePermit> = (0..n).map(|_| gate.try_acquire().unwrap()).collect();
        assert!(gate.try_acquire().is_none());

        let first = held.remove(0);
        let waiter = {
            let gate = gate.clone();
            thread::spawn(move || gate.acquire())
        };
        first.release();
        let admitted = waiter.join().unwrap();
        assert_eq!(gate.in_flight(), n);
        drop(admitted);
        drop(held);
        assert_eq!(gate.available(), n);
    }

    #[test]
    #[should_panic]
    fn zero_capacity_panics() {
        let _ = FrameGate::new(0);
    }
}
