/// Fixed set of per-frame resources selected by a rotating index.
///
/// The ring only rotates; it does not know whether the GPU is done with a
/// slot. Pair it with a [`FrameGate`](super::FrameGate) of the same depth.
#[derive(Debug)]
pub struct FrameRing<T> {
    slots: Vec<T>,
    current: usize,
}

impl<T> FrameRing<T> {
    /// Builds `depth` slots with `make_slot(index)`.
    pub fn new(depth: usize, make_slot: impl FnMut(usize) -> T) -> Self {
        assert!(depth > 0, "frame ring depth must be non-zero");
        Self {
            slots: (0..depth).map(make_slot).collect(),
            current: 0,
        }
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.slots.len()
    }

    /// Index selected by the last [`acquire_slot`](Self::acquire_slot).
    #[inline]
    pub fn current(&self) -> usize {
        self.current
    }

    /// Advances to the next slot and returns its index.
    ///
    /// Starting from slot 0, a ring of depth 3 yields 1, 2, 0, 1, ...
    pub fn acquire_slot(&mut self) -> usize {
        self.current = (self.current + 1) % self.slots.len();
        self.current
    }

    #[inline]
    pub fn slot(&self, index: usize) -> &T {
        &self.slots[index % self.slots.len()]
    }

    #[inline]
    pub fn slot_mut(&mut self, index: usize) -> &mut T {
        let len = self.slots.len();
        &mut self.slots[index % len]
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triple_ring_rotates_from_one() {
        let mut ring = FrameRing::new(3, |i| i);
        let seq: Vec<usize> = (0..7).map(|_| ring.acquire_slot()).collect();
        assert_eq!(seq, vec![1, 2, 0, 1, 2, 0, 1]);
    }

    #[test]
    fn single_slot_ring_always_returns_zero() {
        let mut ring = FrameRing::new(1, |_| ());
        assert!((0..5).all(|_| ring.acquire_slot() == 0));
    }

    #[test]
    fn slot_sequence_depends_only_on_call_count() {
        for depth in 1..=5 {
            let mut ring = FrameRing::new(depth, |i| i * 10);
            for call in 1..=20 {
                let idx = ring.acquire_slot();
                assert_eq!(idx, call % depth);
                assert_eq!(*ring.slot(idx), idx * 10);
            }
        }
    }

    #[test]
    fn slot_mut_writes_are_isolated() {
        let mut ring = FrameRing::new(3, |_| Vec::<u32>::new());
        let a = ring.acquire_slot();
        ring.slot_mut(a).push(7);
        let b = ring.acquire_slot();
        assert!(ring.slot(b).is_empty());
        assert_eq!(ring.slot(a), &vec![7]);
        assert_eq!(ring.current(), b);
        assert_eq!(ring.iter().count(), 3);
    }
}
