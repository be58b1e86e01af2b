//! Fixed-capacity object pool
//!
//! Falling objects live in recycled slots so the per-frame path never
//! allocates. The pool is the sole owner of the backing storage; the
//! simulation addresses active slots through `Handle`s. Capacity is set at
//! construction and never grows.

use crate::sim::state::FallingObject;

/// Handle to a pool slot. Only meaningful for the pool that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handle(usize);

#[derive(Debug, Clone)]
struct Slot {
    object: FallingObject,
    active: bool,
}

/// Fixed-capacity pool of falling-object slots
#[derive(Debug, Clone)]
pub struct ObjectPool {
    slots: Vec<Slot>,
    /// Active slot indices in acquisition order
    order: Vec<usize>,
}

impl ObjectPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![
                Slot {
                    object: FallingObject::default(),
                    active: false,
                };
                capacity
            ],
            order: Vec::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.order.len()
    }

    /// Claim an inactive slot. Returns `None` when the pool is exhausted;
    /// callers treat that as a spawn throttle, not an error.
    pub fn acquire(&mut self) -> Option<Handle> {
        let idx = self.slots.iter().position(|s| !s.active)?;
        self.slots[idx].active = true;
        self.order.push(idx);
        Some(Handle(idx))
    }

    /// Return a slot to the pool. Releasing an inactive handle is a no-op.
    pub fn release(&mut self, handle: Handle) {
        let Some(slot) = self.slots.get_mut(handle.0) else {
            return;
        };
        if !slot.active {
            return;
        }
        slot.active = false;
        self.order.retain(|&i| i != handle.0);
    }

    /// Deactivate every slot at once (session reset)
    pub fn release_all(&mut self) {
        for slot in &mut self.slots {
            slot.active = false;
        }
        self.order.clear();
    }

    pub fn get(&self, handle: Handle) -> Option<&FallingObject> {
        self.slots.get(handle.0).filter(|s| s.active).map(|s| &s.object)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut FallingObject> {
        self.slots
            .get_mut(handle.0)
            .filter(|s| s.active)
            .map(|s| &mut s.object)
    }

    /// Snapshot of active handles in acquisition order. Safe to release
    /// against while iterating the snapshot.
    pub fn active_handles(&self) -> Vec<Handle> {
        self.order.iter().map(|&i| Handle(i)).collect()
    }

    /// Iterate active objects in acquisition order
    pub fn iter_active(&self) -> impl Iterator<Item = &FallingObject> {
        self.order.iter().map(|&i| &self.slots[i].object)
    }

    /// Visit every active object mutably, in acquisition order
    pub fn for_each_active_mut(&mut self, mut f: impl FnMut(&mut FallingObject)) {
        for i in 0..self.order.len() {
            let idx = self.order[i];
            f(&mut self.slots[idx].object);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::ObjectKind;
    use glam::Vec2;
    use proptest::prelude::*;

    #[test]
    fn test_acquire_until_exhausted() {
        let mut pool = ObjectPool::new(3);
        assert!(pool.acquire().is_some());
        assert!(pool.acquire().is_some());
        assert!(pool.acquire().is_some());
        assert_eq!(pool.active_count(), 3);
        // Exhausted: explicit refusal, no growth
        assert!(pool.acquire().is_none());
        assert_eq!(pool.active_count(), 3);
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut pool = ObjectPool::new(2);
        let h = pool.acquire().unwrap();
        pool.release(h);
        assert_eq!(pool.active_count(), 0);
        // Second release of the same handle changes nothing
        pool.release(h);
        assert_eq!(pool.active_count(), 0);
        assert!(pool.get(h).is_none());
    }

    #[test]
    fn test_release_frees_capacity() {
        let mut pool = ObjectPool::new(1);
        let h = pool.acquire().unwrap();
        assert!(pool.acquire().is_none());
        pool.release(h);
        assert!(pool.acquire().is_some());
    }

    #[test]
    fn test_acquisition_order_preserved() {
        let mut pool = ObjectPool::new(4);
        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        let c = pool.acquire().unwrap();
        pool.get_mut(a).unwrap().pos = Vec2::new(1.0, 0.0);
        pool.get_mut(b).unwrap().pos = Vec2::new(2.0, 0.0);
        pool.get_mut(c).unwrap().pos = Vec2::new(3.0, 0.0);

        // Releasing the middle entry keeps the others in order
        pool.release(b);
        let xs: Vec<f32> = pool.iter_active().map(|o| o.pos.x).collect();
        assert_eq!(xs, vec![1.0, 3.0]);

        // A recycled slot joins at the back regardless of slot index
        let d = pool.acquire().unwrap();
        pool.get_mut(d).unwrap().pos = Vec2::new(4.0, 0.0);
        let xs: Vec<f32> = pool.iter_active().map(|o| o.pos.x).collect();
        assert_eq!(xs, vec![1.0, 3.0, 4.0]);
    }

    #[test]
    fn test_release_all() {
        let mut pool = ObjectPool::new(3);
        for _ in 0..3 {
            pool.acquire();
        }
        pool.release_all();
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.iter_active().count(), 0);
        assert!(pool.acquire().is_some());
    }

    #[test]
    fn test_slot_contents_survive_until_release() {
        let mut pool = ObjectPool::new(2);
        let h = pool.acquire().unwrap();
        pool.get_mut(h).unwrap().kind = ObjectKind::Bomb;
        assert_eq!(pool.get(h).unwrap().kind, ObjectKind::Bomb);
    }

    proptest! {
        /// Arbitrary acquire/release interleavings never exceed capacity and
        /// never corrupt the active count.
        #[test]
        fn prop_active_never_exceeds_capacity(ops in prop::collection::vec(0u8..4, 0..200)) {
            let mut pool = ObjectPool::new(5);
            let mut handles: Vec<Handle> = Vec::new();
            for op in ops {
                match op {
                    0 | 1 => {
                        if let Some(h) = pool.acquire() {
                            handles.push(h);
                        }
                    }
                    2 => {
                        if let Some(h) = handles.pop() {
                            pool.release(h);
                        }
                    }
                    _ => {
                        // Double-release an already returned handle
                        if let Some(&h) = handles.first() {
                            pool.release(h);
                            handles.retain(|&x| x != h);
                        }
                    }
                }
                prop_assert!(pool.active_count() <= pool.capacity());
                prop_assert_eq!(pool.active_count(), pool.iter_active().count());
            }
        }
    }
}
