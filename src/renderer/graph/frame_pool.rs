//! Frame-Scoped Pools
//!
//! Per-frame collections that are rebuilt every frame but must not allocate
//! in steady state. Records are built once by a factory and then recycled:
//! a reset only rewinds a cursor, it never drops records.
//!
//! | Pool | Hands out | Reset |
//! |------|-----------|-------|
//! | [`RecyclePool`] | `add()` → next record, logical length grows | length → 0 |
//! | [`FramePool`] | `alloc()` → next resource from a ring | cursor → 0 |
//!
//! Both grow by doubling when exhausted. Both bump a generation counter on
//! reset. Records are only reachable through `&mut` borrows of the pool, so
//! nothing handed out before a reset can be used after it.

/// A growable list of recycled records with a logical length.
pub struct RecyclePool<T> {
    data: Vec<T>,
    len: usize,
    generation: u64,
    factory: fn() -> T,
}

impl<T> RecyclePool<T> {
    /// Pre-builds `capacity` records with `factory`.
    pub fn new(factory: fn() -> T, capacity: usize) -> Self {
        let mut data = Vec::with_capacity(capacity);
        data.resize_with(capacity, factory);
        Self {
            data,
            len: 0,
            generation: 0,
            factory,
        }
    }

    /// Returns the next record, growing the backing store when full.
    ///
    /// The record keeps whatever it held last frame; callers overwrite it.
    pub fn add(&mut self) -> &mut T {
        if self.len == self.data.len() {
            let grow = self.data.len().max(1);
            log::trace!("RecyclePool grows {} -> {}", self.data.len(), self.data.len() + grow);
            self.data.reserve(grow);
            for _ in 0..grow {
                self.data.push((self.factory)());
            }
        }
        let idx = self.len;
        self.len += 1;
        &mut self.data[idx]
    }

    pub fn reset(&mut self) {
        self.len = 0;
        self.generation = self.generation.wrapping_add(1);
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of records built so far.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data[..self.len]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data[..self.len]
    }
}

/// A ring of reusable resources handed out one per `alloc()`.
pub struct FramePool<T> {
    data: Vec<T>,
    cursor: usize,
    generation: u64,
    factory: Box<dyn Fn() -> T + Send + Sync>,
}

impl<T> FramePool<T> {
    pub fn new(factory: impl Fn() -> T + Send + Sync + 'static, size: usize) -> Self {
        let mut data = Vec::with_capacity(size);
        data.resize_with(size, &factory);
        Self {
            data,
            cursor: 0,
            generation: 0,
            factory: Box::new(factory),
        }
    }

    /// Hands out the next resource, growing the ring when exhausted.
    pub fn alloc(&mut self) -> &mut T {
        if self.cursor == self.data.len() {
            let grow = self.data.len().max(1);
            log::trace!("FramePool grows {} -> {}", self.data.len(), self.data.len() + grow);
            self.data.reserve(grow);
            for _ in 0..grow {
                self.data.push((self.factory)());
            }
        }
        let idx = self.cursor;
        self.cursor += 1;
        &mut self.data[idx]
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Resources handed out since the last reset.
    #[inline]
    #[must_use]
    pub fn active(&self) -> &[T] {
        &self.data[..self.cursor]
    }

    #[inline]
    pub fn active_mut(&mut self) -> &mut [T] {
        &mut self.data[..self.cursor]
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.cursor
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recycle_pool_reuses_records_after_reset() {
        let mut pool: RecyclePool<u32> = RecyclePool::new(|| 0, 2);
        *pool.add() = 7;
        *pool.add() = 8;
        assert_eq!(pool.as_slice(), &[7, 8]);

        pool.reset();
        assert!(pool.is_empty());
        assert_eq!(pool.generation(), 1);
        // Stale contents are visible until overwritten; no new records built.
        assert_eq!(*pool.add(), 7);
        assert_eq!(pool.capacity(), 2);
    }

    #[test]
    fn recycle_pool_doubles_when_full() {
        let mut pool: RecyclePool<u32> = RecyclePool::new(|| 0, 2);
        for i in 0..3 {
            *pool.add() = i;
        }
        assert_eq!(pool.capacity(), 4);
        assert_eq!(pool.as_slice(), &[0, 1, 2]);
    }

    #[test]
    fn zero_capacity_pools_grow() {
        let mut pool: RecyclePool<u8> = RecyclePool::new(|| 0, 0);
        pool.add();
        assert_eq!(pool.capacity(), 1);

        let mut ring: FramePool<u8> = FramePool::new(|| 0, 0);
        ring.alloc();
        assert_eq!(ring.capacity(), 1);
    }

    #[test]
    fn frame_pool_rewinds_without_building() {
        let mut pool = FramePool::new(Vec::<u32>::new, 2);
        pool.alloc().push(1);
        pool.alloc().push(2);
        assert_eq!(pool.len(), 2);

        pool.reset();
        assert!(pool.active().is_empty());
        let first = pool.alloc();
        assert_eq!(first, &vec![1]);
        assert_eq!(pool.capacity(), 2);
        assert_eq!(pool.generation(), 1);
    }
}
