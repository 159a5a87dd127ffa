//! Fixed capacity container for grains which get created and rendered on the same thread.

// -------------------------------------------------------------------------------------------------

/// Identifies an element in a [`Pool`].
///
/// Handles get invalidated when their element is popped or removed. A handle never refers to
/// another element than the one it was created for: access via stale handles fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolHandle {
    index: usize,
    stamp: u64,
}

impl PoolHandle {
    /// Current storage index of the handle's element, which may change when other elements get
    /// removed.
    pub fn index(&self) -> usize {
        self.index
    }
}

// -------------------------------------------------------------------------------------------------

#[derive(Debug)]
struct Slot<T> {
    stamp: u64,
    value: T,
}

/// Contiguous, fixed capacity storage which never allocates after creation.
///
/// Removal swaps the last element into the removed element's place, so element order is not
/// stable. Iteration via [`Self::retain_rev`] runs from the last to the first element, which
/// allows removing elements while iterating without visiting any element twice.
///
/// Not thread-safe: use [`crate::grain_queue`] to pass grains between threads.
#[derive(Debug)]
pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    capacity: usize,
    next_stamp: u64,
}

impl<T> Pool<T> {
    /// Create a new pool and allocate storage for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            next_stamp: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.capacity
    }

    /// Append an element. Returns the element back when the pool is full.
    pub fn push(&mut self, value: T) -> Result<PoolHandle, T> {
        if self.is_full() {
            return Err(value);
        }
        let stamp = self.next_stamp;
        self.next_stamp = self.next_stamp.wrapping_add(1);
        let index = self.slots.len();
        self.slots.push(Slot { stamp, value });
        Ok(PoolHandle { index, stamp })
    }

    /// Access the element of the given handle, if it still is alive.
    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        self.slots
            .get(handle.index)
            .filter(|slot| slot.stamp == handle.stamp)
            .map(|slot| &slot.value)
    }

    /// Mutable access to the element of the given handle, if it still is alive.
    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index)
            .filter(|slot| slot.stamp == handle.stamp)
            .map(|slot| &mut slot.value)
    }

    /// Remove the element of the given handle. The last element takes its place.
    pub fn pop(&mut self, handle: PoolHandle) -> Option<T> {
        self.get(handle)?;
        Some(self.slots.swap_remove(handle.index).value)
    }

    /// Visit all elements from last to first and remove those for which `f` returns false.
    pub fn retain_rev<F: FnMut(&mut T) -> bool>(&mut self, mut f: F) {
        let mut index = self.slots.len();
        while index > 0 {
            index -= 1;
            if !f(&mut self.slots[index].value) {
                // moves an already visited element into `index`
                self.slots.swap_remove(index);
            }
        }
    }

    /// Iterate over all elements from last to first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().rev().map(|slot| &slot.value)
    }

    /// Mutably iterate over all elements from last to first.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().rev().map(|slot| &mut slot.value)
    }

    /// Remove all elements.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{rngs::SmallRng, Rng, SeedableRng};

    #[test]
    fn capacity() {
        let mut pool = Pool::with_capacity(3);
        assert!(pool.is_empty());
        for i in 0..3 {
            assert!(pool.push(i).is_ok());
        }
        assert!(pool.is_full());
        assert_eq!(pool.push(3), Err(3));
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.capacity(), 3);

        let mut pool = Pool::with_capacity(0);
        assert_eq!(pool.push("a"), Err("a"));
    }

    #[test]
    fn handles() {
        let mut pool = Pool::with_capacity(4);
        let a = pool.push('a').unwrap();
        let b = pool.push('b').unwrap();
        let c = pool.push('c').unwrap();
        assert_eq!(pool.get(b), Some(&'b'));

        // remove from the middle: 'c' moves into b's place
        assert_eq!(pool.pop(b), Some('b'));
        assert_eq!(pool.get(b), None);
        assert_eq!(pool.pop(b), None);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.get(a), Some(&'a'));

        // c's handle is stale now, as its element moved
        assert_eq!(pool.get(c), None);

        // reused slots do not revive stale handles
        let d = pool.push('d').unwrap();
        assert_eq!(d.index(), c.index());
        assert_eq!(pool.get(c), None);
        assert_eq!(pool.get(d), Some(&'d'));

        *pool.get_mut(d).unwrap() = 'e';
        assert_eq!(pool.pop(d), Some('e'));
        assert_eq!(pool.pop(a), Some('a'));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn retain_rev_visits_each_element_once() {
        let mut pool = Pool::with_capacity(16);
        for i in 0..10 {
            pool.push(i).unwrap();
        }
        let mut visited = Vec::new();
        pool.retain_rev(|value| {
            visited.push(*value);
            *value % 3 != 0
        });
        assert_eq!(visited, (0..10).rev().collect::<Vec<_>>());

        let mut remaining = pool.iter().copied().collect::<Vec<_>>();
        remaining.sort();
        assert_eq!(remaining, vec![1, 2, 4, 5, 7, 8]);

        for value in pool.iter_mut() {
            *value *= 10;
        }
        assert!(pool.iter().all(|v| *v % 10 == 0));

        pool.retain_rev(|_| false);
        assert!(pool.is_empty());
    }

    #[test]
    fn random_operations() {
        const CAPACITY: usize = 32;
        let mut rng = SmallRng::seed_from_u64(0x5eed);
        let mut pool = Pool::with_capacity(CAPACITY);
        let mut handles: Vec<(PoolHandle, u32)> = Vec::new();
        let mut stale: Vec<PoolHandle> = Vec::new();
        let mut next_value = 0u32;

        for _ in 0..2_000 {
            match rng.random_range(0..4) {
                0 | 1 => match pool.push(next_value) {
                    Ok(handle) => {
                        handles.push((handle, next_value));
                        next_value += 1;
                    }
                    Err(value) => {
                        assert_eq!(value, next_value);
                        assert_eq!(pool.len(), CAPACITY);
                    }
                },
                2 if !handles.is_empty() => {
                    let (handle, value) = handles.swap_remove(rng.random_range(0..handles.len()));
                    assert_eq!(pool.pop(handle), Some(value));
                    stale.push(handle);
                    // popping may have moved another element: refresh its handle
                    handles.retain(|(handle, _)| pool.get(*handle).is_some());
                }
                _ => {
                    let threshold = rng.random_range(0..=next_value.max(1));
                    pool.retain_rev(|value| *value >= threshold);
                    // moved elements get new indices: forget their handles
                    handles.retain(|(handle, value)| {
                        *value >= threshold && pool.get(*handle).is_some()
                    });
                }
            }
            assert!(pool.len() <= CAPACITY);
            for (handle, value) in &handles {
                assert_eq!(pool.get(*handle), Some(value));
            }
            for handle in &stale {
                assert_eq!(pool.get(*handle), None);
            }
            // alive values are unique
            let mut values = pool.iter().copied().collect::<Vec<_>>();
            values.sort();
            values.dedup();
            assert_eq!(values.len(), pool.len());
        }
    }
}
