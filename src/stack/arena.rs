use std::{
    cell::UnsafeCell,
    sync::atomic::{AtomicU32, Ordering},
};

use assume::assume;

// -------------------------------------------------------------------------------------------------

/// Index which terminates a node chain.
pub(crate) const NIL: u32 = u32::MAX;

/// Largest number of nodes an arena can hold.
pub(crate) const MAX_NODES: usize = NIL as usize;

// -------------------------------------------------------------------------------------------------

struct Node<T> {
    next: AtomicU32,
    value: UnsafeCell<Option<T>>,
}

/// Fixed size storage for stack nodes, which link to each other via indices.
///
/// A node is owned by exactly one list or stack at any time. Only the owner of a node may touch
/// its value. Links are atomic, so stacks can be traversed while other threads push onto them.
pub(crate) struct NodeArena<T> {
    nodes: Box<[Node<T>]>,
}

// Node values are only ever accessed by the owner of the node.
unsafe impl<T: Send> Sync for NodeArena<T> {}

impl<T> NodeArena<T> {
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity < MAX_NODES, "Arena capacity exceeds the index range");
        let nodes = (0..capacity.min(MAX_NODES - 1))
            .map(|_| Node {
                next: AtomicU32::new(NIL),
                value: UnsafeCell::new(None),
            })
            .collect();
        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Link all nodes into a single chain and return its first node.
    pub fn chain_all(&self) -> u32 {
        let len = self.nodes.len() as u32;
        for index in 0..len {
            let next = if index + 1 < len { index + 1 } else { NIL };
            self.set_next(index, next);
        }
        if len > 0 {
            0
        } else {
            NIL
        }
    }

    #[inline]
    pub fn next(&self, index: u32) -> u32 {
        self.node(index).next.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_next(&self, index: u32, next: u32) {
        self.node(index).next.store(next, Ordering::Relaxed);
    }

    /// Access the value of a node.
    ///
    /// # Safety
    /// The caller must own the node: it got popped from a shared stack by the caller, or it is
    /// part of a list which only the calling thread accesses.
    #[inline]
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn value_mut(&self, index: u32) -> &mut Option<T> {
        unsafe { &mut *self.node(index).value.get() }
    }

    #[inline]
    fn node(&self, index: u32) -> &Node<T> {
        assume!(
            unsafe: (index as usize) < self.nodes.len(),
            "Node indices only get created by the arena"
        );
        &self.nodes[index as usize]
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chains_all_nodes() {
        let arena = NodeArena::<u8>::new(3);
        assert_eq!(arena.len(), 3);
        let first = arena.chain_all();
        assert_eq!(first, 0);
        assert_eq!(arena.next(0), 1);
        assert_eq!(arena.next(1), 2);
        assert_eq!(arena.next(2), NIL);

        let empty = NodeArena::<u8>::new(0);
        assert_eq!(empty.chain_all(), NIL);
    }

    #[test]
    fn node_values() {
        let arena = NodeArena::new(2);
        unsafe {
            *arena.value_mut(1) = Some("one");
            assert_eq!(*arena.value_mut(0), None);
            assert_eq!(arena.value_mut(1).take(), Some("one"));
        }
    }
}
