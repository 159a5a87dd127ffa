use std::sync::atomic::{AtomicU32, Ordering};

use super::arena::{NodeArena, NIL};

// -------------------------------------------------------------------------------------------------

/// Lock-free LIFO stack of arena nodes.
///
/// All operations are a single successful atomic operation on the head, so whole node chains
/// get published or adopted at once. Publishing uses release, adopting acquire semantics: node
/// values written before a push are visible to the thread which pops them.
///
/// `pop_front` is not ABA safe when multiple threads pop concurrently. Each stack thus must have
/// at most one popping thread, while any number of threads may push.
pub(crate) struct AtomicStack {
    head: AtomicU32,
}

impl AtomicStack {
    pub const fn new() -> Self {
        Self {
            head: AtomicU32::new(NIL),
        }
    }

    /// Create a stack which owns the chain starting at `first`.
    pub const fn with_chain(first: u32) -> Self {
        Self {
            head: AtomicU32::new(first),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == NIL
    }

    /// Push a single node, which must be owned by the caller.
    pub fn push_front<T>(&self, arena: &NodeArena<T>, node: u32) {
        self.push_chain(arena, node, node);
    }

    /// Push a `NIL` terminated chain of nodes, which must be owned by the caller.
    pub fn push_multiple<T>(&self, arena: &NodeArena<T>, first: u32) {
        if first == NIL {
            return;
        }
        let mut last = first;
        loop {
            let next = arena.next(last);
            if next == NIL {
                break;
            }
            last = next;
        }
        self.push_chain(arena, first, last);
    }

    /// Push a chain of nodes from `first` to `last`, which must be owned by the caller.
    pub fn push_chain<T>(&self, arena: &NodeArena<T>, first: u32, last: u32) {
        debug_assert!(first != NIL && last != NIL, "Can't push empty chains");
        let mut head = self.head.load(Ordering::Relaxed);
        loop {
            arena.set_next(last, head);
            match self.head.compare_exchange_weak(
                head,
                first,
                Ordering::Release,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(current) => head = current,
            }
        }
    }

    /// Pop the first node. The popped node is owned by the caller afterwards.
    pub fn pop_front<T>(&self, arena: &NodeArena<T>) -> Option<u32> {
        let mut head = self.head.load(Ordering::Acquire);
        loop {
            if head == NIL {
                return None;
            }
            let next = arena.next(head);
            match self.head.compare_exchange_weak(
                head,
                next,
                Ordering::Acquire,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    arena.set_next(head, NIL);
                    return Some(head);
                }
                Err(current) => head = current,
            }
        }
    }

    /// Pop all nodes at once. Returns the first node of the popped chain or `NIL`.
    pub fn pop_all(&self) -> u32 {
        self.head.swap(NIL, Ordering::Acquire)
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn collect<T>(arena: &NodeArena<T>, first: u32) -> Vec<u32> {
        let mut nodes = Vec::new();
        let mut node = first;
        while node != NIL {
            nodes.push(node);
            node = arena.next(node);
        }
        nodes
    }

    #[test]
    fn push_and_pop() {
        let arena = NodeArena::<()>::new(4);
        let stack = AtomicStack::new();
        assert!(stack.is_empty());
        assert_eq!(stack.pop_front(&arena), None);

        stack.push_front(&arena, 2);
        stack.push_front(&arena, 0);
        assert!(!stack.is_empty());
        assert_eq!(stack.pop_front(&arena), Some(0));
        assert_eq!(stack.pop_front(&arena), Some(2));
        assert_eq!(stack.pop_front(&arena), None);
    }

    #[test]
    fn pop_all_returns_whole_chain() {
        let arena = NodeArena::<()>::new(4);
        let stack = AtomicStack::with_chain(arena.chain_all());
        assert_eq!(stack.pop_front(&arena), Some(0));

        let chain = stack.pop_all();
        assert!(stack.is_empty());
        assert_eq!(collect(&arena, chain), vec![1, 2, 3]);

        // pushing a popped chain back restores the stack
        stack.push_multiple(&arena, chain);
        assert_eq!(collect(&arena, stack.pop_all()), vec![1, 2, 3]);

        // chains go in front of existing nodes
        stack.push_front(&arena, 0);
        arena.set_next(1, 2);
        arena.set_next(2, NIL);
        stack.push_multiple(&arena, 1);
        assert_eq!(collect(&arena, stack.pop_all()), vec![1, 2, 0]);

        stack.push_multiple(&arena, NIL);
        assert_eq!(stack.pop_all(), NIL);
    }
}
