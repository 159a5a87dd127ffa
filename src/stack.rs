//! Lock-free handoff of grains from a control thread to the audio thread.
//!
//! A fixed number of nodes gets allocated upfront and circulates between three stacks: the
//! producer pops free nodes from `inactive`, fills them and pushes them onto `added`. The
//! consumer adopts all `added` nodes into its thread local `active` list at the start of each
//! block, renders them and returns the depleted ones to `inactive`. The consumer performs two
//! atomic operations per block, independent of the number of grains.

use std::sync::Arc;

use crate::Error;

// -------------------------------------------------------------------------------------------------

mod arena;
mod atomic;
mod list;

use arena::{NodeArena, MAX_NODES, NIL};
use atomic::AtomicStack;
use list::NodeList;

// -------------------------------------------------------------------------------------------------

struct Shared<T> {
    arena: NodeArena<T>,
    inactive: AtomicStack,
    added: AtomicStack,
}

/// Create a new producer and consumer pair which can pass up to `capacity` values at once.
///
/// All memory is allocated here: neither side allocates afterwards.
pub fn grain_queue<T: Send>(
    capacity: usize,
) -> Result<(GrainProducer<T>, GrainConsumer<T>), Error> {
    if capacity == 0 || capacity >= MAX_NODES {
        return Err(Error::ConfigError(format!(
            "Queue capacity must be > 0 and < {MAX_NODES}"
        )));
    }
    let arena = NodeArena::new(capacity);
    let inactive = AtomicStack::with_chain(arena.chain_all());
    let shared = Arc::new(Shared {
        arena,
        inactive,
        added: AtomicStack::new(),
    });
    log::debug!("Created grain queue with {capacity} nodes");
    Ok((
        GrainProducer {
            shared: Arc::clone(&shared),
        },
        GrainConsumer {
            shared,
            active: NodeList::new(),
            removed: NodeList::new(),
        },
    ))
}

// -------------------------------------------------------------------------------------------------

/// Control side of a [`grain_queue`]: creates new values. Lock-free and allocation-free.
pub struct GrainProducer<T> {
    shared: Arc<Shared<T>>,
}

impl<T: Send> GrainProducer<T> {
    /// Total number of nodes in the queue.
    pub fn capacity(&self) -> usize {
        self.shared.arena.len()
    }

    /// True when all nodes are in use, so pushing would fail.
    pub fn is_full(&self) -> bool {
        self.shared.inactive.is_empty()
    }

    /// Hand a value over to the consumer. Returns the value back when no node is available.
    pub fn push(&mut self, value: T) -> Result<(), T> {
        let shared = &*self.shared;
        let Some(node) = shared.inactive.pop_front(&shared.arena) else {
            return Err(value);
        };
        // SAFETY: popped from inactive, so we own the node until we push it
        unsafe { *shared.arena.value_mut(node) = Some(value) };
        shared.added.push_front(&shared.arena, node);
        Ok(())
    }

    /// Hand over as many values from `values` as there are free nodes, publishing all of them
    /// with a single atomic operation. Returns the number of pushed values.
    ///
    /// Stops consuming `values` when running out of nodes.
    pub fn push_batch<I: IntoIterator<Item = T>>(&mut self, values: I) -> usize {
        let shared = &*self.shared;
        let mut first = NIL;
        let mut last = NIL;
        let mut count = 0;
        let mut values = values.into_iter();
        while !shared.inactive.is_empty() {
            let Some(value) = values.next() else {
                break;
            };
            let Some(node) = shared.inactive.pop_front(&shared.arena) else {
                break;
            };
            // SAFETY: popped from inactive, so we own the node until we push it
            unsafe { *shared.arena.value_mut(node) = Some(value) };
            shared.arena.set_next(node, first);
            if last == NIL {
                last = node;
            }
            first = node;
            count += 1;
        }
        if first != NIL {
            shared.added.push_chain(&shared.arena, first, last);
        }
        count
    }
}

// -------------------------------------------------------------------------------------------------

/// Audio side of a [`grain_queue`]: processes and removes values. Lock-free and allocation-free.
///
/// Values get dropped on the consumer's thread when they are removed.
pub struct GrainConsumer<T> {
    shared: Arc<Shared<T>>,
    active: NodeList,
    removed: NodeList,
}

impl<T: Send> GrainConsumer<T> {
    /// Total number of nodes in the queue.
    pub fn capacity(&self) -> usize {
        self.shared.arena.len()
    }

    /// Number of values adopted by the consumer.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.len() == 0
    }

    /// Adopt all newly pushed values, then call `f` for every value and remove those for which
    /// `f` returns false. Returns the number of values still alive.
    pub fn process<F: FnMut(&mut T) -> bool>(&mut self, mut f: F) -> usize {
        let arena = &self.shared.arena;

        self.active
            .push_multiple(arena, self.shared.added.pop_all());

        self.active.retain(
            arena,
            |node| {
                // SAFETY: nodes in the active list are owned by the consumer
                let value = unsafe { arena.value_mut(node) };
                let keep = value.as_mut().is_some_and(&mut f);
                if !keep {
                    *value = None;
                }
                keep
            },
            &mut self.removed,
        );

        self.shared
            .inactive
            .push_multiple(arena, self.removed.pop_all());

        self.active.len()
    }

    /// Remove all values, including those which were pushed but not adopted yet.
    pub fn clear(&mut self) {
        self.process(|_| false);
    }
}

// -------------------------------------------------------------------------------------------------
