use super::arena::{NodeArena, NIL};

// -------------------------------------------------------------------------------------------------

/// Singly linked list of arena nodes which is owned and accessed by a single thread.
pub(crate) struct NodeList {
    head: u32,
    len: usize,
}

impl NodeList {
    pub const fn new() -> Self {
        Self { head: NIL, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn push_front<T>(&mut self, arena: &NodeArena<T>, node: u32) {
        arena.set_next(node, self.head);
        self.head = node;
        self.len += 1;
    }

    /// Prepend a `NIL` terminated chain of nodes.
    pub fn push_multiple<T>(&mut self, arena: &NodeArena<T>, first: u32) {
        if first == NIL {
            return;
        }
        let mut last = first;
        self.len += 1;
        loop {
            let next = arena.next(last);
            if next == NIL {
                break;
            }
            last = next;
            self.len += 1;
        }
        arena.set_next(last, self.head);
        self.head = first;
    }

    /// Unlink all nodes. Returns the first node of the chain or `NIL`.
    pub fn pop_all(&mut self) -> u32 {
        self.len = 0;
        std::mem::replace(&mut self.head, NIL)
    }

    /// Visit all nodes in list order and move those for which `keep` returns false into
    /// `removed`.
    pub fn retain<T, F: FnMut(u32) -> bool>(
        &mut self,
        arena: &NodeArena<T>,
        mut keep: F,
        removed: &mut NodeList,
    ) {
        let mut prev = NIL;
        let mut node = self.head;
        while node != NIL {
            let next = arena.next(node);
            if keep(node) {
                prev = node;
            } else {
                if prev == NIL {
                    self.head = next;
                } else {
                    arena.set_next(prev, next);
                }
                self.len -= 1;
                removed.push_front(arena, node);
            }
            node = next;
        }
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes<T>(arena: &NodeArena<T>, list: &mut NodeList) -> Vec<u32> {
        let mut nodes = Vec::new();
        let first = list.pop_all();
        let mut node = first;
        while node != NIL {
            nodes.push(node);
            node = arena.next(node);
        }
        list.push_multiple(arena, first);
        nodes
    }

    #[test]
    fn push_and_retain() {
        let arena = NodeArena::<()>::new(6);
        let mut list = NodeList::new();
        let mut removed = NodeList::new();

        list.push_multiple(&arena, arena.chain_all());
        assert_eq!(list.len(), 6);
        assert_eq!(nodes(&arena, &mut list), vec![0, 1, 2, 3, 4, 5]);

        // remove the first, a middle and the last node
        let mut visited = Vec::new();
        list.retain(
            &arena,
            |node| {
                visited.push(node);
                !matches!(node, 0 | 3 | 5)
            },
            &mut removed,
        );
        assert_eq!(visited, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(list.len(), 3);
        assert_eq!(nodes(&arena, &mut list), vec![1, 2, 4]);
        assert_eq!(removed.len(), 3);
        assert_eq!(nodes(&arena, &mut removed), vec![5, 3, 0]);

        list.push_front(&arena, removed.pop_all());
        assert_eq!(removed.len(), 0);
        assert_eq!(list.len(), 4);
        assert_eq!(nodes(&arena, &mut list)[0], 5);
    }
}
