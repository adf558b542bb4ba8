//! Singly-linked bucket chains whose nodes live in a shared `SlotMap` arena.
//!
//! A `Chain` is just `(head, tail, len)`; every operation takes the arena
//! that owns the nodes. All chains of one `ChainedTable` share a single
//! arena, so rehashing relinks nodes instead of moving keys and values.

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    pub(crate) struct NodeKey;
}

#[derive(Debug)]
pub(crate) struct Node<V> {
    pub(crate) key: String,
    pub(crate) value: V,
    pub(crate) hash: u64,
    next: Option<NodeKey>,
}

impl<V> Node<V> {
    pub(crate) fn new(key: String, value: V, hash: u64) -> Self {
        Self {
            key,
            value,
            hash,
            next: None,
        }
    }
}

pub(crate) type Nodes<V> = SlotMap<NodeKey, Node<V>>;

#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct Chain {
    head: Option<NodeKey>,
    tail: Option<NodeKey>,
    len: usize,
}

impl Chain {
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Node holding `key`, if any.
    pub(crate) fn find<V>(&self, nodes: &Nodes<V>, hash: u64, key: &str) -> Option<NodeKey> {
        let mut cur = self.head;
        while let Some(k) = cur {
            let node = nodes.get(k)?;
            if node.hash == hash && node.key == key {
                return Some(k);
            }
            cur = node.next;
        }
        None
    }

    /// Allocate `node` in the arena and append it at the tail.
    pub(crate) fn push_back<V>(&mut self, nodes: &mut Nodes<V>, node: Node<V>) -> NodeKey {
        let k = nodes.insert(node);
        self.link_back(nodes, k);
        k
    }

    /// Append an already-allocated node. Its old `next` link is discarded.
    pub(crate) fn link_back<V>(&mut self, nodes: &mut Nodes<V>, k: NodeKey) {
        if let Some(node) = nodes.get_mut(k) {
            node.next = None;
        }
        match self.tail.and_then(|t| nodes.get_mut(t)) {
            Some(tail) => tail.next = Some(k),
            None => self.head = Some(k),
        }
        self.tail = Some(k);
        self.len += 1;
    }

    /// Unlink and free the node holding `key`.
    pub(crate) fn remove<V>(&mut self, nodes: &mut Nodes<V>, hash: u64, key: &str) -> Option<Node<V>> {
        let mut prev: Option<NodeKey> = None;
        let mut cur = self.head;
        while let Some(k) = cur {
            let node = nodes.get(k)?;
            let next = node.next;
            if node.hash == hash && node.key == key {
                match prev.and_then(|p| nodes.get_mut(p)) {
                    Some(p) => p.next = next,
                    None => self.head = next,
                }
                if self.tail == Some(k) {
                    self.tail = prev;
                }
                self.len -= 1;
                return nodes.remove(k);
            }
            prev = cur;
            cur = next;
        }
        None
    }

    /// Node keys in chain order. Collected up front so callers may relink.
    pub(crate) fn keys<V>(&self, nodes: &Nodes<V>) -> Vec<NodeKey> {
        let mut out = Vec::with_capacity(self.len);
        let mut cur = self.head;
        while let Some(k) = cur {
            out.push(k);
            cur = nodes.get(k).and_then(|n| n.next);
        }
        out
    }

    pub(crate) fn iter<'a, V>(&self, nodes: &'a Nodes<V>) -> ChainIter<'a, V> {
        ChainIter {
            nodes,
            cur: self.head,
        }
    }
}

/// Forward iterator over the nodes of one chain.
pub(crate) struct ChainIter<'a, V> {
    nodes: &'a Nodes<V>,
    cur: Option<NodeKey>,
}

impl<'a, V> Iterator for ChainIter<'a, V> {
    type Item = &'a Node<V>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let node = self.nodes.get(self.cur?)?;
        self.cur = node.next;
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys_of(chain: &Chain, nodes: &Nodes<i32>) -> Vec<String> {
        chain.iter(nodes).map(|n| n.key.clone()).collect()
    }

    #[test]
    fn push_back_keeps_insertion_order() {
        let mut nodes: Nodes<i32> = SlotMap::with_key();
        let mut c = Chain::default();
        for (i, k) in ["a", "b", "c"].iter().enumerate() {
            c.push_back(&mut nodes, Node::new(k.to_string(), i as i32, 0));
        }
        assert_eq!(c.len(), 3);
        assert_eq!(keys_of(&c, &nodes), ["a", "b", "c"]);
        assert!(c.find(&nodes, 0, "b").is_some());
        assert!(c.find(&nodes, 0, "z").is_none());
        // Hash mismatch short-circuits even when the key text matches.
        assert!(c.find(&nodes, 1, "b").is_none());
    }

    #[test]
    fn remove_head_middle_and_tail() {
        let mut nodes: Nodes<i32> = SlotMap::with_key();
        let mut c = Chain::default();
        for k in ["a", "b", "c", "d"] {
            c.push_back(&mut nodes, Node::new(k.to_string(), 0, 0));
        }

        assert_eq!(c.remove(&mut nodes, 0, "b").map(|n| n.key), Some("b".to_string()));
        assert_eq!(keys_of(&c, &nodes), ["a", "c", "d"]);

        assert!(c.remove(&mut nodes, 0, "a").is_some());
        assert_eq!(keys_of(&c, &nodes), ["c", "d"]);

        assert!(c.remove(&mut nodes, 0, "d").is_some());
        assert_eq!(keys_of(&c, &nodes), ["c"]);

        // Tail was fixed up: appending lands after "c".
        c.push_back(&mut nodes, Node::new("e".to_string(), 0, 0));
        assert_eq!(keys_of(&c, &nodes), ["c", "e"]);

        assert!(c.remove(&mut nodes, 0, "missing").is_none());
        assert_eq!(c.len(), 2);
        assert_eq!(nodes.len(), 2);
    }

    #[test]
    fn remove_only_node_empties_chain() {
        let mut nodes: Nodes<i32> = SlotMap::with_key();
        let mut c = Chain::default();
        c.push_back(&mut nodes, Node::new("x".to_string(), 1, 9));
        let removed = c.remove(&mut nodes, 9, "x").unwrap();
        assert_eq!(removed.value, 1);
        assert!(c.is_empty());
        assert!(c.iter(&nodes).next().is_none());
        c.push_back(&mut nodes, Node::new("y".to_string(), 2, 9));
        assert_eq!(keys_of(&c, &nodes), ["y"]);
    }

    #[test]
    fn relinking_moves_nodes_between_chains() {
        let mut nodes: Nodes<i32> = SlotMap::with_key();
        let mut src = Chain::default();
        for k in ["a", "b", "c"] {
            src.push_back(&mut nodes, Node::new(k.to_string(), 0, 0));
        }
        let mut even = Chain::default();
        let mut odd = Chain::default();
        for (i, k) in src.keys(&nodes).into_iter().enumerate() {
            if i % 2 == 0 {
                even.link_back(&mut nodes, k);
            } else {
                odd.link_back(&mut nodes, k);
            }
        }
        assert_eq!(keys_of(&even, &nodes), ["a", "c"]);
        assert_eq!(keys_of(&odd, &nodes), ["b"]);
        assert_eq!(nodes.len(), 3);
    }
}
