use bytes::BufMut;
use tracing::debug;

use super::iter::PrefixIter;
use super::key::{KeyProbe, TreeKey};
use super::node::well_formed::{check_tree, MalformedTree};
use super::node::{
    recursive_completion, recursive_find, recursive_insert, recursive_mut_find,
    recursive_remove, RadixNode,
};
use crate::errors::{ErrorKind, Result};

/// A compressed trie mapping byte-string keys to values.
///
/// Chains of single-child nodes are merged into one multi-byte edge, and
/// removals compact the tree again so that no branch point outlives the
/// keys that needed it.
///
/// ```
/// use symtrie::RadixTree;
///
/// let mut tree = RadixTree::new();
/// tree.insert("car", 1).unwrap();
/// tree.insert("cat", 2).unwrap();
///
/// assert_eq!(tree.get("car"), Some(&1));
/// assert_eq!(tree.get("ca"), None);
/// ```
#[derive(Debug, Clone)]
pub struct RadixTree<V> {
    size: usize,
    root: RadixNode<V>,
}

impl<V> RadixTree<V> {
    pub fn new() -> Self {
        RadixTree {
            size: 0,
            root: RadixNode::root(),
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn clear(&mut self) {
        self.teardown();
        self.size = 0;
    }

    pub fn contains_key<Q: ?Sized>(&self, key: &Q) -> bool
    where
        Q: TreeKey,
    {
        self.get(key).is_some()
    }

    pub fn get<Q: ?Sized>(&self, key: &Q) -> Option<&V>
    where
        Q: TreeKey,
    {
        recursive_find(&self.root, KeyProbe::new(key))
    }

    pub fn get_mut<Q: ?Sized>(&mut self, key: &Q) -> Option<&mut V>
    where
        Q: TreeKey,
    {
        recursive_mut_find(&mut self.root, KeyProbe::new(key))
    }

    /// Stores `value` under `key`, returning the value previously stored
    /// there.
    ///
    /// The empty key is rejected: the root of the tree is never a leaf.
    pub fn insert<Q: ?Sized>(&mut self, key: &Q, value: V) -> Result<Option<V>>
    where
        Q: TreeKey,
    {
        let probe = KeyProbe::new(key);
        if probe.is_empty() {
            debug!("rejected insert of the empty key");
            bail!(ErrorKind::EmptyKey);
        }

        let old_value = recursive_insert(&mut self.root, probe, value);

        if old_value.is_none() {
            self.size += 1;
        }

        Ok(old_value)
    }

    pub fn remove<Q: ?Sized>(&mut self, key: &Q) -> Option<V>
    where
        Q: TreeKey,
    {
        let old_value = recursive_remove(&mut self.root, KeyProbe::new(key));

        if old_value.is_some() {
            self.size -= 1;
        }

        old_value
    }

    /// Extends `buf` as far as the stored keys agree.
    ///
    /// When `buf` ends inside an edge of the tree, exactly one path
    /// continues it up to the next branch point or key, and the rest of
    /// that edge is appended. Returns `false` and leaves `buf` alone when
    /// `buf` already ends at a branch point or key, or when no stored key
    /// starts with it.
    pub fn complete<B>(&self, buf: &mut B) -> bool
    where
        B: AsRef<[u8]> + BufMut,
    {
        match recursive_completion(&self.root, KeyProbe::new(buf.as_ref())) {
            Some(rest) => {
                buf.put_slice(rest);
                true
            }
            None => false,
        }
    }

    /// Like [`complete`](RadixTree::complete), but fails without touching
    /// `buf` if the completed key would be longer than `capacity` bytes.
    pub fn complete_within<B>(&self, buf: &mut B, capacity: usize) -> Result<bool>
    where
        B: AsRef<[u8]> + BufMut,
    {
        let current_len = buf.as_ref().len();
        let rest = match recursive_completion(&self.root, KeyProbe::new(buf.as_ref())) {
            Some(rest) => rest,
            None => return Ok(false),
        };

        let required = current_len + rest.len();
        if required > capacity {
            bail!(ErrorKind::CapacityExceeded(required, capacity));
        }

        buf.put_slice(rest);

        Ok(true)
    }

    /// Iterates over every key starting with `prefix`, depth first in
    /// sibling order.
    pub fn iter_prefix<Q: ?Sized>(&self, prefix: &Q) -> PrefixIter<'_, V>
    where
        Q: TreeKey,
    {
        PrefixIter::new(&self.root, prefix.as_bytes())
    }

    pub fn iter(&self) -> PrefixIter<'_, V> {
        PrefixIter::new(&self.root, &[])
    }

    /// Calls `callback` with each key starting with `prefix` and its value,
    /// stopping after `max_results` calls. Returns the number of calls made.
    pub fn prefix_iter<Q: ?Sized, F>(&self, prefix: &Q, max_results: usize, mut callback: F) -> usize
    where
        Q: TreeKey,
        F: FnMut(&[u8], &V),
    {
        let mut produced = 0;

        for (key, value) in self.iter_prefix(prefix).take(max_results) {
            callback(&key, value);
            produced += 1;
        }

        produced
    }

    /// Walks the whole tree and reports the first broken structural
    /// invariant, if any.
    pub fn check_well_formed(&self) -> ::std::result::Result<(), MalformedTree> {
        check_tree(&self.root, self.size)
    }

    // Frees nodes with an explicit stack so that deep trees cannot
    // overflow the call stack.
    fn teardown(&mut self) {
        let mut stack: Vec<_> = self.root.take_children().into_iter().collect();

        while let Some(mut node) = stack.pop() {
            stack.extend(node.take_children());
        }
    }
}

impl<V> Default for RadixTree<V> {
    fn default() -> Self {
        RadixTree::new()
    }
}

impl<V> Drop for RadixTree<V> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<'a, V> IntoIterator for &'a RadixTree<V> {
    type Item = (Vec<u8>, &'a V);
    type IntoIter = PrefixIter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
