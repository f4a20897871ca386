use std::iter::FusedIterator;

use super::key::KeyProbe;
use super::node::{find_subtree, RadixNode};

/// Depth-first iterator over the keys sharing a prefix.
///
/// A node is yielded before its children, and children are visited in
/// sibling order, so the output follows the insertion history of the tree
/// rather than the byte order of the keys.
pub struct PrefixIter<'a, V> {
    key: Vec<u8>,
    stack: Vec<(usize, &'a RadixNode<V>)>,
}

impl<'a, V> PrefixIter<'a, V> {
    pub(crate) fn new(root: &'a RadixNode<V>, prefix: &[u8]) -> Self {
        // The prefix may end inside a label. Everything above the node
        // found has been matched byte for byte, so the key so far is the
        // start of the prefix.
        match find_subtree(root, KeyProbe::new(prefix), 0) {
            Some((subtree, depth)) => PrefixIter {
                key: prefix[..depth].to_vec(),
                stack: vec![(depth, subtree)],
            },
            None => PrefixIter {
                key: Vec::new(),
                stack: Vec::new(),
            },
        }
    }
}

impl<'a, V> Iterator for PrefixIter<'a, V> {
    type Item = (Vec<u8>, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((depth, node)) = self.stack.pop() {
            self.key.truncate(depth);
            self.key.extend_from_slice(node.label().bytes());

            let child_depth = self.key.len();
            self.stack.extend(
                node.children()
                    .iter()
                    .rev()
                    .map(|(_, child)| (child_depth, child)),
            );

            if let Some(value) = node.value() {
                return Some((self.key.clone(), value));
            }
        }

        None
    }
}

impl<'a, V> FusedIterator for PrefixIter<'a, V> {}

#[cfg(test)]
mod prefix_iter_tests {
    use super::*;
    use crate::radix_tree::node::recursive_insert;

    fn build(keys: &[&str]) -> RadixNode<usize> {
        let mut root = RadixNode::root();
        for (idx, key) in keys.iter().enumerate() {
            recursive_insert(&mut root, KeyProbe::new(*key), idx);
        }
        root
    }

    fn collect(root: &RadixNode<usize>, prefix: &str) -> Vec<(String, usize)> {
        PrefixIter::new(root, prefix.as_bytes())
            .map(|(key, value)| (String::from_utf8(key).unwrap(), *value))
            .collect()
    }

    #[test]
    fn empty_tree_yields_nothing() {
        let root: RadixNode<usize> = RadixNode::root();

        assert!(collect(&root, "").is_empty());
        assert!(collect(&root, "a").is_empty());
    }

    #[test]
    fn follows_sibling_history() {
        let root = build(&["dog", "car", "cat", "ca"]);

        assert_eq!(
            collect(&root, ""),
            vec![
                ("dog".to_string(), 0),
                ("ca".to_string(), 3),
                ("car".to_string(), 1),
                ("cat".to_string(), 2),
            ]
        );
    }

    #[test]
    fn prefix_inside_label() {
        let root = build(&["hello", "help", "world"]);

        assert_eq!(
            collect(&root, "he"),
            vec![("hello".to_string(), 0), ("help".to_string(), 1)]
        );
        assert_eq!(collect(&root, "wor"), vec![("world".to_string(), 2)]);
        assert_eq!(collect(&root, "hell"), vec![("hello".to_string(), 0)]);
    }

    #[test]
    fn unknown_prefix() {
        let root = build(&["hello", "help"]);

        assert!(collect(&root, "hex").is_empty());
        assert!(collect(&root, "helpful").is_empty());
        assert!(collect(&root, "x").is_empty());
    }
}
