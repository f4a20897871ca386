use std::iter;
use std::mem;
use std::slice;
use std::vec;

use tracing::trace;

use super::key::{KeyMatchResult, KeyPrefix, KeyProbe};

/// Children of a node, in sibling order.
///
/// Every child is stored next to the first byte of its label. New
/// children are appended, so the order is the history of insertions and
/// splits under this node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeChildren<V> {
    children: Vec<(u8, Box<RadixNode<V>>)>,
}

impl<V> NodeChildren<V> {
    pub fn new() -> Self {
        NodeChildren {
            children: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    fn position(&self, prefix: u8) -> Option<usize> {
        self.children
            .iter()
            .position(|&(branch, _)| branch == prefix)
    }

    pub fn contains_child(&self, prefix: u8) -> bool {
        self.position(prefix).is_some()
    }

    pub fn get_child(&self, prefix: u8) -> Option<&RadixNode<V>> {
        let found_index = self.position(prefix)?;
        let (_, ref child) = self.children[found_index];

        Some(&**child)
    }

    pub fn get_child_mut(&mut self, prefix: u8) -> Option<&mut RadixNode<V>> {
        let found_index = self.position(prefix)?;
        let (_, ref mut child) = self.children[found_index];

        Some(&mut **child)
    }

    /// Appends `new_child` as the last sibling.
    pub fn insert_child(&mut self, prefix: u8, new_child: Box<RadixNode<V>>) {
        debug_assert_eq!(new_child.label.first_byte(), Some(prefix));
        debug_assert!(!self.contains_child(prefix));

        self.children.push((prefix, new_child));
    }

    /// Unlinks the child for `prefix`, keeping the remaining siblings in order.
    pub fn remove_child(&mut self, prefix: u8) -> Option<Box<RadixNode<V>>> {
        let found_index = self.position(prefix)?;
        let (_, child) = self.children.remove(found_index);

        Some(child)
    }

    fn only_child(&self) -> Option<&RadixNode<V>> {
        match self.children.as_slice() {
            [(_, child)] => Some(&**child),
            _ => None,
        }
    }

    pub fn iter<'a>(&'a self) -> ChildrenIter<'a, V>
    where
        V: 'a,
    {
        ChildrenIter {
            iter: self.children.iter(),
        }
    }
}

impl<V> Default for NodeChildren<V> {
    fn default() -> Self {
        NodeChildren::new()
    }
}

type IntoChildren<V> = iter::Map<
    vec::IntoIter<(u8, Box<RadixNode<V>>)>,
    fn((u8, Box<RadixNode<V>>)) -> Box<RadixNode<V>>,
>;

impl<V> IntoIterator for NodeChildren<V> {
    type Item = Box<RadixNode<V>>;
    type IntoIter = IntoChildren<V>;

    fn into_iter(self) -> Self::IntoIter {
        fn child<V>((_, node): (u8, Box<RadixNode<V>>)) -> Box<RadixNode<V>> {
            node
        }

        self.children.into_iter().map(child as fn(_) -> _)
    }
}

pub struct ChildrenIter<'a, V: 'a> {
    iter: slice::Iter<'a, (u8, Box<RadixNode<V>>)>,
}

impl<'a, V: 'a> iter::Iterator for ChildrenIter<'a, V> {
    type Item = (u8, &'a RadixNode<V>);

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|&(branch, ref child)| (branch, &**child))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<'a, V: 'a> iter::DoubleEndedIterator for ChildrenIter<'a, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.iter
            .next_back()
            .map(|&(branch, ref child)| (branch, &**child))
    }
}

impl<'a, V: 'a> iter::ExactSizeIterator for ChildrenIter<'a, V> {}

/// A node of the tree.
///
/// `value` is `Some` when the labels on the path from the root down to
/// and including this node spell a stored key. Nodes holding `None` are
/// branch points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadixNode<V> {
    label: KeyPrefix,
    value: Option<V>,
    children: NodeChildren<V>,
}

impl<V> RadixNode<V> {
    /// The sentinel at the top of every tree: empty label, never a leaf.
    pub fn root() -> Self {
        RadixNode {
            label: KeyPrefix::empty(),
            value: None,
            children: NodeChildren::new(),
        }
    }

    pub fn new_leaf(label: KeyPrefix, value: V) -> Self {
        RadixNode {
            label,
            value: Some(value),
            children: NodeChildren::new(),
        }
    }

    pub fn label(&self) -> &KeyPrefix {
        &self.label
    }

    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    pub fn is_leaf(&self) -> bool {
        self.value.is_some()
    }

    pub fn is_root(&self) -> bool {
        self.label.is_empty()
    }

    pub fn children(&self) -> &NodeChildren<V> {
        &self.children
    }

    pub fn take_children(&mut self) -> NodeChildren<V> {
        mem::take(&mut self.children)
    }

    /// Cuts the label at `idx`. The tail becomes the only child of this
    /// node and takes over its value and children.
    fn split_at(&mut self, idx: usize) {
        debug_assert!(idx > 0 && idx < self.label.len());

        let branch = self.label.bytes()[idx];
        let inherited = Box::new(RadixNode {
            label: self.label.suffix(idx),
            value: self.value.take(),
            children: self.take_children(),
        });

        self.label.truncate(idx);
        self.children.insert_child(branch, inherited);

        trace!(label = %self.label, at = idx, "split");
    }

    /// Absorbs the only child into this node: the labels are joined and the
    /// child's value and children move up. Does nothing unless there is
    /// exactly one child.
    fn merge_only_child(&mut self) {
        let joined = match self.children.only_child() {
            Some(child) => self.label.concat(&child.label),
            None => return,
        };

        let (_, child) = self.children.children.remove(0);
        let child = *child;

        trace!(label = %joined, "merge");

        self.label = joined;
        self.value = child.value;
        self.children = child.children;
    }
}

pub fn recursive_find<'p, 'v, V>(current: &'v RadixNode<V>, probe: KeyProbe<'p>) -> Option<&'v V> {
    match current.label.match_with(probe) {
        KeyMatchResult::Complete => current.value.as_ref(),
        KeyMatchResult::Partial(remaining_probe) => {
            let next_char = remaining_probe.first()?;
            let child = current.children.get_child(next_char)?;

            recursive_find(child, remaining_probe)
        }
        _ => None,
    }
}

pub fn recursive_mut_find<'p, 'v, V>(
    current: &'v mut RadixNode<V>,
    probe: KeyProbe<'p>,
) -> Option<&'v mut V> {
    match current.label.match_with(probe) {
        KeyMatchResult::Complete => current.value.as_mut(),
        KeyMatchResult::Partial(remaining_probe) => {
            let next_char = remaining_probe.first()?;
            let child = current.children.get_child_mut(next_char)?;

            recursive_mut_find(child, remaining_probe)
        }
        _ => None,
    }
}

/// Stores `new_value` under `probe`, returning the value it replaced.
///
/// Must be called with a non-empty probe on the root, or on a child whose
/// first label byte equals the first probe byte.
pub fn recursive_insert<'p, V>(
    current: &mut RadixNode<V>,
    probe: KeyProbe<'p>,
    new_value: V,
) -> Option<V> {
    match current.label.match_with(probe) {
        KeyMatchResult::Complete => current.value.replace(new_value),
        KeyMatchResult::Partial(remaining_probe) => {
            // A partial match always leaves at least one probe byte.
            let next_char = remaining_probe.bytes()[0];

            match current.children.get_child_mut(next_char) {
                Some(child) => recursive_insert(child, remaining_probe, new_value),
                None => {
                    let new_leaf = RadixNode::new_leaf(From::from(remaining_probe), new_value);

                    trace!(parent = %current.label, leaf = %new_leaf.label, "append leaf");

                    current.children.insert_child(next_char, Box::new(new_leaf));

                    None
                }
            }
        }
        KeyMatchResult::LongerPrefix(split_index) => {
            current.split_at(split_index);
            current.value = Some(new_value);

            None
        }
        KeyMatchResult::Incomplete(split_index, remaining_probe) => {
            let next_char_new = remaining_probe.bytes()[0];
            let new_leaf = Box::new(RadixNode::new_leaf(From::from(remaining_probe), new_value));

            current.split_at(split_index);
            current.children.insert_child(next_char_new, new_leaf);

            None
        }
        KeyMatchResult::Disjoint => unreachable!("children are selected by their first label byte"),
    }
}

/// Removes the key `probe` from the children of `parent`, compacting
/// `parent` and the matched node afterwards.
pub fn recursive_remove<'p, V>(parent: &mut RadixNode<V>, probe: KeyProbe<'p>) -> Option<V> {
    let next_char = probe.first()?;

    let (removed_value, unlink) = {
        let child = parent.children.get_child_mut(next_char)?;

        match child.label.match_with(probe) {
            KeyMatchResult::Complete => {
                let removed_value = child.value.take()?;

                if child.children.is_empty() {
                    (removed_value, true)
                } else {
                    child.merge_only_child();
                    (removed_value, false)
                }
            }
            KeyMatchResult::Partial(remaining_probe) => {
                return recursive_remove(child, remaining_probe);
            }
            _ => return None,
        }
    };

    if unlink {
        let _ = parent.children.remove_child(next_char);
        trace!(parent = %parent.label, branch = next_char, "unlink leaf");
    }

    if !parent.is_root() && !parent.is_leaf() {
        parent.merge_only_child();
    }

    Some(removed_value)
}

/// The bytes that extend `probe` to the end of the label it stops inside,
/// or `None` when `probe` ends on a node boundary or matches no key.
pub fn recursive_completion<'p, 'v, V>(
    current: &'v RadixNode<V>,
    probe: KeyProbe<'p>,
) -> Option<&'v [u8]> {
    match current.label.match_with(probe) {
        KeyMatchResult::Partial(remaining_probe) => {
            let next_char = remaining_probe.first()?;
            let child = current.children.get_child(next_char)?;

            recursive_completion(child, remaining_probe)
        }
        KeyMatchResult::LongerPrefix(matched) => Some(&current.label.bytes()[matched..]),
        KeyMatchResult::Complete | KeyMatchResult::Incomplete(..) | KeyMatchResult::Disjoint => {
            None
        }
    }
}

/// Finds the highest node whose keys all start with `probe`, together with
/// the number of key bytes on the path above it.
pub fn find_subtree<'p, 'v, V>(
    current: &'v RadixNode<V>,
    probe: KeyProbe<'p>,
    depth: usize,
) -> Option<(&'v RadixNode<V>, usize)> {
    match current.label.match_with(probe) {
        KeyMatchResult::Complete | KeyMatchResult::LongerPrefix(_) => Some((current, depth)),
        KeyMatchResult::Partial(remaining_probe) => {
            let next_char = remaining_probe.first()?;
            let child = current.children.get_child(next_char)?;

            find_subtree(child, remaining_probe, depth + current.label.len())
        }
        _ => None,
    }
}


/// Structural checks over a whole tree.
pub mod well_formed {
    use std::error::Error;
    use std::fmt;

    use super::RadixNode;

    /// A violated structural invariant, found by
    /// [`RadixTree::check_well_formed`](crate::RadixTree::check_well_formed).
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum MalformedTree {
        /// The root carries a label
        RootLabel { label: Vec<u8> },
        /// The root is marked as a leaf
        RootValue,
        /// A node below the root has an empty label
        EmptyLabel { parent_key: Vec<u8> },
        /// The byte a child is filed under differs from its label
        StaleBranch { key: Vec<u8>, branch: u8 },
        /// Two siblings start with the same byte
        DuplicateBranch { parent_key: Vec<u8>, branch: u8 },
        /// A node below the root has neither a value nor children
        DeadNode { key: Vec<u8> },
        /// The recorded length does not match the number of leaves
        LenMismatch { expected: usize, found: usize },
    }

    impl fmt::Display for MalformedTree {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            match *self {
                MalformedTree::RootLabel { ref label } => {
                    write!(f, "root has label {:?}", String::from_utf8_lossy(label))
                }
                MalformedTree::RootValue => write!(f, "root is marked as a leaf"),
                MalformedTree::EmptyLabel { ref parent_key } => write!(
                    f,
                    "empty label below {:?}",
                    String::from_utf8_lossy(parent_key)
                ),
                MalformedTree::StaleBranch { ref key, branch } => write!(
                    f,
                    "node {:?} is filed under byte {:#04x}",
                    String::from_utf8_lossy(key),
                    branch
                ),
                MalformedTree::DuplicateBranch {
                    ref parent_key,
                    branch,
                } => write!(
                    f,
                    "two children of {:?} start with byte {:#04x}",
                    String::from_utf8_lossy(parent_key),
                    branch
                ),
                MalformedTree::DeadNode { ref key } => write!(
                    f,
                    "node {:?} has no value and no children",
                    String::from_utf8_lossy(key)
                ),
                MalformedTree::LenMismatch { expected, found } => write!(
                    f,
                    "tree records {} keys but holds {} leaves",
                    expected, found
                ),
            }
        }
    }

    impl Error for MalformedTree {}

    pub fn check_tree<V>(root: &RadixNode<V>, expected_len: usize) -> Result<(), MalformedTree> {
        if !root.label.is_empty() {
            return Err(MalformedTree::RootLabel {
                label: root.label.bytes().to_vec(),
            });
        }
        if root.value.is_some() {
            return Err(MalformedTree::RootValue);
        }

        let mut leaves = 0;
        let mut key = Vec::new();
        let mut stack = vec![(0, root)];

        while let Some((depth, node)) = stack.pop() {
            key.truncate(depth);
            key.extend_from_slice(node.label.bytes());

            if node.value.is_some() {
                leaves += 1;
            } else if !node.is_root() && node.children.is_empty() {
                return Err(MalformedTree::DeadNode { key });
            }

            let mut seen = [false; 256];
            for (branch, child) in node.children.iter() {
                match child.label.first_byte() {
                    None => return Err(MalformedTree::EmptyLabel { parent_key: key }),
                    Some(first) if first != branch => {
                        key.extend_from_slice(child.label.bytes());
                        return Err(MalformedTree::StaleBranch { key, branch });
                    }
                    Some(_) => {}
                }

                if seen[branch as usize] {
                    return Err(MalformedTree::DuplicateBranch {
                        parent_key: key,
                        branch,
                    });
                }
                seen[branch as usize] = true;

                stack.push((key.len(), child));
            }
        }

        if leaves != expected_len {
            return Err(MalformedTree::LenMismatch {
                expected: expected_len,
                found: leaves,
            });
        }

        Ok(())
    }
}
