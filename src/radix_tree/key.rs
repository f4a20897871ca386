use std::fmt;

use bytes::{Bytes, BytesMut};

/// Edge label owned by a node.
///
/// Labels are backed by [`Bytes`] so that splitting a label hands out a
/// slice of the same allocation instead of copying.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyPrefix {
    prefix: Bytes,
}

impl KeyPrefix {
    pub fn new(key_bytes: &[u8]) -> KeyPrefix {
        KeyPrefix {
            prefix: Bytes::copy_from_slice(key_bytes),
        }
    }

    pub fn empty() -> KeyPrefix {
        KeyPrefix {
            prefix: Bytes::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.prefix.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefix.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.prefix
    }

    pub fn first_byte(&self) -> Option<u8> {
        self.prefix.first().copied()
    }

    /// The part of the label starting at `idx`, sharing storage with `self`.
    pub fn suffix(&self, idx: usize) -> KeyPrefix {
        KeyPrefix {
            prefix: self.prefix.slice(idx..),
        }
    }

    pub fn truncate(&mut self, idx: usize) {
        self.prefix.truncate(idx);
    }

    /// A new label holding `self` followed by `other`.
    pub fn concat(&self, other: &KeyPrefix) -> KeyPrefix {
        let mut joined = BytesMut::with_capacity(self.len() + other.len());
        joined.extend_from_slice(&self.prefix);
        joined.extend_from_slice(&other.prefix);

        KeyPrefix {
            prefix: joined.freeze(),
        }
    }

    pub fn match_with<'a>(&self, probe: KeyProbe<'a>) -> KeyMatchResult<'a> {
        let common = common_prefix_len(self.bytes(), probe.bytes());

        if common == self.len() {
            if common == probe.len() {
                KeyMatchResult::Complete
            } else {
                let (_, right) = probe.split_at(common);
                KeyMatchResult::Partial(right)
            }
        } else if common == 0 {
            KeyMatchResult::Disjoint
        } else if common == probe.len() {
            KeyMatchResult::LongerPrefix(common)
        } else {
            let (_, right) = probe.split_at(common);
            KeyMatchResult::Incomplete(common, right)
        }
    }
}

impl<'a> From<KeyProbe<'a>> for KeyPrefix {
    fn from(src: KeyProbe<'a>) -> Self {
        KeyPrefix::new(src.bytes())
    }
}

impl fmt::Display for KeyPrefix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.prefix))
    }
}

fn common_prefix_len(left: &[u8], right: &[u8]) -> usize {
    left.iter()
        .zip(right.iter())
        .take_while(|&(a, b)| a == b)
        .count()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyMatchResult<'a> {
    // Occurs when the prefix matches the start of the probe completely,
    // and the prefix is also shorter than the probe
    // Returns the end of the probe that did not match
    // Example
    // Prefix: "ABC"
    // Probe:  "ABCDEF"
    // The result should be Partial("DEF")
    Partial(KeyProbe<'a>),

    // Occurs when the prefix and the probe are the same length and are equal
    // Example
    // Prefix: "ABC"
    // Probe:  "ABC"
    // The result should be Complete
    Complete,

    // Occurs when the probe runs out strictly inside the prefix.
    // Returns the index at which to split the prefix
    // Example
    // Prefix: "ABCDEF"
    // Probe:  "ABC"
    // The result should be LongerPrefix(3)
    LongerPrefix(usize),

    // Occurs when the match diverges strictly inside the prefix, with
    // probe bytes left over.
    // Returns the index to split the prefix at and the remnants of the probe
    // Example 1 - match diverges in the middle
    // Prefix: "ABZDEF"
    // Probe:  "ABCDEF"
    // The result should be Incomplete(2, "CDEF")
    // Example 2 - the probe is too short and a portion doesn't match
    // Prefix: "ABCDEF"
    // Probe:  "ABZ"
    // The result should be Incomplete(2, "Z")
    Incomplete(usize, KeyProbe<'a>),

    // Occurs when not even the first byte matches, so the probe belongs
    // under some other sibling.
    // Prefix: "ABCDEF"
    // Probe:  "GHIJKL"
    Disjoint,
}

/// The unmatched remainder of a key while descending the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyProbe<'a> {
    key_portion: &'a [u8],
}

impl<'a> KeyProbe<'a> {
    pub fn new<K>(key: &'a K) -> Self
    where
        K: TreeKey + ?Sized,
    {
        KeyProbe {
            key_portion: key.as_bytes(),
        }
    }

    pub fn empty() -> Self {
        KeyProbe { key_portion: &[] }
    }

    pub fn len(&self) -> usize {
        self.key_portion.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key_portion.is_empty()
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.key_portion
    }

    pub fn first(&self) -> Option<u8> {
        self.key_portion.first().copied()
    }

    pub fn split_at(self, idx: usize) -> (KeyProbe<'a>, KeyProbe<'a>) {
        let (left_bytes, right_bytes) = self.key_portion.split_at(idx);
        let left = KeyProbe {
            key_portion: left_bytes,
        };
        let right = KeyProbe {
            key_portion: right_bytes,
        };

        (left, right)
    }
}

impl<'a> fmt::Display for KeyProbe<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self.key_portion))
    }
}

/// Anything that can be viewed as a byte string can be used as a key.
pub trait TreeKey {
    fn as_bytes(&self) -> &[u8];
}

impl<T> TreeKey for T
where
    T: AsRef<[u8]> + ?Sized,
{
    fn as_bytes(&self) -> &[u8] {
        self.as_ref()
    }
}
